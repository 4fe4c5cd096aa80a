//! User identities, validated drafts and lookup selectors.
//!
//! Raw input arrives as a [`UserDraft`]; [`UserDraft::validate`] enforces the
//! length bounds below and produces a [`ValidatedUser`] that stores accept.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Category, InterestSet};

/// Maximum length of a display name, in characters.
pub const MAX_NAME_LEN: usize = 120;
/// Maximum length of a handle, in characters.
pub const MAX_HANDLE_LEN: usize = 64;
/// Maximum length of a university name, in characters.
pub const MAX_UNI_LEN: usize = 160;
/// Maximum number of interests per category.
pub const MAX_INTERESTS_PER_CATEGORY: usize = 100;
/// Maximum length of a single interest, in characters.
pub const MAX_INTEREST_LEN: usize = 120;

const ID_SELECTOR_PREFIX: &str = "id:";

/// Errors raised while validating user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserValidationError {
    /// The name was blank.
    #[error("user name is required")]
    MissingName,
    /// The name exceeded [`MAX_NAME_LEN`].
    #[error("user name exceeds {max} characters")]
    NameTooLong {
        /// Permitted maximum.
        max: usize,
    },
    /// The handle was blank.
    #[error("user handle is required")]
    MissingHandle,
    /// The handle exceeded [`MAX_HANDLE_LEN`].
    #[error("user handle exceeds {max} characters")]
    HandleTooLong {
        /// Permitted maximum.
        max: usize,
    },
    /// The university exceeded [`MAX_UNI_LEN`].
    #[error("university exceeds {max} characters")]
    UniTooLong {
        /// Permitted maximum.
        max: usize,
    },
    /// A category listed more than [`MAX_INTERESTS_PER_CATEGORY`] entries.
    #[error("{category} lists more than {max} interests")]
    TooManyInterests {
        /// Offending category.
        category: Category,
        /// Permitted maximum.
        max: usize,
    },
    /// An interest exceeded [`MAX_INTEREST_LEN`].
    #[error("{category} interest exceeds {max} characters")]
    InterestTooLong {
        /// Offending category.
        category: Category,
        /// Permitted maximum.
        max: usize,
    },
    /// An `id:` selector carried no identifier.
    #[error("user id selector must not be empty")]
    EmptyId,
}

/// Opaque, store-assigned user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap an identifier issued by a store.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A unique, normalised user handle: trimmed, lower-cased, at most
/// [`MAX_HANDLE_LEN`] characters.
///
/// # Examples
/// ```
/// use kindred_core::Handle;
///
/// let handle = Handle::parse("  Ada ").unwrap();
/// assert_eq!(handle.as_str(), "ada");
/// assert!(Handle::parse("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Handle(String);

impl Handle {
    /// Normalise and validate a raw handle.
    ///
    /// # Errors
    /// Returns [`UserValidationError::MissingHandle`] for blank input and
    /// [`UserValidationError::HandleTooLong`] when the bound is exceeded.
    pub fn parse(raw: &str) -> Result<Self, UserValidationError> {
        let normalised = raw.trim().to_lowercase();
        if normalised.is_empty() {
            return Err(UserValidationError::MissingHandle);
        }
        if normalised.chars().count() > MAX_HANDLE_LEN {
            return Err(UserValidationError::HandleTooLong {
                max: MAX_HANDLE_LEN,
            });
        }
        Ok(Self(normalised))
    }

    /// Borrow the normalised handle.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Handle {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Handle> for String {
    fn from(handle: Handle) -> Self {
        handle.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Selects a single user by identifier or handle.
///
/// The text form is `id:<identifier>` for identifiers; anything else is
/// parsed as a handle.
///
/// # Examples
/// ```
/// use kindred_core::{Handle, UserId, UserSelector};
///
/// let by_id: UserSelector = "id:42".parse().unwrap();
/// assert_eq!(by_id, UserSelector::Id(UserId::new("42")));
///
/// let by_handle: UserSelector = "Ada".parse().unwrap();
/// assert_eq!(by_handle, UserSelector::Handle(Handle::parse("ada").unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UserSelector {
    /// Match the store-assigned identifier.
    Id(UserId),
    /// Match the normalised handle.
    Handle(Handle),
}

impl UserSelector {
    /// Report whether `profile` is the user this selector names.
    #[must_use]
    pub fn matches(&self, profile: &UserProfile) -> bool {
        match self {
            Self::Id(id) => &profile.id == id,
            Self::Handle(handle) => &profile.handle == handle,
        }
    }
}

impl FromStr for UserSelector {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(id) = trimmed.strip_prefix(ID_SELECTOR_PREFIX) {
            let id_trimmed = id.trim();
            if id_trimmed.is_empty() {
                return Err(UserValidationError::EmptyId);
            }
            return Ok(Self::Id(UserId::new(id_trimmed)));
        }
        Handle::parse(trimmed).map(Self::Handle)
    }
}

impl fmt::Display for UserSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{ID_SELECTOR_PREFIX}{id}"),
            Self::Handle(handle) => write!(f, "{handle}"),
        }
    }
}

/// Unvalidated user input as received at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserDraft {
    /// Display name.
    pub name: String,
    /// Requested handle; normalised during validation.
    pub handle: String,
    /// Optional university.
    #[serde(default)]
    pub uni: Option<String>,
    /// Interests grouped by category.
    #[serde(default)]
    pub interests: InterestSet,
}

impl UserDraft {
    /// Validate bounds, normalise the handle and tidy interests.
    ///
    /// Blank interest entries are dropped and duplicates collapse onto the
    /// first spelling before the per-category count is checked.
    ///
    /// # Errors
    /// Returns the first [`UserValidationError`] encountered.
    pub fn validate(self) -> Result<ValidatedUser, UserValidationError> {
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return Err(UserValidationError::MissingName);
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(UserValidationError::NameTooLong { max: MAX_NAME_LEN });
        }
        let handle = Handle::parse(&self.handle)?;
        let uni = match self.uni.as_deref().map(str::trim) {
            Some(value) if value.chars().count() > MAX_UNI_LEN => {
                return Err(UserValidationError::UniTooLong { max: MAX_UNI_LEN });
            }
            Some(value) if !value.is_empty() => Some(value.to_owned()),
            _ => None,
        };
        let interests = self.interests.tidied();
        validate_interests(&interests)?;
        Ok(ValidatedUser {
            name,
            handle,
            uni,
            interests,
        })
    }
}

fn validate_interests(interests: &InterestSet) -> Result<(), UserValidationError> {
    for (category, entries) in interests.iter() {
        if entries.len() > MAX_INTERESTS_PER_CATEGORY {
            return Err(UserValidationError::TooManyInterests {
                category,
                max: MAX_INTERESTS_PER_CATEGORY,
            });
        }
        if entries
            .iter()
            .any(|entry| entry.chars().count() > MAX_INTEREST_LEN)
        {
            return Err(UserValidationError::InterestTooLong {
                category,
                max: MAX_INTEREST_LEN,
            });
        }
    }
    Ok(())
}

/// User input that passed [`UserDraft::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUser {
    /// Trimmed display name.
    pub name: String,
    /// Normalised handle.
    pub handle: Handle,
    /// Trimmed university, absent when blank.
    pub uni: Option<String>,
    /// Tidied interests.
    pub interests: InterestSet,
}

/// A persisted user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Store-assigned identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Unique handle.
    pub handle: Handle,
    /// Optional university.
    pub uni: Option<String>,
    /// Interests grouped by category.
    pub interests: InterestSet,
    /// First time the handle was stored.
    pub created_at: DateTime<Utc>,
    /// Most recent upsert.
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Return the minimal identity shown alongside comparisons.
    #[must_use]
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            handle: self.handle.clone(),
        }
    }
}

/// Minimal identity information for a compared user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    /// Store-assigned identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Unique handle.
    pub handle: Handle,
}
