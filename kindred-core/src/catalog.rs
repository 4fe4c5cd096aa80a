//! Interest catalog bookkeeping and user registration.
//!
//! The catalog is a write-through side channel: [`register_user`] stores the
//! user first and then records each interest on a best-effort basis. Catalog
//! failures are logged and never change the registration outcome.

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::{InterestCatalog, StoreError, UserDirectory};
use crate::{Category, UserProfile, ValidatedUser};

/// A known interest within a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Category the interest belongs to.
    pub category: Category,
    /// Spelling recorded when the interest was first seen.
    pub name: String,
    /// Optional artwork.
    pub image_url: Option<String>,
    /// First time the interest was recorded.
    pub created_at: DateTime<Utc>,
    /// Most recent time the interest was ensured.
    pub updated_at: DateTime<Utc>,
}

/// Errors raised by [`InterestCatalog::ensure_interest`].
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The interest name was blank.
    #[error("{category} interest name cannot be empty")]
    EmptyName {
        /// Category of the rejected entry.
        category: Category,
    },
    /// The backing store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Trimmed display name and lower-cased lookup key for a catalog entry.
///
/// # Errors
/// Returns [`CatalogError::EmptyName`] for blank names.
pub fn catalog_key(category: Category, name: &str) -> Result<(String, String), CatalogError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CatalogError::EmptyName { category });
    }
    Ok((trimmed.to_owned(), trimmed.to_lowercase()))
}

/// Return `image_url` trimmed, or `None` when blank.
#[must_use]
pub fn usable_image_url(image_url: Option<&str>) -> Option<&str> {
    image_url.map(str::trim).filter(|url| !url.is_empty())
}

/// Upsert a user, then record each of their interests in the catalog.
///
/// Catalog writes are fire-and-forget: each failure is logged at `warn`
/// level and the stored profile is returned regardless.
///
/// # Errors
/// Returns [`StoreError`] only when the user upsert itself fails.
pub fn register_user<D, C>(
    directory: &D,
    catalog: &C,
    user: &ValidatedUser,
    now: DateTime<Utc>,
) -> Result<UserProfile, StoreError>
where
    D: UserDirectory + ?Sized,
    C: InterestCatalog + ?Sized,
{
    let profile = directory.upsert_user(user, now)?;
    for (category, entries) in profile.interests.iter() {
        for entry in entries {
            if let Err(err) = catalog.ensure_interest(category, entry, None, now) {
                warn!("ensure_interest failed for {category}:{entry} - {err}");
            }
        }
    }
    Ok(profile)
}
