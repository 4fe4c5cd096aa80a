//! Categories describing the fixed interest buckets.
//!
//! The enum is closed: scoring iterates [`Category::ALL`] and never sees a
//! category outside it. Free-form names are only accepted at parse
//! boundaries via [`FromStr`](std::str::FromStr).
//!
//! # Examples
//! ```
//! use kindred_core::Category;
//!
//! assert_eq!(Category::Movie.as_str(), "movie");
//! assert_eq!(Category::Hobby.to_string(), "hobby");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An interest bucket shared by every user profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Films.
    Movie,
    /// Television series.
    Tv,
    /// Musicians and other performing artists.
    Artist,
    /// Pastimes and activities.
    Hobby,
}

/// Error returned when a category name is outside the fixed set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported category '{name}', use one of movie, tv, artist, hobby")]
pub struct UnknownCategory {
    /// The rejected input.
    pub name: String,
}

impl Category {
    /// Every category in scoring order.
    pub const ALL: [Self; 4] = [Self::Movie, Self::Tv, Self::Artist, Self::Hobby];

    /// Return the category as a lowercase `&str`.
    ///
    /// # Examples
    /// ```
    /// use kindred_core::Category;
    ///
    /// assert_eq!(Category::Tv.as_str(), "tv");
    /// ```
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Tv => "tv",
            Self::Artist => "artist",
            Self::Hobby => "hobby",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "movie" => Ok(Self::Movie),
            "tv" => Ok(Self::Tv),
            "artist" => Ok(Self::Artist),
            "hobby" => Ok(Self::Hobby),
            _ => Err(UnknownCategory { name: s.to_owned() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[rstest]
    fn display_matches_as_str() {
        for category in Category::ALL {
            assert_eq!(category.to_string(), category.as_str());
        }
    }

    #[rstest]
    #[case("movie", Category::Movie)]
    #[case(" TV ", Category::Tv)]
    #[case("Artist", Category::Artist)]
    fn parsing_is_case_insensitive(#[case] raw: &str, #[case] expected: Category) {
        assert_eq!(Category::from_str(raw), Ok(expected));
    }

    #[rstest]
    fn parsing_rejects_unknown() {
        let err = Category::from_str("podcast").unwrap_err();
        assert_eq!(err.name, "podcast");
        assert!(err.to_string().contains("unsupported category"));
    }

    #[rstest]
    fn serialises_as_lowercase_name() {
        let json = serde_json::to_string(&Category::Hobby).unwrap();
        assert_eq!(json, "\"hobby\"");
    }
}
