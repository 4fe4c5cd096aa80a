//! Interest sets: per-category lists of free-text interests.
//!
//! Entries keep the spelling the user supplied. Comparisons go through
//! [`normalise_interest`], which trims and lower-cases, so `"Inception "` and
//! `"inception"` name the same interest.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::Category;

/// A user's interests grouped by [`Category`].
///
/// Missing categories behave as empty lists.
///
/// # Examples
/// ```
/// use kindred_core::{Category, InterestSet};
///
/// let interests = InterestSet::new().with_entries(Category::Movie, ["Inception", "Up"]);
/// assert_eq!(interests.entries(Category::Movie).len(), 2);
/// assert!(interests.entries(Category::Tv).is_empty());
/// assert!(interests.normalised(Category::Movie).contains("inception"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterestSet {
    entries: BTreeMap<Category, Vec<String>>,
}

impl InterestSet {
    /// Construct an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the raw entries for a category, or an empty slice.
    #[must_use]
    pub fn entries(&self, category: Category) -> &[String] {
        self.entries
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Replace the entries for a category.
    pub fn set_entries<I, S>(&mut self, category: Category, entries: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries
            .insert(category, entries.into_iter().map(Into::into).collect());
    }

    /// Replace the entries for a category while returning `self` for chaining.
    #[must_use]
    pub fn with_entries<I, S>(mut self, category: Category, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_entries(category, entries);
        self
    }

    /// Return the normalised, de-duplicated entries for a category.
    ///
    /// Blank entries are dropped.
    #[must_use]
    pub fn normalised(&self, category: Category) -> BTreeSet<String> {
        self.entries(category)
            .iter()
            .filter_map(|entry| normalise_interest(entry))
            .collect()
    }

    /// Report whether every category is empty after normalisation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        Category::ALL
            .iter()
            .all(|category| self.normalised(*category).is_empty())
    }

    /// Iterate over categories that carry at least one raw entry.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[String])> {
        self.entries
            .iter()
            .filter(|(_, entries)| !entries.is_empty())
            .map(|(category, entries)| (*category, entries.as_slice()))
    }

    /// Return a copy with every category passed through [`tidy_entries`].
    #[must_use]
    pub fn tidied(&self) -> Self {
        let entries = self
            .entries
            .iter()
            .map(|(category, raw)| (*category, tidy_entries(raw)))
            .filter(|(_, tidy)| !tidy.is_empty())
            .collect();
        Self { entries }
    }
}

/// Normalise an interest for comparison.
///
/// Returns `None` for blank input.
///
/// # Examples
/// ```
/// use kindred_core::normalise_interest;
///
/// assert_eq!(normalise_interest("  Inception "), Some("inception".to_owned()));
/// assert_eq!(normalise_interest("   "), None);
/// ```
#[must_use]
pub fn normalise_interest(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Trim entries, drop blanks and de-duplicate case-insensitively.
///
/// The first spelling of each interest wins and input order is kept.
///
/// # Examples
/// ```
/// use kindred_core::tidy_entries;
///
/// let tidy = tidy_entries(&[" Dune", "dune ", "", "Up"]);
/// assert_eq!(tidy, vec!["Dune".to_owned(), "Up".to_owned()]);
/// ```
#[must_use]
pub fn tidy_entries<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.iter()
        .map(|entry| entry.as_ref().trim())
        .filter(|entry| !entry.is_empty())
        .filter(|entry| seen.insert(entry.to_lowercase()))
        .map(str::to_owned)
        .collect()
}
