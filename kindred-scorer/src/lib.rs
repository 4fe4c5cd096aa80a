//! Weighted Jaccard compatibility scoring.
//!
//! [`JaccardScorer`] compares two [`InterestSet`](kindred_core::InterestSet)s
//! category by category. Each category contributes the Jaccard similarity of
//! its normalised sets, scaled by a resolved weight, and the weighted sum is
//! mapped onto `0..=100`.
//!
//! # Examples
//!
//! ```
//! use kindred_core::{Category, CompatibilityScorer, InterestSet, ScoreOptions};
//! use kindred_scorer::JaccardScorer;
//!
//! let a = InterestSet::new().with_entries(Category::Movie, ["Inception", "Interstellar"]);
//! let b = InterestSet::new().with_entries(Category::Movie, ["inception", "Tenet"]);
//! let scored = JaccardScorer.compute(&a, &b, &ScoreOptions::default());
//! assert_eq!(scored.score, 33);
//! assert_eq!(scored.breakdown[&Category::Movie].common, ["Inception"]);
//! ```

#![forbid(unsafe_code)]

mod jaccard;

pub use jaccard::{JaccardScorer, jaccard};

#[cfg(test)]
mod tests;
