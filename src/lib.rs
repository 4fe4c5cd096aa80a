//! Facade crate for the Kindred compatibility engine.
//!
//! This crate re-exports the core domain types and the Jaccard scorer, and
//! exposes the SQLite store behind the `store-sqlite` feature.

#![forbid(unsafe_code)]

pub use kindred_core::{
    Breakdown, CachedPair, CatalogEntry, CatalogError, Category, CategoryBreakdown, Clock,
    Comparison, CompatError, CompatService, CompatibilityResult, CompatibilityScorer, Handle,
    InterestSet, PairKey, PairSide, ScoreOptions, Scored, StoreError, SystemClock, UnknownCategory,
    UserDraft, UserId, UserProfile, UserSelector, UserValidationError, WeightConfig,
    WeightOverrides, register_user, store,
};

#[cfg(feature = "store-sqlite")]
pub use kindred_core::SqliteStore;

pub use kindred_scorer::{JaccardScorer, jaccard};
