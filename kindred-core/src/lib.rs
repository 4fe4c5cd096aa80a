//! Core domain types for the Kindred compatibility engine.
//!
//! Users declare interests in a handful of [`Category`] values. A
//! [`CompatibilityScorer`] turns two [`InterestSet`]s into a 0-100 score with
//! a per-category breakdown, and [`CompatService`] caches each result under
//! an order-independent [`PairKey`] for a configurable time-to-live.
//!
//! Persistence is expressed as traits in [`store`]; the `store-sqlite`
//! feature adds [`SqliteStore`].

#![forbid(unsafe_code)]

mod catalog;
mod category;
mod clock;
mod compat;
mod interests;
mod scorer;
mod service;
pub mod store;
#[doc(hidden)]
pub mod test_support;
mod user;
mod weights;

pub use catalog::{CatalogEntry, CatalogError, catalog_key, register_user, usable_image_url};
pub use category::{Category, UnknownCategory};
pub use clock::{Clock, SystemClock};
pub use compat::{
    Breakdown, CachedPair, CategoryBreakdown, Comparison, CompatibilityResult, PAIR_KEY_SEPARATOR,
    PairKey, PairUsers, ScoreOptions, Scored, expiry_of,
};
pub use interests::{InterestSet, normalise_interest, tidy_entries};
pub use scorer::CompatibilityScorer;
pub use service::{CompatError, CompatService, PairSide};
#[cfg(feature = "store-sqlite")]
pub use store::SqliteStore;
pub use store::StoreError;
pub use user::{
    Handle, MAX_HANDLE_LEN, MAX_INTEREST_LEN, MAX_INTERESTS_PER_CATEGORY, MAX_NAME_LEN,
    MAX_UNI_LEN, UserDraft, UserId, UserProfile, UserSelector, UserSummary, UserValidationError,
    ValidatedUser,
};
pub use weights::{DEFAULT_WEIGHTS, WeightConfig, WeightOverrides};
