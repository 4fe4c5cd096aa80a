//! Storage capabilities consumed by the compatibility service.
//!
//! The traits here describe what the core needs from persistence without
//! committing to a backend: [`UserLookup`] resolves selectors,
//! [`UserDirectory`] upserts users, [`PairStore`] caches scores by
//! [`PairKey`], and [`InterestCatalog`] records known interests. The
//! `store-sqlite` feature provides [`SqliteStore`], which implements all of
//! them over a single connection.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{
    CachedPair, CatalogEntry, CatalogError, Category, PairKey, UserProfile, UserSelector,
    ValidatedUser,
};

#[cfg(feature = "store-sqlite")]
mod schema;
#[cfg(feature = "store-sqlite")]
mod sqlite;

#[cfg(feature = "store-sqlite")]
pub use schema::SCHEMA_VERSION;
#[cfg(feature = "store-sqlite")]
pub use sqlite::SqliteStore;

/// Errors raised by storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Opening the SQLite database failed.
    #[cfg(feature = "store-sqlite")]
    #[error("failed to open SQLite database at {path}")]
    OpenDatabase {
        /// Requested database path.
        path: std::path::PathBuf,
        /// Source error from `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Preparing or executing a statement failed.
    #[cfg(feature = "store-sqlite")]
    #[error("failed to {operation}")]
    Sqlite {
        /// Description of the failed operation.
        operation: &'static str,
        /// Source error from `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// The database was created by an incompatible schema.
    #[error("unsupported schema version {found} (expected {expected})")]
    SchemaVersion {
        /// Version recorded in the database.
        found: i64,
        /// Version this build understands.
        expected: i64,
    },
    /// Serialising a value for storage failed.
    #[error("failed to encode {what}")]
    Encode {
        /// Description of the value.
        what: &'static str,
        /// Source error from `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// Deserialising a stored value failed.
    #[error("failed to decode {what}")]
    Decode {
        /// Description of the value.
        what: &'static str,
        /// Source error from `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// A stored value violated its invariants.
    #[error("stored {what} value {value:?} is invalid")]
    Corrupt {
        /// Description of the value.
        what: &'static str,
        /// Offending raw value.
        value: String,
    },
    /// A writer panicked while holding the store lock.
    #[error("store lock was poisoned by a panicking writer")]
    Poisoned,
}

/// Resolve a [`UserSelector`] to a stored profile.
pub trait UserLookup {
    /// Return the profile the selector names, if any.
    fn find_one(&self, selector: &UserSelector) -> Result<Option<UserProfile>, StoreError>;
}

/// Persist users keyed by handle.
pub trait UserDirectory: UserLookup {
    /// Insert a new user or replace the fields of the user with the same
    /// handle.
    ///
    /// Existing users keep their identifier and `created_at`; `updated_at`
    /// is set to `now`. The write is a single atomic operation.
    fn upsert_user(&self, user: &ValidatedUser, now: DateTime<Utc>)
    -> Result<UserProfile, StoreError>;
}

/// Cache of compatibility results keyed by [`PairKey`].
///
/// Implementations apply their own time-to-live, measured from each entry's
/// `computed_at`.
pub trait PairStore {
    /// Atomically insert or overwrite the entry for `pair.pair_key` and
    /// return the stored record.
    ///
    /// Concurrent writers for the same key never fail; the last write wins.
    fn upsert_pair(&self, pair: &CachedPair) -> Result<CachedPair, StoreError>;

    /// Return the entry for `key` unless it is missing or expired at `now`.
    fn fresh_pair(
        &self,
        key: &PairKey,
        now: DateTime<Utc>,
    ) -> Result<Option<CachedPair>, StoreError>;

    /// Delete entries that have expired at `now`, returning how many were
    /// removed.
    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, StoreError>;
}

/// Registry of interests seen across all users.
pub trait InterestCatalog {
    /// Ensure an entry exists for `name` within `category`.
    ///
    /// Matching is case-insensitive. Existing entries keep their spelling and
    /// only have `updated_at` bumped, plus `image_url` when a non-blank one
    /// is supplied.
    fn ensure_interest(
        &self,
        category: Category,
        name: &str,
        image_url: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<CatalogEntry, CatalogError>;

    /// List the entries of a category ordered by lower-cased name.
    fn list_interests(&self, category: Category) -> Result<Vec<CatalogEntry>, StoreError>;
}

impl<T: UserLookup + ?Sized> UserLookup for &T {
    fn find_one(&self, selector: &UserSelector) -> Result<Option<UserProfile>, StoreError> {
        (**self).find_one(selector)
    }
}

impl<T: PairStore + ?Sized> PairStore for &T {
    fn upsert_pair(&self, pair: &CachedPair) -> Result<CachedPair, StoreError> {
        (**self).upsert_pair(pair)
    }

    fn fresh_pair(
        &self,
        key: &PairKey,
        now: DateTime<Utc>,
    ) -> Result<Option<CachedPair>, StoreError> {
        (**self).fresh_pair(key, now)
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        (**self).purge_expired(now)
    }
}
