//! SQLite-backed implementation of every storage trait.
//!
//! One connection is shared behind a mutex. Each write is a single
//! `INSERT ... ON CONFLICT ... DO UPDATE ... RETURNING` statement, so
//! concurrent writers for the same handle, pair or interest never fail on a
//! uniqueness violation and the last write wins.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use uuid::Uuid;

use super::schema::initialise_schema;
use super::{InterestCatalog, PairStore, StoreError, UserDirectory, UserLookup};
use crate::catalog::{catalog_key, usable_image_url};
use crate::{
    Breakdown, CachedPair, CatalogEntry, CatalogError, Category, CompatibilityResult, Handle,
    InterestSet, PairKey, UserId, UserProfile, UserSelector, ValidatedUser,
};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const USER_COLUMNS: &str = "id, name, handle, uni, interests, created_at, updated_at";
const PAIR_COLUMNS: &str = "pair_key, user_a_id, user_b_id, score, breakdown, computed_at";
const INTEREST_COLUMNS: &str = "category, name, image_url, created_at, updated_at";

/// Users, interest catalog and compatibility cache in one SQLite database.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use kindred_core::SqliteStore;
///
/// let store = SqliteStore::open_in_memory(Some(Duration::from_secs(60))).unwrap();
/// assert_eq!(store.ttl(), Some(Duration::from_secs(60)));
/// ```
pub struct SqliteStore {
    connection: Mutex<Connection>,
    ttl: Option<Duration>,
}

impl fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteStore")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Open or create the database at `path` and apply the schema.
    ///
    /// `ttl` bounds how long cached pairs are served; `None` disables expiry.
    ///
    /// # Errors
    /// Returns [`StoreError::OpenDatabase`] when the file cannot be opened
    /// and [`StoreError::SchemaVersion`] when it belongs to another build.
    pub fn open(path: impl AsRef<Path>, ttl: Option<Duration>) -> Result<Self, StoreError> {
        let db_path = path.as_ref();
        let connection = Connection::open(db_path).map_err(|source| StoreError::OpenDatabase {
            path: db_path.to_path_buf(),
            source,
        })?;
        Self::from_connection(connection, ttl)
    }

    /// Create a private in-memory database.
    ///
    /// # Errors
    /// Returns [`StoreError`] when SQLite cannot allocate the database.
    pub fn open_in_memory(ttl: Option<Duration>) -> Result<Self, StoreError> {
        let connection = Connection::open_in_memory().map_err(|source| StoreError::Sqlite {
            operation: "open in-memory database",
            source,
        })?;
        Self::from_connection(connection, ttl)
    }

    fn from_connection(
        mut connection: Connection,
        ttl: Option<Duration>,
    ) -> Result<Self, StoreError> {
        connection
            .busy_timeout(BUSY_TIMEOUT)
            .map_err(|source| StoreError::Sqlite {
                operation: "set busy timeout",
                source,
            })?;
        initialise_schema(&mut connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
            ttl,
        })
    }

    /// Time-to-live applied to cached pairs.
    #[must_use]
    pub const fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.connection.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl UserLookup for SqliteStore {
    fn find_one(&self, selector: &UserSelector) -> Result<Option<UserProfile>, StoreError> {
        let (column, value) = match selector {
            UserSelector::Id(id) => ("id", id.as_str()),
            UserSelector::Handle(handle) => ("handle", handle.as_str()),
        };
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1");
        let connection = self.connection()?;
        connection
            .query_row(&sql, [value], UserRow::read)
            .optional()
            .map_err(|source| StoreError::Sqlite {
                operation: "look up user",
                source,
            })?
            .map(UserRow::into_profile)
            .transpose()
    }
}

impl UserDirectory for SqliteStore {
    fn upsert_user(
        &self,
        user: &ValidatedUser,
        now: DateTime<Utc>,
    ) -> Result<UserProfile, StoreError> {
        let interests =
            serde_json::to_string(&user.interests).map_err(|source| StoreError::Encode {
                what: "interests",
                source,
            })?;
        let id = Uuid::new_v4().to_string();
        let sql = format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
             ON CONFLICT(handle) DO UPDATE SET
                name = excluded.name,
                uni = excluded.uni,
                interests = excluded.interests,
                updated_at = excluded.updated_at
             RETURNING {USER_COLUMNS}"
        );
        let connection = self.connection()?;
        let row = connection
            .query_row(
                &sql,
                params![
                    id,
                    user.name,
                    user.handle.as_str(),
                    user.uni,
                    interests,
                    now.timestamp_millis()
                ],
                UserRow::read,
            )
            .map_err(|source| StoreError::Sqlite {
                operation: "upsert user",
                source,
            })?;
        row.into_profile()
    }
}

impl PairStore for SqliteStore {
    fn upsert_pair(&self, pair: &CachedPair) -> Result<CachedPair, StoreError> {
        let breakdown =
            serde_json::to_string(&pair.result.breakdown).map_err(|source| StoreError::Encode {
                what: "breakdown",
                source,
            })?;
        let sql = format!(
            "INSERT INTO compatibilities ({PAIR_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(pair_key) DO UPDATE SET
                user_a_id = excluded.user_a_id,
                user_b_id = excluded.user_b_id,
                score = excluded.score,
                breakdown = excluded.breakdown,
                computed_at = excluded.computed_at
             RETURNING {PAIR_COLUMNS}"
        );
        let connection = self.connection()?;
        let row = connection
            .query_row(
                &sql,
                params![
                    pair.pair_key.as_str(),
                    pair.user_a.as_str(),
                    pair.user_b.as_str(),
                    pair.result.score,
                    breakdown,
                    pair.result.computed_at.timestamp_millis()
                ],
                PairRow::read,
            )
            .map_err(|source| StoreError::Sqlite {
                operation: "upsert compatibility",
                source,
            })?;
        row.into_pair()
    }

    fn fresh_pair(
        &self,
        key: &PairKey,
        now: DateTime<Utc>,
    ) -> Result<Option<CachedPair>, StoreError> {
        let sql = format!("SELECT {PAIR_COLUMNS} FROM compatibilities WHERE pair_key = ?1");
        let row = {
            let connection = self.connection()?;
            connection
                .query_row(&sql, [key.as_str()], PairRow::read)
                .optional()
                .map_err(|source| StoreError::Sqlite {
                    operation: "read compatibility",
                    source,
                })?
        };
        let pair = row.map(PairRow::into_pair).transpose()?;
        Ok(pair.filter(|stored| stored.is_fresh(now, self.ttl)))
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        let Some(ttl) = self.ttl else {
            return Ok(0);
        };
        let ttl_millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let cutoff = now.timestamp_millis().saturating_sub(ttl_millis);
        let connection = self.connection()?;
        connection
            .execute(
                "DELETE FROM compatibilities WHERE computed_at <= ?1",
                [cutoff],
            )
            .map_err(|source| StoreError::Sqlite {
                operation: "purge expired compatibilities",
                source,
            })
    }
}

impl InterestCatalog for SqliteStore {
    fn ensure_interest(
        &self,
        category: Category,
        name: &str,
        image_url: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<CatalogEntry, CatalogError> {
        let (display, key) = catalog_key(category, name)?;
        let sql = format!(
            "INSERT INTO interests (category, name, name_lc, image_url, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             ON CONFLICT(category, name_lc) DO UPDATE SET
                updated_at = excluded.updated_at,
                image_url = COALESCE(excluded.image_url, interests.image_url)
             RETURNING {INTEREST_COLUMNS}"
        );
        let connection = self.connection()?;
        let row = connection
            .query_row(
                &sql,
                params![
                    category.as_str(),
                    display,
                    key,
                    usable_image_url(image_url),
                    now.timestamp_millis()
                ],
                InterestRow::read,
            )
            .map_err(|source| StoreError::Sqlite {
                operation: "ensure interest",
                source,
            })?;
        row.into_entry().map_err(CatalogError::from)
    }

    fn list_interests(&self, category: Category) -> Result<Vec<CatalogEntry>, StoreError> {
        let sql =
            format!("SELECT {INTEREST_COLUMNS} FROM interests WHERE category = ?1 ORDER BY name_lc");
        let rows = {
            let connection = self.connection()?;
            let mut statement = connection
                .prepare(&sql)
                .map_err(|source| StoreError::Sqlite {
                    operation: "prepare interest listing",
                    source,
                })?;
            statement
                .query_map([category.as_str()], InterestRow::read)
                .and_then(Iterator::collect::<Result<Vec<_>, _>>)
                .map_err(|source| StoreError::Sqlite {
                    operation: "list interests",
                    source,
                })?
        };
        rows.into_iter().map(InterestRow::into_entry).collect()
    }
}

fn timestamp(what: &'static str, millis: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| StoreError::Corrupt {
        what,
        value: millis.to_string(),
    })
}

struct UserRow {
    id: String,
    name: String,
    handle: String,
    uni: Option<String>,
    interests: String,
    created_at: i64,
    updated_at: i64,
}

impl UserRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            handle: row.get(2)?,
            uni: row.get(3)?,
            interests: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    fn into_profile(self) -> Result<UserProfile, StoreError> {
        let handle = Handle::parse(&self.handle).map_err(|_| StoreError::Corrupt {
            what: "handle",
            value: self.handle.clone(),
        })?;
        let interests: InterestSet =
            serde_json::from_str(&self.interests).map_err(|source| StoreError::Decode {
                what: "interests",
                source,
            })?;
        Ok(UserProfile {
            id: UserId::new(self.id),
            name: self.name,
            handle,
            uni: self.uni,
            interests,
            created_at: timestamp("user created_at", self.created_at)?,
            updated_at: timestamp("user updated_at", self.updated_at)?,
        })
    }
}

struct PairRow {
    pair_key: String,
    user_a: String,
    user_b: String,
    score: i64,
    breakdown: String,
    computed_at: i64,
}

impl PairRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            pair_key: row.get(0)?,
            user_a: row.get(1)?,
            user_b: row.get(2)?,
            score: row.get(3)?,
            breakdown: row.get(4)?,
            computed_at: row.get(5)?,
        })
    }

    fn into_pair(self) -> Result<CachedPair, StoreError> {
        let score = u8::try_from(self.score)
            .ok()
            .filter(|score| *score <= 100)
            .ok_or_else(|| StoreError::Corrupt {
                what: "score",
                value: self.score.to_string(),
            })?;
        let breakdown: Breakdown =
            serde_json::from_str(&self.breakdown).map_err(|source| StoreError::Decode {
                what: "breakdown",
                source,
            })?;
        Ok(CachedPair {
            pair_key: PairKey::from_stored(self.pair_key),
            user_a: UserId::new(self.user_a),
            user_b: UserId::new(self.user_b),
            result: CompatibilityResult {
                score,
                breakdown,
                computed_at: timestamp("computed_at", self.computed_at)?,
            },
        })
    }
}

struct InterestRow {
    category: String,
    name: String,
    image_url: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl InterestRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            category: row.get(0)?,
            name: row.get(1)?,
            image_url: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }

    fn into_entry(self) -> Result<CatalogEntry, StoreError> {
        let category = Category::from_str(&self.category).map_err(|_| StoreError::Corrupt {
            what: "category",
            value: self.category.clone(),
        })?;
        Ok(CatalogEntry {
            category,
            name: self.name,
            image_url: self.image_url,
            created_at: timestamp("interest created_at", self.created_at)?,
            updated_at: timestamp("interest updated_at", self.updated_at)?,
        })
    }
}
