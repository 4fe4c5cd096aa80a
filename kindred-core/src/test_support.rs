//! In-memory collaborators used by unit, behaviour and doc tests.
//!
//! [`MemoryStore`] implements every storage trait behind mutexes, so each
//! operation is atomic with respect to the others. It performs linear scans
//! and is intended only for small datasets.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::catalog::{catalog_key, usable_image_url};
use crate::store::{InterestCatalog, PairStore, StoreError, UserDirectory, UserLookup};
use crate::{
    Breakdown, CachedPair, CatalogEntry, CatalogError, Category, Clock, CompatibilityScorer,
    InterestSet, PairKey, ScoreOptions, Scored, UserId, UserProfile, UserSelector, ValidatedUser,
};

/// 2026-01-01T00:00:00Z.
const DEFAULT_CLOCK_SECS: i64 = 1_767_225_600;

/// In-memory implementation of every storage trait.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: Mutex<Vec<UserProfile>>,
    pairs: Mutex<BTreeMap<PairKey, CachedPair>>,
    catalog: Mutex<BTreeMap<(Category, String), CatalogEntry>>,
    next_id: AtomicU64,
    ttl: Option<Duration>,
}

impl MemoryStore {
    /// Create an empty store whose cache entries expire after `ttl`.
    #[must_use]
    pub fn with_ttl(ttl: Option<Duration>) -> Self {
        Self {
            ttl,
            ..Self::default()
        }
    }

    /// Number of cached pairs, expired or not.
    #[must_use]
    pub fn pair_count(&self) -> usize {
        lock(&self.pairs).map_or(0, |pairs| pairs.len())
    }

    /// Number of stored users.
    #[must_use]
    pub fn user_count(&self) -> usize {
        lock(&self.users).map_or(0, |users| users.len())
    }

    /// Number of catalog entries across all categories.
    #[must_use]
    pub fn catalog_len(&self) -> usize {
        lock(&self.catalog).map_or(0, |catalog| catalog.len())
    }

    fn allocate_id(&self) -> UserId {
        let next = self.next_id.fetch_add(1, Ordering::Relaxed).saturating_add(1);
        UserId::new(format!("user-{next}"))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex.lock().map_err(|_| StoreError::Poisoned)
}

impl UserLookup for MemoryStore {
    fn find_one(&self, selector: &UserSelector) -> Result<Option<UserProfile>, StoreError> {
        let users = lock(&self.users)?;
        Ok(users.iter().find(|user| selector.matches(user)).cloned())
    }
}

impl UserDirectory for MemoryStore {
    fn upsert_user(
        &self,
        user: &ValidatedUser,
        now: DateTime<Utc>,
    ) -> Result<UserProfile, StoreError> {
        let mut users = lock(&self.users)?;
        if let Some(existing) = users.iter_mut().find(|stored| stored.handle == user.handle) {
            existing.name.clone_from(&user.name);
            existing.uni.clone_from(&user.uni);
            existing.interests = user.interests.clone();
            existing.updated_at = now;
            return Ok(existing.clone());
        }
        let profile = UserProfile {
            id: self.allocate_id(),
            name: user.name.clone(),
            handle: user.handle.clone(),
            uni: user.uni.clone(),
            interests: user.interests.clone(),
            created_at: now,
            updated_at: now,
        };
        users.push(profile.clone());
        Ok(profile)
    }
}

impl PairStore for MemoryStore {
    fn upsert_pair(&self, pair: &CachedPair) -> Result<CachedPair, StoreError> {
        let mut pairs = lock(&self.pairs)?;
        pairs.insert(pair.pair_key.clone(), pair.clone());
        Ok(pair.clone())
    }

    fn fresh_pair(
        &self,
        key: &PairKey,
        now: DateTime<Utc>,
    ) -> Result<Option<CachedPair>, StoreError> {
        let pairs = lock(&self.pairs)?;
        Ok(pairs
            .get(key)
            .filter(|pair| pair.is_fresh(now, self.ttl))
            .cloned())
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut pairs = lock(&self.pairs)?;
        let before = pairs.len();
        pairs.retain(|_, pair| pair.is_fresh(now, self.ttl));
        Ok(before.saturating_sub(pairs.len()))
    }
}

impl InterestCatalog for MemoryStore {
    fn ensure_interest(
        &self,
        category: Category,
        name: &str,
        image_url: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<CatalogEntry, CatalogError> {
        let (display, key) = catalog_key(category, name)?;
        let image = usable_image_url(image_url).map(str::to_owned);
        let mut catalog = lock(&self.catalog)?;
        let entry = catalog
            .entry((category, key))
            .and_modify(|existing| {
                existing.updated_at = now;
                if image.is_some() {
                    existing.image_url.clone_from(&image);
                }
            })
            .or_insert_with(|| CatalogEntry {
                category,
                name: display,
                image_url: image.clone(),
                created_at: now,
                updated_at: now,
            });
        Ok(entry.clone())
    }

    fn list_interests(&self, category: Category) -> Result<Vec<CatalogEntry>, StoreError> {
        let catalog = lock(&self.catalog)?;
        Ok(catalog
            .iter()
            .filter(|((entry_category, _), _)| *entry_category == category)
            .map(|(_, entry)| entry.clone())
            .collect())
    }
}

/// Settable [`Clock`] for deterministic timestamps.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    /// Create a clock frozen at `now`.
    #[must_use]
    pub const fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Current value without going through the [`Clock`] trait.
    #[must_use]
    pub fn now_value(&self) -> DateTime<Utc> {
        self.now.lock().map_or_else(|poisoned| *poisoned.into_inner(), |now| *now)
    }

    /// Move the clock to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }

    /// Move the clock forward by `delta`.
    pub fn advance(&self, delta: TimeDelta) {
        self.set(self.now_value() + delta);
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::at(DateTime::from_timestamp(DEFAULT_CLOCK_SECS, 0).unwrap_or_default())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now_value()
    }
}

/// Scorer that ignores its input and returns a constant score.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedScorer(pub u8);

impl CompatibilityScorer for FixedScorer {
    fn compute(&self, _a: &InterestSet, _b: &InterestSet, _options: &ScoreOptions) -> Scored {
        Scored {
            score: self.0.min(100),
            breakdown: Breakdown::new(),
        }
    }
}
