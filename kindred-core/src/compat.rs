//! Compatibility results and the cache records that hold them.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::{Category, UserId, UserSummary, WeightOverrides};

/// Separator placed between the two sorted identifiers of a [`PairKey`].
pub const PAIR_KEY_SEPARATOR: &str = ":";

/// Similarity detail for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    /// Shared interests in display form, sorted by normalised value.
    pub common: Vec<String>,
    /// Jaccard similarity of the normalised sets, in `0.0..=1.0`.
    pub jaccard: f64,
    /// Raw number of entries supplied by the first profile.
    pub count_a: u32,
    /// Raw number of entries supplied by the second profile.
    pub count_b: u32,
}

impl CategoryBreakdown {
    /// Breakdown for a category neither profile filled in.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            common: Vec::new(),
            jaccard: 0.0,
            count_a: 0,
            count_b: 0,
        }
    }
}

/// Per-category breakdown keyed in scoring order.
pub type Breakdown = BTreeMap<Category, CategoryBreakdown>;

/// Output of a [`CompatibilityScorer`](crate::CompatibilityScorer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scored {
    /// Overall score in `0..=100`.
    pub score: u8,
    /// Per-category detail.
    pub breakdown: Breakdown,
}

/// Caller-supplied tuning for a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreOptions {
    /// Partial weight overrides merged onto the defaults.
    #[serde(default)]
    pub weights: Option<WeightOverrides>,
    /// Redistribute weight across categories that either profile filled in.
    #[serde(default = "default_reweight_active")]
    pub reweight_active: bool,
}

const fn default_reweight_active() -> bool {
    true
}

impl ScoreOptions {
    /// Replace the weight overrides while returning `self` for chaining.
    #[must_use]
    pub fn with_weights(mut self, weights: WeightOverrides) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Set the reweighting policy while returning `self` for chaining.
    #[must_use]
    pub const fn with_reweight_active(mut self, reweight_active: bool) -> Self {
        self.reweight_active = reweight_active;
        self
    }
}

impl Default for ScoreOptions {
    fn default() -> Self {
        Self {
            weights: None,
            reweight_active: default_reweight_active(),
        }
    }
}

/// A score stamped with the time it was computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityResult {
    /// Overall score in `0..=100`.
    pub score: u8,
    /// Per-category detail.
    pub breakdown: Breakdown,
    /// When the score was computed.
    pub computed_at: DateTime<Utc>,
}

impl CompatibilityResult {
    /// Stamp a scorer output with its computation time.
    #[must_use]
    pub fn new(scored: Scored, computed_at: DateTime<Utc>) -> Self {
        Self {
            score: scored.score,
            breakdown: scored.breakdown,
            computed_at,
        }
    }
}

/// Canonical, order-independent key for an unordered pair of users.
///
/// # Examples
/// ```
/// use kindred_core::{PairKey, UserId};
///
/// let a = UserId::new("b7");
/// let b = UserId::new("a3");
/// assert_eq!(PairKey::new(&a, &b), PairKey::new(&b, &a));
/// assert_eq!(PairKey::new(&a, &b).as_str(), "a3:b7");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairKey(String);

impl PairKey {
    /// Join the two identifiers in lexicographic order.
    #[must_use]
    pub fn new(a: &UserId, b: &UserId) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self(format!("{first}{PAIR_KEY_SEPARATOR}{second}"))
    }

    /// Borrow the key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wrap a key read back from storage.
    #[must_use]
    pub fn from_stored(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cache entry for one unordered pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedPair {
    /// Canonical key; unique within a store.
    pub pair_key: PairKey,
    /// Requesting user of the most recent computation.
    pub user_a: UserId,
    /// Compared user of the most recent computation.
    pub user_b: UserId,
    /// Stored score.
    pub result: CompatibilityResult,
}

impl CachedPair {
    /// Build an entry for `user_a` compared with `user_b`.
    #[must_use]
    pub fn new(user_a: UserId, user_b: UserId, result: CompatibilityResult) -> Self {
        Self {
            pair_key: PairKey::new(&user_a, &user_b),
            user_a,
            user_b,
            result,
        }
    }

    /// Report whether the entry may still be served at `now`.
    ///
    /// Entries expire once `ttl` has elapsed since `computed_at`. A `None`
    /// TTL never expires.
    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Option<Duration>) -> bool {
        ttl.is_none_or(|limit| now < expiry_of(self.result.computed_at, limit))
    }
}

/// Return the instant at which an entry computed at `computed_at` expires.
///
/// TTLs beyond the representable range saturate to never expiring.
#[must_use]
pub fn expiry_of(computed_at: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(ttl)
        .ok()
        .and_then(|delta| computed_at.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Identity information for both sides of a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairUsers {
    /// The requesting user.
    pub a: UserSummary,
    /// The compared user.
    pub b: UserSummary,
}

/// A stored comparison returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// Overall score in `0..=100`.
    pub score: u8,
    /// Per-category detail.
    pub breakdown: Breakdown,
    /// Both users' identities.
    pub users: PairUsers,
    /// When the score was computed, serialised as RFC 3339.
    pub computed_at: DateTime<Utc>,
}
