//! Compare two users and cache the result by unordered pair.
//!
//! [`CompatService`] owns no state of its own: the user lookup, pair cache,
//! scorer and clock are injected once at start-up and shared by every call.

use std::fmt;

use log::debug;
use thiserror::Error;

use crate::store::{PairStore, StoreError, UserLookup};
use crate::{
    CachedPair, Clock, CompatibilityResult, CompatibilityScorer, Comparison, PairKey, PairUsers,
    ScoreOptions, UserProfile, UserSelector,
};

/// Which side of a comparison a selector belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairSide {
    /// The requesting user.
    A,
    /// The compared user.
    B,
}

impl fmt::Display for PairSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::A => "A",
            Self::B => "B",
        })
    }
}

/// Errors raised while comparing users.
#[derive(Debug, Error)]
pub enum CompatError {
    /// A selector did not resolve to a user.
    #[error("user {side} ({selector}) not found")]
    UserNotFound {
        /// Side of the missing user.
        side: PairSide,
        /// Text form of the selector.
        selector: String,
    },
    /// The backing store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Compatibility service over injected collaborators.
///
/// # Examples
/// ```
/// use kindred_core::test_support::{FixedClock, FixedScorer, MemoryStore};
/// use kindred_core::{CompatService, ScoreOptions, UserDraft, UserSelector};
/// use kindred_core::store::UserDirectory;
///
/// let clock = FixedClock::default();
/// let store = MemoryStore::default();
/// for handle in ["ada", "grace"] {
///     let draft = UserDraft { name: handle.into(), handle: handle.into(), ..UserDraft::default() };
///     store.upsert_user(&draft.validate().unwrap(), clock.now_value()).unwrap();
/// }
///
/// let service = CompatService::new(&store, &store, FixedScorer(73), &clock);
/// let a: UserSelector = "ada".parse().unwrap();
/// let b: UserSelector = "grace".parse().unwrap();
/// let comparison = service.compare_and_cache(&a, &b, &ScoreOptions::default()).unwrap();
/// assert_eq!(comparison.score, 73);
/// assert_eq!(store.pair_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct CompatService<U, P, S, C> {
    users: U,
    pairs: P,
    scorer: S,
    clock: C,
}

impl<U, P, S, C> CompatService<U, P, S, C>
where
    U: UserLookup,
    P: PairStore,
    S: CompatibilityScorer,
    C: Clock,
{
    /// Assemble a service from its collaborators.
    #[must_use]
    pub const fn new(users: U, pairs: P, scorer: S, clock: C) -> Self {
        Self {
            users,
            pairs,
            scorer,
            clock,
        }
    }

    /// Resolve both users, score them and upsert the result for the pair.
    ///
    /// The stored record is keyed by [`PairKey`], so comparing A with B and
    /// B with A share one entry; recomputation overwrites it.
    ///
    /// # Errors
    /// Returns [`CompatError::UserNotFound`] when either selector resolves to
    /// nothing and [`CompatError::Store`] when lookup or persistence fails.
    pub fn compare_and_cache(
        &self,
        selector_a: &UserSelector,
        selector_b: &UserSelector,
        options: &ScoreOptions,
    ) -> Result<Comparison, CompatError> {
        let (user_a, user_b) = self.resolve_pair(selector_a, selector_b)?;
        let scored = self
            .scorer
            .compute(&user_a.interests, &user_b.interests, options);
        let result = CompatibilityResult::new(scored, self.clock.now());
        let pending = CachedPair::new(user_a.id.clone(), user_b.id.clone(), result);
        let stored = self.pairs.upsert_pair(&pending)?;
        debug!(
            "stored compatibility {} for pair {}",
            stored.result.score, stored.pair_key
        );
        Ok(comparison(stored, &user_a, &user_b))
    }

    /// Return the cached comparison for the pair if it is still fresh.
    ///
    /// Expired or missing entries yield `None`; callers recompute with
    /// [`CompatService::compare_and_cache`], which overwrites the entry.
    ///
    /// The breakdown is oriented to the computation that wrote the entry, so
    /// `users.a` is that computation's requesting user whichever order the
    /// selectors are given in here.
    ///
    /// # Errors
    /// Returns [`CompatError::UserNotFound`] when either selector resolves to
    /// nothing and [`CompatError::Store`] when lookup fails.
    pub fn fetch_cached(
        &self,
        selector_a: &UserSelector,
        selector_b: &UserSelector,
    ) -> Result<Option<Comparison>, CompatError> {
        let (user_a, user_b) = self.resolve_pair(selector_a, selector_b)?;
        let key = PairKey::new(&user_a.id, &user_b.id);
        let cached = self.pairs.fresh_pair(&key, self.clock.now())?;
        Ok(cached.map(|stored| comparison(stored, &user_a, &user_b)))
    }

    /// Delete expired cache entries.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the store rejects the deletion.
    pub fn purge_expired(&self) -> Result<usize, StoreError> {
        self.pairs.purge_expired(self.clock.now())
    }

    fn resolve_pair(
        &self,
        selector_a: &UserSelector,
        selector_b: &UserSelector,
    ) -> Result<(UserProfile, UserProfile), CompatError> {
        let user_a = self.resolve(selector_a, PairSide::A)?;
        let user_b = self.resolve(selector_b, PairSide::B)?;
        Ok((user_a, user_b))
    }

    fn resolve(&self, selector: &UserSelector, side: PairSide) -> Result<UserProfile, CompatError> {
        self.users
            .find_one(selector)?
            .ok_or_else(|| CompatError::UserNotFound {
                side,
                selector: selector.to_string(),
            })
    }
}

/// Label the stored result with the users it was computed for.
fn comparison(stored: CachedPair, user_a: &UserProfile, user_b: &UserProfile) -> Comparison {
    let (first, second) = if stored.user_a == user_a.id {
        (user_a, user_b)
    } else {
        (user_b, user_a)
    };
    Comparison {
        score: stored.result.score,
        breakdown: stored.result.breakdown,
        users: PairUsers {
            a: first.summary(),
            b: second.summary(),
        },
        computed_at: stored.result.computed_at,
    }
}
