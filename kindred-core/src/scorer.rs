//! Score the compatibility of two interest sets.
//!
//! The `CompatibilityScorer` trait maps two [`InterestSet`]s and caller
//! [`ScoreOptions`] to a [`Scored`] result. Implementations are pure: no I/O
//! and no shared mutable state.

use crate::{InterestSet, ScoreOptions, Scored};

/// Calculate a compatibility score for two interest sets.
///
/// Implementations must be thread-safe (`Send` + `Sync`) so a single scorer
/// can serve concurrent comparisons. The method is infallible; sets with no
/// overlapping information score `0`.
///
/// Implementations must:
/// - Return a score in `0..=100`.
/// - Produce identical output for identical input.
/// - Treat missing categories as empty.
///
/// Use [`CompatibilityScorer::sanitise`] to turn a raw total into a score.
///
/// # Examples
///
/// ```rust
/// use kindred_core::{Breakdown, CompatibilityScorer, InterestSet, ScoreOptions, Scored};
///
/// struct FlatScorer;
///
/// impl CompatibilityScorer for FlatScorer {
///     fn compute(&self, _a: &InterestSet, _b: &InterestSet, _options: &ScoreOptions) -> Scored {
///         Scored { score: Self::sanitise(49.5), breakdown: Breakdown::new() }
///     }
/// }
///
/// let scored = FlatScorer.compute(&InterestSet::new(), &InterestSet::new(), &ScoreOptions::default());
/// assert_eq!(scored.score, 50);
/// ```
pub trait CompatibilityScorer: Send + Sync {
    /// Score `a` against `b`.
    fn compute(&self, a: &InterestSet, b: &InterestSet, options: &ScoreOptions) -> Scored;

    /// Clamp a raw total to `0.0..=100.0` and round it.
    ///
    /// Rounding is half-to-even, so `49.5` becomes `50` and `50.5` becomes
    /// `50`. Non-finite totals score `0`.
    fn sanitise(total: f64) -> u8
    where
        Self: Sized,
    {
        sanitise_total(total)
    }
}

impl<T: CompatibilityScorer + ?Sized> CompatibilityScorer for &T {
    fn compute(&self, a: &InterestSet, b: &InterestSet, options: &ScoreOptions) -> Scored {
        (**self).compute(a, b, options)
    }
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "the value is clamped to 0..=100 and rounded before the cast"
)]
pub(crate) fn sanitise_total(total: f64) -> u8 {
    if !total.is_finite() {
        return 0;
    }
    total.clamp(0.0, 100.0).round_ties_even() as u8
}
