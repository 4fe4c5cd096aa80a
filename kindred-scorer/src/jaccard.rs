//! Category-wise Jaccard similarity blended by resolved weights.

use std::collections::{BTreeMap, BTreeSet};

use kindred_core::{
    Breakdown, Category, CategoryBreakdown, CompatibilityScorer, InterestSet, ScoreOptions,
    Scored, WeightConfig, normalise_interest,
};
use log::trace;

/// Stateless weighted-Jaccard scorer.
///
/// Categories that neither profile fills in are *inactive*. With
/// [`ScoreOptions::reweight_active`] set, their weight is redistributed
/// across the active categories so empty categories do not dampen the score.
#[derive(Debug, Default, Clone, Copy)]
pub struct JaccardScorer;

impl CompatibilityScorer for JaccardScorer {
    fn compute(&self, a: &InterestSet, b: &InterestSet, options: &ScoreOptions) -> Scored {
        let sets: Vec<(Category, BTreeSet<String>, BTreeSet<String>)> = Category::ALL
            .into_iter()
            .map(|category| (category, a.normalised(category), b.normalised(category)))
            .collect();

        let active: BTreeSet<Category> = sets
            .iter()
            .filter(|(_, set_a, set_b)| !set_a.is_empty() || !set_b.is_empty())
            .map(|(category, _, _)| *category)
            .collect();

        let weights = effective_weights(options, &active);
        trace!("scoring with weights {weights:?} over {} active categories", active.len());

        let mut total = 0.0;
        let mut breakdown = Breakdown::new();
        for (category, set_a, set_b) in &sets {
            let similarity = jaccard(set_a, set_b);
            total = accumulate(total, weights.weight(*category), similarity);
            breakdown.insert(
                *category,
                CategoryBreakdown {
                    common: display_common(a, b, *category, set_a, set_b),
                    jaccard: similarity,
                    count_a: raw_count(a, *category),
                    count_b: raw_count(b, *category),
                },
            );
        }

        Scored {
            score: Self::sanitise(total),
            breakdown,
        }
    }
}

fn effective_weights(options: &ScoreOptions, active: &BTreeSet<Category>) -> WeightConfig {
    let base = WeightConfig::resolve(options.weights.as_ref());
    if options.reweight_active && !active.is_empty() {
        base.restricted_to(active)
    } else {
        base
    }
}

/// Jaccard similarity of two sets, or `0.0` when both are empty.
///
/// # Examples
/// ```
/// use std::collections::BTreeSet;
/// use kindred_scorer::jaccard;
///
/// let a: BTreeSet<_> = ["x", "y"].into_iter().collect();
/// let b: BTreeSet<_> = ["y", "z"].into_iter().collect();
/// assert!((jaccard(&a, &b) - 1.0 / 3.0).abs() < 1e-12);
/// assert_eq!(jaccard::<&str>(&BTreeSet::new(), &BTreeSet::new()), 0.0);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "similarity is a ratio of set sizes"
)]
pub fn jaccard<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f64 {
    let shared = a.intersection(b).count();
    let union = a.len().saturating_add(b.len()).saturating_sub(shared);
    if union == 0 {
        return 0.0;
    }
    f64::from(saturating_u32(shared)) / f64::from(saturating_u32(union))
}

#[expect(
    clippy::float_arithmetic,
    reason = "the score is a weighted sum of similarities"
)]
const fn accumulate(total: f64, weight: f64, similarity: f64) -> f64 {
    total + weight * similarity * 100.0
}

/// Shared interests in display form, ordered by normalised key.
///
/// The first spelling in `a` wins, then the first in `b`.
fn display_common(
    a: &InterestSet,
    b: &InterestSet,
    category: Category,
    set_a: &BTreeSet<String>,
    set_b: &BTreeSet<String>,
) -> Vec<String> {
    let spellings_a = first_spellings(a.entries(category));
    let spellings_b = first_spellings(b.entries(category));
    set_a
        .intersection(set_b)
        .map(|key| {
            spellings_a
                .get(key)
                .or_else(|| spellings_b.get(key))
                .map_or_else(|| key.clone(), |display| (*display).to_owned())
        })
        .collect()
}

fn first_spellings(entries: &[String]) -> BTreeMap<String, &str> {
    let mut spellings = BTreeMap::new();
    for entry in entries {
        if let Some(key) = normalise_interest(entry) {
            spellings.entry(key).or_insert_with(|| entry.trim());
        }
    }
    spellings
}

fn raw_count(interests: &InterestSet, category: Category) -> u32 {
    saturating_u32(interests.entries(category).len())
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
