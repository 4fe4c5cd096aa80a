//! Unit coverage for weighted Jaccard scoring.

use std::collections::BTreeSet;

use kindred_core::{
    Category, CompatibilityScorer, InterestSet, ScoreOptions, Scored, WeightOverrides,
};
use rstest::rstest;

use crate::{JaccardScorer, jaccard};

fn score(a: &InterestSet, b: &InterestSet, options: &ScoreOptions) -> Scored {
    JaccardScorer.compute(a, b, options)
}

#[expect(clippy::float_arithmetic, reason = "assertions compare floats")]
fn assert_near(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected approximately {expected}, got {actual}"
    );
}

fn movies_and_tv() -> (InterestSet, InterestSet) {
    let a = InterestSet::new()
        .with_entries(Category::Movie, ["Alien", "Up"])
        .with_entries(Category::Tv, ["Lost"]);
    let b = InterestSet::new()
        .with_entries(Category::Movie, ["alien"])
        .with_entries(Category::Tv, ["Lost"]);
    (a, b)
}

#[rstest]
fn jaccard_of_partial_overlap_is_one_third() {
    let a: BTreeSet<_> = ["inception", "interstellar"].into_iter().collect();
    let b: BTreeSet<_> = ["inception", "tenet"].into_iter().collect();
    assert_near(jaccard(&a, &b), 1.0 / 3.0);
}

#[rstest]
fn empty_profiles_score_zero() {
    let scored = score(&InterestSet::new(), &InterestSet::new(), &ScoreOptions::default());
    assert_eq!(scored.score, 0);
    assert_eq!(scored.breakdown.len(), Category::ALL.len());
    assert!(scored.breakdown.values().all(|entry| entry.common.is_empty()));
}

#[rstest]
#[case(true)]
#[case(false)]
fn identical_full_profiles_score_hundred(#[case] reweight: bool) {
    let interests = Category::ALL
        .into_iter()
        .fold(InterestSet::new(), |acc, category| {
            acc.with_entries(category, [format!("{category} pick")])
        });
    let options = ScoreOptions::default().with_reweight_active(reweight);
    assert_eq!(score(&interests, &interests, &options).score, 100);
}

#[rstest]
fn identical_single_category_scores_hundred_when_reweighted() {
    let interests = InterestSet::new().with_entries(Category::Hobby, ["Chess"]);
    assert_eq!(
        score(&interests, &interests, &ScoreOptions::default()).score,
        100
    );
}

#[rstest]
fn reweighting_redistributes_over_active_categories() {
    let (a, b) = movies_and_tv();
    // Movie 0.35 and TV 0.25 renormalise to 0.583 and 0.417.
    // 0.583 * 50 + 0.417 * 100 = 70.83
    let scored = score(&a, &b, &ScoreOptions::default());
    assert_eq!(scored.score, 71);
    assert_near(scored.breakdown[&Category::Movie].jaccard, 0.5);
    assert_near(scored.breakdown[&Category::Tv].jaccard, 1.0);
}

#[rstest]
fn disabling_reweight_keeps_global_weights() {
    let a = InterestSet::new()
        .with_entries(Category::Movie, ["Alien", "Up"])
        .with_entries(Category::Tv, ["Lost"]);
    let b = InterestSet::new()
        .with_entries(Category::Movie, ["Alien", "Heat"])
        .with_entries(Category::Tv, ["lost"]);
    // 0.35 * 33.3 + 0.25 * 100 = 36.67
    let global = ScoreOptions::default().with_reweight_active(false);
    assert_eq!(score(&a, &b, &global).score, 37);
    // 0.583 * 33.3 + 0.417 * 100 = 61.11
    assert_eq!(score(&a, &b, &ScoreOptions::default()).score, 61);
}

#[rstest]
fn common_prefers_first_profile_spelling() {
    let a = InterestSet::new().with_entries(Category::Artist, ["  Radiohead ", "radiohead"]);
    let b = InterestSet::new().with_entries(Category::Artist, ["RADIOHEAD", "Björk"]);
    let scored = score(&a, &b, &ScoreOptions::default());
    let artist = &scored.breakdown[&Category::Artist];
    assert_eq!(artist.common, ["Radiohead"]);
    assert_eq!(artist.count_a, 2);
    assert_eq!(artist.count_b, 2);
    assert_near(artist.jaccard, 0.5);
}

#[rstest]
fn common_is_sorted_by_normalised_key() {
    let a = InterestSet::new().with_entries(Category::Tv, ["zorro", "Archer", "Monk"]);
    let b = InterestSet::new().with_entries(Category::Tv, ["monk", "ZORRO", "archer"]);
    let scored = score(&a, &b, &ScoreOptions::default());
    assert_eq!(
        scored.breakdown[&Category::Tv].common,
        ["Archer", "Monk", "zorro"]
    );
    assert_eq!(scored.score, 100);
}

#[rstest]
fn overrides_shift_the_balance() {
    let (a, b) = movies_and_tv();
    let weights = WeightOverrides::new()
        .with_weight(Category::Movie, 0.0)
        .with_weight(Category::Tv, 1.0);
    // Movie is dropped, so TV carries all weight among the active categories.
    let options = ScoreOptions::default().with_weights(weights);
    assert_eq!(score(&a, &b, &options).score, 100);
}

#[rstest]
fn restriction_without_weighted_active_category_scores_zero() {
    let a = InterestSet::new().with_entries(Category::Hobby, ["Chess"]);
    let weights = WeightOverrides::new().with_weight(Category::Hobby, -1.0);
    let options = ScoreOptions::default().with_weights(weights);
    assert_eq!(score(&a, &a, &options).score, 0);
}

#[rstest]
fn scoring_is_symmetric() {
    let (a, b) = movies_and_tv();
    let options = ScoreOptions::default();
    assert_eq!(score(&a, &b, &options).score, score(&b, &a, &options).score);
}

#[rstest]
fn lenient_weights_from_json_are_applied() {
    let (a, b) = movies_and_tv();
    let weights: WeightOverrides =
        serde_json::from_str(r#"{"movie": 3, "tv": "heavy", "sports": 9}"#).expect("lenient");
    let options = ScoreOptions::default()
        .with_weights(weights)
        .with_reweight_active(false);
    // Movie 3.0 merged over tv 0.25, artist 0.25, hobby 0.15 gives
    // 3.0 / 3.65 * 50 + 0.25 / 3.65 * 100 = 47.95
    assert_eq!(score(&a, &b, &options).score, 48);
}
