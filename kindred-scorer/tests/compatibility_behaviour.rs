#![expect(
    clippy::expect_used,
    reason = "tests should fail fast when setup breaks"
)]

//! Behavioural coverage for weighted Jaccard scoring.

use std::cell::RefCell;

use kindred_core::{Category, CompatibilityScorer, InterestSet, ScoreOptions, Scored};
use kindred_scorer::JaccardScorer;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

/// Aggregate fixtures shared across the BDD scenarios.
pub struct TestContext {
    first: RefCell<InterestSet>,
    second: RefCell<InterestSet>,
    options: RefCell<ScoreOptions>,
    scored: RefCell<Option<Scored>>,
}

#[fixture]
/// Build a fresh `TestContext` for each scenario run.
pub fn context() -> TestContext {
    TestContext {
        first: RefCell::new(InterestSet::new()),
        second: RefCell::new(InterestSet::new()),
        options: RefCell::new(ScoreOptions::default()),
        scored: RefCell::new(None),
    }
}

fn movie_and_show(movie: &str, show: &str) -> InterestSet {
    InterestSet::new()
        .with_entries(Category::Movie, [movie])
        .with_entries(Category::Tv, [show])
}

#[given("a first profile who likes Inception and Interstellar")]
fn first_likes_nolan(context: &TestContext) {
    *context.first.borrow_mut() =
        InterestSet::new().with_entries(Category::Movie, ["Inception", "Interstellar"]);
}

#[given("a second profile who likes inception and Tenet")]
fn second_likes_nolan(context: &TestContext) {
    *context.second.borrow_mut() =
        InterestSet::new().with_entries(Category::Movie, ["inception", "Tenet"]);
}

#[given("a first profile with no interests")]
fn first_empty(context: &TestContext) {
    *context.first.borrow_mut() = InterestSet::new();
}

#[given("a second profile with no interests")]
fn second_empty(context: &TestContext) {
    *context.second.borrow_mut() = InterestSet::new();
}

#[given("a first profile who likes Alien and Lost")]
fn first_likes_alien(context: &TestContext) {
    *context.first.borrow_mut() = movie_and_show("Alien", "Lost");
}

#[given("a second profile who likes alien and Lost")]
fn second_likes_alien(context: &TestContext) {
    *context.second.borrow_mut() = movie_and_show("alien", "Lost");
}

#[given("reweighting is disabled")]
fn reweighting_disabled(context: &TestContext) {
    let options = context.options.borrow().clone().with_reweight_active(false);
    *context.options.borrow_mut() = options;
}

#[when("the profiles are scored")]
fn score_profiles(context: &TestContext) {
    let scored = JaccardScorer.compute(
        &context.first.borrow(),
        &context.second.borrow(),
        &context.options.borrow(),
    );
    *context.scored.borrow_mut() = Some(scored);
}

fn scored(context: &TestContext) -> Scored {
    context
        .scored
        .borrow()
        .clone()
        .expect("profiles should be scored")
}

#[then("the score is 33")]
fn score_is_33(context: &TestContext) {
    assert_eq!(scored(context).score, 33);
}

#[then("the score is 0")]
fn score_is_0(context: &TestContext) {
    assert_eq!(scored(context).score, 0);
}

#[then("the score is 100")]
fn score_is_100(context: &TestContext) {
    assert_eq!(scored(context).score, 100);
}

#[then("the score is 60")]
fn score_is_60(context: &TestContext) {
    assert_eq!(scored(context).score, 60);
}

#[then("the shared movies are listed as Inception")]
fn shared_movies(context: &TestContext) {
    let result = scored(context);
    let movie = result
        .breakdown
        .get(&Category::Movie)
        .expect("movie breakdown");
    assert_eq!(movie.common, ["Inception"]);
}

#[scenario(path = "tests/features/compatibility.feature", index = 0)]
fn partial_overlap(context: TestContext) {
    let _ = context;
}

#[scenario(path = "tests/features/compatibility.feature", index = 1)]
fn empty_profiles(context: TestContext) {
    let _ = context;
}

#[scenario(path = "tests/features/compatibility.feature", index = 2)]
fn inactive_categories_reweighted(context: TestContext) {
    let _ = context;
}

#[scenario(path = "tests/features/compatibility.feature", index = 3)]
fn global_weights_without_reweight(context: TestContext) {
    let _ = context;
}
