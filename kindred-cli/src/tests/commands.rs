//! End-to-end command tests against a temporary SQLite database.

use super::helpers::{Workspace, parse_output};
use super::*;
use crate::compare::{CompareConfig, PairConfig, execute_cached, execute_compare, execute_purge};
use crate::users::{
    InterestsConfig, PutUserConfig, ShowUserConfig, execute_interests, execute_put_user,
    execute_show_user,
};
use chrono::TimeDelta;
use kindred_core::{Category, CompatError, PairSide, ScoreOptions, UserSelector};
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn workspace() -> Workspace {
    Workspace::new()
}

fn selector(raw: &str) -> UserSelector {
    raw.parse().expect("valid selector")
}

fn pair(workspace: &Workspace, me: &str, other: &str) -> PairConfig {
    PairConfig {
        me: selector(me),
        other: selector(other),
        store: workspace.store.clone(),
    }
}

fn compare(workspace: &Workspace, me: &str, other: &str) -> Result<Vec<u8>, CliError> {
    let config = CompareConfig {
        pair: pair(workspace, me, other),
        options: ScoreOptions::default(),
    };
    let mut out = Vec::new();
    execute_compare(&config, &workspace.clock, &mut out)?;
    Ok(out)
}

fn cached(workspace: &Workspace, me: &str, other: &str) -> Result<Vec<u8>, CliError> {
    let mut out = Vec::new();
    execute_cached(&pair(workspace, me, other), &workspace.clock, &mut out)?;
    Ok(out)
}

#[rstest]
fn put_user_prints_identity_and_keeps_it_on_update(workspace: Workspace) {
    let first = workspace.put_user("Ada", &["Inception"]);
    assert_eq!(first["handle"], "ada");
    assert!(first["id"].as_str().is_some_and(|id| !id.is_empty()));

    let second = workspace.put_user("ada", &["Heat"]);
    assert_eq!(second["id"], first["id"]);
}

#[rstest]
fn put_user_rejects_invalid_profiles(workspace: Workspace) {
    let config = PutUserConfig {
        profile: workspace.write_profile("blank", &json!({ "name": " ", "handle": "x" })),
        store: workspace.store.clone(),
    };
    let err = execute_put_user(&config, &workspace.clock, &mut Vec::new())
        .expect_err("blank name should error");
    match err {
        CliError::InvalidInput { field, .. } => assert_eq!(field, ARG_PROFILE),
        other => panic!("expected InvalidInput, found {other:?}"),
    }
}

#[rstest]
fn put_user_reports_unreadable_profiles(workspace: Workspace) {
    let config = PutUserConfig {
        profile: workspace.root.join("missing.json"),
        store: workspace.store.clone(),
    };
    let err = execute_put_user(&config, &workspace.clock, &mut Vec::new())
        .expect_err("missing file should error");
    match err {
        CliError::ReadInput { field, path, .. } => {
            assert_eq!(field, ARG_PROFILE);
            assert_eq!(path, workspace.root.join("missing.json"));
        }
        other => panic!("expected ReadInput, found {other:?}"),
    }
}

#[rstest]
fn show_user_prints_the_stored_profile(workspace: Workspace) {
    workspace.put_user("grace", &["Tenet", "Heat"]);
    let config = ShowUserConfig {
        selector: selector("GRACE"),
        store: workspace.store.clone(),
    };
    let mut out = Vec::new();
    execute_show_user(&config, &mut out).expect("show-user succeeds");

    let profile = parse_output(&out);
    assert_eq!(profile["name"], "GRACE");
    assert_eq!(profile["interests"]["movie"], json!(["Tenet", "Heat"]));
}

#[rstest]
fn show_user_reports_missing_users(workspace: Workspace) {
    let config = ShowUserConfig {
        selector: selector("nobody"),
        store: workspace.store.clone(),
    };
    let err = execute_show_user(&config, &mut Vec::new()).expect_err("unknown user");
    match err {
        CliError::UserNotFound { selector } => assert_eq!(selector, "nobody"),
        other => panic!("expected UserNotFound, found {other:?}"),
    }
}

#[rstest]
fn compare_scores_and_caches_the_pair(workspace: Workspace) {
    workspace.put_user("ada", &["Inception", "Interstellar"]);
    workspace.put_user("grace", &["inception", "Tenet"]);

    let compared = parse_output(&compare(&workspace, "ada", "grace").expect("compare"));
    assert_eq!(compared["score"], 33);
    assert_eq!(compared["breakdown"]["movie"]["common"], json!(["Inception"]));
    assert_eq!(compared["users"]["a"]["handle"], "ada");

    let reversed = parse_output(&cached(&workspace, "grace", "ada").expect("cached"));
    assert_eq!(reversed["score"], 33);
    assert_eq!(reversed["users"]["a"]["handle"], "ada");
    assert_eq!(reversed["computed_at"], compared["computed_at"]);
}

#[rstest]
fn cached_breakdown_follows_the_computed_order(workspace: Workspace) {
    workspace.put_user("ada", &["Up"]);
    workspace.put_user("grace", &["up", "Heat", "Alien"]);
    compare(&workspace, "ada", "grace").expect("compare");

    let reversed = parse_output(&cached(&workspace, "grace", "ada").expect("cached"));
    let movie = &reversed["breakdown"]["movie"];
    assert_eq!(reversed["users"]["a"]["handle"], "ada");
    assert_eq!(reversed["users"]["b"]["handle"], "grace");
    assert_eq!(movie["count_a"], 1);
    assert_eq!(movie["count_b"], 3);
    assert_eq!(movie["common"], json!(["Up"]));
}

#[rstest]
fn cached_without_a_comparison_reports_not_cached(workspace: Workspace) {
    workspace.put_user("ada", &["Heat"]);
    workspace.put_user("grace", &["Heat"]);

    let err = cached(&workspace, "ada", "grace").expect_err("nothing cached yet");
    match err {
        CliError::NotCached { a, b } => {
            assert_eq!(a, "ada");
            assert_eq!(b, "grace");
        }
        other => panic!("expected NotCached, found {other:?}"),
    }
}

#[rstest]
fn compare_reports_which_user_is_missing(workspace: Workspace) {
    workspace.put_user("ada", &["Heat"]);

    let err = compare(&workspace, "ada", "ghost").expect_err("unknown user B");
    match err {
        CliError::Compare(CompatError::UserNotFound { side, selector }) => {
            assert_eq!(side, PairSide::B);
            assert_eq!(selector, "ghost");
        }
        other => panic!("expected UserNotFound, found {other:?}"),
    }
}

#[rstest]
fn expired_entries_are_hidden_then_purged(workspace: Workspace) {
    workspace.put_user("ada", &["Heat"]);
    workspace.put_user("grace", &["Heat"]);
    compare(&workspace, "ada", "grace").expect("compare");

    workspace.clock.advance(TimeDelta::days(8));
    let err = cached(&workspace, "ada", "grace").expect_err("entry expired");
    assert!(matches!(err, CliError::NotCached { .. }));

    let mut out = Vec::new();
    execute_purge(&workspace.store, &workspace.clock, &mut out).expect("purge");
    assert_eq!(parse_output(&out), json!({ "purged": 1 }));
}

#[rstest]
fn zero_ttl_keeps_entries_forever() {
    let workspace = Workspace::with_ttl_seconds(Some(0));
    workspace.put_user("ada", &["Heat"]);
    workspace.put_user("grace", &["Heat"]);
    compare(&workspace, "ada", "grace").expect("compare");

    workspace.clock.advance(TimeDelta::days(365));
    let cached_pair = parse_output(&cached(&workspace, "ada", "grace").expect("still cached"));
    assert_eq!(cached_pair["score"], 100);
}

#[rstest]
fn database_parent_directories_are_created(workspace: Workspace) {
    let nested = StoreConfig {
        database: workspace.root.join("nested/deeper/kindred.db"),
        ttl: None,
    };
    nested.open().expect("open nested database");
    assert!(workspace.root.join("nested/deeper/kindred.db").is_file());
}

#[rstest]
fn interests_lists_catalogued_entries(workspace: Workspace) {
    workspace.put_user("ada", &["Up", "heat"]);
    workspace.put_user("grace", &["Heat"]);

    let config = InterestsConfig {
        category: Category::Movie,
        store: workspace.store.clone(),
    };
    let mut out = Vec::new();
    execute_interests(&config, &mut out).expect("interests");

    let entries = parse_output(&out);
    let names: Vec<&str> = entries
        .as_array()
        .expect("array output")
        .iter()
        .filter_map(|entry| entry["name"].as_str())
        .collect();
    assert_eq!(names, ["heat", "Up"]);
}
