//! Focused unit tests covering argument conversion and defaults.

use super::*;
use crate::compare::{CachedArgs, CompareArgs, CompareConfig, PairConfig};
use crate::users::{
    InterestsArgs, InterestsConfig, PutUserArgs, PutUserConfig, ShowUserArgs, ShowUserConfig,
};
use kindred_core::{Category, UserSelector, UserValidationError};
use rstest::rstest;

#[rstest]
fn converting_put_user_without_profile_errors() {
    let err = PutUserConfig::try_from(PutUserArgs::default()).expect_err("profile is required");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_PROFILE);
            assert_eq!(env, ENV_PUT_USER_PROFILE);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
#[case(None, Some("grace"), ARG_ME, ENV_COMPARE_ME)]
#[case(Some("ada"), None, ARG_OTHER, ENV_COMPARE_OTHER)]
fn converting_compare_without_users_errors(
    #[case] me: Option<&str>,
    #[case] other: Option<&str>,
    #[case] field: &'static str,
    #[case] env_var: &'static str,
) {
    let args = CompareArgs {
        me: me.map(str::to_owned),
        other: other.map(str::to_owned),
        ..CompareArgs::default()
    };
    let err = CompareConfig::try_from(args).expect_err("missing user should error");
    match err {
        CliError::MissingArgument {
            field: missing,
            env,
        } => {
            assert_eq!(missing, field);
            assert_eq!(env, env_var);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn converting_cached_reports_its_own_environment_variable() {
    let args = CachedArgs {
        other: Some("grace".into()),
        ..CachedArgs::default()
    };
    let err = PairConfig::try_from(args).expect_err("missing user should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_ME);
            assert_eq!(env, ENV_CACHED_ME);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn store_config_applies_defaults() {
    let config = StoreConfig::from_options(None, None);
    assert_eq!(config.database, Utf8PathBuf::from(DEFAULT_DATABASE));
    assert_eq!(
        config.ttl,
        Some(Duration::from_secs(7 * 24 * 60 * 60))
    );
}

#[rstest]
fn zero_ttl_disables_expiry() {
    let config = StoreConfig::from_options(Some("data/k.db".into()), Some(0));
    assert_eq!(config.database, Utf8PathBuf::from("data/k.db"));
    assert_eq!(config.ttl, None);
}

#[rstest]
fn compare_config_parses_selectors_and_options() {
    let args = CompareArgs {
        me: Some(" Ada ".into()),
        other: Some("id:user-7".into()),
        weights: Some(r#"{"movie": 2, "bogus": 1, "tv": "heavy"}"#.into()),
        no_reweight: true,
        ..CompareArgs::default()
    };
    let config = CompareConfig::try_from(args).expect("config should build");

    assert_eq!(config.pair.me.to_string(), "ada");
    assert_eq!(config.pair.other.to_string(), "id:user-7");
    assert!(!config.options.reweight_active);
    let weights = config.options.weights.expect("weights supplied");
    assert_eq!(weights.get(Category::Movie), Some(2.0));
    assert_eq!(weights.get(Category::Tv), None);
}

#[rstest]
fn compare_config_defaults_to_reweighting_without_overrides() {
    let args = CompareArgs {
        me: Some("ada".into()),
        other: Some("grace".into()),
        ..CompareArgs::default()
    };
    let config = CompareConfig::try_from(args).expect("config should build");
    assert!(config.options.reweight_active);
    assert!(config.options.weights.is_none());
}

#[rstest]
fn malformed_weights_are_rejected() {
    let args = CompareArgs {
        me: Some("ada".into()),
        other: Some("grace".into()),
        weights: Some("{movie:".into()),
        ..CompareArgs::default()
    };
    let err = CompareConfig::try_from(args).expect_err("malformed JSON should error");
    match err {
        CliError::ParseJson { field, .. } => assert_eq!(field, ARG_WEIGHTS),
        other => panic!("expected ParseJson, found {other:?}"),
    }
}

#[rstest]
fn empty_id_selector_is_invalid() {
    let args = ShowUserArgs {
        selector: Some("id:".into()),
        ..ShowUserArgs::default()
    };
    let err = ShowUserConfig::try_from(args).expect_err("empty id should error");
    match err {
        CliError::InvalidInput { field, source } => {
            assert_eq!(field, ARG_SELECTOR);
            assert_eq!(source, UserValidationError::EmptyId);
        }
        other => panic!("expected InvalidInput, found {other:?}"),
    }
}

#[rstest]
fn show_user_accepts_handles() {
    let args = ShowUserArgs {
        selector: Some("Grace".into()),
        ..ShowUserArgs::default()
    };
    let config = ShowUserConfig::try_from(args).expect("config should build");
    assert!(matches!(config.selector, UserSelector::Handle(_)));
}

#[rstest]
#[case("Movie", Some(Category::Movie))]
#[case(" hobby ", Some(Category::Hobby))]
#[case("books", None)]
fn interests_category_is_parsed(#[case] raw: &str, #[case] expected: Option<Category>) {
    let args = InterestsArgs {
        category: Some(raw.into()),
        ..InterestsArgs::default()
    };
    match (InterestsConfig::try_from(args), expected) {
        (Ok(config), Some(category)) => assert_eq!(config.category, category),
        (Err(CliError::InvalidCategory(err)), None) => assert_eq!(err.name, raw),
        (other, _) => panic!("unexpected conversion result {other:?}"),
    }
}
