//! Comparison subcommands: `compare`, `cached` and `purge`.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::{ArgAction, Parser};
use kindred_core::{
    Clock, CompatService, ScoreOptions, SqliteStore, SystemClock, UserSelector, WeightOverrides,
};
use kindred_scorer::JaccardScorer;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::users::parse_selector;
use crate::{
    ARG_DATABASE, ARG_ME, ARG_NO_REWEIGHT, ARG_OTHER, ARG_TTL_SECONDS, ARG_WEIGHTS, CliError,
    ENV_CACHED_ME, ENV_CACHED_OTHER, ENV_COMPARE_ME, ENV_COMPARE_OTHER, StoreConfig, write_json,
};

type Service<'a> = CompatService<&'a SqliteStore, &'a SqliteStore, JaccardScorer, &'a dyn Clock>;

fn service<'a>(store: &'a SqliteStore, clock: &'a dyn Clock) -> Service<'a> {
    CompatService::new(store, store, JaccardScorer, clock)
}

/// CLI arguments for the `compare` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "compare",
    long_about = "Score two users by weighted Jaccard similarity of their \
                 interests and cache the result for the unordered pair. \
                 Users are given by handle or as `id:<id>`.",
    about = "Score two users and cache the result"
)]
#[ortho_config(prefix = "KINDRED")]
pub(crate) struct CompareArgs {
    /// The requesting user.
    #[arg(value_name = "me")]
    #[serde(default)]
    pub(crate) me: Option<String>,
    /// The user to compare against.
    #[arg(value_name = "other")]
    #[serde(default)]
    pub(crate) other: Option<String>,
    /// JSON object of category weights, e.g. `{"movie": 2}`.
    #[arg(long = ARG_WEIGHTS, value_name = "json")]
    #[serde(default)]
    pub(crate) weights: Option<String>,
    /// Keep the weight of categories neither user filled in.
    #[arg(long = ARG_NO_REWEIGHT, action = ArgAction::SetTrue)]
    #[serde(default)]
    pub(crate) no_reweight: bool,
    /// Path to the SQLite database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Cache time-to-live in seconds; 0 disables expiry.
    #[arg(long = ARG_TTL_SECONDS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) ttl_seconds: Option<u64>,
}

impl CompareArgs {
    pub(crate) fn into_config(self) -> Result<CompareConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        CompareConfig::try_from(merged)
    }
}

/// Resolved `compare` configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CompareConfig {
    pub(crate) pair: PairConfig,
    pub(crate) options: ScoreOptions,
}

impl TryFrom<CompareArgs> for CompareConfig {
    type Error = CliError;

    fn try_from(args: CompareArgs) -> Result<Self, Self::Error> {
        let pair = PairConfig::resolve(
            args.me,
            args.other,
            (ENV_COMPARE_ME, ENV_COMPARE_OTHER),
            StoreConfig::from_options(args.database, args.ttl_seconds),
        )?;
        let mut options = ScoreOptions::default().with_reweight_active(!args.no_reweight);
        if let Some(raw) = args.weights {
            let weights: WeightOverrides =
                serde_json::from_str(&raw).map_err(|source| CliError::ParseJson {
                    field: ARG_WEIGHTS,
                    source,
                })?;
            options = options.with_weights(weights);
        }
        Ok(Self { pair, options })
    }
}

pub(crate) fn run_compare(args: CompareArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    execute_compare(&config, &SystemClock, writer)
}

pub(crate) fn execute_compare(
    config: &CompareConfig,
    clock: &dyn Clock,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let store = config.pair.store.open()?;
    let comparison = service(&store, clock).compare_and_cache(
        &config.pair.me,
        &config.pair.other,
        &config.options,
    )?;
    info!(
        "{} and {} scored {}",
        comparison.users.a.handle, comparison.users.b.handle, comparison.score
    );
    write_json(writer, &comparison)
}

/// CLI arguments for the `cached` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "cached",
    about = "Print the cached comparison for two users if it is still fresh"
)]
#[ortho_config(prefix = "KINDRED")]
pub(crate) struct CachedArgs {
    /// The requesting user.
    #[arg(value_name = "me")]
    #[serde(default)]
    pub(crate) me: Option<String>,
    /// The compared user.
    #[arg(value_name = "other")]
    #[serde(default)]
    pub(crate) other: Option<String>,
    /// Path to the SQLite database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Cache time-to-live in seconds; 0 disables expiry.
    #[arg(long = ARG_TTL_SECONDS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) ttl_seconds: Option<u64>,
}

impl CachedArgs {
    pub(crate) fn into_config(self) -> Result<PairConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        PairConfig::try_from(merged)
    }
}

/// Two resolved selectors plus the store they are looked up in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PairConfig {
    pub(crate) me: UserSelector,
    pub(crate) other: UserSelector,
    pub(crate) store: StoreConfig,
}

impl PairConfig {
    fn resolve(
        me: Option<String>,
        other: Option<String>,
        (env_me, env_other): (&'static str, &'static str),
        store: StoreConfig,
    ) -> Result<Self, CliError> {
        let raw_me = me.ok_or(CliError::MissingArgument {
            field: ARG_ME,
            env: env_me,
        })?;
        let raw_other = other.ok_or(CliError::MissingArgument {
            field: ARG_OTHER,
            env: env_other,
        })?;
        Ok(Self {
            me: parse_selector(&raw_me, ARG_ME)?,
            other: parse_selector(&raw_other, ARG_OTHER)?,
            store,
        })
    }
}

impl TryFrom<CachedArgs> for PairConfig {
    type Error = CliError;

    fn try_from(args: CachedArgs) -> Result<Self, Self::Error> {
        Self::resolve(
            args.me,
            args.other,
            (ENV_CACHED_ME, ENV_CACHED_OTHER),
            StoreConfig::from_options(args.database, args.ttl_seconds),
        )
    }
}

pub(crate) fn run_cached(args: CachedArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    execute_cached(&config, &SystemClock, writer)
}

pub(crate) fn execute_cached(
    config: &PairConfig,
    clock: &dyn Clock,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let store = config.store.open()?;
    let cached = service(&store, clock).fetch_cached(&config.me, &config.other)?;
    let comparison = cached.ok_or_else(|| CliError::NotCached {
        a: config.me.to_string(),
        b: config.other.to_string(),
    })?;
    write_json(writer, &comparison)
}

/// CLI arguments for the `purge` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(name = "purge", about = "Delete expired cached comparisons")]
#[ortho_config(prefix = "KINDRED")]
pub(crate) struct PurgeArgs {
    /// Path to the SQLite database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Cache time-to-live in seconds; 0 disables expiry.
    #[arg(long = ARG_TTL_SECONDS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) ttl_seconds: Option<u64>,
}

impl PurgeArgs {
    pub(crate) fn into_config(self) -> Result<StoreConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        Ok(StoreConfig::from_options(merged.database, merged.ttl_seconds))
    }
}

#[derive(Debug, Serialize)]
struct PurgeOutput {
    purged: usize,
}

pub(crate) fn run_purge(args: PurgeArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    execute_purge(&config, &SystemClock, writer)
}

pub(crate) fn execute_purge(
    config: &StoreConfig,
    clock: &dyn Clock,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let store = config.open()?;
    let purged = service(&store, clock).purge_expired()?;
    info!("purged {purged} expired comparisons");
    write_json(writer, &PurgeOutput { purged })
}
