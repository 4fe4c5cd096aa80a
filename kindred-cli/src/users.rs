//! User and interest catalog subcommands.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use kindred_core::store::{InterestCatalog, UserLookup};
use kindred_core::{
    Category, Clock, Handle, SystemClock, UserDraft, UserId, UserSelector, ValidatedUser,
    register_user,
};
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_CATEGORY, ARG_DATABASE, ARG_PROFILE, ARG_SELECTOR, ARG_TTL_SECONDS, CliError,
    ENV_INTERESTS_CATEGORY, ENV_PUT_USER_PROFILE, ENV_SHOW_USER_SELECTOR, StoreConfig, fs,
    write_json,
};

/// CLI arguments for the `put-user` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "put-user",
    long_about = "Create or update a user from a JSON profile containing \
                 name, handle, an optional uni and interests grouped by \
                 category. Users are matched on their normalised handle.",
    about = "Create or update a user"
)]
#[ortho_config(prefix = "KINDRED")]
pub(crate) struct PutUserArgs {
    /// Path to a JSON file containing the user profile.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) profile: Option<Utf8PathBuf>,
    /// Path to the SQLite database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Cache time-to-live in seconds; 0 disables expiry.
    #[arg(long = ARG_TTL_SECONDS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) ttl_seconds: Option<u64>,
}

impl PutUserArgs {
    pub(crate) fn into_config(self) -> Result<PutUserConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        PutUserConfig::try_from(merged)
    }
}

/// Resolved `put-user` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PutUserConfig {
    pub(crate) profile: Utf8PathBuf,
    pub(crate) store: StoreConfig,
}

impl TryFrom<PutUserArgs> for PutUserConfig {
    type Error = CliError;

    fn try_from(args: PutUserArgs) -> Result<Self, Self::Error> {
        let profile = args.profile.ok_or(CliError::MissingArgument {
            field: ARG_PROFILE,
            env: ENV_PUT_USER_PROFILE,
        })?;
        Ok(Self {
            profile,
            store: StoreConfig::from_options(args.database, args.ttl_seconds),
        })
    }
}

#[derive(Debug, Serialize)]
struct PutUserOutput<'a> {
    id: &'a UserId,
    handle: &'a Handle,
}

pub(crate) fn run_put_user(args: PutUserArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    execute_put_user(&config, &SystemClock, writer)
}

pub(crate) fn execute_put_user(
    config: &PutUserConfig,
    clock: &dyn Clock,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let user = load_user(config)?;
    let store = config.store.open()?;
    let profile = register_user(&store, &store, &user, clock.now())?;
    info!("stored user {} as {}", profile.handle, profile.id);
    write_json(
        writer,
        &PutUserOutput {
            id: &profile.id,
            handle: &profile.handle,
        },
    )
}

fn load_user(config: &PutUserConfig) -> Result<ValidatedUser, CliError> {
    let raw = fs::read_utf8_file(&config.profile).map_err(|source| CliError::ReadInput {
        field: ARG_PROFILE,
        path: config.profile.clone(),
        source,
    })?;
    let draft: UserDraft = serde_json::from_str(&raw).map_err(|source| CliError::ParseJson {
        field: ARG_PROFILE,
        source,
    })?;
    draft.validate().map_err(|source| CliError::InvalidInput {
        field: ARG_PROFILE,
        source,
    })
}

/// CLI arguments for the `show-user` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "show-user",
    about = "Print a stored user profile by handle or `id:<id>`"
)]
#[ortho_config(prefix = "KINDRED")]
pub(crate) struct ShowUserArgs {
    /// Handle of the user, or `id:` followed by the stored identifier.
    #[arg(value_name = "selector")]
    #[serde(default)]
    pub(crate) selector: Option<String>,
    /// Path to the SQLite database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Cache time-to-live in seconds; 0 disables expiry.
    #[arg(long = ARG_TTL_SECONDS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) ttl_seconds: Option<u64>,
}

impl ShowUserArgs {
    pub(crate) fn into_config(self) -> Result<ShowUserConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ShowUserConfig::try_from(merged)
    }
}

/// Resolved `show-user` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ShowUserConfig {
    pub(crate) selector: UserSelector,
    pub(crate) store: StoreConfig,
}

impl TryFrom<ShowUserArgs> for ShowUserConfig {
    type Error = CliError;

    fn try_from(args: ShowUserArgs) -> Result<Self, Self::Error> {
        let raw = args.selector.ok_or(CliError::MissingArgument {
            field: ARG_SELECTOR,
            env: ENV_SHOW_USER_SELECTOR,
        })?;
        Ok(Self {
            selector: parse_selector(&raw, ARG_SELECTOR)?,
            store: StoreConfig::from_options(args.database, args.ttl_seconds),
        })
    }
}

pub(crate) fn run_show_user(args: ShowUserArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    execute_show_user(&config, writer)
}

pub(crate) fn execute_show_user(
    config: &ShowUserConfig,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let store = config.store.open()?;
    let profile = store
        .find_one(&config.selector)?
        .ok_or_else(|| CliError::UserNotFound {
            selector: config.selector.to_string(),
        })?;
    write_json(writer, &profile)
}

/// CLI arguments for the `interests` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "interests",
    about = "List catalogued interests for a category"
)]
#[ortho_config(prefix = "KINDRED")]
pub(crate) struct InterestsArgs {
    /// One of movie, tv, artist or hobby.
    #[arg(value_name = "category")]
    #[serde(default)]
    pub(crate) category: Option<String>,
    /// Path to the SQLite database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Cache time-to-live in seconds; 0 disables expiry.
    #[arg(long = ARG_TTL_SECONDS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) ttl_seconds: Option<u64>,
}

impl InterestsArgs {
    pub(crate) fn into_config(self) -> Result<InterestsConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        InterestsConfig::try_from(merged)
    }
}

/// Resolved `interests` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InterestsConfig {
    pub(crate) category: Category,
    pub(crate) store: StoreConfig,
}

impl TryFrom<InterestsArgs> for InterestsConfig {
    type Error = CliError;

    fn try_from(args: InterestsArgs) -> Result<Self, Self::Error> {
        let raw = args.category.ok_or(CliError::MissingArgument {
            field: ARG_CATEGORY,
            env: ENV_INTERESTS_CATEGORY,
        })?;
        Ok(Self {
            category: raw.parse()?,
            store: StoreConfig::from_options(args.database, args.ttl_seconds),
        })
    }
}

pub(crate) fn run_interests(args: InterestsArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    execute_interests(&config, writer)
}

pub(crate) fn execute_interests(
    config: &InterestsConfig,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let store = config.store.open()?;
    let entries = store.list_interests(config.category)?;
    write_json(writer, &entries)
}

/// Parse a handle or `id:` selector supplied through `field`.
pub(crate) fn parse_selector(raw: &str, field: &'static str) -> Result<UserSelector, CliError> {
    raw.parse()
        .map_err(|source| CliError::InvalidInput { field, source })
}
