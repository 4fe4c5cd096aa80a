//! Command-line interface for the Kindred compatibility engine.
//!
//! Every subcommand opens the same SQLite database. Its location and the
//! cache time-to-live are layered from CLI flags, environment variables and
//! configuration files via `ortho_config`.
#![forbid(unsafe_code)]

use std::io::Write;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use kindred_core::SqliteStore;
use serde::Serialize;

mod compare;
mod error;
mod fs;
mod users;

pub use error::CliError;

use compare::{CachedArgs, CompareArgs, PurgeArgs};
use users::{InterestsArgs, PutUserArgs, ShowUserArgs};

pub(crate) const ARG_DATABASE: &str = "database";
pub(crate) const ARG_TTL_SECONDS: &str = "ttl-seconds";
pub(crate) const ARG_PROFILE: &str = "profile";
pub(crate) const ARG_SELECTOR: &str = "selector";
pub(crate) const ARG_ME: &str = "me";
pub(crate) const ARG_OTHER: &str = "other";
pub(crate) const ARG_WEIGHTS: &str = "weights";
pub(crate) const ARG_NO_REWEIGHT: &str = "no-reweight";
pub(crate) const ARG_CATEGORY: &str = "category";
pub(crate) const ENV_PUT_USER_PROFILE: &str = "KINDRED_CMDS_PUT_USER_PROFILE";
pub(crate) const ENV_SHOW_USER_SELECTOR: &str = "KINDRED_CMDS_SHOW_USER_SELECTOR";
pub(crate) const ENV_COMPARE_ME: &str = "KINDRED_CMDS_COMPARE_ME";
pub(crate) const ENV_COMPARE_OTHER: &str = "KINDRED_CMDS_COMPARE_OTHER";
pub(crate) const ENV_CACHED_ME: &str = "KINDRED_CMDS_CACHED_ME";
pub(crate) const ENV_CACHED_OTHER: &str = "KINDRED_CMDS_CACHED_OTHER";
pub(crate) const ENV_INTERESTS_CATEGORY: &str = "KINDRED_CMDS_INTERESTS_CATEGORY";

/// Database used when none is configured.
pub const DEFAULT_DATABASE: &str = "kindred.db";
/// Cache time-to-live used when none is configured: seven days.
pub const DEFAULT_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;

/// Run the Kindred CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when argument parsing, configuration, storage or
/// output fails.
pub fn run() -> Result<(), CliError> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => return Err(CliError::ArgumentParsing(err)),
    };
    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Command::PutUser(args) => users::run_put_user(args, &mut stdout),
        Command::ShowUser(args) => users::run_show_user(args, &mut stdout),
        Command::Interests(args) => users::run_interests(args, &mut stdout),
        Command::Compare(args) => compare::run_compare(args, &mut stdout),
        Command::Cached(args) => compare::run_cached(args, &mut stdout),
        Command::Purge(args) => compare::run_purge(args, &mut stdout),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "kindred",
    about = "Score and cache interest compatibility between users",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create or update a user from a JSON profile.
    PutUser(PutUserArgs),
    /// Print a stored user profile.
    ShowUser(ShowUserArgs),
    /// List catalogued interests for a category.
    Interests(InterestsArgs),
    /// Score two users and cache the result.
    Compare(CompareArgs),
    /// Print the cached comparison for two users if it is still fresh.
    Cached(CachedArgs),
    /// Delete expired comparisons.
    Purge(PurgeArgs),
}

/// Resolved database location and cache policy shared by every subcommand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StoreConfig {
    /// Path to the SQLite database.
    pub(crate) database: Utf8PathBuf,
    /// Cache time-to-live; `None` disables expiry.
    pub(crate) ttl: Option<Duration>,
}

impl StoreConfig {
    /// Apply defaults to the merged store options.
    ///
    /// A TTL of zero seconds disables expiry.
    pub(crate) fn from_options(database: Option<Utf8PathBuf>, ttl_seconds: Option<u64>) -> Self {
        let seconds = ttl_seconds.unwrap_or(DEFAULT_TTL_SECONDS);
        Self {
            database: database.unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE)),
            ttl: (seconds > 0).then(|| Duration::from_secs(seconds)),
        }
    }

    /// Create the parent directory if needed and open the database.
    pub(crate) fn open(&self) -> Result<SqliteStore, CliError> {
        prepare_parent(&self.database)?;
        Ok(SqliteStore::open(self.database.as_std_path(), self.ttl)?)
    }
}

fn prepare_parent(path: &Utf8Path) -> Result<(), CliError> {
    fs::ensure_parent_dir(path).map_err(|source| CliError::PrepareDatabase {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `value` as pretty-printed JSON followed by a newline.
pub(crate) fn write_json<T: Serialize + ?Sized>(
    writer: &mut dyn Write,
    value: &T,
) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)
}

#[cfg(test)]
mod tests;
