//! Error types emitted by the Kindred CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use kindred_core::{CompatError, StoreError, UnknownCategory, UserValidationError};
use thiserror::Error;

/// Errors emitted by the Kindred CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Argument name.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// The database directory could not be created.
    #[error("failed to prepare database directory for {path}: {source}")]
    PrepareDatabase {
        /// Requested database path.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// Reading an input file failed.
    #[error("failed to read {field} at {path}: {source}")]
    ReadInput {
        /// Argument that named the file.
        field: &'static str,
        /// Path of the file.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// JSON input could not be decoded.
    #[error("failed to parse {field} JSON: {source}")]
    ParseJson {
        /// Argument that supplied the JSON.
        field: &'static str,
        /// Decoding failure.
        #[source]
        source: serde_json::Error,
    },
    /// A user or selector failed validation.
    #[error("invalid {field}: {source}")]
    InvalidInput {
        /// Argument that failed validation.
        field: &'static str,
        /// Validation failure.
        #[source]
        source: UserValidationError,
    },
    /// A category name was outside the fixed set.
    #[error(transparent)]
    InvalidCategory(#[from] UnknownCategory),
    /// The store rejected an operation.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Comparing two users failed.
    #[error(transparent)]
    Compare(#[from] CompatError),
    /// No user has the requested handle.
    #[error("user {selector} not found")]
    UserNotFound {
        /// Text form of the selector.
        selector: String,
    },
    /// No fresh comparison is cached for the pair.
    #[error("no cached comparison for {a} and {b}; run `kindred compare` first")]
    NotCached {
        /// First selector.
        a: String,
        /// Second selector.
        b: String,
    },
    /// Serialising command output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
