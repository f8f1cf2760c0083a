//! Error types emitted by the mapfeed CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use mapfeed_core::{FormatError, ScaleError};
use mapfeed_data::{ExtractError, PrefetchError};
use thiserror::Error;

/// Errors emitted by the mapfeed CLI.
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
        field: &'static str,
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The configured coordinate scale was rejected.
    #[error("invalid coordinate scale: {0}")]
    InvalidScale(#[source] ScaleError),
    /// The table name is not a plain SQL identifier.
    #[error("table {table:?} is not a plain identifier")]
    InvalidTable { table: String },
    /// A timestamp option did not use the `YYYY-MM-DDTHH:MM:SSZ` layout.
    #[error("{field} value {value:?} is not a YYYY-MM-DDTHH:MM:SSZ timestamp")]
    InvalidTimestamp { field: &'static str, value: String },
    /// The log level is not one of the `log` crate's level names.
    #[error("unknown log level {value:?}")]
    InvalidLogLevel { value: String },
    /// A global logger was already installed.
    #[error("failed to install logger: {0}")]
    InstallLogger(#[source] log::SetLoggerError),
    /// Opening the SQLite database failed.
    #[error("failed to open database {path:?}: {source}")]
    OpenDatabase {
        path: Utf8PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    /// Querying the rollup table failed.
    #[error("failed to query table {table}: {source}")]
    QueryTable {
        table: String,
        #[source]
        source: rusqlite::Error,
    },
    /// Loading changeset owners failed.
    #[error(transparent)]
    Prefetch(#[from] PrefetchError),
    /// A row could not be extracted.
    #[error("extraction failed: {0}")]
    Extract(#[from] ExtractError),
    /// Flushing the output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[from] FormatError),
}
