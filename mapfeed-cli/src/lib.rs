//! Command-line interface for extracting rolled-up map rows.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use log::LevelFilter;
use structured_logger::{Builder, json::new_writer};

mod error;
mod extract;
mod fs;

pub use error::CliError;

use extract::ExtractArgs;

const ARG_DATABASE: &str = "database";
const ARG_KIND: &str = "kind";
const ARG_TABLE: &str = "table";
const ARG_SCALE: &str = "scale";
const ARG_INCLUDE_DISCUSSIONS: &str = "include-discussions";
const ARG_AS_OF: &str = "as-of";
const ARG_LOG_LEVEL: &str = "log-level";
const ENV_DATABASE: &str = "MAPFEED_CMDS_EXTRACT_DATABASE";
const ENV_KIND: &str = "MAPFEED_CMDS_EXTRACT_KIND";

/// Run the mapfeed CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when arguments or configuration are invalid, the
/// database cannot be read, or extraction fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Extract(args) => {
            extract::run_extract(args)?;
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(
    name = "mapfeed",
    about = "Stream rolled-up map rows as JSON lines",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Extract one rollup table from a SQLite database to stdout.
    Extract(ExtractArgs),
}

/// Install the JSON logger on stderr.
fn init_logging(level: LevelFilter) -> Result<(), CliError> {
    Builder::with_level(level.as_str())
        .with_target_writer("*", new_writer(std::io::stderr()))
        .try_init()
        .map_err(CliError::InstallLogger)
}

#[cfg(test)]
mod tests;
