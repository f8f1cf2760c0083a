//! Extract command implementation for the mapfeed CLI.

use std::io::{BufWriter, Write};
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use log::{LevelFilter, info, warn};
use mapfeed_core::{ChangesetCache, CoordinateScale, ElementKind, parse_timestamp};
use mapfeed_data::{
    ExtractOptions, JsonLinesFormatter, extract_changesets, extract_elements,
    load_changeset_owners,
};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use rusqlite::{Connection, OpenFlags};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_AS_OF, ARG_DATABASE, ARG_INCLUDE_DISCUSSIONS, ARG_KIND, ARG_LOG_LEVEL, ARG_SCALE,
    ARG_TABLE, CliError, ENV_DATABASE, ENV_KIND, fs, init_logging,
};

/// Kind of record held by a rollup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum RecordKind {
    Nodes,
    Ways,
    Relations,
    Changesets,
}

impl RecordKind {
    /// Element kind extracted from the table, or `None` for changesets.
    pub(crate) const fn element_kind(self) -> Option<ElementKind> {
        match self {
            Self::Nodes => Some(ElementKind::Node),
            Self::Ways => Some(ElementKind::Way),
            Self::Relations => Some(ElementKind::Relation),
            Self::Changesets => None,
        }
    }

    pub(crate) const fn default_table(self) -> &'static str {
        match self {
            Self::Nodes => "nodes_rollup",
            Self::Ways => "ways_rollup",
            Self::Relations => "relations_rollup",
            Self::Changesets => "changesets_rollup",
        }
    }

    /// Column naming the changeset whose owner attributes each row.
    const fn changeset_column(self) -> &'static str {
        match self {
            Self::Changesets => "id",
            Self::Nodes | Self::Ways | Self::Relations => "changeset_id",
        }
    }
}

/// CLI arguments for the `extract` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Stream one rollup table as JSON lines on stdout. Changeset \
                 owners are prefetched from the changeset_owners table before \
                 any row is read. Options can come from CLI flags, \
                 configuration files, or environment variables.",
    about = "Extract rolled-up rows as JSON lines"
)]
#[ortho_config(prefix = "MAPFEED")]
pub(crate) struct ExtractArgs {
    /// Path to the SQLite database holding the rollup tables.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Kind of record to extract.
    #[arg(long = ARG_KIND, value_enum)]
    #[serde(default)]
    pub(crate) kind: Option<RecordKind>,
    /// Override the rollup table name (defaults to `<kind>_rollup`).
    #[arg(long = ARG_TABLE, value_name = "name")]
    #[serde(default)]
    pub(crate) table: Option<String>,
    /// Divisor for scaled coordinate columns.
    #[arg(long = ARG_SCALE, value_name = "factor")]
    #[serde(default)]
    pub(crate) scale: Option<u32>,
    /// Include changeset discussions in the output.
    #[arg(
        long = ARG_INCLUDE_DISCUSSIONS,
        value_name = "bool",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    #[serde(default)]
    pub(crate) include_discussions: Option<bool>,
    /// Reference time for open changesets (`YYYY-MM-DDTHH:MM:SSZ`).
    #[arg(long = ARG_AS_OF, value_name = "timestamp")]
    #[serde(default)]
    pub(crate) as_of: Option<String>,
    /// Log level for the JSON logger on stderr.
    #[arg(long = ARG_LOG_LEVEL, value_name = "level")]
    #[serde(default)]
    pub(crate) log_level: Option<String>,
}

impl ExtractArgs {
    pub(crate) fn into_config(self) -> Result<ExtractConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ExtractConfig::try_from(merged)
    }
}

/// Resolved `extract` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ExtractConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) kind: RecordKind,
    pub(crate) table: String,
    pub(crate) options: ExtractOptions,
    pub(crate) as_of: Option<DateTime<Utc>>,
    pub(crate) log_level: LevelFilter,
}

impl ExtractConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_existing(&self.database, ARG_DATABASE)
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match fs::file_is_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::SourcePathNotFile {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field,
                    path: path.to_path_buf(),
                })
            }
            Err(source) => Err(CliError::InspectSourcePath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

impl TryFrom<ExtractArgs> for ExtractConfig {
    type Error = CliError;

    fn try_from(args: ExtractArgs) -> Result<Self, Self::Error> {
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_DATABASE,
        })?;
        let kind = args.kind.ok_or(CliError::MissingArgument {
            field: ARG_KIND,
            env: ENV_KIND,
        })?;

        let table = args
            .table
            .unwrap_or_else(|| kind.default_table().to_owned());
        if !is_identifier(&table) {
            return Err(CliError::InvalidTable { table });
        }

        let scale = match args.scale {
            Some(factor) => CoordinateScale::new(factor).map_err(CliError::InvalidScale)?,
            None => CoordinateScale::default(),
        };
        let options = ExtractOptions::new(scale)
            .with_discussions(args.include_discussions.unwrap_or(false));

        let as_of = args
            .as_of
            .map(|value| {
                parse_timestamp(&value).ok_or(CliError::InvalidTimestamp {
                    field: ARG_AS_OF,
                    value,
                })
            })
            .transpose()?;

        let log_level = match args.log_level {
            Some(value) => {
                LevelFilter::from_str(&value).map_err(|_| CliError::InvalidLogLevel { value })?
            }
            None => LevelFilter::Warn,
        };

        Ok(Self {
            database,
            kind,
            table,
            options,
            as_of,
            log_level,
        })
    }
}

/// Whether `name` can be interpolated into SQL as a bare table name.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

pub(crate) fn run_extract(args: ExtractArgs) -> Result<usize, CliError> {
    let config = resolve_extract_config(args)?;
    init_logging(config.log_level)?;
    let mut stdout = std::io::stdout().lock();
    run_extract_with(&config, &mut stdout)
}

pub(crate) fn resolve_extract_config(args: ExtractArgs) -> Result<ExtractConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

/// Extract the configured table into `writer`, returning the rows written.
pub(crate) fn run_extract_with(
    config: &ExtractConfig,
    writer: &mut dyn Write,
) -> Result<usize, CliError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY;
    let connection = Connection::open_with_flags(config.database.as_std_path(), flags)
        .map_err(|source| CliError::OpenDatabase {
            path: config.database.clone(),
            source,
        })?;
    let mut cache = prefetch_owners(&connection, config)?;

    let query_error = |source: rusqlite::Error| CliError::QueryTable {
        table: config.table.clone(),
        source,
    };
    let mut statement = connection
        .prepare(&format!("SELECT * FROM {}", config.table))
        .map_err(query_error)?;
    let mut rows = statement.query([]).map_err(query_error)?;

    let mut formatter = JsonLinesFormatter::new(BufWriter::new(writer));
    let written = match config.kind.element_kind() {
        Some(kind) => extract_elements(
            kind,
            &mut rows,
            &mut formatter,
            None,
            &mut cache,
            &config.options,
        )?,
        None => {
            let now = config.as_of.unwrap_or_else(Utc::now);
            extract_changesets(&mut rows, &mut formatter, &mut cache, now, &config.options)?
        }
    };
    formatter.finish()?;

    let unresolved: Vec<i64> = cache.unresolved().collect();
    if !unresolved.is_empty() {
        warn!(
            "Unresolved changesets during extraction: table={} count={} (attribution suppressed)",
            config.table,
            unresolved.len()
        );
    }
    info!("Extracted {written} rows from {}", config.table);
    Ok(written)
}

/// Load the owners of every changeset the table references.
fn prefetch_owners(
    connection: &Connection,
    config: &ExtractConfig,
) -> Result<ChangesetCache, CliError> {
    let query_error = |source: rusqlite::Error| CliError::QueryTable {
        table: config.table.clone(),
        source,
    };
    let mut statement = connection
        .prepare(&format!(
            "SELECT DISTINCT {} FROM {}",
            config.kind.changeset_column(),
            config.table
        ))
        .map_err(query_error)?;
    let changesets = statement
        .query_map([], |row| row.get::<_, i64>(0))
        .map_err(query_error)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(query_error)?;
    load_changeset_owners(connection, &changesets).map_err(CliError::Prefetch)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<ExtractConfig, CliError> {
    let merged = ExtractArgs::merge_from_layers(layers).map_err(CliError::from)?;
    ExtractConfig::try_from(merged)
}
