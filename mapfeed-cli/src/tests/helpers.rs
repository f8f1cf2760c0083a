//! Test helpers for building rollup databases on disk.

use crate::extract::{ExtractConfig, RecordKind};
use camino::{Utf8Path, Utf8PathBuf};
use log::LevelFilter;
use mapfeed_data::ExtractOptions;
use rusqlite::{Connection, params};
use tempfile::TempDir;

const SCHEMA: &str = "
    CREATE TABLE nodes_rollup (
        id INTEGER NOT NULL,
        version INTEGER NOT NULL,
        timestamp TEXT NOT NULL,
        changeset_id INTEGER NOT NULL,
        visible INTEGER NOT NULL,
        longitude INTEGER NOT NULL,
        latitude INTEGER NOT NULL,
        tag_k TEXT,
        tag_v TEXT
    );
    CREATE TABLE changesets_rollup (
        id INTEGER NOT NULL,
        created_at TEXT NOT NULL,
        closed_at TEXT NOT NULL,
        num_changes INTEGER NOT NULL,
        min_lon INTEGER,
        min_lat INTEGER,
        max_lon INTEGER,
        max_lat INTEGER,
        tag_k TEXT,
        tag_v TEXT,
        comment_id TEXT,
        comment_author_id TEXT,
        comment_display_name TEXT,
        comment_body TEXT,
        comment_created_at TEXT
    );
    CREATE TABLE changeset_owners (
        changeset_id INTEGER PRIMARY KEY,
        user_id INTEGER NOT NULL,
        display_name TEXT NOT NULL,
        data_public INTEGER NOT NULL
    );
";

/// A SQLite database in a temporary directory seeded with rollup tables.
#[derive(Debug)]
pub(super) struct RollupDatabase {
    _dir: TempDir,
    path: Utf8PathBuf,
}

impl RollupDatabase {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        let path = root.join("rollup.db");
        let db = Self { _dir: dir, path };
        db.connection()
            .execute_batch(SCHEMA)
            .expect("create rollup schema");
        db
    }

    pub(super) fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn connection(&self) -> Connection {
        Connection::open(self.path.as_std_path()).expect("open rollup database")
    }

    pub(super) fn insert_node(&self, id: i64, changeset: i64, lon: i64, lat: i64) {
        self.connection()
            .execute(
                "INSERT INTO nodes_rollup VALUES (?1, 1, '2024-01-01T00:00:00Z', ?2, 1, ?3, ?4,
                     '{amenity}', '{cafe}')",
                params![id, changeset, lon, lat],
            )
            .expect("insert node");
    }

    pub(super) fn insert_changeset(&self, id: i64, closed_at: &str) {
        self.connection()
            .execute(
                r#"INSERT INTO changesets_rollup VALUES (?1, '2024-01-01T00:00:00Z', ?2, 2,
                     NULL, NULL, NULL, NULL, '{comment}', '{"fix \"cafe\""}',
                     '{7}', '{30}', '{carol}', '{thanks}', '{2024-01-01T00:05:00Z}')"#,
                params![id, closed_at],
            )
            .expect("insert changeset");
    }

    pub(super) fn insert_owner(&self, changeset: i64, user: i64, name: &str, public: bool) {
        self.connection()
            .execute(
                "INSERT INTO changeset_owners VALUES (?1, ?2, ?3, ?4)",
                params![changeset, user, name, public],
            )
            .expect("insert owner");
    }

    pub(super) fn config(&self, kind: RecordKind) -> ExtractConfig {
        ExtractConfig {
            database: self.path.clone(),
            kind,
            table: kind.default_table().to_owned(),
            options: ExtractOptions::default(),
            as_of: None,
            log_level: LevelFilter::Warn,
        }
    }
}

/// Split JSON-lines output into parsed values.
pub(super) fn json_lines(output: &[u8]) -> Vec<serde_json::Value> {
    std::str::from_utf8(output)
        .expect("utf-8 output")
        .lines()
        .map(|line| serde_json::from_str(line).expect("valid json line"))
        .collect()
}
