//! In-memory rows for unit and behaviour tests.

use crate::row::{Row, RowError, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Cell {
    Null,
    Integer(i64),
    Text(String),
}

/// A row built column by column.
///
/// Columns keep insertion order; setting a column twice keeps the last
/// value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryRow {
    columns: Vec<(&'static str, Cell)>,
}

impl MemoryRow {
    /// Create a row without columns.
    pub fn new() -> Self {
        Self::default()
    }

    fn set(mut self, column: &'static str, cell: Cell) -> Self {
        self.columns.retain(|(name, _)| *name != column);
        self.columns.push((column, cell));
        self
    }

    /// Set a text column.
    #[must_use]
    pub fn with_text(self, column: &'static str, value: impl Into<String>) -> Self {
        self.set(column, Cell::Text(value.into()))
    }

    /// Set an integer column.
    #[must_use]
    pub fn with_integer(self, column: &'static str, value: i64) -> Self {
        self.set(column, Cell::Integer(value))
    }

    /// Set a boolean column, stored as `0` or `1`.
    #[must_use]
    pub fn with_boolean(self, column: &'static str, value: bool) -> Self {
        self.set(column, Cell::Integer(i64::from(value)))
    }

    /// Set a null column.
    #[must_use]
    pub fn with_null(self, column: &'static str) -> Self {
        self.set(column, Cell::Null)
    }

    /// Remove a column so reads report it missing.
    #[must_use]
    pub fn without(mut self, column: &'static str) -> Self {
        self.columns.retain(|(name, _)| *name != column);
        self
    }
}

impl Row for MemoryRow {
    fn value(&self, column: &'static str) -> Result<Value<'_>, RowError> {
        let (_, cell) = self
            .columns
            .iter()
            .find(|(name, _)| *name == column)
            .ok_or(RowError::MissingColumn { column })?;
        Ok(match cell {
            Cell::Null => Value::Null,
            Cell::Integer(value) => Value::Integer(*value),
            Cell::Text(text) => Value::Text(text),
        })
    }
}

/// A complete node row with empty tags.
pub fn node_row(id: i64, changeset: i64) -> MemoryRow {
    element_row(id, changeset)
        .with_integer("longitude", 0)
        .with_integer("latitude", 0)
}

/// A complete way row with no nodes and empty tags.
pub fn way_row(id: i64, changeset: i64) -> MemoryRow {
    element_row(id, changeset).with_text("node_ids", "{NULL}")
}

/// A complete relation row with no members and empty tags.
pub fn relation_row(id: i64, changeset: i64) -> MemoryRow {
    element_row(id, changeset)
        .with_text("member_types", "{NULL}")
        .with_text("member_ids", "{NULL}")
        .with_text("member_roles", "{NULL}")
}

/// A complete changeset row without bounds, tags or comments.
pub fn changeset_row(id: i64) -> MemoryRow {
    MemoryRow::new()
        .with_integer("id", id)
        .with_text("created_at", "2024-01-01T00:00:00Z")
        .with_text("closed_at", "2024-01-01T01:00:00Z")
        .with_null("min_lat")
        .with_null("max_lat")
        .with_null("min_lon")
        .with_null("max_lon")
        .with_integer("num_changes", 0)
        .with_text("tag_k", "{NULL}")
        .with_text("tag_v", "{NULL}")
        .with_text("comment_id", "{NULL}")
        .with_text("comment_author_id", "{NULL}")
        .with_text("comment_display_name", "{NULL}")
        .with_text("comment_body", "{NULL}")
        .with_text("comment_created_at", "{NULL}")
}

fn element_row(id: i64, changeset: i64) -> MemoryRow {
    MemoryRow::new()
        .with_integer("id", id)
        .with_integer("version", 1)
        .with_text("timestamp", "2024-01-01T00:00:00Z")
        .with_integer("changeset_id", changeset)
        .with_boolean("visible", true)
        .with_text("tag_k", "{NULL}")
        .with_text("tag_v", "{NULL}")
}
