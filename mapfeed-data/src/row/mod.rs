//! Storage-neutral access to result rows.
//!
//! Extractors read columns by name through [`Row`] and pull rows one at a
//! time through [`RowSource`]. Adapters exist for SQLite result sets and for
//! any iterator of rows.

#[cfg(feature = "store-sqlite")]
mod sqlite;

use thiserror::Error;

/// A column value borrowed from a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value<'a> {
    /// SQL `NULL`.
    Null,
    /// An integer, also used for booleans stored as `0`/`1`.
    Integer(i64),
    /// A UTF-8 text value.
    Text(&'a str),
}

impl Value<'_> {
    const fn type_name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Integer(_) => "integer",
            Self::Text(_) => "text",
        }
    }
}

/// Errors raised while reading a row.
#[derive(Debug, Error)]
pub enum RowError {
    /// The row has no column with this name.
    #[error("column {column} is missing from the row")]
    MissingColumn {
        /// The requested column.
        column: &'static str,
    },
    /// A required column was null.
    #[error("column {column} must not be null")]
    UnexpectedNull {
        /// The null column.
        column: &'static str,
    },
    /// The column held a value of another type.
    #[error("column {column} holds {found}, expected {expected}")]
    TypeMismatch {
        /// The column read.
        column: &'static str,
        /// Type the accessor wanted.
        expected: &'static str,
        /// Type the column held.
        found: &'static str,
    },
    /// A text column was not valid UTF-8.
    #[error("column {column} is not valid UTF-8")]
    InvalidUtf8 {
        /// The column read.
        column: &'static str,
    },
    /// The database failed while reading a column.
    #[cfg(feature = "store-sqlite")]
    #[error("failed to read column {column}: {source}")]
    Sqlite {
        /// The column read.
        column: &'static str,
        /// The driver error.
        #[source]
        source: rusqlite::Error,
    },
    /// The row source failed to produce the next row.
    #[error("failed to fetch the next row: {source}")]
    Fetch {
        /// The error reported by the row source.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl RowError {
    fn mismatch(column: &'static str, expected: &'static str, found: Value<'_>) -> Self {
        Self::TypeMismatch {
            column,
            expected,
            found: found.type_name(),
        }
    }
}

/// Named-column access to one result row.
///
/// Implementors only provide [`Row::value`]; the typed accessors are derived
/// from it.
pub trait Row {
    /// Read a column by name.
    fn value(&self, column: &'static str) -> Result<Value<'_>, RowError>;

    /// Read a nullable text column.
    fn text(&self, column: &'static str) -> Result<Option<&str>, RowError> {
        match self.value(column)? {
            Value::Null => Ok(None),
            Value::Text(text) => Ok(Some(text)),
            other => Err(RowError::mismatch(column, "text", other)),
        }
    }

    /// Read a non-null text column.
    fn require_text(&self, column: &'static str) -> Result<&str, RowError> {
        self.text(column)?.ok_or(RowError::UnexpectedNull { column })
    }

    /// Read a nullable integer column.
    fn integer(&self, column: &'static str) -> Result<Option<i64>, RowError> {
        match self.value(column)? {
            Value::Null => Ok(None),
            Value::Integer(value) => Ok(Some(value)),
            other => Err(RowError::mismatch(column, "integer", other)),
        }
    }

    /// Read a non-null integer column.
    fn require_integer(&self, column: &'static str) -> Result<i64, RowError> {
        self.integer(column)?.ok_or(RowError::UnexpectedNull { column })
    }

    /// Read a nullable boolean column.
    ///
    /// Integers `0`/`1` and the text forms `t`/`f`/`true`/`false` are
    /// accepted, covering both SQLite and Postgres renderings.
    fn boolean(&self, column: &'static str) -> Result<Option<bool>, RowError> {
        match self.value(column)? {
            Value::Null => Ok(None),
            Value::Integer(0) => Ok(Some(false)),
            Value::Integer(1) => Ok(Some(true)),
            Value::Text("t" | "true") => Ok(Some(true)),
            Value::Text("f" | "false") => Ok(Some(false)),
            other => Err(RowError::mismatch(column, "boolean", other)),
        }
    }

    /// Read a non-null boolean column.
    fn require_boolean(&self, column: &'static str) -> Result<bool, RowError> {
        self.boolean(column)?.ok_or(RowError::UnexpectedNull { column })
    }
}

impl<R: Row + ?Sized> Row for &R {
    fn value(&self, column: &'static str) -> Result<Value<'_>, RowError> {
        (**self).value(column)
    }
}

/// A forward-only stream of rows.
///
/// Each row borrows the source, so at most one row is alive at a time.
pub trait RowSource {
    /// Row type handed out by the source.
    type Row<'r>: Row
    where
        Self: 'r;

    /// Advance to the next row, or return `None` once exhausted.
    fn next_row(&mut self) -> Result<Option<Self::Row<'_>>, RowError>;
}

/// Adapter turning an iterator of rows into a [`RowSource`].
///
/// # Examples
///
/// ```
/// use mapfeed_data::row::{IterRows, Row, RowError, RowSource, Value};
///
/// struct IdRow(i64);
///
/// impl Row for IdRow {
///     fn value(&self, column: &'static str) -> Result<Value<'_>, RowError> {
///         match column {
///             "id" => Ok(Value::Integer(self.0)),
///             _ => Err(RowError::MissingColumn { column }),
///         }
///     }
/// }
///
/// let mut rows = IterRows::new([IdRow(1), IdRow(2)]);
/// let mut seen = Vec::new();
/// while let Some(row) = rows.next_row()? {
///     seen.push(row.require_integer("id")?);
/// }
/// assert_eq!(seen, vec![1, 2]);
/// # Ok::<(), RowError>(())
/// ```
#[derive(Debug, Clone)]
pub struct IterRows<I> {
    rows: I,
}

impl<I: Iterator> IterRows<I> {
    /// Wrap an iterator of rows.
    pub fn new<T: IntoIterator<IntoIter = I>>(rows: T) -> Self {
        Self {
            rows: rows.into_iter(),
        }
    }
}

impl<I> RowSource for IterRows<I>
where
    I: Iterator,
    I::Item: Row,
{
    type Row<'r>
        = I::Item
    where
        Self: 'r;

    fn next_row(&mut self) -> Result<Option<Self::Row<'_>>, RowError> {
        Ok(self.rows.next())
    }
}
