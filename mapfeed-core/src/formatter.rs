//! Output seam for extracted records.
//!
//! The `OutputFormatter` trait receives one call per extracted row, in the
//! order rows were read. Implementations decide the wire format; the
//! extraction pipeline never buffers records on their behalf.

use std::error::Error as StdError;
use std::io;

use chrono::{DateTime, Utc};
use geo::Coord;
use thiserror::Error;

use crate::{ChangesetInfo, Comment, ElementInfo, Member, Tags};

/// Errors raised while writing a record.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The underlying writer failed.
    #[error("failed to write record: {source}")]
    Io {
        /// The writer error.
        #[from]
        source: io::Error,
    },
    /// The record could not be encoded.
    #[error("failed to encode {record} record: {source}")]
    Encode {
        /// Kind of record being encoded.
        record: &'static str,
        /// The encoder error.
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl FormatError {
    /// Wrap an encoder failure for the given record kind.
    pub fn encode(record: &'static str, source: impl StdError + Send + Sync + 'static) -> Self {
        Self::Encode {
            record,
            source: Box::new(source),
        }
    }
}

/// Append-only sink for extracted records.
///
/// Writes are streamed: a record handed to the formatter is never retracted,
/// even if a later row fails to extract.
///
/// # Examples
///
/// ```rust
/// use chrono::{DateTime, Utc};
/// use geo::Coord;
/// use mapfeed_core::{
///     ChangesetInfo, Comment, ElementInfo, FormatError, Member, OutputFormatter, Tags,
/// };
///
/// #[derive(Default)]
/// struct CountingFormatter {
///     records: usize,
/// }
///
/// impl OutputFormatter for CountingFormatter {
///     fn write_node(&mut self, _: &ElementInfo, _: Coord<f64>, _: &Tags) -> Result<(), FormatError> {
///         self.records += 1;
///         Ok(())
///     }
///
///     fn write_way(&mut self, _: &ElementInfo, _: &[u64], _: &Tags) -> Result<(), FormatError> {
///         self.records += 1;
///         Ok(())
///     }
///
///     fn write_relation(
///         &mut self,
///         _: &ElementInfo,
///         _: &[Member],
///         _: &Tags,
///     ) -> Result<(), FormatError> {
///         self.records += 1;
///         Ok(())
///     }
///
///     fn write_changeset(
///         &mut self,
///         _: &ChangesetInfo,
///         _: &Tags,
///         _: bool,
///         _: &[Comment],
///         _: DateTime<Utc>,
///     ) -> Result<(), FormatError> {
///         self.records += 1;
///         Ok(())
///     }
/// }
///
/// let mut formatter = CountingFormatter::default();
/// let node = ElementInfo::new(1, 1, "2024-01-01T00:00:00Z", 1, true);
/// formatter.write_node(&node, Coord { x: 0.0, y: 0.0 }, &Tags::new()).unwrap();
/// assert_eq!(formatter.records, 1);
/// ```
pub trait OutputFormatter {
    /// Write a node located at `location` (`x = longitude`, `y = latitude`).
    fn write_node(
        &mut self,
        element: &ElementInfo,
        location: Coord<f64>,
        tags: &Tags,
    ) -> Result<(), FormatError>;

    /// Write a way with its ordered node references.
    fn write_way(
        &mut self,
        element: &ElementInfo,
        nodes: &[u64],
        tags: &Tags,
    ) -> Result<(), FormatError>;

    /// Write a relation with its ordered members.
    fn write_relation(
        &mut self,
        element: &ElementInfo,
        members: &[Member],
        tags: &Tags,
    ) -> Result<(), FormatError>;

    /// Write a changeset.
    ///
    /// `comments` always holds the decoded discussion; formatters should
    /// only render it when `include_discussion` is set. `now` is the time
    /// the extraction started and lets formatters derive whether the
    /// changeset is still open.
    fn write_changeset(
        &mut self,
        changeset: &ChangesetInfo,
        tags: &Tags,
        include_discussion: bool,
        comments: &[Comment],
        now: DateTime<Utc>,
    ) -> Result<(), FormatError>;
}
