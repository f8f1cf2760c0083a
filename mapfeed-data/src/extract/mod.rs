//! Streaming extraction of rolled-up rows into formatter calls.
//!
//! Each driver pulls rows from a [`RowSource`] one at a time, decodes the
//! row completely, then hands it to the [`OutputFormatter`]. A row that fails
//! to decode aborts the call before anything of that row is written; rows
//! already written stay written.

mod changeset;
mod comments;
mod element;
mod members;
mod parallel;
mod tags;

use chrono::{DateTime, Utc};
use log::debug;
use mapfeed_core::{
    ChangesetCache, CoordinateScale, ElementInfo, ElementKind, FormatError, OutputFormatter,
};
use thiserror::Error;

use crate::array::{ArrayError, IdArrayError, decode_ids};
use crate::row::{Row, RowError, RowSource};

use changeset::extract_changeset;
use element::{ElementExtra, read_element_info};
use tags::decode_tags;

/// Errors that abort an extraction call.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Parallel array columns decoded to different lengths.
    #[error("parallel columns {columns:?} have different lengths {lengths:?}")]
    ArityMismatch {
        /// Columns walked together, in order.
        columns: Vec<&'static str>,
        /// Element count of each column.
        lengths: Vec<usize>,
    },
    /// An integer field did not hold a valid non-negative integer.
    #[error("column {column} holds {value:?}, which is not a valid identifier")]
    Conversion {
        /// Column holding the value.
        column: &'static str,
        /// The rejected text.
        value: String,
    },
    /// A relation member type was not node, way or relation.
    #[error("unknown relation member type code {code:?}")]
    UnknownMemberTypeCode {
        /// The rejected code.
        code: String,
    },
    /// An array column could not be tokenized.
    #[error("column {column} holds a malformed array literal: {source}")]
    MalformedArrayLiteral {
        /// Column holding the literal.
        column: &'static str,
        /// Structural problem found by the tokenizer.
        #[source]
        source: ArrayError,
    },
    /// Some but not all bounding box columns were null.
    #[error("changeset {changeset} has a partial bounding box (null: {missing:?})")]
    PartialBoundingBox {
        /// The changeset id.
        changeset: i64,
        /// The null bound columns.
        missing: Vec<&'static str>,
    },
    /// The row could not be read.
    #[error(transparent)]
    Row(#[from] RowError),
    /// The formatter rejected a record.
    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Settings shared by every row of an extraction call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtractOptions {
    /// Divisor for scaled coordinate columns.
    pub scale: CoordinateScale,
    /// Whether changeset formatters should render discussions.
    pub include_discussions: bool,
}

impl ExtractOptions {
    /// Options with the given coordinate scale and no discussions.
    pub const fn new(scale: CoordinateScale) -> Self {
        Self {
            scale,
            include_discussions: false,
        }
    }

    /// Request changeset discussions.
    #[must_use]
    pub const fn with_discussions(mut self, include: bool) -> Self {
        self.include_discussions = include;
        self
    }
}

/// Convert a stored integer to an unsigned identifier.
fn unsigned(column: &'static str, value: i64) -> Result<u64, ExtractError> {
    u64::try_from(value).map_err(|_| ExtractError::Conversion {
        column,
        value: value.to_string(),
    })
}

/// Decode an integer array column; a null column is empty.
fn decode_id_column<R: Row + ?Sized>(
    row: &R,
    column: &'static str,
) -> Result<Vec<u64>, ExtractError> {
    let literal = row.text(column)?.unwrap_or_default();
    decode_ids(literal).map_err(|err| match err {
        IdArrayError::Malformed(source) => ExtractError::MalformedArrayLiteral { column, source },
        IdArrayError::Conversion { value } => ExtractError::Conversion { column, value },
    })
}

/// Extract every row of `rows` as an element of `kind`.
///
/// For each row the element fields are read, attribution is resolved from
/// `cache`, tags and the kind's payload are decoded, `notify` (when given)
/// sees the element, and finally the formatter writes it. Returns the
/// number of rows written.
///
/// # Errors
///
/// Returns the first [`ExtractError`] met. Rows before the failing one
/// have already been written to `formatter`.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
///
/// use mapfeed_core::test_support::{Record, RecordingFormatter};
/// use mapfeed_core::{ChangesetCache, ChangesetOwner, ElementKind};
/// use mapfeed_data::extract::{ExtractOptions, extract_elements};
/// use mapfeed_data::row::{IterRows, Row, RowError, Value};
///
/// struct Columns(HashMap<&'static str, Value<'static>>);
///
/// impl Row for Columns {
///     fn value(&self, column: &'static str) -> Result<Value<'_>, RowError> {
///         self.0.get(column).copied().ok_or(RowError::MissingColumn { column })
///     }
/// }
///
/// let way = Columns(HashMap::from([
///     ("id", Value::Integer(1)),
///     ("version", Value::Integer(2)),
///     ("timestamp", Value::Text("2024-01-01T00:00:00Z")),
///     ("changeset_id", Value::Integer(5)),
///     ("visible", Value::Integer(1)),
///     ("tag_k", Value::Text("{highway}")),
///     ("tag_v", Value::Text("{residential}")),
///     ("node_ids", Value::Text("{3,4}")),
/// ]));
/// let mut cache: ChangesetCache = [(5, ChangesetOwner::public(9, "mapper"))]
///     .into_iter()
///     .collect();
/// let mut formatter = RecordingFormatter::default();
/// let written = extract_elements(
///     ElementKind::Way,
///     &mut IterRows::new([way]),
///     &mut formatter,
///     None,
///     &mut cache,
///     &ExtractOptions::default(),
/// )?;
///
/// assert_eq!(written, 1);
/// assert!(matches!(
///     formatter.records(),
///     [Record::Way { element, nodes, .. }] if element.uid == Some(9) && nodes == &[3, 4]
/// ));
/// # Ok::<(), mapfeed_data::extract::ExtractError>(())
/// ```
pub fn extract_elements<S, F>(
    kind: ElementKind,
    rows: &mut S,
    formatter: &mut F,
    mut notify: Option<&mut dyn FnMut(&ElementInfo)>,
    cache: &mut ChangesetCache,
    options: &ExtractOptions,
) -> Result<usize, ExtractError>
where
    S: RowSource + ?Sized,
    F: OutputFormatter + ?Sized,
{
    let mut written = 0;
    while let Some(row) = rows.next_row()? {
        let element = read_element_info(&row, cache)?;
        let tags = decode_tags(&row)?;
        let extra = ElementExtra::extract(kind, &row, options.scale)?;
        if let Some(callback) = notify.as_deref_mut() {
            callback(&element);
        }
        extra.write(formatter, &element, &tags)?;
        written += 1;
    }
    debug!("Extracted {written} {kind} rows");
    Ok(written)
}

/// Extract node rows. See [`extract_elements`].
///
/// # Errors
///
/// Returns the first [`ExtractError`] met.
pub fn extract_nodes<S, F>(
    rows: &mut S,
    formatter: &mut F,
    notify: Option<&mut dyn FnMut(&ElementInfo)>,
    cache: &mut ChangesetCache,
    options: &ExtractOptions,
) -> Result<usize, ExtractError>
where
    S: RowSource + ?Sized,
    F: OutputFormatter + ?Sized,
{
    extract_elements(ElementKind::Node, rows, formatter, notify, cache, options)
}

/// Extract way rows. See [`extract_elements`].
///
/// # Errors
///
/// Returns the first [`ExtractError`] met.
pub fn extract_ways<S, F>(
    rows: &mut S,
    formatter: &mut F,
    notify: Option<&mut dyn FnMut(&ElementInfo)>,
    cache: &mut ChangesetCache,
    options: &ExtractOptions,
) -> Result<usize, ExtractError>
where
    S: RowSource + ?Sized,
    F: OutputFormatter + ?Sized,
{
    extract_elements(ElementKind::Way, rows, formatter, notify, cache, options)
}

/// Extract relation rows. See [`extract_elements`].
///
/// # Errors
///
/// Returns the first [`ExtractError`] met.
pub fn extract_relations<S, F>(
    rows: &mut S,
    formatter: &mut F,
    notify: Option<&mut dyn FnMut(&ElementInfo)>,
    cache: &mut ChangesetCache,
    options: &ExtractOptions,
) -> Result<usize, ExtractError>
where
    S: RowSource + ?Sized,
    F: OutputFormatter + ?Sized,
{
    extract_elements(ElementKind::Relation, rows, formatter, notify, cache, options)
}

/// Extract changeset rows.
///
/// Attribution is keyed by each changeset's own id. `now` is forwarded to
/// the formatter so it can tell open changesets from closed ones.
///
/// # Errors
///
/// Returns the first [`ExtractError`] met. Rows before the failing one
/// have already been written to `formatter`.
pub fn extract_changesets<S, F>(
    rows: &mut S,
    formatter: &mut F,
    cache: &mut ChangesetCache,
    now: DateTime<Utc>,
    options: &ExtractOptions,
) -> Result<usize, ExtractError>
where
    S: RowSource + ?Sized,
    F: OutputFormatter + ?Sized,
{
    let mut written = 0;
    while let Some(row) = rows.next_row()? {
        let changeset = extract_changeset(&row, cache, options.scale)?;
        formatter.write_changeset(
            &changeset.info,
            &changeset.tags,
            options.include_discussions,
            &changeset.comments,
            now,
        )?;
        written += 1;
    }
    debug!("Extracted {written} changeset rows");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::IterRows;
    use crate::test_support::{changeset_row, node_row, relation_row, way_row};
    use chrono::TimeZone;
    use geo::Coord;
    use mapfeed_core::test_support::{Record, RecordingFormatter};
    use mapfeed_core::{ChangesetInfo, ChangesetOwner, Comment, Member, Tags};
    use rstest::{fixture, rstest};
    use std::cell::Cell;
    use std::rc::Rc;

    #[fixture]
    fn cache() -> ChangesetCache {
        [
            (1, ChangesetOwner::public(10, "alice")),
            (2, ChangesetOwner::private(20, "bob")),
        ]
        .into_iter()
        .collect()
    }

    #[fixture]
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 30, 0)
            .single()
            .expect("valid date")
    }

    #[rstest]
    fn rows_are_written_in_storage_order(mut cache: ChangesetCache) {
        let mut rows = IterRows::new([3, 1, 2].map(|id| node_row(id, 1)));
        let mut formatter = RecordingFormatter::default();
        let written = extract_nodes(
            &mut rows,
            &mut formatter,
            None,
            &mut cache,
            &ExtractOptions::default(),
        )
        .expect("nodes extract");
        let ids: Vec<u64> = formatter
            .records()
            .iter()
            .filter_map(Record::element)
            .map(|element| element.id)
            .collect();
        assert_eq!(written, 3);
        assert_eq!(ids, vec![3, 1, 2]);
        assert!(formatter.records().iter().all(|record| record.tags().is_empty()));
    }

    /// Formatter that shares its write count with the notify callback.
    #[derive(Default)]
    struct CountingFormatter {
        writes: Rc<Cell<usize>>,
        inner: RecordingFormatter,
    }

    impl CountingFormatter {
        fn count(&self) {
            self.writes.set(self.writes.get() + 1);
        }
    }

    impl OutputFormatter for CountingFormatter {
        fn write_node(
            &mut self,
            element: &ElementInfo,
            location: Coord<f64>,
            tags: &Tags,
        ) -> Result<(), FormatError> {
            self.count();
            self.inner.write_node(element, location, tags)
        }

        fn write_way(
            &mut self,
            element: &ElementInfo,
            nodes: &[u64],
            tags: &Tags,
        ) -> Result<(), FormatError> {
            self.count();
            self.inner.write_way(element, nodes, tags)
        }

        fn write_relation(
            &mut self,
            element: &ElementInfo,
            members: &[Member],
            tags: &Tags,
        ) -> Result<(), FormatError> {
            self.count();
            self.inner.write_relation(element, members, tags)
        }

        fn write_changeset(
            &mut self,
            changeset: &ChangesetInfo,
            tags: &Tags,
            include_discussion: bool,
            comments: &[Comment],
            now: DateTime<Utc>,
        ) -> Result<(), FormatError> {
            self.count();
            self.inner
                .write_changeset(changeset, tags, include_discussion, comments, now)
        }
    }

    #[rstest]
    fn notification_precedes_each_write(mut cache: ChangesetCache) {
        let mut rows = IterRows::new([way_row(5, 1), way_row(6, 2)]);
        let mut formatter = CountingFormatter::default();
        let writes = Rc::clone(&formatter.writes);
        let mut seen = Vec::new();
        let mut track = |element: &ElementInfo| seen.push((element.id, writes.get()));
        extract_ways(
            &mut rows,
            &mut formatter,
            Some(&mut track),
            &mut cache,
            &ExtractOptions::default(),
        )
        .expect("ways extract");
        assert_eq!(seen, vec![(5, 0), (6, 1)]);
        assert_eq!(formatter.inner.records().len(), 2);
    }

    #[rstest]
    fn failing_row_stops_extraction_without_retracting(mut cache: ChangesetCache) {
        let mut rows = IterRows::new([
            relation_row(1, 1),
            relation_row(2, 1).with_text("member_types", "{N,W}"),
            relation_row(3, 1),
        ]);
        let mut formatter = RecordingFormatter::default();
        let mut notified = 0;
        let mut count = |_: &ElementInfo| notified += 1;
        let err = extract_relations(
            &mut rows,
            &mut formatter,
            Some(&mut count),
            &mut cache,
            &ExtractOptions::default(),
        )
        .expect_err("second row has mismatched members");
        assert!(matches!(err, ExtractError::ArityMismatch { .. }));
        assert_eq!(formatter.records().len(), 1);
        assert_eq!(notified, 1);
    }

    #[rstest]
    fn formatter_errors_abort(mut cache: ChangesetCache) {
        let mut rows = IterRows::new([node_row(1, 1), node_row(2, 1)]);
        let mut formatter = RecordingFormatter::failing_after(1);
        let err = extract_nodes(
            &mut rows,
            &mut formatter,
            None,
            &mut cache,
            &ExtractOptions::default(),
        )
        .expect_err("second write is rejected");
        assert!(matches!(err, ExtractError::Format(_)));
    }

    #[rstest]
    fn relation_members_reach_formatter(mut cache: ChangesetCache) {
        let row = relation_row(9, 1)
            .with_text("member_types", "{N,W}")
            .with_text("member_ids", "{5,9}")
            .with_text("member_roles", r#"{"",stop}"#)
            .with_text("tag_k", "{type}")
            .with_text("tag_v", "{route}");
        let mut formatter = RecordingFormatter::default();
        extract_relations(
            &mut IterRows::new([row]),
            &mut formatter,
            None,
            &mut cache,
            &ExtractOptions::default(),
        )
        .expect("relation extracts");
        match formatter.records() {
            [Record::Relation { members, tags, .. }] => {
                assert_eq!(
                    members,
                    &vec![
                        Member::new(ElementKind::Node, 5, ""),
                        Member::new(ElementKind::Way, 9, "stop"),
                    ]
                );
                assert_eq!(tags, &vec![("type".to_owned(), "route".to_owned())]);
            }
            other => panic!("unexpected records {other:?}"),
        }
    }

    #[rstest]
    fn private_changesets_never_leak(mut cache: ChangesetCache, now: DateTime<Utc>) {
        let mut elements = IterRows::new([node_row(1, 2), node_row(2, 99)]);
        let mut formatter = RecordingFormatter::default();
        extract_nodes(
            &mut elements,
            &mut formatter,
            None,
            &mut cache,
            &ExtractOptions::default(),
        )
        .expect("nodes extract");
        extract_changesets(
            &mut IterRows::new([changeset_row(2)]),
            &mut formatter,
            &mut cache,
            now,
            &ExtractOptions::default(),
        )
        .expect("changesets extract");
        for record in formatter.records() {
            match record {
                Record::Changeset { changeset, .. } => {
                    assert_eq!((changeset.uid, changeset.display_name.as_deref()), (None, None));
                }
                other => {
                    let element = other.element().expect("element record");
                    assert_eq!((element.uid, element.display_name.as_deref()), (None, None));
                }
            }
        }
        assert_eq!(cache.unresolved().collect::<Vec<_>>(), vec![99]);
    }

    #[rstest]
    #[case(false)]
    #[case(true)]
    fn changesets_forward_discussion_flag_and_time(
        mut cache: ChangesetCache,
        now: DateTime<Utc>,
        #[case] include: bool,
    ) {
        let mut formatter = RecordingFormatter::default();
        let options = ExtractOptions::default().with_discussions(include);
        extract_changesets(
            &mut IterRows::new([changeset_row(1)]),
            &mut formatter,
            &mut cache,
            now,
            &options,
        )
        .expect("changeset extracts");
        match formatter.records() {
            [
                Record::Changeset {
                    changeset,
                    include_discussion,
                    now: forwarded,
                    ..
                },
            ] => {
                assert_eq!(*include_discussion, include);
                assert_eq!(*forwarded, now);
                assert_eq!(changeset.uid, Some(10));
                assert!(changeset.is_open_at(now));
            }
            other => panic!("unexpected records {other:?}"),
        }
    }
}
