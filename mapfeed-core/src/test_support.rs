//! Test-only `OutputFormatter` that records every call in order.

use std::io;

use chrono::{DateTime, Utc};
use geo::Coord;

use crate::{ChangesetInfo, Comment, ElementInfo, FormatError, Member, OutputFormatter, Tags};

/// One recorded formatter call.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    /// A `write_node` call.
    Node {
        element: ElementInfo,
        location: Coord<f64>,
        tags: Tags,
    },
    /// A `write_way` call.
    Way {
        element: ElementInfo,
        nodes: Vec<u64>,
        tags: Tags,
    },
    /// A `write_relation` call.
    Relation {
        element: ElementInfo,
        members: Vec<Member>,
        tags: Tags,
    },
    /// A `write_changeset` call.
    Changeset {
        changeset: ChangesetInfo,
        tags: Tags,
        include_discussion: bool,
        comments: Vec<Comment>,
        now: DateTime<Utc>,
    },
}

impl Record {
    /// Element fields of a node, way or relation record.
    pub fn element(&self) -> Option<&ElementInfo> {
        match self {
            Self::Node { element, .. }
            | Self::Way { element, .. }
            | Self::Relation { element, .. } => Some(element),
            Self::Changeset { .. } => None,
        }
    }

    /// Tags attached to the record.
    pub fn tags(&self) -> &Tags {
        match self {
            Self::Node { tags, .. }
            | Self::Way { tags, .. }
            | Self::Relation { tags, .. }
            | Self::Changeset { tags, .. } => tags,
        }
    }
}

/// In-memory formatter used by unit and behaviour tests.
///
/// A write limit makes the formatter fail once it has accepted the given
/// number of records, which lets tests observe partial output.
#[derive(Debug, Default)]
pub struct RecordingFormatter {
    records: Vec<Record>,
    limit: Option<usize>,
}

impl RecordingFormatter {
    /// Formatter that rejects every write after `limit` records.
    pub fn failing_after(limit: usize) -> Self {
        Self {
            records: Vec::new(),
            limit: Some(limit),
        }
    }

    /// Records received so far, in call order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Consume the formatter and return its records.
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    fn push(&mut self, record: Record) -> Result<(), FormatError> {
        if self.limit.is_some_and(|limit| self.records.len() >= limit) {
            return Err(io::Error::new(io::ErrorKind::WriteZero, "write limit reached").into());
        }
        self.records.push(record);
        Ok(())
    }
}

impl OutputFormatter for RecordingFormatter {
    fn write_node(
        &mut self,
        element: &ElementInfo,
        location: Coord<f64>,
        tags: &Tags,
    ) -> Result<(), FormatError> {
        self.push(Record::Node {
            element: element.clone(),
            location,
            tags: tags.clone(),
        })
    }

    fn write_way(
        &mut self,
        element: &ElementInfo,
        nodes: &[u64],
        tags: &Tags,
    ) -> Result<(), FormatError> {
        self.push(Record::Way {
            element: element.clone(),
            nodes: nodes.to_vec(),
            tags: tags.clone(),
        })
    }

    fn write_relation(
        &mut self,
        element: &ElementInfo,
        members: &[Member],
        tags: &Tags,
    ) -> Result<(), FormatError> {
        self.push(Record::Relation {
            element: element.clone(),
            members: members.to_vec(),
            tags: tags.clone(),
        })
    }

    fn write_changeset(
        &mut self,
        changeset: &ChangesetInfo,
        tags: &Tags,
        include_discussion: bool,
        comments: &[Comment],
        now: DateTime<Utc>,
    ) -> Result<(), FormatError> {
        self.push(Record::Changeset {
            changeset: changeset.clone(),
            tags: tags.clone(),
            include_discussion,
            comments: comments.to_vec(),
            now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_limit_rejects_further_records() {
        let mut formatter = RecordingFormatter::failing_after(1);
        let node = ElementInfo::new(1, 1, "2024-01-01T00:00:00Z", 1, true);
        let origin = Coord { x: 0.0, y: 0.0 };
        formatter
            .write_node(&node, origin, &Tags::new())
            .expect("first write fits");
        let err = formatter
            .write_node(&node, origin, &Tags::new())
            .expect_err("second write exceeds limit");
        assert!(matches!(err, FormatError::Io { .. }));
        assert_eq!(formatter.records().len(), 1);
    }
}
