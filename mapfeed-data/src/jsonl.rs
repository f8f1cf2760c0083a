//! JSON Lines output.
//!
//! One JSON object per record, discriminated by a `type` field. Element
//! fields are flattened into the record; tags become an object whose keys
//! keep their stored order.

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use geo::Coord;
use mapfeed_core::{
    ChangesetInfo, Comment, ElementInfo, FormatError, Member, OutputFormatter, Tags,
};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Serializes tags as a JSON object in stored order.
struct TagMap<'a>(&'a Tags);

impl Serialize for TagMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[derive(serde::Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Line<'a> {
    Node {
        #[serde(flatten)]
        element: &'a ElementInfo,
        lon: f64,
        lat: f64,
        tags: TagMap<'a>,
    },
    Way {
        #[serde(flatten)]
        element: &'a ElementInfo,
        nodes: &'a [u64],
        tags: TagMap<'a>,
    },
    Relation {
        #[serde(flatten)]
        element: &'a ElementInfo,
        members: &'a [Member],
        tags: TagMap<'a>,
    },
    Changeset {
        #[serde(flatten)]
        changeset: &'a ChangesetInfo,
        open: bool,
        tags: TagMap<'a>,
        #[serde(skip_serializing_if = "Option::is_none")]
        discussion: Option<&'a [Comment]>,
    },
}

impl Line<'_> {
    const fn record(&self) -> &'static str {
        match self {
            Self::Node { .. } => "node",
            Self::Way { .. } => "way",
            Self::Relation { .. } => "relation",
            Self::Changeset { .. } => "changeset",
        }
    }
}

/// Formatter writing newline-delimited JSON to any [`Write`] sink.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use mapfeed_core::{ElementInfo, OutputFormatter};
/// use mapfeed_data::jsonl::JsonLinesFormatter;
///
/// let mut formatter = JsonLinesFormatter::new(Vec::new());
/// let node = ElementInfo::new(1, 1, "2024-01-01T00:00:00Z", 3, true);
/// let tags = vec![("amenity".to_owned(), "cafe".to_owned())];
/// formatter.write_node(&node, Coord { x: 0.5, y: 51.0 }, &tags)?;
/// let output = String::from_utf8(formatter.finish()?)?;
/// assert!(output.starts_with(r#"{"type":"node","id":1,"#));
/// assert!(output.ends_with("\"tags\":{\"amenity\":\"cafe\"}}\n"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct JsonLinesFormatter<W> {
    writer: W,
}

impl<W: Write> JsonLinesFormatter<W> {
    /// Wrap `writer`. Callers should buffer it when writing to files.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Flush and return the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::Io`] when flushing fails.
    pub fn finish(mut self) -> Result<W, FormatError> {
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn emit(&mut self, line: &Line<'_>) -> Result<(), FormatError> {
        serde_json::to_writer(&mut self.writer, line).map_err(|err| {
            if err.is_io() {
                FormatError::from(io::Error::from(err))
            } else {
                FormatError::encode(line.record(), err)
            }
        })?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

impl<W: Write> OutputFormatter for JsonLinesFormatter<W> {
    fn write_node(
        &mut self,
        element: &ElementInfo,
        location: Coord<f64>,
        tags: &Tags,
    ) -> Result<(), FormatError> {
        self.emit(&Line::Node {
            element,
            lon: location.x,
            lat: location.y,
            tags: TagMap(tags),
        })
    }

    fn write_way(
        &mut self,
        element: &ElementInfo,
        nodes: &[u64],
        tags: &Tags,
    ) -> Result<(), FormatError> {
        self.emit(&Line::Way {
            element,
            nodes,
            tags: TagMap(tags),
        })
    }

    fn write_relation(
        &mut self,
        element: &ElementInfo,
        members: &[Member],
        tags: &Tags,
    ) -> Result<(), FormatError> {
        self.emit(&Line::Relation {
            element,
            members,
            tags: TagMap(tags),
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
        self.emit(&Line::Changeset {
            changeset,
            open: changeset.is_open_at(now),
            tags: TagMap(tags),
            discussion: include_discussion.then_some(comments),
        })
    }
}
