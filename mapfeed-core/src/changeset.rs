//! Changeset records and discussion comments.

use chrono::{DateTime, NaiveDateTime, Utc};
use geo::Rect;

/// Timestamp layout used by stored changeset times.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A changeset as emitted to formatters.
///
/// The bounding box is in degrees (`x = longitude`, `y = latitude`) and is
/// absent for changesets without any located edits.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ChangesetInfo {
    /// Changeset id.
    pub id: i64,
    /// Creation time as stored.
    pub created_at: String,
    /// Close time as stored; a time after `now` means the changeset is open.
    pub closed_at: String,
    /// Owner's user id, present only for public owners.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub uid: Option<u64>,
    /// Owner's display name, present only for public owners.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub display_name: Option<String>,
    /// Extent of the located edits.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub bounding_box: Option<Rect<f64>>,
    /// Number of edits made in the changeset.
    pub num_changes: u64,
    /// Number of discussion comments.
    pub comments_count: usize,
}

impl ChangesetInfo {
    /// Whether the changeset is still open at `now`.
    ///
    /// A changeset stays open until its `closed_at` time passes. Unparseable
    /// close times are treated as closed.
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use mapfeed_core::ChangesetInfo;
    ///
    /// let changeset = ChangesetInfo {
    ///     id: 1,
    ///     created_at: "2024-01-01T00:00:00Z".into(),
    ///     closed_at: "2024-01-01T01:00:00Z".into(),
    ///     uid: None,
    ///     display_name: None,
    ///     bounding_box: None,
    ///     num_changes: 0,
    ///     comments_count: 0,
    /// };
    /// let before = Utc.with_ymd_and_hms(2024, 1, 1, 0, 30, 0).unwrap();
    /// let after = Utc.with_ymd_and_hms(2024, 1, 1, 2, 0, 0).unwrap();
    /// assert!(changeset.is_open_at(before));
    /// assert!(!changeset.is_open_at(after));
    /// ```
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        parse_timestamp(&self.closed_at).is_some_and(|closed_at| closed_at > now)
    }
}

/// Parse a stored `YYYY-MM-DDTHH:MM:SSZ` timestamp.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// A comment on a changeset discussion.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Comment {
    /// Comment id.
    pub id: u64,
    /// User id of the author.
    pub author_id: u64,
    /// Comment text, unescaped.
    pub body: String,
    /// Posting time as stored.
    pub created_at: String,
    /// Display name of the author.
    pub author_display_name: String,
}
