//! Element records assembled from rolled-up rows.

use crate::ElementKind;

/// Ordered key/value tags.
///
/// Order follows the stored arrays and duplicate keys are kept as-is.
pub type Tags = Vec<(String, String)>;

/// Fields shared by nodes, ways and relations.
///
/// `uid` and `display_name` are attribution fields. They are filled from the
/// changeset cache and stay `None` whenever the owning changeset's user has
/// not made their edits public.
///
/// # Examples
/// ```
/// use mapfeed_core::ElementInfo;
///
/// let element = ElementInfo::new(7, 2, "2024-01-01T00:00:00Z", 42, true);
/// assert_eq!(element.id, 7);
/// assert!(element.uid.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ElementInfo {
    /// Element id.
    pub id: u64,
    /// Version of this element row.
    pub version: u64,
    /// ISO 8601 timestamp as stored.
    pub timestamp: String,
    /// Changeset the version was created in.
    pub changeset: i64,
    /// `false` for deleted versions.
    pub visible: bool,
    /// Owner's user id, present only when the changeset owner is public.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub uid: Option<u64>,
    /// Owner's display name, present only when the changeset owner is public.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub display_name: Option<String>,
}

impl ElementInfo {
    /// Construct an element without attribution.
    pub fn new(
        id: u64,
        version: u64,
        timestamp: impl Into<String>,
        changeset: i64,
        visible: bool,
    ) -> Self {
        Self {
            id,
            version,
            timestamp: timestamp.into(),
            changeset,
            visible,
            uid: None,
            display_name: None,
        }
    }

    /// Attach attribution to the element.
    ///
    /// # Examples
    /// ```
    /// use mapfeed_core::ElementInfo;
    ///
    /// let element = ElementInfo::new(1, 1, "2024-01-01T00:00:00Z", 3, true)
    ///     .with_attribution(Some(9), Some("mapper".to_owned()));
    /// assert_eq!(element.uid, Some(9));
    /// ```
    #[must_use]
    pub fn with_attribution(mut self, uid: Option<u64>, display_name: Option<String>) -> Self {
        self.uid = uid;
        self.display_name = display_name;
        self
    }
}

/// A relation member.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Member {
    /// Kind of the referenced element.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: ElementKind,
    /// Id of the referenced element.
    #[cfg_attr(feature = "serde", serde(rename = "ref"))]
    pub id: u64,
    /// Role within the relation, possibly empty.
    pub role: String,
}

impl Member {
    /// Construct a member.
    pub fn new(kind: ElementKind, id: u64, role: impl Into<String>) -> Self {
        Self {
            kind,
            id,
            role: role.into(),
        }
    }
}
