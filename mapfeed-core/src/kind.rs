//! Kinds of map elements.
//!
//! The set is closed: every element is a node, a way or a relation.
//!
//! # Examples
//! ```
//! use mapfeed_core::ElementKind;
//!
//! assert_eq!(ElementKind::Way.as_str(), "way");
//! assert_eq!(ElementKind::Relation.to_string(), "relation");
//! ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ElementKind {
    /// A single point.
    Node,
    /// An ordered list of nodes.
    Way,
    /// An ordered list of typed members with roles.
    Relation,
}

impl ElementKind {
    /// Return the kind as a lowercase `&str`.
    ///
    /// # Examples
    /// ```
    /// use mapfeed_core::ElementKind;
    ///
    /// assert_eq!(ElementKind::Node.as_str(), "node");
    /// ```
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Way => "way",
            Self::Relation => "relation",
        }
    }

    /// Map a relation member type code to its kind.
    ///
    /// Only the leading character is inspected, so both the single-letter
    /// codes (`N`, `w`) and full names (`Node`, `relation`) are accepted.
    ///
    /// # Examples
    /// ```
    /// use mapfeed_core::ElementKind;
    ///
    /// assert_eq!(ElementKind::from_member_code("W"), Some(ElementKind::Way));
    /// assert_eq!(ElementKind::from_member_code("relation"), Some(ElementKind::Relation));
    /// assert_eq!(ElementKind::from_member_code("x"), None);
    /// ```
    pub fn from_member_code(code: &str) -> Option<Self> {
        match code.as_bytes().first()? {
            b'N' | b'n' => Some(Self::Node),
            b'W' | b'w' => Some(Self::Way),
            b'R' | b'r' => Some(Self::Relation),
            _ => None,
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ElementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "node" | "nodes" => Ok(Self::Node),
            "way" | "ways" => Ok(Self::Way),
            "relation" | "relations" => Ok(Self::Relation),
            _ => Err(format!("unknown element kind '{s}'")),
        }
    }
}
