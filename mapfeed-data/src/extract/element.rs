//! Node, way and relation extraction.

use geo::Coord;
use mapfeed_core::{
    ChangesetCache, CoordinateScale, ElementInfo, ElementKind, FormatError, Member,
    OutputFormatter, Tags,
};

use super::members::decode_members;
use super::{ExtractError, decode_id_column, unsigned};
use crate::row::Row;

/// Kind-specific payload of an element row.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ElementExtra {
    Node(Coord<f64>),
    Way(Vec<u64>),
    Relation(Vec<Member>),
}

impl ElementExtra {
    /// Decode the payload columns for `kind`.
    pub(crate) fn extract<R: Row + ?Sized>(
        kind: ElementKind,
        row: &R,
        scale: CoordinateScale,
    ) -> Result<Self, ExtractError> {
        match kind {
            ElementKind::Node => {
                let lon = row.require_integer("longitude")?;
                let lat = row.require_integer("latitude")?;
                Ok(Self::Node(scale.coord(lon, lat)))
            }
            ElementKind::Way => Ok(Self::Way(decode_id_column(row, "node_ids")?)),
            ElementKind::Relation => Ok(Self::Relation(decode_members(row)?)),
        }
    }

    /// Hand the assembled element to the matching formatter method.
    pub(crate) fn write<F: OutputFormatter + ?Sized>(
        &self,
        formatter: &mut F,
        element: &ElementInfo,
        tags: &Tags,
    ) -> Result<(), FormatError> {
        match self {
            Self::Node(location) => formatter.write_node(element, *location, tags),
            Self::Way(nodes) => formatter.write_way(element, nodes, tags),
            Self::Relation(members) => formatter.write_relation(element, members, tags),
        }
    }
}

/// Read the common element columns and attach cached attribution.
///
/// The row's own user columns, if any, are never consulted.
pub(crate) fn read_element_info<R: Row + ?Sized>(
    row: &R,
    cache: &mut ChangesetCache,
) -> Result<ElementInfo, ExtractError> {
    let id = unsigned("id", row.require_integer("id")?)?;
    let version = unsigned("version", row.require_integer("version")?)?;
    let timestamp = row.require_text("timestamp")?;
    let changeset = row.require_integer("changeset_id")?;
    let visible = row.require_boolean("visible")?;
    let attribution = cache.attribution(changeset);
    Ok(
        ElementInfo::new(id, version, timestamp, changeset, visible).with_attribution(
            attribution.user_id(),
            attribution.display_name().map(str::to_owned),
        ),
    )
}
