//! Changeset extraction.

use geo::Rect;
use mapfeed_core::{ChangesetCache, ChangesetInfo, Comment, CoordinateScale, Tags};

use super::comments::decode_comments;
use super::tags::decode_tags;
use super::{ExtractError, unsigned};
use crate::row::Row;

/// Bounding box columns in `Rect` corner order.
const BOUNDS: [&str; 4] = ["min_lon", "min_lat", "max_lon", "max_lat"];

/// A decoded changeset row.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ExtractedChangeset {
    pub(crate) info: ChangesetInfo,
    pub(crate) tags: Tags,
    pub(crate) comments: Vec<Comment>,
}

pub(crate) fn extract_changeset<R: Row + ?Sized>(
    row: &R,
    cache: &mut ChangesetCache,
    scale: CoordinateScale,
) -> Result<ExtractedChangeset, ExtractError> {
    let id = row.require_integer("id")?;
    let created_at = row.require_text("created_at")?.to_owned();
    let closed_at = row.require_text("closed_at")?.to_owned();
    let num_changes = unsigned("num_changes", row.require_integer("num_changes")?)?;
    let bounding_box = bounding_box(row, id, scale)?;
    let tags = decode_tags(row)?;
    let comments = decode_comments(row)?;
    let attribution = cache.attribution(id);
    let info = ChangesetInfo {
        id,
        created_at,
        closed_at,
        uid: attribution.user_id(),
        display_name: attribution.display_name().map(str::to_owned),
        bounding_box,
        num_changes,
        comments_count: comments.len(),
    };
    Ok(ExtractedChangeset {
        info,
        tags,
        comments,
    })
}

/// Read the bounds, which must be either all null or all present.
fn bounding_box<R: Row + ?Sized>(
    row: &R,
    changeset: i64,
    scale: CoordinateScale,
) -> Result<Option<Rect<f64>>, ExtractError> {
    let mut bounds = [None; 4];
    for (bound, column) in bounds.iter_mut().zip(BOUNDS) {
        *bound = row.integer(column)?;
    }
    match bounds {
        [Some(min_lon), Some(min_lat), Some(max_lon), Some(max_lat)] => {
            Ok(Some(scale.rect(min_lon, min_lat, max_lon, max_lat)))
        }
        [None, None, None, None] => Ok(None),
        _ => Err(ExtractError::PartialBoundingBox {
            changeset,
            missing: BOUNDS
                .into_iter()
                .zip(bounds)
                .filter_map(|(column, bound)| bound.is_none().then_some(column))
                .collect(),
        }),
    }
}
