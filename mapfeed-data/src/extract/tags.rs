//! Tag decoding from the `tag_k`/`tag_v` column pair.

use mapfeed_core::Tags;

use super::ExtractError;
use super::parallel::Parallel;
use crate::row::Row;

/// Decode the row's tags in stored order.
///
/// Positions with an absent key are skipped; a left join without tags
/// rolls up to `{NULL}` in both columns. An absent value reads as empty.
pub(crate) fn decode_tags<R: Row + ?Sized>(row: &R) -> Result<Tags, ExtractError> {
    let mut pairs = Parallel::new(row, ["tag_k", "tag_v"])?;
    let mut tags = Tags::new();
    while let Some([key, value]) = pairs.next()? {
        let Some(key) = key.resolved() else {
            continue;
        };
        let value = value.resolved().unwrap_or_default();
        tags.push((key.into_owned(), value.into_owned()));
    }
    Ok(tags)
}
