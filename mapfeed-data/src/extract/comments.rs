//! Changeset discussion decoding.

use mapfeed_core::Comment;

use super::ExtractError;
use super::parallel::Parallel;
use crate::array::{RawElement, parse_id};
use crate::row::Row;

const COLUMNS: [&str; 5] = [
    "comment_id",
    "comment_author_id",
    "comment_display_name",
    "comment_body",
    "comment_created_at",
];

/// Decode the comments of a changeset row, oldest first as stored.
///
/// Positions with an absent comment id are skipped.
pub(crate) fn decode_comments<R: Row + ?Sized>(row: &R) -> Result<Vec<Comment>, ExtractError> {
    let mut columns = Parallel::new(row, COLUMNS)?;
    let mut comments = Vec::new();
    while let Some([id, author_id, display_name, body, created_at]) = columns.next()? {
        if id.is_absent() {
            continue;
        }
        comments.push(Comment {
            id: integer("comment_id", id)?,
            author_id: integer("comment_author_id", author_id)?,
            body: text(body),
            created_at: text(created_at),
            author_display_name: text(display_name),
        });
    }
    Ok(comments)
}

fn integer(column: &'static str, element: RawElement<'_>) -> Result<u64, ExtractError> {
    let value = element.text().unwrap_or_default();
    parse_id(value).ok_or_else(|| ExtractError::Conversion {
        column,
        value: value.to_owned(),
    })
}

fn text(element: RawElement<'_>) -> String {
    element.resolved().unwrap_or_default().into_owned()
}
