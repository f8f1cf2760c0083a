//! Relation member decoding.

use mapfeed_core::{ElementKind, Member};

use super::ExtractError;
use super::parallel::Parallel;
use crate::array::{RawElement, parse_id};
use crate::row::Row;

const COLUMNS: [&str; 3] = ["member_types", "member_ids", "member_roles"];

/// Decode relation members from three parallel columns.
///
/// Types and ids are plain tokens; roles may be quoted and escaped. A
/// position where both type and id are absent is skipped.
pub(crate) fn decode_members<R: Row + ?Sized>(row: &R) -> Result<Vec<Member>, ExtractError> {
    let mut columns = Parallel::new(row, COLUMNS)?;
    let mut members = Vec::new();
    while let Some([kind, id, role]) = columns.next()? {
        if kind.is_absent() && id.is_absent() {
            continue;
        }
        let role = role.resolved().unwrap_or_default().into_owned();
        members.push(Member::new(member_kind(kind)?, member_id(id)?, role));
    }
    Ok(members)
}

fn member_kind(code: RawElement<'_>) -> Result<ElementKind, ExtractError> {
    let code = code.resolved().unwrap_or_default();
    ElementKind::from_member_code(&code).ok_or_else(|| ExtractError::UnknownMemberTypeCode {
        code: code.into_owned(),
    })
}

fn member_id(id: RawElement<'_>) -> Result<u64, ExtractError> {
    let text = id.text().unwrap_or_default();
    parse_id(text).ok_or_else(|| ExtractError::Conversion {
        column: "member_ids",
        value: text.to_owned(),
    })
}
