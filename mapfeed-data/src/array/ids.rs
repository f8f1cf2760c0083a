//! Fast path for arrays of unquoted integers.
//!
//! Id columns never contain quoting, escapes or per-element `NULL`s, so they
//! skip the general tokenizer and are split directly on commas.

use std::str::FromStr;

use thiserror::Error;

use super::ArrayError;

/// Errors returned by [`decode_ids`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdArrayError {
    /// The literal was not wrapped in braces.
    #[error(transparent)]
    Malformed(#[from] ArrayError),
    /// An element was not a decimal integer that fits the target type.
    #[error("cannot convert {value:?} to an integer")]
    Conversion {
        /// The offending element text.
        value: String,
    },
}

/// Parse one decimal integer.
///
/// Only an optional leading `-` followed by ASCII digits is accepted; signs
/// are rejected for unsigned targets by the target's own parser.
pub(crate) fn parse_id<T: FromStr>(text: &str) -> Option<T> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Decode an integer array literal such as `{12,34,56}`.
///
/// The empty string, `{}` and the whole-array `{NULL}` all decode to an
/// empty vector.
///
/// # Examples
///
/// ```
/// use mapfeed_data::array::decode_ids;
///
/// assert_eq!(decode_ids::<u64>("{12,34,56}")?, vec![12, 34, 56]);
/// assert_eq!(decode_ids::<i64>("{-7}")?, vec![-7]);
/// assert!(decode_ids::<u64>("{NULL}")?.is_empty());
/// assert!(decode_ids::<u64>("{1,x}").is_err());
/// # Ok::<(), mapfeed_data::array::IdArrayError>(())
/// ```
pub fn decode_ids<T: FromStr>(literal: &str) -> Result<Vec<T>, IdArrayError> {
    if matches!(literal, "" | "{}" | "{NULL}") {
        return Ok(Vec::new());
    }
    let body = literal
        .strip_prefix('{')
        .ok_or(ArrayError::MissingOpeningBrace)?
        .strip_suffix('}')
        .ok_or(ArrayError::MissingClosingBrace)?;
    body.split(',')
        .map(|span| {
            parse_id(span).ok_or_else(|| IdArrayError::Conversion {
                value: span.to_owned(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("{12,34,56}", vec![12, 34, 56])]
    #[case("{7}", vec![7])]
    #[case("{NULL}", vec![])]
    #[case("{}", vec![])]
    #[case("", vec![])]
    #[case("{3,3,1}", vec![3, 3, 1])]
    fn decodes_unsigned_ids(#[case] literal: &str, #[case] expected: Vec<u64>) {
        assert_eq!(decode_ids::<u64>(literal), Ok(expected));
    }

    #[test]
    fn decodes_signed_ids() {
        assert_eq!(decode_ids::<i64>("{-1,2}"), Ok(vec![-1, 2]));
    }

    #[rstest]
    #[case("{1,a}", "a")]
    #[case("{1,,2}", "")]
    #[case("{12x}", "12x")]
    #[case("{ 1}", " 1")]
    #[case("{+1}", "+1")]
    #[case("{-1}", "-1")]
    #[case("{NULL,1}", "NULL")]
    #[case("{99999999999999999999999}", "99999999999999999999999")]
    fn rejects_non_digit_spans(#[case] literal: &str, #[case] value: &str) {
        assert_eq!(
            decode_ids::<u64>(literal),
            Err(IdArrayError::Conversion {
                value: value.to_owned()
            })
        );
    }

    #[rstest]
    #[case("1,2}", ArrayError::MissingOpeningBrace)]
    #[case("{1,2", ArrayError::MissingClosingBrace)]
    fn rejects_unbraced_literals(#[case] literal: &str, #[case] expected: ArrayError) {
        assert_eq!(
            decode_ids::<u64>(literal),
            Err(IdArrayError::Malformed(expected))
        );
    }

    #[rstest]
    #[case("0", Some(0))]
    #[case("-0", Some(0))]
    #[case("-", None)]
    #[case("1.5", None)]
    fn parse_id_accepts_only_decimal_digits(#[case] text: &str, #[case] expected: Option<i32>) {
        assert_eq!(parse_id::<i32>(text), expected);
    }
}
