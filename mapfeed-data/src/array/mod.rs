//! Decoding of Postgres array literals.
//!
//! Rolled-up rows carry their one-to-many children as array literals such
//! as `{highway,"note \"1\""}`. [`ArrayLiteral`] tokenizes them lazily and
//! without copying; [`resolve`] unescapes a quoted element on demand;
//! [`decode_ids`] is a shortcut for arrays of bare integers.
//!
//! Generic text columns that do not care whether an element was `NULL` use
//! [`decode_text_array`], which runs the same tokenizer under
//! [`NullPolicy::Collapse`].

mod escape;
mod ids;
mod tokenizer;

use thiserror::Error;

pub use escape::{quote, resolve};
pub use ids::{IdArrayError, decode_ids};
pub use tokenizer::{ArrayLiteral, NullPolicy, RawElement};

pub(crate) use ids::parse_id;

/// Structural errors in an array literal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArrayError {
    /// A non-empty literal did not start with `{`.
    #[error("array literal does not start with '{{'")]
    MissingOpeningBrace,
    /// An integer array literal did not end with `}`.
    #[error("array literal does not end with '}}'")]
    MissingClosingBrace,
    /// The literal ended inside a quoted element.
    #[error("quoted element opened at byte {offset} is never closed")]
    UnterminatedQuote {
        /// Byte offset of the opening quote.
        offset: usize,
    },
    /// A closing quote was followed by something other than a separator.
    #[error("unexpected {found:?} at byte {offset} after a closing quote")]
    UnexpectedAfterQuote {
        /// Byte offset of the unexpected character.
        offset: usize,
        /// The unexpected character.
        found: char,
    },
}

/// Decode a text array into owned, unescaped strings.
///
/// Absent elements read as empty strings, and `{NULL}`, `{}` or an empty
/// input give an empty vector.
///
/// # Examples
///
/// ```
/// use mapfeed_data::array::decode_text_array;
///
/// let roles = decode_text_array(r#"{admin,NULL,"a \"b\""}"#)?;
/// assert_eq!(roles, vec!["admin", "", "a \"b\""]);
/// assert!(decode_text_array("{NULL}")?.is_empty());
/// # Ok::<(), mapfeed_data::array::ArrayError>(())
/// ```
pub fn decode_text_array(literal: &str) -> Result<Vec<String>, ArrayError> {
    ArrayLiteral::with_policy(literal, NullPolicy::Collapse)
        .map(|element| {
            element.map(|raw| raw.resolved().map(|text| text.into_owned()).unwrap_or_default())
        })
        .collect()
}

/// Encode strings as an array literal with every element quoted.
///
/// # Examples
///
/// ```
/// use mapfeed_data::array::encode_text_array;
///
/// assert_eq!(encode_text_array(["a,b", "c"]), r#"{"a,b","c"}"#);
/// ```
pub fn encode_text_array<I>(items: I) -> String
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let quoted: Vec<String> = items
        .into_iter()
        .map(|item| quote(item.as_ref()))
        .collect();
    format!("{{{}}}", quoted.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("", vec![])]
    #[case("{}", vec![])]
    #[case("{NULL}", vec![])]
    #[case(r#"{""}"#, vec![""])]
    #[case("{a,,b}", vec!["a", "", "b"])]
    #[case(r#"{"x\\y",z}"#, vec![r"x\y", "z"])]
    fn legacy_decoder_collapses_absent(#[case] literal: &str, #[case] expected: Vec<&str>) {
        assert_eq!(decode_text_array(literal), Ok(expected.into_iter().map(String::from).collect()));
    }

    #[test]
    fn legacy_decoder_reports_structural_errors() {
        assert_eq!(
            decode_text_array(r#"{"open"#),
            Err(ArrayError::UnterminatedQuote { offset: 1 })
        );
    }

    #[test]
    fn empty_list_encodes_to_empty_braces() {
        assert_eq!(encode_text_array(Vec::<String>::new()), "{}");
    }

    proptest! {
        #[test]
        fn quoted_literals_round_trip(items in prop::collection::vec(".*", 1..8)) {
            let literal = encode_text_array(&items);
            let decoded: Vec<String> = ArrayLiteral::new(&literal)
                .map(|element| {
                    let raw = element.expect("encoded literal is well formed");
                    raw.resolved().expect("quoted elements are present").into_owned()
                })
                .collect();
            prop_assert_eq!(decoded, items);
        }

        #[test]
        fn adversarial_characters_round_trip(
            items in prop::collection::vec(r#"[,{}"\\ NUL]{0,6}"#, 1..6)
        ) {
            let literal = encode_text_array(&items);
            prop_assert_eq!(decode_text_array(&literal), Ok(items));
        }
    }
}
