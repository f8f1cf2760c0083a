//! Backslash escape handling for quoted array elements.

use std::borrow::Cow;

/// Resolve backslash escapes in a tokenized element.
///
/// Unescaped text is returned borrowed. Otherwise each backslash is dropped
/// and the character after it is kept literally.
///
/// # Examples
///
/// ```
/// use std::borrow::Cow;
/// use mapfeed_data::array::resolve;
///
/// assert!(matches!(resolve("plain", false), Cow::Borrowed("plain")));
/// assert_eq!(resolve(r#"say \"hi\" \\o/"#, true), r#"say "hi" \o/"#);
/// ```
pub fn resolve(text: &str, escaped: bool) -> Cow<'_, str> {
    if !escaped {
        return Cow::Borrowed(text);
    }
    let mut resolved = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(literal) = chars.next() {
                resolved.push(literal);
            }
        } else {
            resolved.push(ch);
        }
    }
    Cow::Owned(resolved)
}

/// Quote `text` as an array element, escaping quotes and backslashes.
///
/// The inverse of tokenizing a quoted element and calling [`resolve`].
pub fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for ch in text.chars() {
        if matches!(ch, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}
