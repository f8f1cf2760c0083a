//! Zero-copy tokenizer for Postgres array literals.
//!
//! The tokenizer walks the literal one byte at a time through an explicit
//! state machine. Each call to [`Iterator::next`] scans exactly one element
//! and returns a slice of the input, so nothing is allocated unless a caller
//! later resolves escapes.
//!
//! All delimiters are ASCII, so every slice boundary falls on a UTF-8
//! character boundary and multi-byte content passes through untouched.

use std::borrow::Cow;
use std::iter::FusedIterator;

use super::{ArrayError, escape::resolve};

/// The bare token Postgres writes for an absent element.
const NULL_TOKEN: &str = "NULL";

/// How absent elements are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NullPolicy {
    /// Absent elements stay distinct from present empty strings.
    #[default]
    Preserve,
    /// Absent elements read as empty strings and a whole-array `{NULL}`
    /// reads as an empty array.
    Collapse,
}

/// One element as it appears in the literal.
///
/// The default value is an absent element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawElement<'a> {
    text: Option<&'a str>,
    escaped: bool,
}

impl<'a> RawElement<'a> {
    const ABSENT: Self = Self {
        text: None,
        escaped: false,
    };

    const fn present(text: &'a str, escaped: bool) -> Self {
        Self {
            text: Some(text),
            escaped,
        }
    }

    /// The raw slice, with any escapes still in place.
    pub const fn text(self) -> Option<&'a str> {
        self.text
    }

    /// Whether the slice contains backslash escapes.
    pub const fn escaped(self) -> bool {
        self.escaped
    }

    /// Whether the element was `NULL` or empty and unquoted.
    pub const fn is_absent(self) -> bool {
        self.text.is_none()
    }

    /// The element with escapes resolved, borrowing when there are none.
    pub fn resolved(self) -> Option<Cow<'a, str>> {
        self.text.map(|text| resolve(text, self.escaped))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Before the first byte of an element.
    Start,
    Bare,
    Quoted,
    /// Inside quotes, directly after a backslash.
    Escaped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimiter {
    Comma,
    Brace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Stay,
    Enter(State),
    OpenQuote,
    MarkEscape,
    CloseQuote,
    Delimit(Delimiter),
}

/// The transition function of the tokenizer.
const fn step(state: State, byte: u8) -> Action {
    match (state, byte) {
        (State::Start | State::Bare, b'"') => Action::OpenQuote,
        (State::Start | State::Bare, b',') => Action::Delimit(Delimiter::Comma),
        (State::Start | State::Bare, b'}') => Action::Delimit(Delimiter::Brace),
        (State::Start, _) => Action::Enter(State::Bare),
        (State::Quoted, b'"') => Action::CloseQuote,
        (State::Quoted, b'\\') => Action::MarkEscape,
        (State::Bare | State::Quoted, _) => Action::Stay,
        (State::Escaped, _) => Action::Enter(State::Quoted),
    }
}

/// Lazy iterator over the elements of one array literal.
///
/// The iterator cannot be restarted; build a new one over the same input to
/// read the elements again. After an error or the closing brace it only
/// returns `None`.
///
/// # Examples
///
/// ```
/// use mapfeed_data::array::ArrayLiteral;
///
/// let elements: Vec<_> = ArrayLiteral::new(r#"{a,NULL,"b\"c"}"#)
///     .map(|element| element.map(|e| e.resolved().map(|text| text.into_owned())))
///     .collect::<Result<_, _>>()?;
/// assert_eq!(
///     elements,
///     vec![Some("a".to_owned()), None, Some("b\"c".to_owned())]
/// );
/// # Ok::<(), mapfeed_data::array::ArrayError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ArrayLiteral<'a> {
    input: &'a str,
    pos: usize,
    done: bool,
    policy: NullPolicy,
}

impl<'a> ArrayLiteral<'a> {
    /// Tokenize `input`, keeping absent elements distinct.
    pub const fn new(input: &'a str) -> Self {
        Self::with_policy(input, NullPolicy::Preserve)
    }

    /// Tokenize `input` under the given null policy.
    pub const fn with_policy(input: &'a str, policy: NullPolicy) -> Self {
        Self {
            input,
            pos: 0,
            done: false,
            policy,
        }
    }

    fn slice(&self, from: usize, to: usize) -> &'a str {
        self.input.get(from..to).unwrap_or_default()
    }

    fn finish(&mut self) {
        self.done = true;
        self.pos = self.input.len();
    }

    /// Consume the opening brace. Returns `false` when the literal holds no
    /// elements at all.
    fn open(&mut self) -> Result<bool, ArrayError> {
        if self.input.is_empty() {
            return Ok(false);
        }
        if self.policy == NullPolicy::Collapse && self.input == "{NULL}" {
            return Ok(false);
        }
        let Some(rest) = self.input.strip_prefix('{') else {
            return Err(ArrayError::MissingOpeningBrace);
        };
        self.pos = 1;
        Ok(!rest.starts_with('}'))
    }

    fn bare(&self, from: usize, to: usize) -> RawElement<'a> {
        let text = self.slice(from, to);
        if text.is_empty() || text == NULL_TOKEN {
            match self.policy {
                NullPolicy::Preserve => RawElement::ABSENT,
                NullPolicy::Collapse => RawElement::present("", false),
            }
        } else {
            RawElement::present(text, false)
        }
    }

    /// Consume the separator after a closing quote.
    fn after_quote(&mut self) -> Result<(), ArrayError> {
        match self.input.as_bytes().get(self.pos) {
            Some(b',') => {
                self.pos += 1;
                Ok(())
            }
            Some(b'}') | None => {
                self.finish();
                Ok(())
            }
            Some(_) => {
                let offset = self.pos;
                let found = self
                    .input
                    .get(offset..)
                    .and_then(|rest| rest.chars().next())
                    .unwrap_or_default();
                self.finish();
                Err(ArrayError::UnexpectedAfterQuote { offset, found })
            }
        }
    }

    fn scan(&mut self) -> Option<Result<RawElement<'a>, ArrayError>> {
        let bytes = self.input.as_bytes();
        let mut state = State::Start;
        let mut start = self.pos;
        let mut quote_at = self.pos;
        let mut escaped = false;

        while let Some(&byte) = bytes.get(self.pos) {
            let at = self.pos;
            self.pos += 1;
            match step(state, byte) {
                Action::Stay => {}
                Action::Enter(next) => state = next,
                Action::OpenQuote => {
                    state = State::Quoted;
                    quote_at = at;
                    start = self.pos;
                }
                Action::MarkEscape => {
                    state = State::Escaped;
                    escaped = true;
                }
                Action::CloseQuote => {
                    let element = RawElement::present(self.slice(start, at), escaped);
                    return Some(self.after_quote().map(|()| element));
                }
                Action::Delimit(delimiter) => {
                    if delimiter == Delimiter::Brace {
                        self.finish();
                    }
                    return Some(Ok(self.bare(start, at)));
                }
            }
        }

        self.finish();
        match state {
            State::Start => None,
            State::Bare => Some(Ok(self.bare(start, bytes.len()))),
            State::Quoted | State::Escaped => {
                Some(Err(ArrayError::UnterminatedQuote { offset: quote_at }))
            }
        }
    }
}

impl<'a> Iterator for ArrayLiteral<'a> {
    type Item = Result<RawElement<'a>, ArrayError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.pos == 0 {
            match self.open() {
                Ok(true) => {}
                Ok(false) => {
                    self.finish();
                    return None;
                }
                Err(err) => {
                    self.finish();
                    return Some(Err(err));
                }
            }
        }
        self.scan()
    }
}

impl FusedIterator for ArrayLiteral<'_> {}
