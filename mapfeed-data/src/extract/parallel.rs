//! Lockstep iteration over parallel array columns.

use super::ExtractError;
use crate::array::{ArrayLiteral, RawElement};
use crate::row::Row;

/// Walks `N` array columns of one row element by element.
///
/// A null column reads as an empty array. Every column is counted before the
/// first element is handed out, so columns of different lengths fail with an
/// arity mismatch whatever their contents.
pub(crate) struct Parallel<'a, const N: usize> {
    columns: [&'static str; N],
    tokens: [ArrayLiteral<'a>; N],
}

impl<'a, const N: usize> Parallel<'a, N> {
    pub(crate) fn new<R: Row + ?Sized>(
        row: &'a R,
        columns: [&'static str; N],
    ) -> Result<Self, ExtractError> {
        let mut literals = [""; N];
        for (literal, column) in literals.iter_mut().zip(columns) {
            *literal = row.text(column)?.unwrap_or_default();
        }
        let mut lengths = Vec::with_capacity(N);
        for (literal, column) in literals.iter().zip(columns) {
            lengths.push(count(literal, column)?);
        }
        if lengths.windows(2).any(|pair| pair.first() != pair.last()) {
            return Err(ExtractError::ArityMismatch {
                columns: columns.to_vec(),
                lengths,
            });
        }
        Ok(Self {
            columns,
            tokens: literals.map(ArrayLiteral::new),
        })
    }

    /// The next element of every column, or `None` once all are exhausted.
    pub(crate) fn next(&mut self) -> Result<Option<[RawElement<'a>; N]>, ExtractError> {
        let mut step = [None; N];
        for ((slot, tokens), column) in step.iter_mut().zip(&mut self.tokens).zip(self.columns) {
            *slot = tokens
                .next()
                .transpose()
                .map_err(|source| ExtractError::MalformedArrayLiteral { column, source })?;
        }
        if step.iter().any(Option::is_none) {
            return Ok(None);
        }
        Ok(Some(step.map(Option::unwrap_or_default)))
    }
}

/// Number of elements in `literal`, checking its structure on the way.
fn count(literal: &str, column: &'static str) -> Result<usize, ExtractError> {
    ArrayLiteral::new(literal).try_fold(0, |length, element| {
        element
            .map(|_| length + 1)
            .map_err(|source| ExtractError::MalformedArrayLiteral { column, source })
    })
}
