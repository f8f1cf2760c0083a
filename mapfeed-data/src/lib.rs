//! Row decoding and extraction for the mapfeed pipeline.
//!
//! Responsibilities:
//! - Tokenize PostgreSQL array literals and decode identifier arrays.
//! - Read rolled-up element and changeset rows through a storage-neutral
//!   [`row::Row`] seam.
//! - Drive rows into an [`mapfeed_core::OutputFormatter`], one record per
//!   row, in storage order.
//! - Prefetch changeset owners and provide a JSON Lines formatter.
//!
//! Boundaries:
//! - Do not issue queries while extracting; attribution comes from a cache
//!   built before extraction starts.
//! - Do not buffer records; formatters receive each row as it is decoded.
//!
//! Invariants:
//! - A row is written only after it has decoded completely.
//! - Attribution never reaches a formatter for private or unresolved
//!   changesets.
//! - No global mutable state.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod array;
pub mod extract;
#[cfg(feature = "jsonl")]
#[cfg_attr(docsrs, doc(cfg(feature = "jsonl")))]
pub mod jsonl;
#[cfg(feature = "store-sqlite")]
#[cfg_attr(docsrs, doc(cfg(feature = "store-sqlite")))]
pub mod prefetch;
pub mod row;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use array::{ArrayError, decode_text_array, encode_text_array};
pub use extract::{
    ExtractError, ExtractOptions, extract_changesets, extract_elements, extract_nodes,
    extract_relations, extract_ways,
};
#[cfg(feature = "jsonl")]
pub use jsonl::JsonLinesFormatter;
#[cfg(feature = "store-sqlite")]
pub use prefetch::{PrefetchError, load_changeset_owners};
pub use row::{IterRows, Row, RowError, RowSource, Value};
