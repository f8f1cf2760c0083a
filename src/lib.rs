//! Facade crate for the mapfeed extraction pipeline.
//!
//! This crate re-exports the domain records and the output seam from
//! `mapfeed-core`, together with the row decoding and extraction drivers from
//! `mapfeed-data`. The SQLite adapters and the JSON Lines formatter sit
//! behind feature flags.

#![forbid(unsafe_code)]

pub use mapfeed_core::{
    Attribution, ChangesetCache, ChangesetInfo, ChangesetOwner, Comment, CoordinateScale,
    DEFAULT_SCALE, ElementInfo, ElementKind, FormatError, Member, OutputFormatter, ScaleError,
    Tags, parse_timestamp,
};

pub use mapfeed_data::{
    ArrayError, ExtractError, ExtractOptions, IterRows, Row, RowError, RowSource, Value,
    decode_text_array, encode_text_array, extract_changesets, extract_elements, extract_nodes,
    extract_relations, extract_ways,
};

#[cfg(feature = "store-sqlite")]
pub use mapfeed_data::{PrefetchError, load_changeset_owners};

#[cfg(feature = "serde")]
pub use mapfeed_data::JsonLinesFormatter;
