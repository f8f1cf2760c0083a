//! Core domain types for the mapfeed extraction pipeline.
//!
//! Records produced from rolled-up rows live here, together with the seams
//! the pipeline writes through: the [`OutputFormatter`] trait and the
//! request-scoped [`ChangesetCache`] that gates attribution.
//!
//! Nothing in this crate touches storage. Decoding rows is the job of
//! `mapfeed-data`.

#![cfg_attr(docsrs, feature(doc_cfg))]

mod cache;
mod changeset;
mod element;
mod formatter;
mod kind;
mod scale;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use cache::{Attribution, ChangesetCache, ChangesetOwner};
pub use changeset::{ChangesetInfo, Comment, parse_timestamp};
pub use element::{ElementInfo, Member, Tags};
pub use formatter::{FormatError, OutputFormatter};
pub use kind::ElementKind;
pub use scale::{CoordinateScale, DEFAULT_SCALE, ScaleError};
