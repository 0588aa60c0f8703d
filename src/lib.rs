//! Streaming writer for mtree specification files.
//!
//! An mtree file is a line-oriented, human-readable manifest: one record
//! per archive entry, each a quoted name token followed by `key=value`
//! attribute tokens, with a `/set` directive establishing baseline values
//! so later records carry only deltas. Use [`MtreeWriter`] to produce one,
//! feeding it [`Entry`] metadata and content bytes; content digests are
//! computed incrementally, so entries of any size stream without
//! buffering.

mod cksum;
mod digest;
mod entry;
pub mod escape;
mod keys;
mod wrap;
mod writer;

pub use cksum::Cksum;
pub use entry::{Entry, FileType};
pub use keys::KeySet;
pub use writer::{Error, MtreeWriter};
