//! Export derived artifacts from an index snapshot: raw documents, TF-IDF
//! term vectors and analyzed query topics.

pub mod analyzer;
pub mod error;
pub mod index;
pub mod markup;
pub mod persist;
pub mod raw;
pub mod reader;
pub mod tfidf;
pub mod topics;
pub mod vectors;

pub use error::{ExportError, Result};
pub use index::{Ordinal, Posting, StoredFields, Term, TermId, TermVector};

/// Default stored field holding the external document id.
pub const FIELD_ID: &str = "id";
/// Analyzed body field whose term vectors are dumped.
pub const FIELD_BODY: &str = "contents";
/// Stored field holding the unprocessed document text.
pub const FIELD_RAW: &str = "raw";

/// Documents between two progress log lines.
pub const PROGRESS_INTERVAL: u32 = 100_000;
