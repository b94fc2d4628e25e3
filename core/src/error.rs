use std::path::PathBuf;

use crate::{Ordinal, Term};

pub type Result<T> = std::result::Result<T, ExportError>;

#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    /// Bad id field name, empty index or an unusable option. Raised before any
    /// document is written.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A field the export needs was never stored in the index.
    #[error("{0} not stored!")]
    NotStored(&'static str),

    #[error("document at ordinal {ordinal} has no value for id field {field}")]
    MissingDocId { ordinal: Ordinal, field: String },

    /// A term taken from a document's own vector reported df = 0.
    #[error("index reports zero document frequency for present term {0}")]
    DegenerateDocFrequency(Term),

    #[error("{}:{line}: {reason}", .path.display())]
    Parse { path: PathBuf, line: usize, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Codec(#[from] bincode::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
