use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub type TermId = u32;
/// Dense position of a document inside one open snapshot.
pub type Ordinal = u32;

/// Stored (retrievable) fields of one document, keyed by field name.
pub type StoredFields = BTreeMap<String, String>;

/// One document's term occurrences for a single field, in the order the
/// snapshot stored them.
pub type TermVector = Vec<(String, u64)>;

/// A (field, token) pair. Used as the document-frequency cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Term {
    pub field: String,
    pub text: String,
}

impl Term {
    pub fn new(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self { field: field.into(), text: text.into() }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub ordinal: Ordinal,
    pub freq: u32,
}
