//! Read-only view over an index snapshot directory.
//!
//! Header tables are loaded once by [`IndexReader::open`]; postings and term
//! vectors are read from disk on demand.

use crate::persist::{load_index_header, load_postings_for_term, load_vectors_for_doc, Dictionary, IndexPaths};
use crate::{ExportError, Ordinal, Result, StoredFields, Term, TermVector};
use std::collections::HashMap;
use std::path::Path;

pub struct IndexReader {
    paths: IndexPaths,
    docs: Vec<StoredFields>,
    doc_id_map: HashMap<String, Ordinal>,
    dictionary: Dictionary,
    field_doc_counts: HashMap<String, u32>,
}

impl IndexReader {
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let paths = IndexPaths::new(root);
        let (meta, docs, doc_id_map, dictionary) = load_index_header(&paths)?;
        if meta.num_docs as usize != docs.len() {
            tracing::warn!(meta_docs = meta.num_docs, stored_docs = docs.len(), "meta.json disagrees with docs.bin, using docs.bin");
        }
        tracing::info!(
            index = %paths.root.display(),
            num_docs = docs.len(),
            id_field = %meta.id_field,
            created_at = %meta.created_at,
            "opened index snapshot"
        );
        Ok(Self {
            paths,
            docs,
            doc_id_map,
            dictionary,
            field_doc_counts: meta.field_doc_counts.into_iter().collect(),
        })
    }

    pub fn num_docs(&self) -> u32 {
        self.docs.len() as u32
    }

    /// Documents holding at least one term in `field`.
    pub fn doc_count(&self, field: &str) -> u32 {
        self.field_doc_counts.get(field).copied().unwrap_or(0)
    }

    pub fn stored_field(&self, ordinal: Ordinal, field: &str) -> Option<&str> {
        self.docs.get(ordinal as usize)?.get(field).map(String::as_str)
    }

    /// `Ok(None)` when vectors were not stored for this document and field,
    /// which is different from a stored but empty vector.
    pub fn term_vector(&self, ordinal: Ordinal, field: &str) -> Result<Option<TermVector>> {
        let Some(mut vectors) = load_vectors_for_doc(&self.paths, ordinal)? else {
            return Ok(None);
        };
        Ok(vectors.remove(field))
    }

    /// Number of documents containing `term`. Terms missing from the
    /// dictionary have frequency 0; an unreadable postings list is an error.
    pub fn doc_freq(&self, term: &Term) -> Result<u32> {
        let Some(term_id) = self.dictionary.get(&term.field).and_then(|d| d.get(&term.text)) else {
            return Ok(0);
        };
        let postings = load_postings_for_term(&self.paths, *term_id)?;
        Ok(postings.len() as u32)
    }

    pub fn resolve_ordinal(&self, external_id: &str) -> Option<Ordinal> {
        self.doc_id_map.get(external_id).copied()
    }

    /// Checks that the index is non-empty and that its first document carries
    /// `id_field`. Anything else is a misconfigured field name.
    pub fn check_id_field(&self, id_field: &str) -> Result<()> {
        if self.docs.is_empty() {
            return Err(ExportError::Configuration("No document is in the index!".into()));
        }
        if self.stored_field(0, id_field).is_none() {
            tracing::info!(id_field, "wrong document ID field name");
            return Err(ExportError::Configuration(format!("{id_field} is a wrong document ID field name!")));
        }
        Ok(())
    }

    /// External id of the document at `ordinal`.
    pub fn doc_id(&self, ordinal: Ordinal, id_field: &str) -> Result<&str> {
        self.stored_field(ordinal, id_field)
            .ok_or_else(|| ExportError::MissingDocId { ordinal, field: id_field.to_string() })
    }
}
