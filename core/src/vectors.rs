//! TF-IDF vector dump.
//!
//! Output is one block per non-empty document:
//!
//! ```text
//! DOC_ID
//! TERM_1 WEIGHT_1
//! ...
//! TERM_N WEIGHT_N
//!
//! ```
//!
//! Terms keep the order of the stored term vector and weights are printed
//! with six fractional digits. Pruned terms are left out; a document whose
//! terms were all pruned still gets its header and blank line.

use crate::reader::IndexReader;
use crate::tfidf::{tfidf_weight, DocFreqCache};
use crate::{ExportError, Result, Term, FIELD_BODY, PROGRESS_INTERVAL};
use std::io::{BufWriter, Write};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct VectorDumpStats {
    pub docs_seen: u64,
    pub docs_written: u64,
    pub docs_empty: u64,
    pub terms_written: u64,
    pub terms_pruned: u64,
}

pub struct VectorDumper<'a> {
    reader: &'a IndexReader,
    df_cache: DocFreqCache<'a>,
}

impl<'a> VectorDumper<'a> {
    pub fn new(reader: &'a IndexReader) -> Self {
        Self { reader, df_cache: DocFreqCache::new(reader) }
    }

    pub fn run<W: Write>(&mut self, id_field: &str, out: W, threshold: u32) -> Result<VectorDumpStats> {
        let mut out = BufWriter::new(out);
        let reader = self.reader;
        reader.check_id_field(id_field)?;

        let num_docs = reader.num_docs();
        let num_non_empty = reader.doc_count(FIELD_BODY);
        tracing::info!(num_docs, num_non_empty, threshold, "dumping tf-idf vectors");

        let mut stats = VectorDumpStats::default();
        for i in 0..num_docs {
            let docid = reader.doc_id(i, id_field)?;
            // Vectors are looked up through the external id, like any other client would.
            let ordinal = reader.resolve_ordinal(docid).unwrap_or(i);
            stats.docs_seen += 1;

            let vector = reader
                .term_vector(ordinal, FIELD_BODY)?
                .ok_or(ExportError::NotStored("Document vector"))?;

            if vector.is_empty() {
                tracing::warn!(docid, "empty document");
                stats.docs_empty += 1;
            } else {
                if num_non_empty == 0 {
                    return Err(ExportError::Configuration(format!(
                        "index reports no non-empty {FIELD_BODY} documents but {docid} has terms"
                    )));
                }
                writeln!(out, "{docid}")?;
                for (text, freq) in vector {
                    let term = Term::new(FIELD_BODY, text);
                    let w = tfidf_weight(&mut self.df_cache, &term, freq, num_non_empty, threshold)?;
                    if w == 0.0 {
                        stats.terms_pruned += 1;
                        continue;
                    }
                    writeln!(out, "{} {:.6}", term.text, w)?;
                    stats.terms_written += 1;
                }
                writeln!(out)?;
                stats.docs_written += 1;
            }

            if i % PROGRESS_INTERVAL == 0 {
                tracing::info!(docs = i, "dump progress");
            }
        }
        out.flush()?;
        tracing::info!(cached_terms = self.df_cache.len(), "tf-idf dump complete");
        Ok(stats)
    }
}
