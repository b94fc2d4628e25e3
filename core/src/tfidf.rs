use crate::reader::IndexReader;
use crate::{ExportError, Result, Term};
use std::collections::HashMap;

/// Memoized document frequencies for one export run.
///
/// Failed lookups are logged and never cached, so a later occurrence of the
/// same term probes the index again.
pub struct DocFreqCache<'a> {
    reader: &'a IndexReader,
    cache: HashMap<Term, u32>,
}

impl<'a> DocFreqCache<'a> {
    pub fn new(reader: &'a IndexReader) -> Self {
        Self { reader, cache: HashMap::new() }
    }

    /// `None` when the index could not answer; `Some(0)` is a real answer.
    pub fn get(&mut self, term: &Term) -> Option<u32> {
        if let Some(&df) = self.cache.get(term) {
            return Some(df);
        }
        match self.reader.doc_freq(term) {
            Ok(df) => {
                self.cache.insert(term.clone(), df);
                Some(df)
            }
            Err(e) => {
                tracing::error!(%term, error = %e, "cannot find term in index");
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

/// TF-IDF weight of `term` in a document: `tf * ln(num_docs / df)`.
///
/// Returns exactly `0.0` when `df < threshold`; callers drop zero weights.
/// A failed df lookup counts as df = 0. With threshold 0 such a term is not
/// pruned and its weight comes out as `+inf`. This matches the historical
/// output of the tool and is kept as is.
/// A df of 0 reported by a successful lookup is impossible for a term taken
/// from a document's own vector and is returned as an error.
pub fn tfidf_weight(cache: &mut DocFreqCache<'_>, term: &Term, term_freq: u64, num_docs: u32, threshold: u32) -> Result<f32> {
    let (df, looked_up) = match cache.get(term) {
        Some(df) => (df, true),
        None => (0, false),
    };
    if df < threshold {
        return Ok(0.0);
    }
    if df == 0 {
        if looked_up {
            return Err(ExportError::DegenerateDocFrequency(term.clone()));
        }
        tracing::warn!(%term, "document frequency unavailable, weight is unbounded");
    }
    Ok(weight(term_freq, num_docs, df))
}

#[inline]
fn weight(term_freq: u64, num_docs: u32, df: u32) -> f32 {
    (term_freq as f64 * (num_docs as f64 / df as f64).ln()) as f32
}

/// Minimum document frequency a term needs to survive the dump.
pub struct DropThreshold;

impl DropThreshold {
    /// An absolute count wins when set; otherwise the ratio is applied to the
    /// number of non-empty documents in f32 and truncated.
    pub fn resolve(by_num: u32, by_ratio: f32, non_empty_docs: u32) -> Result<u32> {
        if !by_ratio.is_finite() || by_ratio < 0.0 {
            return Err(ExportError::Configuration(format!("invalid df drop ratio {by_ratio}")));
        }
        if by_num > 0 {
            return Ok(by_num);
        }
        if by_ratio > 0.0 {
            return Ok((non_empty_docs as f32 * by_ratio) as u32);
        }
        Ok(0)
    }
}
