//! Raw document dump, optionally restricted to a docid filter and stripped of
//! markup. Each surviving document is written as
//! `<doc> DOC_ID\nTEXT\n</doc>\n`.

use crate::markup::strip_markup;
use crate::reader::IndexReader;
use crate::{ExportError, Result, FIELD_RAW, PROGRESS_INTERVAL};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Reads the docids to keep. Rows are whitespace separated and the docid is
/// the third column, as in a TREC run or qrels file. Blank lines are skipped;
/// shorter rows are rejected.
pub fn load_docid_filter<P: AsRef<Path>>(path: P) -> Result<HashSet<String>> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let mut docids = HashSet::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let docid = line.split_whitespace().nth(2).ok_or_else(|| ExportError::Parse {
            path: path.to_path_buf(),
            line: n + 1,
            reason: "expected at least 3 columns with the docid in the third".into(),
        })?;
        docids.insert(docid.to_string());
    }
    tracing::info!(path = %path.display(), docids = docids.len(), "loaded docid filter");
    Ok(docids)
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RawDumpStats {
    pub docs_seen: u64,
    pub docs_written: u64,
    pub docs_filtered: u64,
}

pub struct RawDumper<'a> {
    reader: &'a IndexReader,
}

impl<'a> RawDumper<'a> {
    pub fn new(reader: &'a IndexReader) -> Self {
        Self { reader }
    }

    pub fn run<W: Write>(
        &self,
        id_field: &str,
        out: W,
        filter: Option<&HashSet<String>>,
        strip: bool,
    ) -> Result<RawDumpStats> {
        let mut out = BufWriter::new(out);
        self.reader.check_id_field(id_field)?;

        let mut stats = RawDumpStats::default();
        for i in 0..self.reader.num_docs() {
            let docid = self.reader.doc_id(i, id_field)?;
            stats.docs_seen += 1;
            if i % PROGRESS_INTERVAL == 0 {
                tracing::info!(docs = i, "dump progress");
            }
            if filter.is_some_and(|f| !f.contains(docid)) {
                stats.docs_filtered += 1;
                continue;
            }

            let raw = self
                .reader
                .stored_field(i, FIELD_RAW)
                .ok_or(ExportError::NotStored("Raw documents"))?;
            let text = if strip { strip_markup(raw) } else { raw.to_string() };

            writeln!(out, "<doc> {docid}")?;
            writeln!(out, "{text}")?;
            writeln!(out, "</doc>")?;
            stats.docs_written += 1;
        }
        out.flush()?;
        tracing::info!(written = stats.docs_written, filtered = stats.docs_filtered, "raw dump complete");
        Ok(stats)
    }
}
