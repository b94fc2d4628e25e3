use export_core::persist::{
    save_dictionary, save_doc_id_map, save_docs, save_meta, save_postings_for_term, save_vectors_for_doc, Dictionary,
    DocVectors, IndexPaths, MetaFile,
};
use export_core::raw::RawDumper;
use export_core::reader::IndexReader;
use export_core::tfidf::DocFreqCache;
use export_core::vectors::VectorDumper;
use export_core::{ExportError, Ordinal, Posting, StoredFields, Term, FIELD_BODY, FIELD_ID, FIELD_RAW};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

struct FixtureDoc<'a> {
    id: &'a str,
    raw: Option<&'a str>,
    vector: Option<Vec<(&'a str, u64)>>,
}

fn doc<'a>(id: &'a str, raw: &'a str, vector: &[(&'a str, u64)]) -> FixtureDoc<'a> {
    FixtureDoc { id, raw: Some(raw), vector: Some(vector.to_vec()) }
}

/// Writes a snapshot whose dictionary and postings are derived from the
/// documents' body vectors. Term ids follow first appearance.
fn write_index(dir: &Path, docs: &[FixtureDoc]) {
    let paths = IndexPaths::new(dir);
    let mut stored: Vec<StoredFields> = Vec::new();
    let mut doc_id_map: HashMap<String, Ordinal> = HashMap::new();
    let mut terms: HashMap<String, u32> = HashMap::new();
    let mut postings: BTreeMap<u32, Vec<Posting>> = BTreeMap::new();
    let mut non_empty = 0;

    for (ordinal, d) in docs.iter().enumerate() {
        let ordinal = ordinal as Ordinal;
        let mut fields = StoredFields::new();
        fields.insert(FIELD_ID.to_string(), d.id.to_string());
        if let Some(raw) = d.raw {
            fields.insert(FIELD_RAW.to_string(), raw.to_string());
        }
        stored.push(fields);
        doc_id_map.insert(d.id.to_string(), ordinal);

        if let Some(vector) = &d.vector {
            if !vector.is_empty() {
                non_empty += 1;
            }
            for (text, freq) in vector {
                let next = terms.len() as u32;
                let tid = *terms.entry(text.to_string()).or_insert(next);
                postings.entry(tid).or_default().push(Posting { ordinal, freq: *freq as u32 });
            }
            let mut vectors = DocVectors::new();
            vectors.insert(FIELD_BODY.to_string(), vector.iter().map(|(t, f)| (t.to_string(), *f)).collect());
            save_vectors_for_doc(&paths, ordinal, &vectors).unwrap();
        }
    }

    let mut dict = Dictionary::new();
    dict.insert(FIELD_BODY.to_string(), terms);
    save_dictionary(&paths, &dict).unwrap();
    for (tid, plist) in &postings {
        save_postings_for_term(&paths, *tid, plist).unwrap();
    }
    save_docs(&paths, &stored).unwrap();
    save_doc_id_map(&paths, &doc_id_map).unwrap();
    let meta = MetaFile {
        num_docs: docs.len() as u32,
        field_doc_counts: BTreeMap::from([(FIELD_BODY.to_string(), non_empty)]),
        id_field: FIELD_ID.to_string(),
        created_at: "2024-01-01T00:00:00Z".into(),
        version: 1,
    };
    save_meta(&paths, &meta).unwrap();
}

fn cat_dog_docs() -> Vec<FixtureDoc<'static>> {
    vec![
        doc("d1", "<p>the <b>cat</b> sat</p>", &[("cat", 2)]),
        doc("d2", "a cat", &[("cat", 1)]),
        doc("d3", "<html><body>a  dog</body></html>", &[("dog", 1)]),
    ]
}

fn dump_vectors(reader: &IndexReader, threshold: u32) -> export_core::Result<String> {
    let mut buf = Vec::new();
    VectorDumper::new(reader).run(FIELD_ID, &mut buf, threshold)?;
    Ok(String::from_utf8(buf).unwrap())
}

#[test]
fn tfidf_dump_without_threshold() {
    let dir = tempdir().unwrap();
    write_index(dir.path(), &cat_dog_docs());
    let reader = IndexReader::open(dir.path()).unwrap();

    let out = dump_vectors(&reader, 0).unwrap();
    assert_eq!(out, "d1\ncat 0.810930\n\nd2\ncat 0.405465\n\nd3\ndog 1.098612\n\n");
}

#[test]
fn tfidf_dump_prunes_rare_terms_but_keeps_header() {
    let dir = tempdir().unwrap();
    write_index(dir.path(), &cat_dog_docs());
    let reader = IndexReader::open(dir.path()).unwrap();

    let out = dump_vectors(&reader, 2).unwrap();
    assert_eq!(out, "d1\ncat 0.810930\n\nd2\ncat 0.405465\n\nd3\n\n");
}

#[test]
fn tfidf_dump_is_repeatable() {
    let dir = tempdir().unwrap();
    write_index(dir.path(), &cat_dog_docs());
    let reader = IndexReader::open(dir.path()).unwrap();

    assert_eq!(dump_vectors(&reader, 0).unwrap(), dump_vectors(&reader, 0).unwrap());
}

#[test]
fn tfidf_dump_keeps_vector_order() {
    let dir = tempdir().unwrap();
    write_index(
        dir.path(),
        &[doc("a", "", &[("zebra", 1), ("apple", 3)]), doc("b", "", &[("apple", 1)]), doc("c", "", &[("pear", 1)])],
    );
    let reader = IndexReader::open(dir.path()).unwrap();

    let out = dump_vectors(&reader, 0).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "a");
    assert!(lines[1].starts_with("zebra "));
    assert!(lines[2].starts_with("apple "));
}

#[test]
fn wrong_id_field_fails_before_output() {
    let dir = tempdir().unwrap();
    write_index(dir.path(), &cat_dog_docs());
    let reader = IndexReader::open(dir.path()).unwrap();

    let mut buf = Vec::new();
    let err = VectorDumper::new(&reader).run("docno", &mut buf, 0).unwrap_err();
    assert!(matches!(err, ExportError::Configuration(_)));
    assert!(buf.is_empty());
}

#[test]
fn empty_index_is_a_configuration_error() {
    let dir = tempdir().unwrap();
    write_index(dir.path(), &[]);
    let reader = IndexReader::open(dir.path()).unwrap();

    let err = RawDumper::new(&reader).run(FIELD_ID, Vec::new(), None, false).unwrap_err();
    assert!(matches!(err, ExportError::Configuration(_)));
}

#[test]
fn missing_body_doc_count_is_a_configuration_error() {
    let dir = tempdir().unwrap();
    write_index(dir.path(), &cat_dog_docs());
    let meta = MetaFile {
        num_docs: 3,
        field_doc_counts: BTreeMap::new(),
        id_field: FIELD_ID.to_string(),
        created_at: "2024-01-01T00:00:00Z".into(),
        version: 1,
    };
    save_meta(&IndexPaths::new(dir.path()), &meta).unwrap();
    let reader = IndexReader::open(dir.path()).unwrap();

    let mut buf = Vec::new();
    let err = VectorDumper::new(&reader).run(FIELD_ID, &mut buf, 0).unwrap_err();
    assert!(matches!(err, ExportError::Configuration(_)));
    assert!(buf.is_empty());
}

#[test]
fn empty_document_is_skipped() {
    let dir = tempdir().unwrap();
    write_index(dir.path(), &[doc("d1", "", &[("cat", 1)]), doc("d2", "", &[]), doc("d3", "", &[("dog", 1)])]);
    let reader = IndexReader::open(dir.path()).unwrap();

    let mut buf = Vec::new();
    let stats = VectorDumper::new(&reader).run(FIELD_ID, &mut buf, 0).unwrap();
    let out = String::from_utf8(buf).unwrap();
    assert!(!out.contains("d2"));
    assert_eq!(stats.docs_empty, 1);
    assert_eq!(stats.docs_written, 2);
}

#[test]
fn missing_vectors_abort_with_partial_output() {
    let dir = tempdir().unwrap();
    let docs = vec![
        doc("d1", "", &[("cat", 1)]),
        FixtureDoc { id: "d2", raw: None, vector: None },
        doc("d3", "", &[("cat", 1)]),
    ];
    write_index(dir.path(), &docs);
    let reader = IndexReader::open(dir.path()).unwrap();

    let mut buf = Vec::new();
    let err = VectorDumper::new(&reader).run(FIELD_ID, &mut buf, 0).unwrap_err();
    assert!(matches!(err, ExportError::NotStored(_)));
    assert!(String::from_utf8(buf).unwrap().starts_with("d1\n"));
}

#[test]
fn failed_df_lookup_falls_back_to_zero() {
    let dir = tempdir().unwrap();
    write_index(dir.path(), &cat_dog_docs());
    // "dog" is term 1; losing its postings makes the lookup fail.
    fs::remove_file(dir.path().join("postings/00000001.postings.bin")).unwrap();
    let reader = IndexReader::open(dir.path()).unwrap();

    let pruned = dump_vectors(&reader, 1).unwrap();
    assert!(pruned.ends_with("d3\n\n"));

    let unbounded = dump_vectors(&reader, 0).unwrap();
    assert!(unbounded.ends_with("d3\ndog inf\n\n"));
}

#[test]
fn df_zero_from_a_good_lookup_is_an_error() {
    let dir = tempdir().unwrap();
    write_index(dir.path(), &cat_dog_docs());
    save_dictionary(&IndexPaths::new(dir.path()), &Dictionary::new()).unwrap();
    let reader = IndexReader::open(dir.path()).unwrap();

    let err = dump_vectors(&reader, 0).unwrap_err();
    assert!(matches!(err, ExportError::DegenerateDocFrequency(_)));
}

#[test]
fn df_cache_memoizes_successful_lookups() {
    let dir = tempdir().unwrap();
    write_index(dir.path(), &cat_dog_docs());
    let reader = IndexReader::open(dir.path()).unwrap();
    let cat = Term::new(FIELD_BODY, "cat");
    let dog = Term::new(FIELD_BODY, "dog");

    let mut cache = DocFreqCache::new(&reader);
    assert_eq!(cache.get(&cat), Some(2));
    fs::remove_dir_all(dir.path().join("postings")).unwrap();
    assert_eq!(cache.get(&cat), Some(2));
    assert_eq!(cache.get(&dog), None);
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get(&Term::new(FIELD_BODY, "bird")), Some(0));
}

#[test]
fn raw_dump_writes_every_document_in_order() {
    let dir = tempdir().unwrap();
    write_index(dir.path(), &cat_dog_docs());
    let reader = IndexReader::open(dir.path()).unwrap();

    let mut buf = Vec::new();
    let stats = RawDumper::new(&reader).run(FIELD_ID, &mut buf, None, false).unwrap();
    assert_eq!(stats.docs_written, 3);
    assert_eq!(
        String::from_utf8(buf).unwrap(),
        "<doc> d1\n<p>the <b>cat</b> sat</p>\n</doc>\n<doc> d2\na cat\n</doc>\n<doc> d3\n<html><body>a  dog</body></html>\n</doc>\n"
    );
}

#[test]
fn raw_dump_with_filter_and_stripping() {
    let dir = tempdir().unwrap();
    write_index(dir.path(), &cat_dog_docs());
    let reader = IndexReader::open(dir.path()).unwrap();
    let filter: HashSet<String> = ["d3", "d1", "missing"].iter().map(|s| s.to_string()).collect();

    let mut buf = Vec::new();
    let stats = RawDumper::new(&reader).run(FIELD_ID, &mut buf, Some(&filter), true).unwrap();
    assert_eq!(stats.docs_filtered, 1);
    assert_eq!(String::from_utf8(buf).unwrap(), "<doc> d1\nthe cat sat\n</doc>\n<doc> d3\na dog\n</doc>\n");
}

#[test]
fn raw_dump_requires_stored_text() {
    let dir = tempdir().unwrap();
    let docs = vec![doc("d1", "x", &[("cat", 1)]), FixtureDoc { id: "d2", raw: None, vector: Some(vec![("cat", 1)]) }];
    write_index(dir.path(), &docs);
    let reader = IndexReader::open(dir.path()).unwrap();

    let err = RawDumper::new(&reader).run(FIELD_ID, Vec::new(), None, false).unwrap_err();
    assert!(matches!(err, ExportError::NotStored(_)));
}

#[derive(Clone, Default)]
struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl Write for LogCapture {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn raw_dump_reports_progress_for_filtered_documents() {
    let dir = tempdir().unwrap();
    write_index(dir.path(), &cat_dog_docs());
    let reader = IndexReader::open(dir.path()).unwrap();
    let filter: HashSet<String> = ["d2".to_string()].into_iter().collect();

    let capture = LogCapture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .finish();
    let stats = tracing::subscriber::with_default(subscriber, || {
        RawDumper::new(&reader).run(FIELD_ID, Vec::new(), Some(&filter), false).unwrap()
    });
    assert_eq!(stats.docs_written, 1);

    let logs = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
    assert!(logs.contains("dump progress"), "logs: {logs}");
    assert!(logs.contains("docs=0"), "logs: {logs}");
}
