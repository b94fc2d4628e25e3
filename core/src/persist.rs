use crate::{Ordinal, Posting, Result, StoredFields, TermId, TermVector};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs::{create_dir_all, File};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

/// Field name -> term text -> term id.
pub type Dictionary = HashMap<String, HashMap<String, TermId>>;

/// Per-document stored term vectors, keyed by field name.
pub type DocVectors = BTreeMap<String, TermVector>;

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    /// Number of documents with at least one term in each field.
    pub field_doc_counts: BTreeMap<String, u32>,
    /// Field the external id map was built from.
    pub id_field: String,
    pub created_at: String,
    pub version: u32,
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn dictionary(&self) -> PathBuf { self.root.join("dictionary.bin") }
    fn docs(&self) -> PathBuf { self.root.join("docs.bin") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
    fn postings_dir(&self) -> PathBuf { self.root.join("postings") }
    fn vectors_dir(&self) -> PathBuf { self.root.join("vectors") }
    fn doc_id_map(&self) -> PathBuf { self.root.join("doc_id_map.bin") }
}

fn write_bin<T: Serialize>(path: PathBuf, value: &T) -> Result<()> {
    let mut f = File::create(path)?;
    let bytes = bincode::serialize(value)?;
    f.write_all(&bytes)?;
    Ok(())
}

fn read_bin<T: for<'de> Deserialize<'de>>(path: PathBuf) -> Result<T> {
    let mut f = File::open(path)?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    Ok(bincode::deserialize(&buf)?)
}

pub fn save_dictionary(paths: &IndexPaths, dict: &Dictionary) -> Result<()> {
    create_dir_all(&paths.root)?;
    write_bin(paths.dictionary(), dict)
}

pub fn load_dictionary(paths: &IndexPaths) -> Result<Dictionary> {
    read_bin(paths.dictionary())
}

pub fn save_docs(paths: &IndexPaths, docs: &[StoredFields]) -> Result<()> {
    create_dir_all(&paths.root)?;
    write_bin(paths.docs(), &docs)
}

pub fn load_docs(paths: &IndexPaths) -> Result<Vec<StoredFields>> {
    read_bin(paths.docs())
}

pub fn save_postings_for_term(paths: &IndexPaths, term_id: TermId, postings: &[Posting]) -> Result<()> {
    let dir = paths.postings_dir();
    create_dir_all(&dir)?;
    write_bin(dir.join(format!("{term_id:08}.postings.bin")), &postings)
}

pub fn load_postings_for_term(paths: &IndexPaths, term_id: TermId) -> Result<Vec<Posting>> {
    read_bin(paths.postings_dir().join(format!("{term_id:08}.postings.bin")))
}

pub fn save_vectors_for_doc(paths: &IndexPaths, ordinal: Ordinal, vectors: &DocVectors) -> Result<()> {
    let dir = paths.vectors_dir();
    create_dir_all(&dir)?;
    write_bin(dir.join(format!("{ordinal:08}.vec.bin")), vectors)
}

/// `Ok(None)` when no vectors were stored for the document at all.
pub fn load_vectors_for_doc(paths: &IndexPaths, ordinal: Ordinal) -> Result<Option<DocVectors>> {
    let file = paths.vectors_dir().join(format!("{ordinal:08}.vec.bin"));
    match read_bin(file) {
        Ok(v) => Ok(Some(v)),
        Err(crate::ExportError::Io(e)) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta())?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

pub fn save_doc_id_map(paths: &IndexPaths, map: &HashMap<String, Ordinal>) -> Result<()> {
    create_dir_all(&paths.root)?;
    write_bin(paths.doc_id_map(), map)
}

pub fn load_doc_id_map(paths: &IndexPaths) -> Result<HashMap<String, Ordinal>> {
    read_bin(paths.doc_id_map())
}

/// Load the header tables a snapshot keeps in memory: meta, stored fields,
/// external id map and dictionary. Postings and vectors stay on disk.
pub fn load_index_header(
    paths: &IndexPaths,
) -> Result<(MetaFile, Vec<StoredFields>, HashMap<String, Ordinal>, Dictionary)> {
    let meta = load_meta(paths)?;
    let docs = load_docs(paths)?;
    let doc_id_map = load_doc_id_map(paths)?;
    let dict = load_dictionary(paths)?;
    Ok((meta, docs, doc_id_map, dict))
}
