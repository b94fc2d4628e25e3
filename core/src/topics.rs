//! Query topics: reading topic files and writing their analyzed tokens.

use crate::analyzer::Analyzer;
use crate::{ExportError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

/// Topic id -> field name -> text, ascending by id.
pub type Topics = BTreeMap<u32, HashMap<String, String>>;

lazy_static! {
    static ref TREC_TOP: Regex = Regex::new(r"(?s)<top>(.*?)</top>").expect("valid regex");
    static ref TREC_TAG: Regex = Regex::new(r"<(num|title|desc|narr)>").expect("valid regex");
    static ref WEB_TOPIC: Regex = Regex::new(r#"(?s)<topic\s+number="([^"]*)"[^>]*>(.*?)</topic>"#).expect("valid regex");
    static ref WEB_QUERY: Regex = Regex::new(r"(?s)<query>(.*?)</query>").expect("valid regex");
    static ref WEB_DESC: Regex = Regex::new(r"(?s)<description>(.*?)</description>").expect("valid regex");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicFormat {
    /// Classic TREC `<top>` SGML topics.
    Trec,
    /// TREC Web track XML topics.
    WebXml,
    /// `id<TAB>title` per line.
    Tsv,
}

impl FromStr for TopicFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "trec" => Ok(TopicFormat::Trec),
            "webxml" => Ok(TopicFormat::WebXml),
            "tsv" => Ok(TopicFormat::Tsv),
            other => Err(ExportError::Configuration(format!(
                "unknown topic reader {other}, expected one of trec, webxml, tsv"
            ))),
        }
    }
}

impl TopicFormat {
    pub fn read<P: AsRef<Path>>(self, path: P) -> Result<Topics> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let topics = match self {
            TopicFormat::Trec => parse_trec(&text, path)?,
            TopicFormat::WebXml => parse_webxml(&text, path)?,
            TopicFormat::Tsv => parse_tsv(&text, path)?,
        };
        tracing::info!(path = %path.display(), format = ?self, topics = topics.len(), "read topics");
        Ok(topics)
    }
}

fn collapse(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}

fn parse_id(raw: &str, path: &Path, line: usize) -> Result<u32> {
    raw.trim().parse().map_err(|_| ExportError::Parse {
        path: path.to_path_buf(),
        line,
        reason: format!("invalid topic id {:?}", raw.trim()),
    })
}

fn parse_trec(text: &str, path: &Path) -> Result<Topics> {
    let mut topics = Topics::new();
    for top in TREC_TOP.captures_iter(text) {
        let Some(body) = top.get(1) else { continue };
        let body_str = body.as_str();
        let tags: Vec<_> = TREC_TAG.captures_iter(body_str).collect();

        let mut id = None;
        let mut fields = HashMap::new();
        for (i, tag) in tags.iter().enumerate() {
            let (Some(whole), Some(name)) = (tag.get(0), tag.get(1)) else { continue };
            let end = tags.get(i + 1).and_then(|t| t.get(0)).map_or(body_str.len(), |m| m.start());
            let section = &body_str[whole.end()..end];
            match name.as_str() {
                "num" => {
                    let raw = section.trim().trim_start_matches("Number:");
                    id = Some(parse_id(raw, path, line_of(text, body.start() + whole.start()))?);
                }
                "title" => {
                    fields.insert("title".to_string(), collapse(section));
                }
                "desc" => {
                    fields.insert("description".to_string(), collapse(section.trim().trim_start_matches("Description:")));
                }
                _ => {
                    fields.insert("narrative".to_string(), collapse(section.trim().trim_start_matches("Narrative:")));
                }
            }
        }
        let id = id.ok_or_else(|| ExportError::Parse {
            path: path.to_path_buf(),
            line: line_of(text, body.start()),
            reason: "topic without <num>".into(),
        })?;
        topics.insert(id, fields);
    }
    Ok(topics)
}

fn parse_webxml(text: &str, path: &Path) -> Result<Topics> {
    let mut topics = Topics::new();
    for topic in WEB_TOPIC.captures_iter(text) {
        let (Some(whole), Some(number), Some(body)) = (topic.get(0), topic.get(1), topic.get(2)) else { continue };
        let id = parse_id(number.as_str(), path, line_of(text, whole.start()))?;
        let mut fields = HashMap::new();
        if let Some(q) = WEB_QUERY.captures(body.as_str()).and_then(|c| c.get(1)) {
            fields.insert("title".to_string(), collapse(q.as_str()));
        }
        if let Some(d) = WEB_DESC.captures(body.as_str()).and_then(|c| c.get(1)) {
            fields.insert("description".to_string(), collapse(d.as_str()));
        }
        topics.insert(id, fields);
    }
    Ok(topics)
}

fn parse_tsv(text: &str, path: &Path) -> Result<Topics> {
    let mut topics = Topics::new();
    for (n, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let (id, title) = line.split_once('\t').ok_or_else(|| ExportError::Parse {
            path: path.to_path_buf(),
            line: n + 1,
            reason: "expected id<TAB>title".into(),
        })?;
        let id = parse_id(id, path, n + 1)?;
        topics.insert(id, HashMap::from([("title".to_string(), title.trim().to_string())]));
    }
    Ok(topics)
}

/// Writes `ID\nTOKEN_1 ... TOKEN_N\n\n` per topic in ascending id order.
/// A topic without `field` is written with an empty token line.
pub fn write_tokenized_topics<W: Write>(topics: &Topics, analyzer: &Analyzer, out: W, field: &str) -> Result<usize> {
    let mut out = BufWriter::new(out);
    for (id, fields) in topics {
        let tokens = match fields.get(field) {
            Some(content) => analyzer.analyze(content),
            None => {
                tracing::debug!(id, field, "topic has no such field");
                Vec::new()
            }
        };
        writeln!(out, "{id}")?;
        writeln!(out, "{}", tokens.join(" "))?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(topics.len())
}
