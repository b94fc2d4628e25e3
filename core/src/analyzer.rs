use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use unicode_normalization::UnicodeNormalization;
use std::collections::HashSet;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        // Lucene's English stop set.
        let words: &[&str] = &[
            "a","an","and","are","as","at","be","but","by","for","if","in","into","is","it",
            "no","not","of","on","or","such","that","the","their","then","there","these",
            "they","this","to","was","will","with"
        ];
        words.iter().copied().collect()
    };
}

/// English analysis chain used for topics: NFKC, lowercase, word split,
/// optional stopword removal, Snowball English stemming.
pub struct Analyzer {
    stemmer: Stemmer,
    keep_stopwords: bool,
}

impl Default for Analyzer {
    fn default() -> Self { Self::new(false) }
}

impl Analyzer {
    pub fn new(keep_stopwords: bool) -> Self {
        Self { stemmer: Stemmer::create(Algorithm::English), keep_stopwords }
    }

    pub fn analyze(&self, text: &str) -> Vec<String> {
        let normalized = text.nfkc().collect::<String>().to_lowercase();
        WORD.find_iter(&normalized)
            .map(|m| m.as_str())
            .filter(|token| self.keep_stopwords || !STOPWORDS.contains(token))
            .map(|token| self.stemmer.stem(token).into_owned())
            .collect()
    }
}
