use export_core::analyzer::Analyzer;

#[test]
fn it_normalizes_and_stems() {
    let words = Analyzer::default().analyze("Running Runners RUN! The café's menu.");
    // Stemming to "run" should appear
    assert!(words.contains(&"run".to_string()));
    // NFKC keeps the accent but folds compatibility forms
    assert!(words.iter().any(|w| w.starts_with("caf")));
}

#[test]
fn it_filters_stopwords() {
    let words = Analyzer::default().analyze("The quick brown fox and the lazy dog");
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"and".to_string()));
    assert!(words.contains(&"fox".to_string()));
}

#[test]
fn it_is_deterministic() {
    let a = Analyzer::default();
    let text = "International Organized Crime";
    assert_eq!(a.analyze(text), a.analyze(text));
}
