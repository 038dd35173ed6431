use lyrics_core::tokenizer::{tokenize, Analyzer, AnalyzerConfig};

#[test]
fn it_lowercases_and_drops_punctuation() {
    let words: Vec<String> = tokenize("Don't STOP me now!").into_iter().map(|(w, _)| w).collect();
    assert_eq!(words, vec!["dont", "stop", "me", "now"]);
}

#[test]
fn it_keeps_digits_and_letters() {
    let words: Vec<String> = tokenize("99 Luftballons, über 2x").into_iter().map(|(w, _)| w).collect();
    assert_eq!(words, vec!["99", "luftballons", "über", "2x"]);
}

#[test]
fn it_stems_when_enabled() {
    let analyzer = Analyzer::new(AnalyzerConfig { remove_stopwords: false, stem: true });
    let words = analyzer.terms("Running runs");
    assert_eq!(words, vec!["run", "run"]);
}

#[test]
fn it_filters_stopwords_when_enabled() {
    let analyzer = Analyzer::new(AnalyzerConfig { remove_stopwords: true, stem: false });
    let words = analyzer.terms("The quick brown fox and the lazy dog");
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"and".to_string()));
    assert!(words.contains(&"fox".to_string()));
}

#[test]
fn default_keeps_stopwords() {
    let words = Analyzer::default().terms("love is love");
    assert_eq!(words, vec!["love", "is", "love"]);
}

#[test]
fn config_reads_environment() {
    // Only this test touches these variables.
    std::env::set_var("LYRICS_REMOVE_STOPWORDS", "true");
    std::env::set_var("LYRICS_STEM", "1");
    let cfg = AnalyzerConfig::from_env();
    assert_eq!(cfg, AnalyzerConfig { remove_stopwords: true, stem: true });

    std::env::set_var("LYRICS_STEM", "off");
    std::env::remove_var("LYRICS_REMOVE_STOPWORDS");
    assert_eq!(AnalyzerConfig::from_env(), AnalyzerConfig::default());
}
