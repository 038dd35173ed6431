use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use std::collections::HashSet;

lazy_static! {
    // Anything that is not a letter, mark, digit or whitespace is punctuation.
    static ref PUNCT: Regex = Regex::new(r"[^\p{L}\p{M}\p{N}\s]").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a", "an", "the", "is", "are", "was", "were", "am", "be", "been", "being",
            "and", "or", "but", "if", "then", "this", "that", "these", "those",
            "in", "on", "at", "for", "with", "of", "to", "by", "as", "from",
        ];
        words.iter().copied().collect()
    };
}

pub fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Optional stages of the analysis pipeline. Both are off by default, which
/// leaves plain lowercase alphanumeric terms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub remove_stopwords: bool,
    pub stem: bool,
}

impl AnalyzerConfig {
    /// Read `LYRICS_REMOVE_STOPWORDS` and `LYRICS_STEM` from the environment.
    pub fn from_env() -> Self {
        Self {
            remove_stopwords: env_flag("LYRICS_REMOVE_STOPWORDS"),
            stem: env_flag("LYRICS_STEM"),
        }
    }
}

fn env_flag(name: &str) -> bool {
    match std::env::var(name) {
        Ok(val) => parse_flag(&val),
        Err(_) => false,
    }
}

fn parse_flag(val: &str) -> bool {
    matches!(val.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Tokenization shared by indexing and querying.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analyzer {
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self { Self { config } }

    pub fn config(&self) -> AnalyzerConfig { self.config }

    /// Split text into (term, position) pairs. Positions count every
    /// whitespace-separated word, so dropping a stopword leaves a gap.
    pub fn analyze(&self, text: &str) -> Vec<(String, usize)> {
        let normalized = text.nfkc().collect::<String>().to_lowercase();
        let stripped = PUNCT.replace_all(&normalized, "");
        let mut tokens = Vec::new();
        for (pos, word) in stripped.split_whitespace().enumerate() {
            if self.config.remove_stopwords && is_stopword(word) { continue; }
            let term = if self.config.stem {
                STEMMER.stem(word).into_owned()
            } else {
                word.to_string()
            };
            tokens.push((term, pos));
        }
        tokens
    }

    /// Terms only, in document order.
    pub fn terms(&self, text: &str) -> Vec<String> {
        self.analyze(text).into_iter().map(|(term, _)| term).collect()
    }
}

/// Tokenize with the default analyzer: NFKC, lowercase, punctuation removed.
pub fn tokenize(text: &str) -> Vec<(String, usize)> {
    Analyzer::default().analyze(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let t = tokenize("Love is LOVE!");
        let words: Vec<&str> = t.iter().map(|(w, _)| w.as_str()).collect();
        assert_eq!(words, vec!["love", "is", "love"]);
    }

    #[test]
    fn punctuation_only_is_empty() {
        assert!(tokenize("?! ... --").is_empty());
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn stopword_gap_keeps_positions() {
        let analyzer = Analyzer::new(AnalyzerConfig { remove_stopwords: true, stem: false });
        let t = analyzer.analyze("the night is young");
        assert_eq!(t, vec![("night".to_string(), 1), ("young".to_string(), 3)]);
    }

    #[test]
    fn flag_parsing() {
        assert!(parse_flag("TRUE"));
        assert!(parse_flag(" 1 "));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("nope"));
    }
}
