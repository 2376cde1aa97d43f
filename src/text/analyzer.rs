// Analyzer: turns normalized text into the unigram terms the vectorizer counts.
//
// Tokens are whitespace-separated runs of at least two characters. Stop words
// are dropped before stemming, so the stop list is compared against surface
// forms. The analyzer is serialized inside the model artifact: the stop list
// and the stemming switch travel with the weights they were fit against.

use std::collections::BTreeSet;

use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use stop_words::{get, LANGUAGE};

use super::normalize::normalize;

/// Shortest token (in characters) the analyzer keeps.
pub const MIN_TOKEN_CHARS: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analyzer {
    stop_words: BTreeSet<String>,
    stem: bool,
}

impl Analyzer {
    /// Analyzer using the English stop list from the `stop-words` crate.
    ///
    /// Entries are run through the normalizer so contractions like "don't"
    /// match the punctuation-free tokens they will be compared against.
    pub fn english(stem: bool) -> Self {
        let raw: Vec<String> = get(LANGUAGE::English);
        Self::with_stop_words(raw, stem)
    }

    pub fn with_stop_words<I, S>(words: I, stem: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stop_words = words
            .into_iter()
            .map(|w| normalize(w.as_ref()).trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();
        Self { stop_words, stem }
    }

    pub fn stems(&self) -> bool {
        self.stem
    }

    pub fn stop_words(&self) -> &BTreeSet<String> {
        &self.stop_words
    }

    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(token)
    }

    /// Split already-normalized text into terms.
    pub fn terms(&self, normalized: &str) -> Vec<String> {
        let stemmer = self.stem.then(|| Stemmer::create(Algorithm::English));
        normalized
            .split_whitespace()
            .filter(|t| t.chars().count() >= MIN_TOKEN_CHARS)
            .filter(|t| !self.is_stop_word(t))
            .map(|t| match &stemmer {
                Some(s) => s.stem(t).into_owned(),
                None => t.to_string(),
            })
            .collect()
    }

    /// Normalize raw text, then split it into terms.
    pub fn analyze(&self, raw: &str) -> Vec<String> {
        self.terms(&normalize(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_tokens_and_stop_words_dropped() {
        let analyzer = Analyzer::with_stop_words(["the", "of"], false);
        assert_eq!(
            analyzer.terms("the bank of a italy"),
            vec!["bank".to_string(), "italy".to_string()]
        );
    }

    #[test]
    fn test_stop_words_are_normalized() {
        let analyzer = Analyzer::with_stop_words(["Don't"], false);
        assert!(analyzer.is_stop_word("dont"));
    }

    #[test]
    fn test_stemming_merges_inflections() {
        let analyzer = Analyzer::with_stop_words(Vec::<String>::new(), true);
        assert_eq!(analyzer.terms("confirms"), analyzer.terms("confirm"));
        assert_eq!(analyzer.terms("vaccines"), analyzer.terms("vaccine"));
    }

    #[test]
    fn test_english_list_is_populated() {
        let analyzer = Analyzer::english(true);
        assert!(analyzer.is_stop_word("the"));
        assert!(analyzer.stop_words().len() > 100);
    }

    #[test]
    fn test_analyze_empty() {
        assert!(Analyzer::english(true).analyze("").is_empty());
    }
}
