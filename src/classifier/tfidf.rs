// TF-IDF vectorizer over analyzer unigrams.
//
// Vocabulary and IDF weights are frozen at fit time. Inference projects a
// document onto that vocabulary: unknown terms are dropped silently, known
// terms get raw count * IDF, and the row is L2-normalized.
//
// IDF is the smoothed form ln((1 + n) / (1 + df)) + 1, which keeps every
// vocabulary term's weight strictly positive.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ClassifierError, Result};
use crate::text::Analyzer;

/// Sparse feature row: `(feature index, value)` pairs sorted by index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    /// Build from arbitrary pairs; sorts by index and sums duplicates.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (usize, f64)>) -> Self {
        let mut merged: BTreeMap<usize, f64> = BTreeMap::new();
        for (idx, value) in pairs {
            *merged.entry(idx).or_insert(0.0) += value;
        }
        Self {
            entries: merged.into_iter().collect(),
        }
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Dot product with a dense vector. Indices past the end contribute zero.
    pub fn dot(&self, dense: &[f64]) -> f64 {
        self.entries
            .iter()
            .filter_map(|&(i, v)| dense.get(i).map(|w| w * v))
            .sum()
    }

    pub fn l2_norm(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt()
    }

    fn l2_normalized(mut self) -> Self {
        let norm = self.l2_norm();
        if norm > 0.0 {
            for (_, v) in &mut self.entries {
                *v /= norm;
            }
        }
        self
    }
}

/// Vocabulary construction knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerParams {
    /// Terms appearing in a larger fraction of documents than this are dropped.
    pub max_df: f64,
    /// Terms appearing in fewer documents than this are dropped.
    pub min_df: usize,
    /// Keep only the most frequent terms (by corpus-wide count) when set.
    pub max_features: Option<usize>,
    /// Apply English Snowball stemming to tokens.
    pub stem: bool,
}

impl Default for VectorizerParams {
    fn default() -> Self {
        Self {
            max_df: 1.0,
            min_df: 1,
            max_features: None,
            stem: true,
        }
    }
}

impl VectorizerParams {
    fn validate(&self) -> Result<()> {
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            return Err(ClassifierError::training(format!(
                "max_df must be in (0, 1], got {}",
                self.max_df
            )));
        }
        if self.min_df == 0 {
            return Err(ClassifierError::training("min_df must be at least 1"));
        }
        if self.max_features == Some(0) {
            return Err(ClassifierError::training("max_features must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    analyzer: Analyzer,
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Assemble a vectorizer from already-fitted parts.
    ///
    /// `vocabulary` must map terms onto `0..idf.len()` exactly once each.
    pub fn from_parts(
        analyzer: Analyzer,
        vocabulary: BTreeMap<String, usize>,
        idf: Vec<f64>,
    ) -> Result<Self> {
        let vectorizer = Self {
            analyzer,
            vocabulary,
            idf,
        };
        vectorizer.validate()?;
        Ok(vectorizer)
    }

    /// Learn vocabulary and IDF from `documents`, returning the fitted
    /// vectorizer together with each document's feature row.
    pub fn fit_transform<S: AsRef<str>>(
        documents: &[S],
        analyzer: Analyzer,
        params: &VectorizerParams,
    ) -> Result<(Self, Vec<SparseVector>)> {
        params.validate()?;
        if documents.is_empty() {
            return Err(ClassifierError::training("no documents to build a vocabulary from"));
        }

        let analyzed: Vec<Vec<String>> = documents
            .iter()
            .map(|d| analyzer.analyze(d.as_ref()))
            .collect();

        let n_docs = analyzed.len();
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        let mut term_freq: HashMap<&str, usize> = HashMap::new();
        for terms in &analyzed {
            let mut seen: HashSet<&str> = HashSet::new();
            for term in terms {
                *term_freq.entry(term.as_str()).or_insert(0) += 1;
                if seen.insert(term.as_str()) {
                    *doc_freq.entry(term.as_str()).or_insert(0) += 1;
                }
            }
        }

        let max_doc_count = params.max_df * n_docs as f64;
        let mut kept: Vec<(&str, usize)> = doc_freq
            .iter()
            .filter(|(_, &df)| df >= params.min_df && df as f64 <= max_doc_count)
            .map(|(&term, _)| (term, term_freq.get(term).copied().unwrap_or(0)))
            .collect();

        if let Some(limit) = params.max_features {
            // Most frequent first; ties broken alphabetically so the cut is stable.
            kept.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
            kept.truncate(limit);
        }

        if kept.is_empty() {
            return Err(ClassifierError::training(format!(
                "no usable vocabulary in {n_docs} documents after stop-word and frequency filtering"
            )));
        }

        let mut terms: Vec<&str> = kept.into_iter().map(|(t, _)| t).collect();
        terms.sort_unstable();

        let n = n_docs as f64;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(terms.len());
        for (idx, term) in terms.iter().enumerate() {
            let df = doc_freq.get(term).copied().unwrap_or(0) as f64;
            idf.push(((1.0 + n) / (1.0 + df)).ln() + 1.0);
            vocabulary.insert((*term).to_string(), idx);
        }

        info!(
            documents = n_docs,
            distinct_terms = doc_freq.len(),
            vocabulary = vocabulary.len(),
            "Fitted TF-IDF vocabulary"
        );

        let vectorizer = Self {
            analyzer,
            vocabulary,
            idf,
        };
        let rows = analyzed
            .iter()
            .map(|terms| vectorizer.project(terms))
            .collect();
        Ok((vectorizer, rows))
    }

    /// Normalize, analyze and project one raw document.
    pub fn transform(&self, raw: &str) -> SparseVector {
        let terms = self.analyzer.analyze(raw);
        let row = self.project(&terms);
        debug!(terms = terms.len(), features = row.nnz(), "Vectorized document");
        row
    }

    fn project(&self, terms: &[String]) -> SparseVector {
        let pairs = terms
            .iter()
            .filter_map(|t| self.vocabulary.get(t.as_str()))
            .filter_map(|&idx| self.idf.get(idx).map(|&w| (idx, w)));
        SparseVector::from_pairs(pairs).l2_normalized()
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    pub fn vocabulary_size(&self) -> usize {
        self.idf.len()
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    /// Terms in feature-index order.
    pub fn feature_names(&self) -> Vec<&str> {
        let mut names = vec![""; self.idf.len()];
        for (term, &idx) in &self.vocabulary {
            if let Some(slot) = names.get_mut(idx) {
                *slot = term.as_str();
            }
        }
        names
    }

    /// Structural checks for a vectorizer that did not come from `fit_transform`.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.idf.is_empty() {
            return Err(ClassifierError::serialization("vocabulary is empty"));
        }
        if self.vocabulary.len() != self.idf.len() {
            return Err(ClassifierError::serialization(format!(
                "vocabulary has {} terms but {} IDF weights",
                self.vocabulary.len(),
                self.idf.len()
            )));
        }
        let mut seen = vec![false; self.idf.len()];
        for (term, &idx) in &self.vocabulary {
            match seen.get_mut(idx) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => {
                    return Err(ClassifierError::serialization(format!(
                        "feature index {idx} assigned twice (at term {term:?})"
                    )))
                }
                None => {
                    return Err(ClassifierError::serialization(format!(
                        "feature index {idx} for term {term:?} is out of range"
                    )))
                }
            }
        }
        if let Some(bad) = self.idf.iter().find(|w| !w.is_finite() || **w <= 0.0) {
            return Err(ClassifierError::serialization(format!(
                "IDF weight {bad} is not a positive finite number"
            )));
        }
        Ok(())
    }
}
