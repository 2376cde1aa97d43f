// Training corpus: labeled documents and the CSV schema they are read from.
//
// The schema is explicit: a header row with `text` and `label` columns (any
// other columns are ignored). Rows where either cell is missing or empty are
// dropped before the corpus is built, so nothing blank reaches training.

use std::fs::File;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::info;

use crate::error::{ClassifierError, Result};

pub const TEXT_COLUMN: &str = "text";
pub const LABEL_COLUMN: &str = "label";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledDocument {
    pub text: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    documents: Vec<LabeledDocument>,
    dropped: usize,
}

impl Corpus {
    /// Build from `(text, label)` pairs, dropping pairs with an empty side.
    pub fn from_pairs<I, T, L>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (T, L)>,
        T: Into<String>,
        L: Into<String>,
    {
        let mut corpus = Self::default();
        for (text, label) in pairs {
            corpus.push(Some(text.into()), Some(label.into()));
        }
        corpus
    }

    fn push(&mut self, text: Option<String>, label: Option<String>) {
        match (text, label) {
            (Some(text), Some(label)) if !text.is_empty() && !label.is_empty() => {
                self.documents.push(LabeledDocument { text, label });
            }
            _ => self.dropped += 1,
        }
    }

    /// Read a CSV file with `text` and `label` columns.
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let corpus = Self::from_csv_reader(file)?;
        info!(
            path = %path.display(),
            documents = corpus.len(),
            dropped = corpus.dropped(),
            "Loaded training corpus"
        );
        Ok(corpus)
    }

    pub fn from_csv_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);

        let headers = rdr
            .headers()
            .map_err(|e| ClassifierError::training(format!("cannot read CSV header: {e}")))?
            .clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| ClassifierError::training(format!("missing required column `{name}`")))
        };
        let text_idx = column(TEXT_COLUMN)?;
        let label_idx = column(LABEL_COLUMN)?;

        let mut corpus = Self::default();
        for (line, record) in rdr.records().enumerate() {
            let record = record.map_err(|e| {
                ClassifierError::training(format!("malformed CSV record {}: {e}", line + 1))
            })?;
            corpus.push(
                record.get(text_idx).map(str::to_string),
                record.get(label_idx).map(str::to_string),
            );
        }
        Ok(corpus)
    }

    pub fn documents(&self) -> &[LabeledDocument] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Rows skipped because text or label was missing.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Deterministically split off a holdout set.
    ///
    /// Every `ceil(1 / fraction)`-th document (1-based) goes to the holdout;
    /// the rest stay for training. `fraction` must be in (0, 0.5].
    pub fn split_holdout(&self, fraction: f64) -> Result<(Corpus, Corpus)> {
        if !(fraction > 0.0 && fraction <= 0.5) {
            return Err(ClassifierError::training(format!(
                "holdout fraction must be in (0, 0.5], got {fraction}"
            )));
        }
        let stride = (1.0 / fraction).ceil() as usize;
        let (holdout, train): (Vec<_>, Vec<_>) = self
            .documents
            .iter()
            .cloned()
            .enumerate()
            .partition(|(i, _)| (i + 1) % stride == 0);

        let strip = |docs: Vec<(usize, LabeledDocument)>| Corpus {
            documents: docs.into_iter().map(|(_, d)| d).collect(),
            dropped: 0,
        };
        let (train, holdout) = (strip(train), strip(holdout));
        if holdout.is_empty() {
            return Err(ClassifierError::training(format!(
                "corpus of {} documents is too small for a {fraction} holdout",
                self.len()
            )));
        }
        Ok((train, holdout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_extra_columns_and_missing_cells() {
        let data = "\
id,title,text,label
1,t1,Aliens run the government,FAKE
2,t2,,REAL
3,t3,NASA confirms water on Mars,
4,t4,\"Quoted, with comma\",REAL
5,t5
";
        let corpus = Corpus::from_csv_reader(data.as_bytes()).unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.dropped(), 3);
        assert_eq!(corpus.documents()[1].text, "Quoted, with comma");
        assert_eq!(corpus.documents()[1].label, "REAL");
    }

    #[test]
    fn test_csv_missing_label_column() {
        let err = Corpus::from_csv_reader("text,category\nhello,FAKE\n".as_bytes()).unwrap_err();
        match err {
            ClassifierError::Training(msg) => assert!(msg.contains("label")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_labels_are_case_sensitive() {
        let corpus = Corpus::from_pairs([("a", "fake"), ("b", "FAKE")]);
        let labels: Vec<&str> = corpus.documents().iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["fake", "FAKE"]);
    }

    #[test]
    fn test_split_holdout() {
        let corpus = Corpus::from_pairs((1..=10).map(|i| (format!("doc {i}"), "L".to_string())));
        let (train, holdout) = corpus.split_holdout(0.2).unwrap();
        assert_eq!(train.len(), 8);
        assert_eq!(holdout.len(), 2);
        assert_eq!(holdout.documents()[0].text, "doc 5");
    }

    #[test]
    fn test_split_holdout_rejects_bad_fraction() {
        let corpus = Corpus::from_pairs([("a", "x")]);
        assert!(corpus.split_holdout(0.0).is_err());
        assert!(corpus.split_holdout(0.9).is_err());
        assert!(corpus.split_holdout(0.5).is_err());
    }
}
