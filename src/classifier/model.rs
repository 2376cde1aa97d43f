// Fitted model: vectorizer + logistic regression + the class order they share.
//
// Class order is fixed at fit time (labels sorted lexicographically) and every
// probability pair this module returns is indexed by it. Callers should read
// `classes()` rather than assume which position means what.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::logistic::{FitSummary, LogisticParams, LogisticRegression};
use super::tfidf::{TfidfVectorizer, VectorizerParams};
use crate::corpus::Corpus;
use crate::error::{ClassifierError, Result};
use crate::text::Analyzer;

/// Everything `FittedModel::fit` needs besides the corpus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingParams {
    pub vectorizer: VectorizerParams,
    pub logistic: LogisticParams,
}

/// Summary of a completed fit.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub documents: usize,
    pub vocabulary: usize,
    pub class_counts: [usize; 2],
    pub optimizer: FitSummary,
}

/// Discrete decision derived from a probability pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub label: String,
    /// Position of `label` in the model's class order.
    pub class_index: usize,
    /// Probability of `label`, as a percentage (50.0..=100.0).
    pub confidence: f64,
}

impl Verdict {
    /// Pick the more probable class. An exact tie goes to class index 0.
    pub fn from_probabilities(classes: &[String; 2], probabilities: (f64, f64)) -> Self {
        let (p0, p1) = probabilities;
        let (class_index, p) = if p1 > p0 { (1, p1) } else { (0, p0) };
        Self {
            label: classes[class_index].clone(),
            class_index,
            confidence: p * 100.0,
        }
    }
}

/// Full inference result: class order, probabilities in that order, verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub classes: [String; 2],
    pub probabilities: [f64; 2],
    pub verdict: Verdict,
}

impl Prediction {
    pub fn probability_of(&self, label: &str) -> Option<f64> {
        self.classes
            .iter()
            .position(|c| c == label)
            .map(|i| self.probabilities[i])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    classes: [String; 2],
    vectorizer: TfidfVectorizer,
    classifier: LogisticRegression,
}

impl FittedModel {
    /// Fit vectorizer and classifier on a labeled corpus.
    pub fn fit(corpus: &Corpus, params: &TrainingParams) -> Result<Self> {
        Self::fit_with_report(corpus, params).map(|(model, _)| model)
    }

    pub fn fit_with_report(corpus: &Corpus, params: &TrainingParams) -> Result<(Self, TrainingReport)> {
        if corpus.is_empty() {
            return Err(ClassifierError::training("corpus is empty"));
        }

        let labels: BTreeSet<&str> = corpus.documents().iter().map(|d| d.label.as_str()).collect();
        let classes: [String; 2] = match labels.into_iter().collect::<Vec<_>>().as_slice() {
            [a, b] => [(*a).to_string(), (*b).to_string()],
            [only] => {
                return Err(ClassifierError::training(format!(
                    "corpus has a single label ({only:?}); two are required"
                )))
            }
            many => {
                return Err(ClassifierError::training(format!(
                    "corpus has {} distinct labels ({}); exactly two are required",
                    many.len(),
                    many.join(", ")
                )))
            }
        };

        let texts: Vec<&str> = corpus.documents().iter().map(|d| d.text.as_str()).collect();
        let targets: Vec<bool> = corpus
            .documents()
            .iter()
            .map(|d| d.label == classes[1])
            .collect();

        let analyzer = Analyzer::english(params.vectorizer.stem);
        let (vectorizer, rows) = TfidfVectorizer::fit_transform(&texts, analyzer, &params.vectorizer)?;
        let (classifier, optimizer) = LogisticRegression::fit(
            &rows,
            &targets,
            vectorizer.vocabulary_size(),
            &params.logistic,
        )?;

        let positives = targets.iter().filter(|&&t| t).count();
        let report = TrainingReport {
            documents: texts.len(),
            vocabulary: vectorizer.vocabulary_size(),
            class_counts: [texts.len() - positives, positives],
            optimizer,
        };
        info!(
            documents = report.documents,
            vocabulary = report.vocabulary,
            class0 = %classes[0],
            class1 = %classes[1],
            "Model fitted"
        );

        Ok((
            Self {
                classes,
                vectorizer,
                classifier,
            },
            report,
        ))
    }

    /// Assemble a model from parts, checking they agree with each other.
    pub fn from_parts(
        classes: [String; 2],
        vectorizer: TfidfVectorizer,
        classifier: LogisticRegression,
    ) -> Result<Self> {
        let model = Self {
            classes,
            vectorizer,
            classifier,
        };
        model.validate()?;
        Ok(model)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.classes[0] == self.classes[1] {
            return Err(ClassifierError::serialization(format!(
                "class labels must differ, both are {:?}",
                self.classes[0]
            )));
        }
        if self.classes.iter().any(|c| c.is_empty()) {
            return Err(ClassifierError::serialization("class labels must be non-empty"));
        }
        self.vectorizer.validate()?;
        self.classifier.validate()?;
        if self.classifier.n_features() != self.vectorizer.vocabulary_size() {
            return Err(ClassifierError::serialization(format!(
                "classifier has {} weights for a vocabulary of {}",
                self.classifier.n_features(),
                self.vectorizer.vocabulary_size()
            )));
        }
        Ok(())
    }

    /// Probabilities of (class 0, class 1) for raw `text`.
    ///
    /// Text is normalized and projected onto the fitted vocabulary; unknown
    /// terms are ignored. Empty text is valid and scores on the intercept alone.
    pub fn predict_proba(&self, text: &str) -> (f64, f64) {
        let row = self.vectorizer.transform(text);
        let p1 = self.classifier.predict_proba_positive(&row);
        debug!(features = row.nnz(), p1, "Scored document");
        (1.0 - p1, p1)
    }

    pub fn classify(&self, text: &str) -> Verdict {
        Verdict::from_probabilities(&self.classes, self.predict_proba(text))
    }

    pub fn predict(&self, text: &str) -> Prediction {
        let probabilities = self.predict_proba(text);
        Prediction {
            classes: self.classes.clone(),
            probabilities: [probabilities.0, probabilities.1],
            verdict: Verdict::from_probabilities(&self.classes, probabilities),
        }
    }

    pub fn classes(&self) -> &[String; 2] {
        &self.classes
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub fn classifier(&self) -> &LogisticRegression {
        &self.classifier
    }

    /// The `n` terms pushing hardest toward each class, strongest first.
    ///
    /// Index 0 holds terms with the most negative weights (toward class 0),
    /// index 1 the most positive (toward class 1).
    pub fn top_terms(&self, n: usize) -> [Vec<(String, f64)>; 2] {
        let names = self.vectorizer.feature_names();
        let mut weighted: Vec<(&str, f64)> = names
            .into_iter()
            .zip(self.classifier.coefficients().iter().copied())
            .collect();

        weighted.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        let toward_class0 = weighted
            .iter()
            .take_while(|(_, w)| *w < 0.0)
            .take(n)
            .map(|(t, w)| (t.to_string(), *w))
            .collect();
        let toward_class1 = weighted
            .iter()
            .rev()
            .take_while(|(_, w)| *w > 0.0)
            .take(n)
            .map(|(t, w)| (t.to_string(), *w))
            .collect();

        [toward_class0, toward_class1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes() -> [String; 2] {
        ["FAKE".to_string(), "REAL".to_string()]
    }

    #[test]
    fn test_verdict_tie_goes_to_first_class() {
        let v = Verdict::from_probabilities(&classes(), (0.5, 0.5));
        assert_eq!(v.label, "FAKE");
        assert_eq!(v.class_index, 0);
        assert!((v.confidence - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_verdict_picks_larger() {
        let v = Verdict::from_probabilities(&classes(), (0.2, 0.8));
        assert_eq!(v.label, "REAL");
        assert!((v.confidence - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_rejects_single_label() {
        let corpus = Corpus::from_pairs([("one text", "FAKE"), ("two text", "FAKE")]);
        let err = FittedModel::fit(&corpus, &TrainingParams::default()).unwrap_err();
        assert!(matches!(err, ClassifierError::Training(_)));
    }

    #[test]
    fn test_fit_rejects_three_labels() {
        let corpus = Corpus::from_pairs([("alpha", "A"), ("beta", "B"), ("gamma", "C")]);
        assert!(FittedModel::fit(&corpus, &TrainingParams::default()).is_err());
    }

    #[test]
    fn test_fit_rejects_empty_corpus() {
        let corpus = Corpus::from_pairs(Vec::<(String, String)>::new());
        assert!(matches!(
            FittedModel::fit(&corpus, &TrainingParams::default()),
            Err(ClassifierError::Training(_))
        ));
    }

    #[test]
    fn test_from_parts_rejects_width_mismatch() {
        let corpus = Corpus::from_pairs([("rockets launch", "REAL"), ("lizard conspiracy", "FAKE")]);
        let model = FittedModel::fit(&corpus, &TrainingParams::default()).unwrap();
        let short = LogisticRegression::from_parts(vec![0.0], 0.0).unwrap();
        let err = FittedModel::from_parts(classes(), model.vectorizer().clone(), short).unwrap_err();
        assert!(matches!(err, ClassifierError::Serialization(_)));
    }

    #[test]
    fn test_top_terms_split_by_sign() {
        let corpus = Corpus::from_pairs([
            ("rockets launch orbit", "REAL"),
            ("lizard conspiracy hoax", "FAKE"),
        ]);
        let model = FittedModel::fit(&corpus, &TrainingParams::default()).unwrap();
        let [fake, real] = model.top_terms(10);
        assert!(fake.iter().all(|(_, w)| *w < 0.0));
        assert!(real.iter().all(|(_, w)| *w > 0.0));
        assert!(!fake.is_empty() && !real.is_empty());
    }
}
