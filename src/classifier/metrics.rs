// Holdout evaluation metrics for the two-class model.

use serde::Serialize;

use super::traits::TextClassifier;
use crate::corpus::Corpus;
use crate::error::{ClassifierError, Result};

/// Per-class precision / recall / F1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of held-out documents whose true label is this class.
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub classes: [String; 2],
    /// `confusion[actual][predicted]`, indexed by class order.
    pub confusion: [[usize; 2]; 2],
    pub accuracy: f64,
    pub per_class: [ClassMetrics; 2],
    /// Mean negative log-likelihood of the true class.
    pub log_loss: f64,
}

impl Evaluation {
    pub fn total(&self) -> usize {
        self.confusion.iter().flatten().sum()
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Score `classifier` on every document in `holdout`.
pub fn evaluate(classifier: &dyn TextClassifier, holdout: &Corpus) -> Result<Evaluation> {
    if holdout.is_empty() {
        return Err(ClassifierError::training("holdout set is empty"));
    }
    let classes = classifier.classes()?;

    let mut confusion = [[0usize; 2]; 2];
    let mut log_loss = 0.0;
    for doc in holdout.documents() {
        let actual = classes.iter().position(|c| *c == doc.label).ok_or_else(|| {
            ClassifierError::training(format!(
                "holdout label {:?} is not one of the model classes",
                doc.label
            ))
        })?;
        let (p0, p1) = classifier.predict_proba(&doc.text)?;
        let predicted = if p1 > p0 { 1 } else { 0 };
        confusion[actual][predicted] += 1;

        let p_true = if actual == 1 { p1 } else { p0 };
        log_loss -= p_true.clamp(1e-15, 1.0).ln();
    }

    let total = holdout.len();
    let correct = confusion[0][0] + confusion[1][1];
    let class_metrics = |k: usize| {
        let true_pos = confusion[k][k];
        let predicted_k = confusion[0][k] + confusion[1][k];
        let actual_k = confusion[k][0] + confusion[k][1];
        let precision = ratio(true_pos, predicted_k);
        let recall = ratio(true_pos, actual_k);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        ClassMetrics {
            label: classes[k].clone(),
            precision,
            recall,
            f1,
            support: actual_k,
        }
    };
    let per_class = [class_metrics(0), class_metrics(1)];

    Ok(Evaluation {
        classes: classes.clone(),
        confusion,
        accuracy: ratio(correct, total),
        per_class,
        log_loss: log_loss / total as f64,
    })
}
