// Text classifier trait: the seam consumers depend on.
//
// Evaluation, the CLI and the web layer only need "give me probabilities in a
// known class order". Both a bare FittedModel and the stateful service
// implement this, so a consumer never cares which one it holds.

use super::model::{FittedModel, Verdict};
use super::service::ClassificationService;
use crate::error::Result;

pub trait TextClassifier: Send + Sync {
    /// Class labels in the order `predict_proba` reports them.
    fn classes(&self) -> Result<[String; 2]>;

    /// Probabilities of (class 0, class 1) for raw document text.
    fn predict_proba(&self, text: &str) -> Result<(f64, f64)>;

    fn classify(&self, text: &str) -> Result<Verdict> {
        let classes = self.classes()?;
        let probabilities = self.predict_proba(text)?;
        Ok(Verdict::from_probabilities(&classes, probabilities))
    }

    /// Classify several documents, returning results in input order.
    fn classify_batch(&self, texts: &[String]) -> Result<Vec<Verdict>> {
        texts.iter().map(|t| self.classify(t)).collect()
    }
}

impl TextClassifier for FittedModel {
    fn classes(&self) -> Result<[String; 2]> {
        Ok(FittedModel::classes(self).clone())
    }

    fn predict_proba(&self, text: &str) -> Result<(f64, f64)> {
        Ok(FittedModel::predict_proba(self, text))
    }
}

impl TextClassifier for ClassificationService {
    fn classes(&self) -> Result<[String; 2]> {
        ClassificationService::classes(self).cloned()
    }

    fn predict_proba(&self, text: &str) -> Result<(f64, f64)> {
        ClassificationService::predict_proba(self, text)
    }

    fn classify(&self, text: &str) -> Result<Verdict> {
        ClassificationService::classify(self, text)
    }
}
