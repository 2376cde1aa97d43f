// Classification service: the explicitly constructed owner of the model.
//
// Two states: Untrained (no model; inference fails with ModelNotLoaded) and
// Ready. The transition happens once, through `fit`, `load`, `load_file` or
// `install`, and never reverts. Once Ready the model is immutable, so the
// service can be shared behind an `Arc` and called concurrently without locks.

use std::path::Path;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::artifact;
use super::model::{FittedModel, Prediction, TrainingParams, TrainingReport, Verdict};
use crate::corpus::Corpus;
use crate::error::{ClassifierError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Untrained,
    Ready,
}

#[derive(Debug)]
struct Ready {
    model: FittedModel,
    trained_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
pub struct ClassificationService {
    ready: OnceLock<Ready>,
    max_input_chars: Option<usize>,
}

impl ClassificationService {
    /// A service in the Untrained state with no input length limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject documents longer than `limit` characters with `InvalidInput`.
    pub fn with_max_input_chars(mut self, limit: usize) -> Self {
        self.max_input_chars = Some(limit);
        self
    }

    pub fn state(&self) -> ServiceState {
        if self.ready.get().is_some() {
            ServiceState::Ready
        } else {
            ServiceState::Untrained
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == ServiceState::Ready
    }

    /// Fit a model on `corpus` and make it the service's model.
    pub fn fit(&self, corpus: &Corpus, params: &TrainingParams) -> Result<TrainingReport> {
        if self.is_ready() {
            return Err(ClassifierError::AlreadyLoaded);
        }
        let (model, report) = FittedModel::fit_with_report(corpus, params)?;
        self.transition(model, Some(Utc::now()))?;
        Ok(report)
    }

    /// Load a model from artifact bytes.
    pub fn load(&self, bytes: &[u8]) -> Result<()> {
        if self.is_ready() {
            return Err(ClassifierError::AlreadyLoaded);
        }
        let loaded = artifact::load_with_metadata(bytes)?;
        self.transition(loaded.model, Some(loaded.trained_at))
    }

    pub fn load_file(&self, path: &Path) -> Result<()> {
        if self.is_ready() {
            return Err(ClassifierError::AlreadyLoaded);
        }
        let loaded = artifact::load_from_file(path)?;
        self.transition(loaded.model, Some(loaded.trained_at))
    }

    /// Adopt an already-built model.
    ///
    /// The model may have come from anywhere (it is `Deserialize`), so it is
    /// checked for internal consistency first.
    pub fn install(&self, model: FittedModel) -> Result<()> {
        if self.is_ready() {
            return Err(ClassifierError::AlreadyLoaded);
        }
        model.validate()?;
        self.transition(model, None)
    }

    fn transition(&self, model: FittedModel, trained_at: Option<DateTime<Utc>>) -> Result<()> {
        let classes = model.classes().clone();
        let vocabulary = model.vectorizer().vocabulary_size();
        self.ready
            .set(Ready { model, trained_at })
            .map_err(|_| ClassifierError::AlreadyLoaded)?;
        info!(
            class0 = %classes[0],
            class1 = %classes[1],
            vocabulary,
            "Classification service ready"
        );
        Ok(())
    }

    pub fn model(&self) -> Result<&FittedModel> {
        self.ready
            .get()
            .map(|r| &r.model)
            .ok_or(ClassifierError::ModelNotLoaded)
    }

    /// When the loaded model was trained, if known.
    pub fn trained_at(&self) -> Option<DateTime<Utc>> {
        self.ready.get().and_then(|r| r.trained_at)
    }

    /// Serialize the current model to artifact bytes.
    pub fn save(&self) -> Result<Vec<u8>> {
        let ready = self.ready.get().ok_or(ClassifierError::ModelNotLoaded)?;
        match ready.trained_at {
            Some(at) => artifact::save_with_timestamp(&ready.model, at),
            None => artifact::save(&ready.model),
        }
    }

    pub fn classes(&self) -> Result<&[String; 2]> {
        self.model().map(FittedModel::classes)
    }

    pub fn predict_proba(&self, text: &str) -> Result<(f64, f64)> {
        let model = self.model()?;
        self.check_input(text)?;
        Ok(model.predict_proba(text))
    }

    pub fn classify(&self, text: &str) -> Result<Verdict> {
        let model = self.model()?;
        self.check_input(text)?;
        Ok(model.classify(text))
    }

    pub fn predict(&self, text: &str) -> Result<Prediction> {
        let model = self.model()?;
        self.check_input(text)?;
        Ok(model.predict(text))
    }

    fn check_input(&self, text: &str) -> Result<()> {
        if let Some(limit) = self.max_input_chars {
            let chars = text.chars().count();
            if chars > limit {
                warn!(chars, limit, "Rejected oversized document");
                return Err(ClassifierError::InvalidInput(format!(
                    "document has {chars} characters; the limit is {limit}"
                )));
            }
        }
        Ok(())
    }
}

/// Turn raw bytes from a file or socket into a document.
///
/// Text that is not valid UTF-8 is rejected as `InvalidInput`.
pub fn decode_document(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| {
        ClassifierError::InvalidInput(format!(
            "document is not valid UTF-8 (first bad byte at offset {})",
            e.utf8_error().valid_up_to()
        ))
    })
}
