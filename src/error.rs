// Error taxonomy for the classification pipeline.
//
// Every failure a caller can act on has its own variant. Training and
// serialization failures are fatal to the call that produced them; the
// other variants are recoverable by loading a model or fixing the input.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassifierError {
    /// The training corpus cannot produce a model (empty, single-class,
    /// malformed schema, or no usable vocabulary).
    #[error("training failed: {0}")]
    Training(String),

    /// Classification was attempted before a model was fitted or loaded.
    #[error("no model loaded; fit or load a model first")]
    ModelNotLoaded,

    /// The document handed to the classifier is not acceptable input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The persisted artifact is corrupt or from an incompatible version.
    #[error("model artifact rejected: {0}")]
    Serialization(String),

    /// The service already holds a model. Build a new service to swap models.
    #[error("a model is already loaded into this service")]
    AlreadyLoaded,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ClassifierError {
    pub(crate) fn training(msg: impl Into<String>) -> Self {
        Self::Training(msg.into())
    }

    pub(crate) fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }
}

pub type Result<T, E = ClassifierError> = std::result::Result<T, E>;
