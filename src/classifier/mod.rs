// Classification: TF-IDF vectorizer + logistic regression, persisted as one
// artifact and served through ClassificationService.
//
// Consumers should depend on the TextClassifier trait; FittedModel and the
// service both implement it.

pub mod artifact;
pub mod logistic;
pub mod metrics;
pub mod model;
pub mod service;
pub mod tfidf;
pub mod traits;

pub use model::{FittedModel, Prediction, TrainingParams, TrainingReport, Verdict};
pub use service::{ClassificationService, ServiceState};
pub use traits::TextClassifier;
