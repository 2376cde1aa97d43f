// TruthLens: news credibility classification.
//
// This is the library root. Each module corresponds to one stage of the
// pipeline: text preparation, the classifier itself, the training corpus,
// and the surfaces (terminal, HTTP) that present its verdicts.

pub mod classifier;
pub mod config;
pub mod corpus;
pub mod error;
pub mod output;
pub mod text;

#[cfg(feature = "web")]
pub mod web;

pub use error::{ClassifierError, Result};
