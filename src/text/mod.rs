// Text preparation: normalization and tokenization.

pub mod analyzer;
pub mod normalize;

pub use analyzer::Analyzer;
pub use normalize::normalize;
