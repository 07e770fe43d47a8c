use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A single model failed to load. Sibling loads are unaffected.
#[derive(Debug, Error)]
#[error("failed to load model {source_id:?}")]
pub struct LoadError {
    pub source_id: String,
    #[source]
    pub cause: BoxError,
}

impl LoadError {
    pub fn new(source_id: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self {
            source_id: source_id.into(),
            cause: cause.into(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MorphError {
    #[error("morphing needs at least 2 models, got {0}")]
    TooFewModels(usize),

    #[error("model {index} has no vertices to resample from")]
    EmptySource { index: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("session has been disposed")]
    Disposed,
}
