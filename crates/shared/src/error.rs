use thiserror::Error;

/// Failure to reach the numeric engine.
///
/// Computation failures (divide by zero and friends) are not errors at this
/// boundary; the engine renders them as display text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("numeric engine is unavailable: {0}")]
    Unavailable(String),
}

impl EngineError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown calculator mode '{0}'")]
pub struct ParseModeError(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown radix '{0}' (expected bin, oct, dec or hex)")]
pub struct ParseRadixError(pub String);
