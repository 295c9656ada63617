/// Result alias used across the public API.
pub type PatchResult<T> = Result<T, PatchError>;

/// Fatal errors surfaced to callers.
///
/// Anything recoverable (a dangling connection, an unknown node kind, a node that fails to
/// evaluate for one frame) is reported as a [`crate::Diagnostic`] instead.
#[derive(thiserror::Error, Debug)]
pub enum PatchError {
    /// The serialized patch could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// The patch parsed but violates a structural rule that cannot be isolated.
    #[error("validation error: {0}")]
    Validation(String),

    /// The patch declares a format version this runtime cannot upgrade.
    #[error("unsupported patch version '{0}'")]
    UnsupportedVersion(String),

    /// Schedule construction failed for the whole graph.
    #[error("schedule error: {0}")]
    Schedule(String),

    /// Evaluation failed outside of per-node isolation.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// The output sink rejected a frame or event.
    #[error("sink error: {0}")]
    Sink(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PatchError {
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn schedule(msg: impl Into<String>) -> Self {
        Self::Schedule(msg.into())
    }

    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    pub fn sink(msg: impl Into<String>) -> Self {
        Self::Sink(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
