//! Error taxonomy for field construction and edits.

use thiserror::Error;

/// Errors surfaced by [`crate::LifeField`] and its building blocks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// Field size, layout geometry or engine configuration is unusable.
    #[error("configuration error: {reason}")]
    Configuration {
        /// What was rejected.
        reason: String,
    },

    /// A coordinate or rectangle lies (partly) outside `[0, size)`.
    #[error("out of range: rect ({x}, {y}) {w}x{h} does not fit a {size}x{size} field")]
    OutOfRange {
        x: usize,
        y: usize,
        w: usize,
        h: usize,
        size: usize,
    },
}

impl FieldError {
    pub(crate) fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }
}

impl From<rayon::ThreadPoolBuildError> for FieldError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        FieldError::configuration(format!("failed to build step thread pool: {e}"))
    }
}

pub type Result<T> = std::result::Result<T, FieldError>;
