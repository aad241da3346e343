//! Construction-time errors.
//!
//! Everything after construction is infallible: arithmetic is deterministic
//! and the only mutation point is the decision step.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArtError {
    #[error("feature count (M) must be positive, got {value}")]
    InvalidFeatureCount { value: usize },

    #[error("vigilance parameter (rho) must be between 0 and 1, got {value}")]
    InvalidVigilance { value: f64 },

    #[error("choice parameter (alpha) must be positive, got {value}")]
    InvalidChoice { value: f64 },

    #[error("learning rate (beta) must be in (0, 1], got {value}")]
    InvalidLearningRate { value: f64 },

    #[error("batch size must be positive, got {value}")]
    InvalidBatchSize { value: usize },

    #[error("worker pool: {0}")]
    WorkerPool(String),
}

pub type Result<T> = std::result::Result<T, ArtError>;
