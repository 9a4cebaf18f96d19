//! Animation error types

use thiserror::Error;

/// Animation-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnimationError {
    /// A ticker provider was disposed while tickers it created were still running
    #[error("{owner} was disposed with {active} active ticker(s): {labels:?}")]
    TickerLeak {
        owner: String,
        active: usize,
        labels: Vec<String>,
    },

    /// The scheduler that drives a ticker no longer exists
    #[error("Animation scheduler dropped while ticker '{label}' needed it")]
    SchedulerDropped { label: String },
}

/// Result type for animation operations
pub type Result<T> = std::result::Result<T, AnimationError>;
