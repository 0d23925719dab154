//! Error types for radmap-core.

use thiserror::Error;

/// Result type alias for radmap operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a set of dose summaries cannot be normalized.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegenerateInput {
    /// No cells reached the normalizer.
    #[error("no cells to normalize")]
    Empty,

    /// Every cell has a dose rate of zero.
    #[error("maximum dose rate is zero")]
    ZeroDose,
}

/// Core error types for radmap operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("configuration error: {0}")]
    InvalidConfig(String),

    /// Input set has no meaningful relative scale.
    #[error("degenerate input: {0}")]
    DegenerateInput(#[from] DegenerateInput),

    /// Histogram with the wrong number of channels.
    #[error("histogram has {actual} channels, expected {expected}")]
    InvalidHistogram { expected: usize, actual: usize },

    /// Integration time outside what a logger can report.
    #[error("integration time of {0} s exceeds {max} s", max = crate::MAX_ELAPSED_SECONDS)]
    InvalidElapsed(u64),
}
