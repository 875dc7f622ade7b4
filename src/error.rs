//! Error types shared by the HMM engine.

use thiserror::Error;

/// Errors raised while building a model or feeding it observations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Bad shape, non-finite entries, or a stochastic row that does not sum to 1.
    #[error("invalid model: {0}")]
    InvalidModel(String),

    /// A symbol outside `[0, num_observations)`.
    #[error(
        "invalid observation {symbol} at position {position} (alphabet has {num_observations} symbols)"
    )]
    InvalidObservation {
        position: usize,
        symbol: usize,
        num_observations: usize,
    },

    #[error("observation sequence is empty")]
    EmptySequence,
}

pub type Result<T> = std::result::Result<T, Error>;
