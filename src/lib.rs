pub mod error;
pub mod ml;

pub use error::{Error, Result};
pub use ml::hmm::{
    Decoded, HiddenMarkovModel, HmmBuilder, NumericConfig, Posteriors, StreamingDecoder,
    TrainConfig, TrainingSummary, Verbosity,
};
