//! Discrete Hidden Markov Models in log space.
//!
//! [`HiddenMarkovModel`] owns the transition, emission and initial
//! distributions. Inference (`forward`, `backward`, `posteriors`, `viterbi`)
//! borrows it immutably, Baum-Welch training (`reestimate`, `train`) borrows
//! it mutably, and [`StreamingDecoder`] decodes a sequence as it arrives.
//!
//! ```
//! use logspace_hmm::{HiddenMarkovModel, TrainConfig};
//! use ndarray::array;
//!
//! let mut hmm = HiddenMarkovModel::builder(2, 2)
//!     .with_transition(array![[0.7, 0.3], [0.4, 0.6]])
//!     .with_emission(array![[0.9, 0.1], [0.2, 0.8]])
//!     .with_initial(array![0.6, 0.4])
//!     .build()
//!     .unwrap();
//!
//! hmm.train(&[0, 0, 1, 1, 0, 1], &TrainConfig::new()).unwrap();
//!
//! let mut decoder = hmm.decoder();
//! decoder.start(&[0, 1]).unwrap();
//! let decoded = decoder.extend(&[0]).unwrap();
//! assert_eq!(decoded.viterbi.len(), 3);
//! ```

pub mod backward;
pub mod baum_welch;
pub mod config;
pub mod decoder;
pub mod forward;
pub mod log_space;
pub mod model;
pub mod posterior;
pub mod trainer;
pub mod viterbi;


pub use config::{NumericConfig, TrainConfig, Verbosity};
pub use decoder::{Decoded, StreamingDecoder};
pub use model::{HiddenMarkovModel, HmmBuilder};
pub use posterior::{state_posteriors, Posteriors};
pub use trainer::TrainingSummary;
