pub mod hmm;

pub use hmm::*;
