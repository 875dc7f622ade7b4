//! Online decoding: forward filtering and Viterbi, one observation at a time.
//!
//! A session keeps the normalized log-forward vector, the best Viterbi score
//! per state, and the full best path ending in each state. Each new symbol
//! costs O(N²) and never revisits earlier steps.

use ndarray::Array1;

use super::forward::propagate;
use super::log_space::{argmax, log_mul, log_normalize};
use super::model::HiddenMarkovModel;
use crate::error::Result;

/// What a decoding session currently believes.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    /// P(state | observations so far), plain probabilities summing to 1.
    pub forward: Array1<f64>,
    /// Most likely state sequence for the whole consumed prefix.
    pub viterbi: Vec<usize>,
}

/// Incremental decoder borrowing a model. The model cannot be trained while
/// a decoder holds it.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamingDecoder<'m> {
    model: &'m HiddenMarkovModel,
    consumed: Vec<usize>,
    log_forward: Array1<f64>,
    log_viterbi: Array1<f64>,
    paths: Vec<Vec<usize>>,
}

impl HiddenMarkovModel {
    /// Opens an empty decoding session on this model.
    pub fn decoder(&self) -> StreamingDecoder<'_> {
        StreamingDecoder::new(self)
    }
}

impl<'m> StreamingDecoder<'m> {
    pub fn new(model: &'m HiddenMarkovModel) -> Self {
        Self {
            model,
            consumed: Vec::new(),
            log_forward: model.log_initial().clone(),
            log_viterbi: model.log_initial().clone(),
            paths: Vec::new(),
        }
    }

    /// Discards the session and decodes `observations` from scratch.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidObservation`](crate::Error::InvalidObservation) if any
    /// symbol is out of range; the previous session is then kept intact.
    pub fn start(&mut self, observations: &[usize]) -> Result<Decoded> {
        self.model.validate_observations(observations)?;
        *self = Self::new(self.model);
        self.extend(observations)
    }

    /// Feeds more observations into the session.
    ///
    /// The whole batch is validated before anything is consumed, so a batch
    /// with one bad symbol leaves the session exactly as it was.
    pub fn extend(&mut self, observations: &[usize]) -> Result<Decoded> {
        self.model.validate_observations(observations)?;
        for &symbol in observations {
            self.step(symbol);
        }
        Ok(self.snapshot())
    }

    /// Current result without consuming anything. Before the first
    /// observation the forward vector is the initial distribution and the
    /// path is empty.
    pub fn snapshot(&self) -> Decoded {
        let viterbi = argmax(self.log_viterbi.iter().copied())
            .and_then(|best| self.paths.get(best))
            .cloned()
            .unwrap_or_default();
        Decoded {
            forward: self.log_forward.mapv(f64::exp),
            viterbi,
        }
    }

    /// Observations consumed since the session started.
    pub fn consumed(&self) -> &[usize] {
        &self.consumed
    }

    pub fn len(&self) -> usize {
        self.consumed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumed.is_empty()
    }

    fn step(&mut self, symbol: usize) {
        let model = self.model;
        let log_a = model.log_transition();
        let emission = model.log_emission().column(symbol);

        if self.consumed.is_empty() {
            self.log_forward = model.log_initial() + &emission;
            self.log_viterbi = model.log_initial() + &emission;
            self.paths = (0..model.num_states()).map(|i| vec![i]).collect();
        } else {
            self.log_forward = propagate(model, self.log_forward.view(), symbol);

            let mut scores = Array1::<f64>::zeros(model.num_states());
            let mut paths = Vec::with_capacity(model.num_states());
            for (j, score) in scores.iter_mut().enumerate() {
                let candidates = self
                    .log_viterbi
                    .iter()
                    .zip(log_a.column(j))
                    .map(|(&v, &a)| log_mul([v, a]));
                // Non-empty: the model has at least one state.
                let best = argmax(candidates).unwrap_or(0);
                *score = log_mul([self.log_viterbi[best], log_a[[best, j]], emission[j]]);
                let mut path = Vec::with_capacity(self.paths[best].len() + 1);
                path.extend_from_slice(&self.paths[best]);
                path.push(j);
                paths.push(path);
            }
            self.log_viterbi = scores;
            self.paths = paths;
        }

        log_normalize(&mut self.log_forward);
        self.consumed.push(symbol);
    }
}
