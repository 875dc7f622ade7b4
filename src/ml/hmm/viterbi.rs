use ndarray::Array2;

use super::log_space::{argmax, log_mul};
use super::model::HiddenMarkovModel;
use crate::error::Result;

impl HiddenMarkovModel {
    /// Runs the Viterbi Algorithm over a complete observation sequence.
    ///
    /// Returns the most likely hidden state sequence together with its joint
    /// log-probability. Ties between predecessors go to the lowest state
    /// index, the same rule the streaming decoder uses, so both agree.
    ///
    /// # Errors
    ///
    /// [`Error::EmptySequence`](crate::Error::EmptySequence) or
    /// [`Error::InvalidObservation`](crate::Error::InvalidObservation).
    pub fn viterbi(&self, observations: &[usize]) -> Result<(Vec<usize>, f64)> {
        self.require_observations(observations)?;

        let t = observations.len();
        let n = self.num_states();
        let log_a = self.log_transition();
        let log_b = self.log_emission();

        // delta[t][s]: best log-probability of any path ending in s at time t
        // psi[t][s]: predecessor of s on that path
        let mut delta = Array2::from_elem((t, n), f64::NEG_INFINITY);
        let mut psi = Array2::<usize>::zeros((t, n));

        for s in 0..n {
            delta[[0, s]] = log_mul([self.log_initial()[s], log_b[[s, observations[0]]]]);
        }

        for time in 1..t {
            let obs = observations[time];
            for s in 0..n {
                let candidates = (0..n).map(|prev| log_mul([delta[[time - 1, prev]], log_a[[prev, s]]]));
                let best_prev = argmax(candidates).unwrap_or(0);
                delta[[time, s]] = log_mul([
                    delta[[time - 1, best_prev]],
                    log_a[[best_prev, s]],
                    log_b[[s, obs]],
                ]);
                psi[[time, s]] = best_prev;
            }
        }

        // Termination and backtracking
        let best_final = argmax(delta.row(t - 1).iter().copied()).unwrap_or(0);
        let score = delta[[t - 1, best_final]];

        let mut path = vec![0_usize; t];
        path[t - 1] = best_final;
        for time in (1..t).rev() {
            path[time - 1] = psi[[time, path[time]]];
        }

        Ok((path, score))
    }
}
