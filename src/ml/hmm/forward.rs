use ndarray::{Array1, Array2, ArrayView1};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::log_space::{log_mul, log_sum, log_sum_all};
use super::model::HiddenMarkovModel;
use crate::error::Result;

impl HiddenMarkovModel {
    /// Forward (alpha) table in log space.
    ///
    /// `alpha[[t, j]]` is the log-probability of emitting `observations[..=t]`
    /// and being in state `j` at time `t`.
    ///
    /// # Errors
    ///
    /// [`Error::EmptySequence`](crate::Error::EmptySequence) or
    /// [`Error::InvalidObservation`](crate::Error::InvalidObservation).
    pub fn forward(&self, observations: &[usize]) -> Result<Array2<f64>> {
        self.require_observations(observations)?;
        Ok(self.forward_unchecked(observations))
    }

    /// Log-probability of the whole sequence under the model.
    pub fn log_likelihood(&self, observations: &[usize]) -> Result<f64> {
        let alpha = self.forward(observations)?;
        Ok(log_sum_all(&alpha.row(observations.len() - 1)))
    }

    pub(crate) fn forward_unchecked(&self, observations: &[usize]) -> Array2<f64> {
        let mut alpha = Array2::from_elem(
            (observations.len(), self.num_states()),
            self.numeric().log_zero(),
        );
        let first = self.log_initial() + &self.log_emission().column(observations[0]);
        alpha.row_mut(0).assign(&first);
        for t in 1..observations.len() {
            let next = propagate(self, alpha.row(t - 1), observations[t]);
            alpha.row_mut(t).assign(&next);
        }
        alpha
    }
}

/// One step of the forward recursion:
/// `next[j] = log_sum_i(prev[i] + logA[i][j]) + logB[j][symbol]`.
pub(crate) fn propagate(
    model: &HiddenMarkovModel,
    prev: ArrayView1<'_, f64>,
    symbol: usize,
) -> Array1<f64> {
    let log_a = model.log_transition();
    let log_b = model.log_emission();
    collect_states(model.num_states(), |j| {
        let incoming = prev
            .iter()
            .zip(log_a.column(j))
            .map(|(&p, &a)| log_mul([p, a]));
        log_mul([log_sum(incoming), log_b[[j, symbol]]])
    })
}

/// Evaluates `cell` for every state. Cells of one time step are independent,
/// so with the `parallel` feature they are spread over the rayon pool; each
/// cell runs the same fold either way.
pub(crate) fn collect_states<F>(num_states: usize, cell: F) -> Array1<f64>
where
    F: Fn(usize) -> f64 + Sync + Send,
{
    #[cfg(feature = "parallel")]
    let values: Vec<f64> = (0..num_states).into_par_iter().map(cell).collect();
    #[cfg(not(feature = "parallel"))]
    let values: Vec<f64> = (0..num_states).map(cell).collect();
    Array1::from(values)
}
