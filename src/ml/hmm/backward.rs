use ndarray::Array2;

use super::forward::collect_states;
use super::log_space::{log_mul, log_sum};
use super::model::HiddenMarkovModel;
use crate::error::Result;

impl HiddenMarkovModel {
    /// Backward (beta) table in log space.
    ///
    /// `beta[[t, i]]` is the log-probability of emitting `observations[t + 1..]`
    /// given state `i` at time `t`. The last row is `ln 1 = 0`.
    pub fn backward(&self, observations: &[usize]) -> Result<Array2<f64>> {
        self.require_observations(observations)?;
        Ok(self.backward_unchecked(observations))
    }

    pub(crate) fn backward_unchecked(&self, observations: &[usize]) -> Array2<f64> {
        let len = observations.len();
        let log_a = self.log_transition();
        let log_b = self.log_emission();
        let mut beta = Array2::<f64>::zeros((len, self.num_states()));

        for t in (0..len.saturating_sub(1)).rev() {
            let symbol = observations[t + 1];
            let later = beta.row(t + 1);
            let row = collect_states(self.num_states(), |i| {
                let outgoing = log_a
                    .row(i)
                    .into_iter()
                    .zip(log_b.column(symbol))
                    .zip(later.iter())
                    .map(|((&a, &b), &next)| log_mul([a, b, next]));
                log_sum(outgoing)
            });
            beta.row_mut(t).assign(&row);
        }
        beta
    }
}
