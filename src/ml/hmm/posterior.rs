use ndarray::Array2;

use super::log_space::{log_mul, log_normalize, log_sum_all};
use super::model::HiddenMarkovModel;
use crate::error::Result;

/// Everything the E-step produces for one observation sequence, in log space.
#[derive(Debug, Clone)]
pub struct Posteriors {
    pub alpha: Array2<f64>,
    pub beta: Array2<f64>,
    /// `gamma[[t, i]]` = log P(state i at t | sequence).
    pub gamma: Array2<f64>,
    pub log_likelihood: f64,
}

/// Per-timestep state posteriors: each row of `alpha + beta`, normalized.
///
/// # Panics
///
/// Panics if `alpha` and `beta` differ in shape.
pub fn state_posteriors(alpha: &Array2<f64>, beta: &Array2<f64>) -> Array2<f64> {
    assert_eq!(
        alpha.shape(),
        beta.shape(),
        "state_posteriors: alpha and beta shapes differ"
    );
    let mut gamma = alpha + beta;
    for mut row in gamma.rows_mut() {
        log_normalize(&mut row);
    }
    gamma
}

impl HiddenMarkovModel {
    /// Runs the forward and backward passes and derives gamma.
    pub fn posteriors(&self, observations: &[usize]) -> Result<Posteriors> {
        self.require_observations(observations)?;
        let alpha = self.forward_unchecked(observations);
        let beta = self.backward_unchecked(observations);
        let gamma = state_posteriors(&alpha, &beta);
        let log_likelihood = log_sum_all(&alpha.row(observations.len() - 1));
        Ok(Posteriors {
            alpha,
            beta,
            gamma,
            log_likelihood,
        })
    }

    /// Transition posterior between steps `t` and `t + 1`:
    /// `xi[[i, j]]` = log P(state i at t, state j at t + 1 | sequence).
    /// The whole N×N matrix is normalized together.
    ///
    /// # Panics
    ///
    /// Panics if `t + 1` is not a valid time step of `alpha`/`beta`/`observations`.
    pub fn transition_posterior(
        &self,
        t: usize,
        alpha: &Array2<f64>,
        beta: &Array2<f64>,
        observations: &[usize],
    ) -> Array2<f64> {
        let symbol = observations[t + 1];
        let log_a = self.log_transition();
        let log_b = self.log_emission();
        let n = self.num_states();
        let mut xi = Array2::from_shape_fn((n, n), |(i, j)| {
            log_mul([
                alpha[[t, i]],
                log_a[[i, j]],
                log_b[[j, symbol]],
                beta[[t + 1, j]],
            ])
        });
        log_normalize(&mut xi);
        xi
    }
}
