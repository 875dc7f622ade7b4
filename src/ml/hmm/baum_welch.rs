//! One expectation-maximization step of Baum-Welch.
//!
//! Counts are accumulated in log space: every "+=" below is a `log_add`, and
//! the final divisions are subtractions of row denominators.

use ndarray::{Array, Array1, Array2, Dimension};

use super::log_space::{log_add_assign, log_div};
use super::model::HiddenMarkovModel;
use super::posterior::state_posteriors;
use crate::error::Result;

impl HiddenMarkovModel {
    /// Performs one Baum-Welch iteration over `observations` and commits the
    /// reestimated parameters. Returns the L1 distance between the old and new
    /// parameters (A, B and pi together, in plain probability space).
    ///
    /// # Errors
    ///
    /// Fails before touching the model if the sequence is empty or holds an
    /// out-of-range symbol.
    pub fn reestimate(&mut self, observations: &[usize]) -> Result<f64> {
        self.require_observations(observations)?;
        Ok(self.reestimate_unchecked(observations))
    }

    pub(crate) fn reestimate_unchecked(&mut self, observations: &[usize]) -> f64 {
        let n = self.num_states();
        let m = self.num_observations();
        let log_zero = self.numeric().log_zero();

        let alpha = self.forward_unchecked(observations);
        let beta = self.backward_unchecked(observations);
        let gamma = state_posteriors(&alpha, &beta);

        // Accumulators start empty (ln 0) so only observed mass is counted.
        let mut transition_num = Array2::from_elem((n, n), f64::NEG_INFINITY);
        let mut transition_den = Array1::from_elem(n, f64::NEG_INFINITY);
        let mut emission_num = Array2::from_elem((n, m), f64::NEG_INFINITY);
        let mut emission_den = Array1::from_elem(n, f64::NEG_INFINITY);

        for (t, &symbol) in observations.iter().enumerate() {
            log_add_assign(emission_num.column_mut(symbol), gamma.row(t));
            log_add_assign(emission_den.view_mut(), gamma.row(t));
        }

        for t in 0..observations.len() - 1 {
            let xi = self.transition_posterior(t, &alpha, &beta, observations);
            log_add_assign(transition_num.view_mut(), xi.view());
            log_add_assign(transition_den.view_mut(), gamma.row(t));
        }

        let log_transition = divide_rows(
            "transition",
            &transition_num,
            &transition_den,
            self.log_transition(),
            log_zero,
        );
        let log_emission = divide_rows(
            "emission",
            &emission_num,
            &emission_den,
            self.log_emission(),
            log_zero,
        );
        let log_initial = gamma.row(0).to_owned();

        let deviation = l1_distance(&log_transition, self.transition())
            + l1_distance(&log_emission, self.emission())
            + l1_distance(&log_initial, self.initial());

        self.commit(&log_transition, &log_emission, &log_initial);
        deviation
    }
}

/// `numerator[i][k] - denominator[i]` for every row. A row whose denominator
/// carries no posterior mass keeps its current values.
fn divide_rows(
    name: &str,
    numerator: &Array2<f64>,
    denominator: &Array1<f64>,
    current: &Array2<f64>,
    log_zero: f64,
) -> Array2<f64> {
    let mut result = numerator.clone();
    for (i, mut row) in result.rows_mut().into_iter().enumerate() {
        let den = denominator[i];
        if den <= log_zero {
            log::warn!("{name} row {i} received no posterior mass, keeping previous estimate");
            row.assign(&current.row(i));
        } else {
            row.mapv_inplace(|num| log_div(num, [den]));
        }
    }
    result
}

/// Sum of `|exp(log_new) - old|` over all elements.
fn l1_distance<D: Dimension>(log_new: &Array<f64, D>, old: &Array<f64, D>) -> f64 {
    log_new
        .iter()
        .zip(old.iter())
        .map(|(&l, &p)| (l.exp() - p).abs())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn weather() -> HiddenMarkovModel {
        HiddenMarkovModel::builder(2, 3)
            .with_transition(array![[0.7, 0.3], [0.4, 0.6]])
            .with_emission(array![[0.5, 0.4, 0.1], [0.1, 0.3, 0.6]])
            .with_initial(array![0.6, 0.4])
            .build()
            .unwrap()
    }

    #[test]
    fn test_reestimate_keeps_invariants() {
        let mut hmm = weather();
        let observations = [0, 1, 2, 2, 1, 0, 0, 2];
        for _ in 0..5 {
            let deviation = hmm.reestimate(&observations).unwrap();
            assert!(deviation.is_finite());
            assert!(deviation >= 0.0);
            assert!(hmm.check());
        }
    }

    #[test]
    fn test_initial_becomes_first_gamma() {
        let mut hmm = weather();
        let observations = [0, 1, 2];
        let gamma0 = hmm.posteriors(&observations).unwrap().gamma.row(0).mapv(f64::exp);
        hmm.reestimate(&observations).unwrap();
        assert_relative_eq!(hmm.initial()[0], gamma0[0], epsilon = 1e-12);
        assert_relative_eq!(hmm.initial()[1], gamma0[1], epsilon = 1e-12);
    }

    #[test]
    fn test_deviation_matches_parameter_change() {
        let mut hmm = weather();
        let before = hmm.clone();
        let deviation = hmm.reestimate(&[0, 0, 1, 2, 2]).unwrap();
        let expected: f64 = (hmm.transition() - before.transition()).mapv(f64::abs).sum()
            + (hmm.emission() - before.emission()).mapv(f64::abs).sum()
            + (hmm.initial() - before.initial()).mapv(f64::abs).sum();
        assert_relative_eq!(deviation, expected, epsilon = 1e-9);
    }

    #[test]
    fn test_unseen_symbol_goes_to_floor() {
        let mut hmm = weather();
        // Symbol 2 never appears, so its emission mass collapses to the floor.
        hmm.reestimate(&[0, 1, 0, 1, 1, 0]).unwrap();
        assert!(hmm.emission()[[0, 2]] < 1e-250);
        assert!(hmm.log_emission()[[0, 2]].is_finite());
        assert!(hmm.check());
    }

    #[test]
    fn test_single_observation_keeps_transition() {
        let mut hmm = weather();
        let before = hmm.transition().clone();
        hmm.reestimate(&[1]).unwrap();
        for (&after, &prior) in hmm.transition().iter().zip(before.iter()) {
            assert_relative_eq!(after, prior, epsilon = 1e-12);
        }
        assert!(hmm.check());
    }

    #[test]
    fn test_invalid_input_leaves_model_untouched() {
        let mut hmm = weather();
        let before = hmm.clone();
        assert!(matches!(
            hmm.reestimate(&[0, 7]),
            Err(Error::InvalidObservation { .. })
        ));
        assert_eq!(hmm.reestimate(&[]), Err(Error::EmptySequence));
        assert_eq!(hmm, before);
    }
}
