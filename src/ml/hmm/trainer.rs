use super::config::{TrainConfig, Verbosity};
use super::model::HiddenMarkovModel;
use crate::error::Result;

/// Outcome of a training run. The model itself is updated in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingSummary {
    /// Number of Baum-Welch iterations that were run.
    pub iterations: usize,
    /// Deviation returned by the last iteration (infinite if none ran).
    pub deviation: f64,
    /// Whether the deviation dropped below the tolerance before the cap.
    pub converged: bool,
}

impl HiddenMarkovModel {
    /// Fits the parameters to `observations` with Baum-Welch.
    ///
    /// Iterates until `config.max_iterations` is reached or the deviation of an
    /// iteration falls below `config.tolerance`. Hitting the cap is not an
    /// error.
    ///
    /// # Errors
    ///
    /// The sequence is validated once up front; on error the model is unchanged.
    ///
    /// # Example
    ///
    /// ```
    /// use logspace_hmm::{HiddenMarkovModel, TrainConfig};
    ///
    /// let mut hmm = HiddenMarkovModel::builder(2, 3).with_seed(7).build().unwrap();
    /// let config = TrainConfig::new().with_max_iterations(20);
    /// let summary = hmm.train(&[0, 1, 2, 2, 1, 0], &config).unwrap();
    /// assert!(summary.iterations <= 20);
    /// assert!(hmm.check());
    /// ```
    pub fn train(
        &mut self,
        observations: &[usize],
        config: &TrainConfig,
    ) -> Result<TrainingSummary> {
        self.require_observations(observations)?;

        let mut summary = TrainingSummary {
            iterations: 0,
            deviation: f64::INFINITY,
            converged: false,
        };

        for iteration in 1..=config.max_iterations {
            let deviation = self.reestimate_unchecked(observations);
            summary.iterations = iteration;
            summary.deviation = deviation;

            if config.verbosity != Verbosity::Silent {
                log::info!("iteration {iteration:5}: deviation {deviation:.6}");
            }
            if config.verbosity == Verbosity::Detailed {
                log::info!("parameters after iteration {}:\n{}", iteration, self);
            }

            if deviation.abs() < config.tolerance {
                summary.converged = true;
                break;
            }
        }

        if summary.converged {
            log::debug!(
                "converged after {} iterations (deviation {:.6})",
                summary.iterations,
                summary.deviation
            );
        } else {
            log::debug!(
                "stopped at the iteration cap of {} (deviation {:.6}, tolerance {})",
                config.max_iterations,
                summary.deviation,
                config.tolerance
            );
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use ndarray::array;

    fn weather() -> HiddenMarkovModel {
        HiddenMarkovModel::builder(2, 3)
            .with_transition(array![[0.7, 0.3], [0.4, 0.6]])
            .with_emission(array![[0.5, 0.4, 0.1], [0.1, 0.3, 0.6]])
            .with_initial(array![0.6, 0.4])
            .build()
            .unwrap()
    }

    fn pattern() -> Vec<usize> {
        [0, 0, 1, 2, 2, 1].iter().cycle().take(60).copied().collect()
    }

    #[test]
    fn test_single_iteration() {
        let mut hmm = weather();
        let config = TrainConfig::new().with_max_iterations(1);
        let summary = hmm.train(&pattern(), &config).unwrap();
        assert_eq!(summary.iterations, 1);
        assert!(hmm.check());
    }

    #[test]
    fn test_cap_without_convergence_is_ok() {
        let mut hmm = weather();
        let config = TrainConfig::new()
            .with_max_iterations(3)
            .with_tolerance(0.0);
        let summary = hmm.train(&pattern(), &config).unwrap();
        assert_eq!(summary.iterations, 3);
        assert!(!summary.converged);
        assert!(hmm.check());
    }

    #[test]
    fn test_converges_with_loose_tolerance() {
        let mut hmm = weather();
        let config = TrainConfig::new()
            .with_max_iterations(500)
            .with_tolerance(0.5);
        let summary = hmm.train(&pattern(), &config).unwrap();
        assert!(summary.converged);
        assert!(summary.deviation < 0.5);
        assert!(summary.iterations < 500);
    }

    #[test]
    fn test_training_improves_likelihood() {
        let mut hmm = HiddenMarkovModel::builder(3, 3).with_seed(11).build().unwrap();
        let observations = pattern();
        let before = hmm.log_likelihood(&observations).unwrap();
        hmm.train(&observations, &TrainConfig::new().with_max_iterations(30))
            .unwrap();
        let after = hmm.log_likelihood(&observations).unwrap();
        assert!(after >= before);
    }

    #[test]
    fn test_zero_iterations() {
        let mut hmm = weather();
        let before = hmm.clone();
        let summary = hmm
            .train(&pattern(), &TrainConfig::new().with_max_iterations(0))
            .unwrap();
        assert_eq!(summary.iterations, 0);
        assert!(!summary.converged);
        assert_eq!(hmm, before);
    }

    #[test]
    fn test_verbose_training_runs() {
        let mut hmm = weather();
        let config = TrainConfig::new()
            .with_max_iterations(2)
            .with_verbosity(Verbosity::Detailed);
        assert!(hmm.train(&pattern(), &config).is_ok());
    }

    #[test]
    fn test_invalid_sequence_rejected_before_training() {
        let mut hmm = weather();
        let before = hmm.clone();
        let mut observations = pattern();
        observations.push(3);
        assert!(matches!(
            hmm.train(&observations, &TrainConfig::new()),
            Err(Error::InvalidObservation { position: 60, symbol: 3, .. })
        ));
        assert_eq!(hmm, before);
    }
}
