/// Numeric constants used by a model for flooring and invariant checks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericConfig {
    /// Tolerance when checking that stochastic rows sum to 1.
    pub eps: f64,
    /// Probability floor. Anything below it is lifted by `zero` before logs are taken.
    pub zero: f64,
}

impl Default for NumericConfig {
    fn default() -> Self {
        Self {
            eps: 1e-4,
            zero: 1e-300,
        }
    }
}

impl NumericConfig {
    /// Customize the row-sum tolerance.
    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }

    /// Customize the probability floor.
    pub fn with_zero(mut self, zero: f64) -> Self {
        self.zero = zero;
        self
    }

    /// Log of the probability floor, the "effectively impossible" value.
    pub fn log_zero(&self) -> f64 {
        self.zero.ln()
    }

    /// Lifts a probability below the floor.
    pub(crate) fn floor(&self, p: f64) -> f64 {
        if p < self.zero {
            p + self.zero
        } else {
            p
        }
    }
}

/// How much the trainer reports while it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    #[default]
    Silent,
    /// Log the deviation after every iteration.
    Progress,
    /// Also log the full parameter dump after every iteration.
    Detailed,
}

/// Configuration options for Baum-Welch training.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Upper bound on EM iterations.
    pub max_iterations: usize,
    /// Training stops once the L1 parameter deviation drops below this.
    pub tolerance: f64,
    pub verbosity: Verbosity,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TrainConfig {
    /// Create a config with max_iterations (100) and tolerance (0.01), silent.
    pub fn new() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 0.01,
            verbosity: Verbosity::Silent,
        }
    }

    /// Customize the maximum number of iterations.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Customize the convergence tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let numeric = NumericConfig::default();
        assert_eq!(numeric.eps, 1e-4);
        assert_eq!(numeric.zero, 1e-300);
        assert!((numeric.log_zero() - (-690.7755278982137)).abs() < 1e-9);

        let train = TrainConfig::default();
        assert_eq!(train.max_iterations, 100);
        assert_eq!(train.tolerance, 0.01);
        assert_eq!(train.verbosity, Verbosity::Silent);
    }

    #[test]
    fn test_floor() {
        let numeric = NumericConfig::default();
        assert_eq!(numeric.floor(0.0), 1e-300);
        assert_eq!(numeric.floor(0.5), 0.5);
    }

    #[test]
    fn test_builders() {
        let train = TrainConfig::new()
            .with_max_iterations(5)
            .with_tolerance(1e-6)
            .with_verbosity(Verbosity::Progress);
        assert_eq!(train.max_iterations, 5);
        assert_eq!(train.tolerance, 1e-6);
        assert_eq!(train.verbosity, Verbosity::Progress);

        let numeric = NumericConfig::default().with_eps(1e-6).with_zero(1e-200);
        assert_eq!(numeric.eps, 1e-6);
        assert_eq!(numeric.zero, 1e-200);
    }
}
