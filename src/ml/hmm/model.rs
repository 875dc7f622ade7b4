use std::fmt;

use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::config::NumericConfig;
use crate::error::{Error, Result};

/// A discrete Hidden Markov Model, storing:
/// - `transition[[i, j]]`: probability of moving from state i to state j
/// - `emission[[i, k]]`: probability that state i emits symbol k
/// - `initial[i]`: probability of starting in state i
///
/// Each matrix is mirrored in natural-log form. The mirrors are recomputed
/// every time the plain parameters change, so readers always see a consistent
/// pair.
#[derive(Debug, Clone, PartialEq)]
pub struct HiddenMarkovModel {
    num_states: usize,
    num_observations: usize,
    transition: Array2<f64>,
    emission: Array2<f64>,
    initial: Array1<f64>,
    log_transition: Array2<f64>,
    log_emission: Array2<f64>,
    log_initial: Array1<f64>,
    numeric: NumericConfig,
}

/// Builder for [`HiddenMarkovModel`]. Parameters left unset are drawn at
/// random and normalized.
#[derive(Debug, Clone)]
pub struct HmmBuilder {
    num_states: usize,
    num_observations: usize,
    transition: Option<Array2<f64>>,
    emission: Option<Array2<f64>>,
    initial: Option<Array1<f64>>,
    numeric: NumericConfig,
    seed: Option<u64>,
}

impl HmmBuilder {
    pub fn new(num_states: usize, num_observations: usize) -> Self {
        Self {
            num_states,
            num_observations,
            transition: None,
            emission: None,
            initial: None,
            numeric: NumericConfig::default(),
            seed: None,
        }
    }

    /// Explicit N×N transition matrix.
    pub fn with_transition(mut self, transition: Array2<f64>) -> Self {
        self.transition = Some(transition);
        self
    }

    /// Explicit N×M emission matrix.
    pub fn with_emission(mut self, emission: Array2<f64>) -> Self {
        self.emission = Some(emission);
        self
    }

    /// Explicit initial state distribution of length N.
    pub fn with_initial(mut self, initial: Array1<f64>) -> Self {
        self.initial = Some(initial);
        self
    }

    pub fn with_numeric(mut self, numeric: NumericConfig) -> Self {
        self.numeric = numeric;
        self
    }

    /// Seed for the generator that fills in missing parameters. Without a
    /// seed the generator is seeded from OS entropy.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate and assemble the model.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidModel`] if either dimension is zero, the
    /// probability floor is not positive, a supplied parameter has the wrong
    /// shape or a negative / non-finite entry, or a row does not sum to 1
    /// within `eps` after flooring.
    pub fn build(self) -> Result<HiddenMarkovModel> {
        let (n, m) = (self.num_states, self.num_observations);
        if n == 0 {
            return Err(Error::InvalidModel("num_states must be > 0".into()));
        }
        if m == 0 {
            return Err(Error::InvalidModel("num_observations must be > 0".into()));
        }
        if !(self.numeric.zero > 0.0 && self.numeric.zero.is_finite()) {
            return Err(Error::InvalidModel(format!(
                "probability floor must be positive and finite, got {}",
                self.numeric.zero
            )));
        }

        let mut rng = match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let transition = match self.transition {
            Some(a) => {
                expect_shape("transition", a.shape(), &[n, n])?;
                a
            }
            None => random_stochastic(n, n, &mut rng),
        };
        let emission = match self.emission {
            Some(b) => {
                expect_shape("emission", b.shape(), &[n, m])?;
                b
            }
            None => random_stochastic(n, m, &mut rng),
        };
        let initial = match self.initial {
            Some(pi) => {
                expect_shape("initial", pi.shape(), &[n])?;
                pi
            }
            None => random_stochastic(1, n, &mut rng).index_axis_move(Axis(0), 0),
        };

        expect_probabilities("transition", transition.iter())?;
        expect_probabilities("emission", emission.iter())?;
        expect_probabilities("initial", initial.iter())?;

        let numeric = self.numeric;
        let mut model = HiddenMarkovModel {
            num_states: n,
            num_observations: m,
            transition: transition.mapv(|p| numeric.floor(p)),
            emission: emission.mapv(|p| numeric.floor(p)),
            initial: initial.mapv(|p| numeric.floor(p)),
            log_transition: Array2::zeros((n, n)),
            log_emission: Array2::zeros((n, m)),
            log_initial: Array1::zeros(n),
            numeric,
        };
        model.refresh_logs();
        model.validate()?;
        Ok(model)
    }
}

impl HiddenMarkovModel {
    /// Start building an N-state, M-symbol model.
    pub fn builder(num_states: usize, num_observations: usize) -> HmmBuilder {
        HmmBuilder::new(num_states, num_observations)
    }

    pub fn num_states(&self) -> usize {
        self.num_states
    }

    pub fn num_observations(&self) -> usize {
        self.num_observations
    }

    pub fn transition(&self) -> &Array2<f64> {
        &self.transition
    }

    pub fn emission(&self) -> &Array2<f64> {
        &self.emission
    }

    pub fn initial(&self) -> &Array1<f64> {
        &self.initial
    }

    pub fn log_transition(&self) -> &Array2<f64> {
        &self.log_transition
    }

    pub fn log_emission(&self) -> &Array2<f64> {
        &self.log_emission
    }

    pub fn log_initial(&self) -> &Array1<f64> {
        &self.log_initial
    }

    pub fn numeric(&self) -> &NumericConfig {
        &self.numeric
    }

    /// True when every row of A, B and pi sums to 1 within `eps`.
    pub fn check(&self) -> bool {
        self.validate().is_ok()
    }

    fn validate(&self) -> Result<()> {
        let eps = self.numeric.eps;
        expect_stochastic_rows("transition", self.transition.view(), eps)?;
        expect_stochastic_rows("emission", self.emission.view(), eps)?;
        expect_stochastic_rows("initial", self.initial.view().insert_axis(Axis(0)), eps)
    }

    /// Ensure every symbol lies in `[0, num_observations)`.
    pub fn validate_observations(&self, observations: &[usize]) -> Result<()> {
        match observations
            .iter()
            .enumerate()
            .find(|&(_, &symbol)| symbol >= self.num_observations)
        {
            Some((position, &symbol)) => Err(Error::InvalidObservation {
                position,
                symbol,
                num_observations: self.num_observations,
            }),
            None => Ok(()),
        }
    }

    /// Like `validate_observations`, but an empty sequence is also rejected.
    pub(crate) fn require_observations(&self, observations: &[usize]) -> Result<()> {
        if observations.is_empty() {
            return Err(Error::EmptySequence);
        }
        self.validate_observations(observations)
    }

    /// Replace all three parameter sets with the exponentiated log values.
    pub(crate) fn commit(
        &mut self,
        log_transition: &Array2<f64>,
        log_emission: &Array2<f64>,
        log_initial: &Array1<f64>,
    ) {
        let numeric = self.numeric;
        self.transition = log_transition.mapv(|l| numeric.floor(l.exp()));
        self.emission = log_emission.mapv(|l| numeric.floor(l.exp()));
        self.initial = log_initial.mapv(|l| numeric.floor(l.exp()));
        self.refresh_logs();
    }

    fn refresh_logs(&mut self) {
        self.log_transition = self.transition.mapv(f64::ln);
        self.log_emission = self.emission.mapv(f64::ln);
        self.log_initial = self.initial.mapv(f64::ln);
    }
}

impl fmt::Display for HiddenMarkovModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:-^50}", "A: Transition probability")?;
        writeln!(f, "{:.4}", self.transition)?;
        writeln!(f, "{:-^50}", "B: Emission probability")?;
        writeln!(f, "{:.4}", self.emission)?;
        writeln!(f, "{:-^50}", "pi: Initial state distribution")?;
        write!(f, "{:.4}", self.initial)
    }
}

/// Uniform random rows normalized to sum to 1.
fn random_stochastic<R: Rng>(rows: usize, cols: usize, rng: &mut R) -> Array2<f64> {
    // Keep every draw strictly positive so no row can sum to zero.
    let mut matrix = Array2::from_shape_fn((rows, cols), |_| rng.gen_range(f64::EPSILON..1.0));
    for mut row in matrix.rows_mut() {
        let total = row.sum();
        row /= total;
    }
    matrix
}

fn expect_shape(name: &str, actual: &[usize], expected: &[usize]) -> Result<()> {
    if actual != expected {
        return Err(Error::InvalidModel(format!(
            "{name} has shape {actual:?}, expected {expected:?}"
        )));
    }
    Ok(())
}

fn expect_probabilities<'a, I>(name: &str, values: I) -> Result<()>
where
    I: IntoIterator<Item = &'a f64>,
{
    match values.into_iter().find(|p| !p.is_finite() || **p < 0.0) {
        Some(p) => Err(Error::InvalidModel(format!(
            "{name} contains {p}, probabilities must be finite and non-negative"
        ))),
        None => Ok(()),
    }
}

fn expect_stochastic_rows(name: &str, matrix: ArrayView2<'_, f64>, eps: f64) -> Result<()> {
    for (i, row) in matrix.rows().into_iter().enumerate() {
        let total = row.sum();
        if (total - 1.0).abs() > eps {
            return Err(Error::InvalidModel(format!(
                "{name} row {i} sums to {total}, expected 1 (eps {eps})"
            )));
        }
    }
    Ok(())
}
