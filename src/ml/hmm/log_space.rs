//! Arithmetic on natural-log probabilities.
//!
//! Products become sums and sums become `log_add` folds, so long sequences
//! never underflow. The array helpers apply the scalar operation element by
//! element and require operands of identical shape.

use ndarray::{ArrayBase, ArrayView, ArrayViewMut, Data, DataMut, Dimension, Zip};

/// Log of a product: `x1 + x2 + ... + xk`.
pub fn log_mul<I>(terms: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    terms.into_iter().sum()
}

/// Log of a quotient: `x - (y1 + ... + yk)`.
pub fn log_div<I>(numerator: f64, denominators: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    numerator - log_mul(denominators)
}

/// `ln(exp(x) + exp(y))` without leaving log space.
pub fn log_add(x: f64, y: f64) -> f64 {
    let (hi, lo) = if x >= y { (x, y) } else { (y, x) };
    if lo == f64::NEG_INFINITY {
        return hi;
    }
    hi + (lo - hi).exp().ln_1p()
}

/// Pairwise `log_add` fold over all terms. Empty input is `-inf` (log of 0).
pub fn log_sum<I>(terms: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    terms.into_iter().fold(f64::NEG_INFINITY, log_add)
}

/// Index of the largest value; ties go to the lowest index.
pub fn argmax<I>(values: I) -> Option<usize>
where
    I: IntoIterator<Item = f64>,
{
    let mut best: Option<(usize, f64)> = None;
    for (i, v) in values.into_iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// `acc[k] = log_add(acc[k], rhs[k])` for every element.
///
/// # Panics
///
/// Panics if the two operands do not have exactly the same shape.
pub fn log_add_assign<D: Dimension>(acc: ArrayViewMut<'_, f64, D>, rhs: ArrayView<'_, f64, D>) {
    assert_eq!(
        acc.shape(),
        rhs.shape(),
        "log_add_assign: operand shapes differ"
    );
    Zip::from(acc)
        .and(rhs)
        .for_each(|a, &b| *a = log_add(*a, b));
}

/// Subtracts the log-sum of all elements so the exponentiated array sums to 1.
/// Returns the log normalizer that was removed.
pub fn log_normalize<S, D>(values: &mut ArrayBase<S, D>) -> f64
where
    S: DataMut<Elem = f64>,
    D: Dimension,
{
    let total = log_sum(values.iter().copied());
    values.mapv_inplace(|v| v - total);
    total
}

/// `log_sum` over every element of an array.
pub fn log_sum_all<S, D>(values: &ArrayBase<S, D>) -> f64
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    log_sum(values.iter().copied())
}
