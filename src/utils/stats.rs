//! Summary statistics used when fitting transform parameters.
//!
//! Thin wrappers over [`statrs::statistics::Statistics`] with the
//! empty-input and non-finite conventions the transforms rely on.

use statrs::statistics::Statistics;

use crate::error::{Result, TransformError};

/// Calculate the mean of a slice.
///
/// Returns NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    Statistics::mean(values.iter())
}

/// Calculate the variance of a slice (sample variance with n-1 denominator).
///
/// Returns NaN when fewer than two values are given.
pub fn variance(values: &[f64]) -> f64 {
    Statistics::variance(values.iter())
}

/// Calculate the population variance of a slice (n denominator).
///
/// Returns NaN for an empty slice.
pub fn population_variance(values: &[f64]) -> f64 {
    Statistics::population_variance(values.iter())
}

/// Calculate the sample standard deviation of a slice.
pub fn std_dev(values: &[f64]) -> f64 {
    Statistics::std_dev(values.iter())
}

/// Minimum and maximum of a slice, or `None` when it is empty.
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    Some((
        Statistics::min(values.iter()),
        Statistics::max(values.iter()),
    ))
}

/// Returns true if the slice holds at least two distinct values.
pub fn has_distinct_values(values: &[f64]) -> bool {
    match values.split_first() {
        Some((first, rest)) => rest.iter().any(|x| x != first),
        None => false,
    }
}

/// Reject empty input and NaN / infinite values.
pub fn ensure_finite(values: &[f64]) -> Result<()> {
    if values.is_empty() {
        return Err(TransformError::EmptyData);
    }
    if let Some((i, x)) = values.iter().enumerate().find(|(_, x)| !x.is_finite()) {
        return Err(TransformError::InvalidInput(format!(
            "non-finite value {x} at index {i}"
        )));
    }
    Ok(())
}
