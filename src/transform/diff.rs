//! Lag differencing and its inverse.
//!
//! `difference(x, k)[i] = x[i + k] - x[i]`. The first `k` observations
//! cannot be recovered from the differenced series alone; they must come
//! from the caller or from fitted [`DifferenceParams`].

use serde::{Deserialize, Serialize};

use super::{FittedTransform, Transform};
use crate::error::{Result, TransformError};
use crate::utils::stats::ensure_finite;

/// Apply lag differencing to a time series.
///
/// # Arguments
/// * `series` - The input series
/// * `interval` - Lag between subtracted observations (1 for trend, the
///   season length for seasonal differencing)
///
/// # Returns
/// The differenced series, `interval` values shorter than the input.
///
/// # Errors
/// `InsufficientData` for `interval == 0` or when the series has no more
/// than `interval` values.
pub fn difference(series: &[f64], interval: usize) -> Result<Vec<f64>> {
    check_interval(interval)?;
    if series.len() <= interval {
        return Err(TransformError::InsufficientData {
            needed: interval + 1,
            got: series.len(),
        });
    }

    Ok(series
        .iter()
        .skip(interval)
        .zip(series.iter())
        .map(|(curr, prev)| curr - prev)
        .collect())
}

/// Reverse differencing against known lag values.
///
/// Computes `original[i] + differenced[i]`, i.e. the values at positions
/// `interval..` of the undifferenced series. Every lag must be supplied;
/// nothing is inferred.
///
/// # Errors
/// `MissingLagValue` if `original` is shorter than `differenced`.
pub fn invert_difference(
    original: &[f64],
    differenced: &[f64],
    interval: usize,
) -> Result<Vec<f64>> {
    check_interval(interval)?;

    differenced
        .iter()
        .enumerate()
        .map(|(i, &diff)| {
            original
                .get(i)
                .map(|&lag| lag + diff)
                .ok_or(TransformError::MissingLagValue {
                    index: i,
                    available: original.len(),
                })
        })
        .collect()
}

/// Integrate differenced values that continue past the end of `history`.
///
/// The first `interval` steps use the trailing values of `history` as lags;
/// later steps use the values reconstructed before them, which is how
/// multi-step forecasts are undifferenced.
///
/// # Errors
/// `MissingLagValue` if `history` has fewer than `interval` values.
pub fn integrate(history: &[f64], differenced: &[f64], interval: usize) -> Result<Vec<f64>> {
    check_interval(interval)?;
    if history.len() < interval {
        return Err(TransformError::MissingLagValue {
            index: 0,
            available: history.len(),
        });
    }

    let mut levels = history[history.len() - interval..].to_vec();
    levels.reserve(differenced.len());
    for (i, &diff) in differenced.iter().enumerate() {
        let next = levels[i] + diff;
        levels.push(next);
    }

    Ok(levels.split_off(interval))
}

fn check_interval(interval: usize) -> Result<()> {
    if interval == 0 {
        return Err(TransformError::InsufficientData { needed: 1, got: 0 });
    }
    Ok(())
}

/// Differencing transform with a caller-supplied interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifferenceTransform {
    interval: usize,
}

impl DifferenceTransform {
    /// Create a differencing transform with the given lag.
    pub fn new(interval: usize) -> Self {
        Self { interval }
    }

    /// Lag between subtracted observations.
    pub fn interval(&self) -> usize {
        self.interval
    }
}

impl Transform for DifferenceTransform {
    type Fitted = DifferenceParams;

    fn fit(&self, series: &[f64]) -> Result<DifferenceParams> {
        check_interval(self.interval)?;
        ensure_finite(series)?;
        if series.len() <= self.interval {
            return Err(TransformError::InsufficientData {
                needed: self.interval + 1,
                got: series.len(),
            });
        }

        let head = series[..self.interval].to_vec();
        let tail = series[series.len() - self.interval..].to_vec();
        log::debug!(
            "fitted difference transform: interval = {}, {} training values",
            self.interval,
            series.len()
        );

        Ok(DifferenceParams {
            interval: self.interval,
            training_len: series.len(),
            head,
            tail,
        })
    }

    fn name(&self) -> &'static str {
        "difference"
    }
}

/// Fitted differencing parameters.
///
/// Besides the interval, keeps the training length and the first and last
/// `interval` training values: `head` seeds reconstruction of the training
/// series itself, `tail` seeds forecasts that continue the training window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifferenceParams {
    /// Lag between subtracted observations.
    pub interval: usize,
    /// Number of values in the training series.
    pub training_len: usize,
    /// First `interval` training values.
    pub head: Vec<f64>,
    /// Last `interval` training values.
    pub tail: Vec<f64>,
}

impl DifferenceParams {
    /// Check the record is internally consistent, e.g. after loading it.
    ///
    /// # Errors
    /// `InsufficientData` for `interval == 0`, `InvalidParameter` when the
    /// stored lags do not match the interval or the training length.
    pub fn validate(&self) -> Result<()> {
        check_interval(self.interval)?;
        if self.head.len() != self.interval || self.tail.len() != self.interval {
            return Err(TransformError::InvalidParameter(format!(
                "difference interval {0} needs {0} head and tail values, got {1} and {2}",
                self.interval,
                self.head.len(),
                self.tail.len()
            )));
        }
        if self.training_len <= self.interval {
            return Err(TransformError::InvalidParameter(format!(
                "training length {} must exceed difference interval {}",
                self.training_len, self.interval
            )));
        }
        if self.head.iter().chain(&self.tail).any(|x| !x.is_finite()) {
            return Err(TransformError::InvalidParameter(
                "difference lag values must be finite".to_string(),
            ));
        }
        Ok(())
    }

    /// Undifference against caller-supplied lag values.
    ///
    /// See [`invert_difference`].
    pub fn invert_with(&self, original: &[f64], differenced: &[f64]) -> Result<Vec<f64>> {
        invert_difference(original, differenced, self.interval)
    }
}

impl FittedTransform for DifferenceParams {
    fn apply(&self, series: &[f64]) -> Result<Vec<f64>> {
        difference(series, self.interval)
    }

    /// Rebuild the training series from its differences, seeded with `head`.
    ///
    /// Only the differenced training series itself is accepted. Any other
    /// length is not aligned with the stored lags, so none of its lag values
    /// are known and `MissingLagValue` is returned; use
    /// [`DifferenceParams::invert_with`] or
    /// [`FittedTransform::invert_forecast`] for other data.
    fn invert(&self, transformed: &[f64]) -> Result<Vec<f64>> {
        self.validate()?;
        if transformed.len() != self.training_len - self.interval {
            return Err(TransformError::MissingLagValue {
                index: 0,
                available: 0,
            });
        }

        let mut levels = self.head.clone();
        levels.reserve(transformed.len());
        for (i, &diff) in transformed.iter().enumerate() {
            let next = levels[i] + diff;
            levels.push(next);
        }
        Ok(levels)
    }

    /// Continue from the end of the training window, seeded with `tail`.
    fn invert_forecast(&self, forecast: &[f64]) -> Result<Vec<f64>> {
        self.validate()?;
        integrate(&self.tail, forecast, self.interval)
    }
}
