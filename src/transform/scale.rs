//! Standardization and min-max normalization.
//!
//! Both are affine maps whose coefficients are fitted once, on training
//! data, and reused for every later series.

use serde::{Deserialize, Serialize};

use super::{FittedTransform, Transform};
use crate::error::{Result, TransformError};
use crate::utils::stats::{ensure_finite, mean, min_max, std_dev};

/// Relative spread below which a series counts as constant.
const DEGENERATE_TOLERANCE: f64 = 1e-12;

/// Zero-mean, unit-variance rescaling (z-score).
///
/// Uses the sample standard deviation (n - 1 denominator).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Standardizer;

impl Standardizer {
    /// Create a standardizer.
    pub fn new() -> Self {
        Self
    }
}

/// Fitted standardization coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandardizeParams {
    pub mean: f64,
    pub std: f64,
}

impl Transform for Standardizer {
    type Fitted = StandardizeParams;

    fn fit(&self, series: &[f64]) -> Result<StandardizeParams> {
        ensure_finite(series)?;
        if series.len() < 2 {
            return Err(TransformError::InsufficientData {
                needed: 2,
                got: series.len(),
            });
        }

        let mean = mean(series);
        let std = std_dev(series);
        if !(std > DEGENERATE_TOLERANCE * mean.abs().max(1.0)) {
            return Err(TransformError::DegenerateDistribution { std });
        }

        log::debug!("fitted standardizer: mean = {mean}, std = {std}");
        Ok(StandardizeParams { mean, std })
    }

    fn name(&self) -> &'static str {
        "standardize"
    }
}

impl StandardizeParams {
    /// Reject records that cannot be inverted, e.g. loaded with `std <= 0`.
    pub fn validate(&self) -> Result<()> {
        if !(self.mean.is_finite() && self.std.is_finite() && self.std > 0.0) {
            return Err(TransformError::InvalidParameter(format!(
                "standardize needs finite mean and std > 0, got mean {} and std {}",
                self.mean, self.std
            )));
        }
        Ok(())
    }
}

impl FittedTransform for StandardizeParams {
    /// x_scaled = (x - mean) / std
    fn apply(&self, series: &[f64]) -> Result<Vec<f64>> {
        self.validate()?;
        Ok(series.iter().map(|&x| (x - self.mean) / self.std).collect())
    }

    fn invert(&self, transformed: &[f64]) -> Result<Vec<f64>> {
        self.validate()?;
        Ok(transformed
            .iter()
            .map(|&y| y * self.std + self.mean)
            .collect())
    }
}

/// Standardize a series with coefficients fitted on itself.
pub fn standardize(series: &[f64]) -> Result<(StandardizeParams, Vec<f64>)> {
    Standardizer.fit_apply(series)
}

/// Min-max rescaling to a target range, `[0, 1]` by default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalizer {
    low: f64,
    high: f64,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            low: 0.0,
            high: 1.0,
        }
    }
}

impl Normalizer {
    /// Normalize to `[0, 1]`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize to `[low, high]`; checked at fit time.
    pub fn with_range(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Target range as `(low, high)`.
    pub fn target_range(&self) -> (f64, f64) {
        (self.low, self.high)
    }
}

/// Fitted min-max coefficients together with the target range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizeParams {
    /// Observed training minimum.
    pub min: f64,
    /// Observed training maximum.
    pub max: f64,
    /// Image of `min`.
    pub low: f64,
    /// Image of `max`.
    pub high: f64,
}

impl Transform for Normalizer {
    type Fitted = NormalizeParams;

    fn fit(&self, series: &[f64]) -> Result<NormalizeParams> {
        if !(self.low.is_finite() && self.high.is_finite() && self.low < self.high) {
            return Err(TransformError::InvalidParameter(format!(
                "target range must be finite with low < high, got ({}, {})",
                self.low, self.high
            )));
        }
        ensure_finite(series)?;

        let (min, max) = min_max(series).ok_or(TransformError::EmptyData)?;
        if max == min {
            return Err(TransformError::DegenerateRange { value: min });
        }

        log::debug!(
            "fitted normalizer: [{min}, {max}] -> [{}, {}]",
            self.low,
            self.high
        );
        Ok(NormalizeParams {
            min,
            max,
            low: self.low,
            high: self.high,
        })
    }

    fn name(&self) -> &'static str {
        "normalize"
    }
}

impl NormalizeParams {
    /// Reject records whose source or target range is empty or non-finite.
    pub fn validate(&self) -> Result<()> {
        let finite = [self.min, self.max, self.low, self.high]
            .iter()
            .all(|x| x.is_finite());
        if !(finite && self.min < self.max && self.low < self.high) {
            return Err(TransformError::InvalidParameter(format!(
                "normalize needs min < max and low < high, got [{}, {}] -> [{}, {}]",
                self.min, self.max, self.low, self.high
            )));
        }
        Ok(())
    }
}

impl FittedTransform for NormalizeParams {
    /// Values outside the training `[min, max]` map outside `[low, high]`.
    fn apply(&self, series: &[f64]) -> Result<Vec<f64>> {
        self.validate()?;
        let ratio = (self.high - self.low) / (self.max - self.min);
        Ok(series
            .iter()
            .map(|&x| self.low + (x - self.min) * ratio)
            .collect())
    }

    fn invert(&self, transformed: &[f64]) -> Result<Vec<f64>> {
        self.validate()?;
        let ratio = (self.max - self.min) / (self.high - self.low);
        Ok(transformed
            .iter()
            .map(|&y| self.min + (y - self.low) * ratio)
            .collect())
    }
}

/// Normalize a series to `[0, 1]` with coefficients fitted on itself.
pub fn normalize(series: &[f64]) -> Result<(NormalizeParams, Vec<f64>)> {
    Normalizer::new().fit_apply(series)
}
