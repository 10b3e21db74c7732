//! Box-Cox power transformation.
//!
//! Transforms strictly positive data to be more normally distributed. The
//! exponent `lambda` is either supplied or estimated by maximizing the
//! Box-Cox profile log-likelihood.

use serde::{Deserialize, Serialize};

use super::{FittedTransform, Transform};
use crate::error::{Result, TransformError};
use crate::utils::optimization::{golden_section_max, GoldenSectionConfig};
use crate::utils::stats::{ensure_finite, has_distinct_values, population_variance};

/// Below this magnitude lambda is treated as exactly zero (log transform).
const LAMBDA_ZERO: f64 = 1e-10;

/// Configuration for lambda estimation.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxCoxConfig {
    /// Lower end of the lambda search interval.
    pub lambda_min: f64,
    /// Upper end of the lambda search interval.
    pub lambda_max: f64,
    /// Number of points in the coarse grid (including both ends).
    pub grid_points: usize,
    /// Bracket tolerance for the golden-section refinement.
    pub tolerance: f64,
    /// Iteration cap for the refinement.
    pub max_iter: usize,
}

impl Default for BoxCoxConfig {
    fn default() -> Self {
        Self {
            lambda_min: -2.0,
            lambda_max: 2.0,
            grid_points: 401,
            tolerance: 1e-10,
            max_iter: 200,
        }
    }
}

impl BoxCoxConfig {
    /// Set the lambda search interval.
    pub fn with_bounds(mut self, lambda_min: f64, lambda_max: f64) -> Self {
        self.lambda_min = lambda_min;
        self.lambda_max = lambda_max;
        self
    }

    /// Set the number of coarse grid points.
    pub fn with_grid_points(mut self, grid_points: usize) -> Self {
        self.grid_points = grid_points;
        self
    }

    /// Set the refinement tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.lambda_min.is_finite()
            && self.lambda_max.is_finite()
            && self.lambda_min < self.lambda_max)
        {
            return Err(TransformError::InvalidParameter(format!(
                "lambda bounds must be finite with min < max, got [{}, {}]",
                self.lambda_min, self.lambda_max
            )));
        }
        if self.grid_points < 3 {
            return Err(TransformError::InvalidParameter(format!(
                "grid_points must be at least 3, got {}",
                self.grid_points
            )));
        }
        Ok(())
    }
}

/// Fitted Box-Cox parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxCoxParams {
    /// Lambda parameter used
    pub lambda: f64,
}

impl BoxCoxParams {
    /// Reject a non-finite lambda, e.g. in a loaded record.
    pub fn validate(&self) -> Result<()> {
        if !self.lambda.is_finite() {
            return Err(TransformError::InvalidParameter(format!(
                "lambda must be finite, got {}",
                self.lambda
            )));
        }
        Ok(())
    }
}

impl FittedTransform for BoxCoxParams {
    fn apply(&self, series: &[f64]) -> Result<Vec<f64>> {
        self.validate()?;
        boxcox(series, self.lambda)
    }

    fn invert(&self, transformed: &[f64]) -> Result<Vec<f64>> {
        self.validate()?;
        inv_boxcox(transformed, self.lambda)
    }
}

/// Box-Cox transform with an estimated or fixed lambda.
///
/// # Example
///
/// ```
/// use tsprep::transform::{FittedTransform, PowerTransform, Transform};
///
/// let series = vec![1.0, 2.0, 4.0, 8.0, 16.0, 32.0];
/// let params = PowerTransform::new().fit(&series).unwrap();
/// let transformed = params.apply(&series).unwrap();
/// let recovered = params.invert(&transformed).unwrap();
///
/// for (orig, rec) in series.iter().zip(&recovered) {
///     assert!((orig - rec).abs() < 1e-9 * orig);
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PowerTransform {
    lambda: Option<f64>,
    config: BoxCoxConfig,
}

impl PowerTransform {
    /// Estimate lambda by maximum likelihood with the default search.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed lambda; `fit` only validates the input.
    pub fn with_lambda(lambda: f64) -> Self {
        Self {
            lambda: Some(lambda),
            config: BoxCoxConfig::default(),
        }
    }

    /// Estimate lambda with a custom search configuration.
    pub fn with_config(config: BoxCoxConfig) -> Self {
        Self {
            lambda: None,
            config,
        }
    }

    /// The fixed lambda, if one was supplied.
    pub fn fixed_lambda(&self) -> Option<f64> {
        self.lambda
    }
}

impl Transform for PowerTransform {
    type Fitted = BoxCoxParams;

    fn fit(&self, series: &[f64]) -> Result<BoxCoxParams> {
        let lambda = match self.lambda {
            Some(lambda) => {
                if !lambda.is_finite() {
                    return Err(TransformError::InvalidParameter(format!(
                        "lambda must be finite, got {lambda}"
                    )));
                }
                ensure_positive(series)?;
                lambda
            }
            None => boxcox_lambda_with(series, &self.config)?,
        };
        log::debug!("fitted power transform: lambda = {lambda}");
        Ok(BoxCoxParams { lambda })
    }

    fn name(&self) -> &'static str {
        "power"
    }
}

/// Result of Box-Cox transformation.
#[derive(Debug, Clone)]
pub struct BoxCoxResult {
    /// Transformed data
    pub data: Vec<f64>,
    /// Lambda parameter used
    pub lambda: f64,
}

impl BoxCoxResult {
    /// Inverse transform to recover original scale.
    pub fn inverse(&self) -> Result<Vec<f64>> {
        inv_boxcox(&self.data, self.lambda)
    }
}

/// Apply Box-Cox transformation with a given lambda.
///
/// For lambda != 0: y = (x^lambda - 1) / lambda
/// For lambda == 0: y = ln(x)
///
/// # Errors
/// `InvalidInput` if any value is not strictly positive.
pub fn boxcox(series: &[f64], lambda: f64) -> Result<Vec<f64>> {
    series
        .iter()
        .enumerate()
        .map(|(i, &x)| {
            if x > 0.0 && x.is_finite() {
                Ok(boxcox_value(x, lambda))
            } else {
                Err(TransformError::InvalidInput(format!(
                    "Box-Cox requires strictly positive values, got {x} at index {i}"
                )))
            }
        })
        .collect()
}

/// Apply Box-Cox transformation with automatic lambda selection.
pub fn boxcox_auto(series: &[f64]) -> Result<BoxCoxResult> {
    let lambda = boxcox_lambda(series)?;
    let data = boxcox(series, lambda)?;
    Ok(BoxCoxResult { data, lambda })
}

/// Inverse Box-Cox transformation.
///
/// For lambda != 0: x = exp(ln(lambda * y + 1) / lambda)
/// For lambda == 0: x = exp(y)
///
/// # Errors
/// `NumericDomain` if `lambda * y + 1 <= 0`, which means the value was not
/// produced by this lambda.
pub fn inv_boxcox(transformed: &[f64], lambda: f64) -> Result<Vec<f64>> {
    transformed
        .iter()
        .enumerate()
        .map(|(index, &y)| {
            if lambda.abs() < LAMBDA_ZERO {
                if y.is_nan() {
                    return Err(TransformError::NumericDomain { index, value: y });
                }
                Ok(y.exp())
            } else {
                let scaled = lambda * y;
                if !(scaled + 1.0 > 0.0) {
                    return Err(TransformError::NumericDomain { index, value: y });
                }
                Ok((scaled.ln_1p() / lambda).exp())
            }
        })
        .collect()
}

/// Find optimal Box-Cox lambda using maximum likelihood estimation.
///
/// Searches `[-2, 2]`; see [`boxcox_lambda_with`].
pub fn boxcox_lambda(series: &[f64]) -> Result<f64> {
    boxcox_lambda_with(series, &BoxCoxConfig::default())
}

/// Find optimal Box-Cox lambda with a custom search configuration.
///
/// A coarse grid locates the best bracket, which golden-section search
/// then refines.
///
/// # Errors
/// `InvalidInput` if any value is not strictly positive or the series has
/// fewer than two distinct values.
pub fn boxcox_lambda_with(series: &[f64], config: &BoxCoxConfig) -> Result<f64> {
    config.validate()?;
    ensure_positive(series)?;
    if !has_distinct_values(series) {
        return Err(TransformError::InvalidInput(
            "lambda estimation needs at least 2 distinct values".to_string(),
        ));
    }

    let step = (config.lambda_max - config.lambda_min) / (config.grid_points - 1) as f64;
    let grid_lambda = |i: usize| config.lambda_min + step * i as f64;

    let mut best_idx = 0;
    let mut best_llf = f64::NEG_INFINITY;
    for i in 0..config.grid_points {
        let llf = boxcox_llf(series, grid_lambda(i));
        if llf > best_llf {
            best_llf = llf;
            best_idx = i;
        }
    }

    let lower = grid_lambda(best_idx.saturating_sub(1));
    let upper = grid_lambda((best_idx + 1).min(config.grid_points - 1));
    let search = GoldenSectionConfig::default()
        .with_max_iter(config.max_iter)
        .with_tolerance(config.tolerance);
    let refined = golden_section_max(|lambda| boxcox_llf(series, lambda), lower, upper, &search);

    let lambda = if refined.optimal_value >= best_llf {
        refined.optimal_point
    } else {
        grid_lambda(best_idx)
    };

    if lambda - config.lambda_min < step || config.lambda_max - lambda < step {
        log::warn!(
            "Box-Cox lambda {lambda} is at the search bound [{}, {}]",
            config.lambda_min,
            config.lambda_max
        );
    }

    Ok(lambda)
}

/// Box-Cox profile log-likelihood, dropping constant terms.
///
/// For `n` positive values the transformed data is scored as a normal
/// sample with its maximum-likelihood variance, plus the log-Jacobian of
/// the transform: `(lambda - 1) * sum(ln x) - n/2 * ln(var)`.
///
/// Returns negative infinity when the likelihood is undefined: fewer than
/// two values, a non-positive value or zero variance after transforming.
pub fn boxcox_llf(series: &[f64], lambda: f64) -> f64 {
    if series.len() < 2 {
        return f64::NEG_INFINITY;
    }
    let Ok(transformed) = boxcox(series, lambda) else {
        return f64::NEG_INFINITY;
    };

    let spread = population_variance(&transformed);
    if !(spread > 0.0 && spread.is_finite()) {
        return f64::NEG_INFINITY;
    }

    let log_jacobian = (lambda - 1.0) * series.iter().map(|x| x.ln()).sum::<f64>();
    log_jacobian - 0.5 * series.len() as f64 * spread.ln()
}

/// Check if data is suitable for Box-Cox transformation.
///
/// Returns true if all values are positive and finite.
pub fn is_boxcox_suitable(series: &[f64]) -> bool {
    !series.is_empty() && series.iter().all(|&x| x > 0.0 && x.is_finite())
}

fn boxcox_value(x: f64, lambda: f64) -> f64 {
    if lambda.abs() < LAMBDA_ZERO {
        x.ln()
    } else {
        // expm1 keeps precision when lambda * ln(x) is small
        (lambda * x.ln()).exp_m1() / lambda
    }
}

fn ensure_positive(series: &[f64]) -> Result<()> {
    ensure_finite(series)?;
    if let Some((i, x)) = series.iter().enumerate().find(|&(_, &x)| x <= 0.0) {
        return Err(TransformError::InvalidInput(format!(
            "Box-Cox requires strictly positive values, got {x} at index {i}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // ==================== boxcox ====================

    #[test]
    fn boxcox_matches_closed_forms() {
        let series = [0.25, 1.0, 4.0, 9.0];
        let cases: [(f64, fn(f64) -> f64); 4] = [
            (1.0, |x| x - 1.0),
            (2.0, |x| (x * x - 1.0) / 2.0),
            (0.5, |x| 2.0 * (x.sqrt() - 1.0)),
            (-1.0, |x| 1.0 - 1.0 / x),
        ];

        for (lambda, closed_form) in cases {
            let result = boxcox(&series, lambda).unwrap();
            for (&x, &y) in series.iter().zip(&result) {
                assert_relative_eq!(y, closed_form(x), epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn boxcox_lambda_0_is_natural_log() {
        let series = vec![0.5, 1.0, 2.0, 3.0, 4.0, 5.0];
        let result = boxcox(&series, 0.0).unwrap();

        for (i, &x) in series.iter().enumerate() {
            assert_relative_eq!(result[i], x.ln(), epsilon = 1e-12);
        }
    }

    #[test]
    fn boxcox_rejects_non_positive() {
        assert!(matches!(
            boxcox(&[1.0, 0.0, 2.0], 1.0),
            Err(TransformError::InvalidInput(_))
        ));
        assert!(matches!(
            boxcox(&[-1.0], 0.5),
            Err(TransformError::InvalidInput(_))
        ));
    }

    #[test]
    fn boxcox_empty() {
        let result = boxcox(&[], 1.0).unwrap();
        assert!(result.is_empty());
    }

    // ==================== inv_boxcox ====================

    #[test]
    fn inv_boxcox_lambda_0_is_exp() {
        let transformed = vec![-1.0, 0.0, 0.5, 2.0];
        let result = inv_boxcox(&transformed, 0.0).unwrap();

        for (i, &y) in transformed.iter().enumerate() {
            assert_relative_eq!(result[i], y.exp(), epsilon = 1e-12);
        }
    }

    #[test]
    fn inv_boxcox_roundtrip() {
        let series = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        for lambda in [-1.5, -0.5, 0.0, 0.5, 1.0, 2.0] {
            let transformed = boxcox(&series, lambda).unwrap();
            let recovered = inv_boxcox(&transformed, lambda).unwrap();

            for (orig, rec) in series.iter().zip(recovered.iter()) {
                assert_relative_eq!(orig, rec, max_relative = 1e-9);
            }
        }
    }

    #[test]
    fn inv_boxcox_outside_domain() {
        // lambda * y + 1 = 0.5 * -4 + 1 < 0
        let err = inv_boxcox(&[1.0, -4.0], 0.5).unwrap_err();
        assert_eq!(
            err,
            TransformError::NumericDomain {
                index: 1,
                value: -4.0
            }
        );
    }

    #[test]
    fn llf_prefers_log_for_geometric_data() {
        // ln of a geometric series is evenly spaced, so lambda = 0 beats 1
        let series: Vec<f64> = (0..12).map(|i| 1.5_f64.powi(i)).collect();
        assert!(boxcox_llf(&series, 0.0) > boxcox_llf(&series, 1.0));
        assert_eq!(boxcox_llf(&[2.0], 0.5), f64::NEG_INFINITY);
        assert_eq!(boxcox_llf(&[2.0, -1.0], 0.5), f64::NEG_INFINITY);
        assert_eq!(boxcox_llf(&[3.0, 3.0], 0.5), f64::NEG_INFINITY);
    }

    #[test]
    fn non_finite_lambda_record_is_rejected() {
        let params = BoxCoxParams { lambda: f64::NAN };
        assert!(matches!(
            params.apply(&[1.0]),
            Err(TransformError::InvalidParameter(_))
        ));
        assert!(matches!(
            params.invert(&[1.0]),
            Err(TransformError::InvalidParameter(_))
        ));
    }

    #[test]
    fn inv_boxcox_nan_is_domain_error() {
        assert!(matches!(
            inv_boxcox(&[f64::NAN], 0.0),
            Err(TransformError::NumericDomain { index: 0, .. })
        ));
        assert!(matches!(
            inv_boxcox(&[f64::NAN], 1.0),
            Err(TransformError::NumericDomain { index: 0, .. })
        ));
    }

    // ==================== boxcox_lambda ====================

    #[test]
    fn boxcox_lambda_finds_reasonable_value() {
        let series = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        let lambda = boxcox_lambda(&series).unwrap();

        assert!((-2.0..=2.0).contains(&lambda));
    }

    #[test]
    fn boxcox_lambda_exponential_data() {
        // Exponential data should have lambda close to 0 (log transform)
        let series: Vec<f64> = (1..=10).map(|i| (i as f64).exp()).collect();
        let lambda = boxcox_lambda(&series).unwrap();

        assert!(
            lambda.abs() < 0.5,
            "Expected lambda near 0 for exponential data, got {}",
            lambda
        );
    }

    #[test]
    fn boxcox_lambda_is_local_maximum() {
        let series = vec![3.0, 7.0, 1.5, 9.0, 4.0, 12.0, 2.5, 6.0];
        let lambda = boxcox_lambda(&series).unwrap();
        let best = boxcox_llf(&series, lambda);

        assert!(best >= boxcox_llf(&series, lambda - 0.01));
        assert!(best >= boxcox_llf(&series, lambda + 0.01));
    }

    #[test]
    fn boxcox_lambda_rejects_bad_input() {
        assert!(matches!(
            boxcox_lambda(&[1.0, -2.0, 3.0]),
            Err(TransformError::InvalidInput(_))
        ));
        assert!(matches!(
            boxcox_lambda(&[4.0, 4.0, 4.0]),
            Err(TransformError::InvalidInput(_))
        ));
        assert!(matches!(
            boxcox_lambda(&[4.0]),
            Err(TransformError::InvalidInput(_))
        ));
        assert_eq!(boxcox_lambda(&[]), Err(TransformError::EmptyData));
    }

    #[test]
    fn boxcox_lambda_rejects_bad_config() {
        let config = BoxCoxConfig::default().with_bounds(1.0, -1.0);
        assert!(matches!(
            boxcox_lambda_with(&[1.0, 2.0, 3.0], &config),
            Err(TransformError::InvalidParameter(_))
        ));

        let config = BoxCoxConfig::default().with_grid_points(2);
        assert!(matches!(
            boxcox_lambda_with(&[1.0, 2.0, 3.0], &config),
            Err(TransformError::InvalidParameter(_))
        ));
    }

    #[test]
    fn boxcox_lambda_respects_bounds() {
        let series: Vec<f64> = (1..=10).map(|i| (i as f64).exp()).collect();
        let config = BoxCoxConfig::default().with_bounds(0.5, 1.5);
        let lambda = boxcox_lambda_with(&series, &config).unwrap();

        assert!((0.5..=1.5).contains(&lambda));
    }

    // ==================== PowerTransform ====================

    #[test]
    fn power_transform_fixed_lambda() {
        let params = PowerTransform::with_lambda(0.0)
            .fit(&[1.0, 1.0, 1.0])
            .unwrap();
        assert_eq!(params.lambda, 0.0);
    }

    #[test]
    fn power_transform_fixed_lambda_still_validates() {
        assert!(matches!(
            PowerTransform::with_lambda(1.0).fit(&[1.0, 0.0]),
            Err(TransformError::InvalidInput(_))
        ));
        assert!(matches!(
            PowerTransform::with_lambda(f64::NAN).fit(&[1.0, 2.0]),
            Err(TransformError::InvalidParameter(_))
        ));
    }

    #[test]
    fn power_transform_fit_apply_invert() {
        let series = vec![1.0, 4.0, 9.0, 16.0, 25.0];
        let (params, data) = PowerTransform::new().fit_apply(&series).unwrap();
        let recovered = params.invert(&data).unwrap();

        assert!(params.lambda >= -2.0 && params.lambda <= 2.0);
        for (orig, rec) in series.iter().zip(recovered.iter()) {
            assert_relative_eq!(orig, rec, max_relative = 1e-9);
        }
    }

    // ==================== boxcox_auto ====================

    #[test]
    fn boxcox_auto_inverse() {
        let series = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = boxcox_auto(&series).unwrap();
        let recovered = result.inverse().unwrap();

        for (orig, rec) in series.iter().zip(recovered.iter()) {
            assert_relative_eq!(orig, rec, max_relative = 1e-9);
        }
    }

    // ==================== is_boxcox_suitable ====================

    #[test]
    fn is_suitable() {
        assert!(is_boxcox_suitable(&[1.0, 2.0, 3.0]));
        assert!(!is_boxcox_suitable(&[0.0, 1.0, 2.0]));
        assert!(!is_boxcox_suitable(&[-1.0, 1.0, 2.0]));
        assert!(!is_boxcox_suitable(&[1.0, f64::NAN]));
        assert!(!is_boxcox_suitable(&[]));
    }
}
