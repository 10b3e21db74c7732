//! Reversible data-preparation transforms for time series.
//!
//! Each transform is split in two: an unfitted configuration implementing
//! [`Transform`], and the parameter record its `fit` returns, implementing
//! [`FittedTransform`]. Parameters are produced once from training data
//! and then only read.
//!
//! # Example
//!
//! ```
//! use tsprep::transform::{FittedTransform, Normalizer, Standardizer, Transform};
//!
//! let train = vec![1.0, 2.0, 3.0, 4.0, 5.0];
//! let test = vec![6.0, 7.0];
//!
//! // Fit on training data only, reuse on test data
//! let params = Standardizer::new().fit(&train).unwrap();
//! let scaled = params.apply(&test).unwrap();
//! let restored = params.invert(&scaled).unwrap();
//! assert!((restored[0] - 6.0).abs() < 1e-12);
//!
//! let (minmax, unit) = Normalizer::new().fit_apply(&train).unwrap();
//! assert_eq!(unit[0], 0.0);
//! assert_eq!(minmax.max, 5.0);
//! ```

pub mod boxcox;
pub mod diff;
pub mod pipeline;
pub mod scale;

use crate::error::Result;

// Re-export from boxcox
pub use boxcox::{
    boxcox, boxcox_auto, boxcox_lambda, boxcox_lambda_with, boxcox_llf, inv_boxcox,
    is_boxcox_suitable, BoxCoxConfig, BoxCoxParams, BoxCoxResult, PowerTransform,
};

// Re-export from diff
pub use diff::{difference, integrate, invert_difference, DifferenceParams, DifferenceTransform};

// Re-export from scale
pub use scale::{
    normalize, standardize, NormalizeParams, Normalizer, StandardizeParams, Standardizer,
};

// Re-export from pipeline
pub use pipeline::{
    FittedPipeline, FittedStage, TransformKind, TransformParameters, TransformPipeline,
    TransformSpec,
};

/// An unfitted transform: learns its parameters from a training series.
pub trait Transform {
    /// Parameter record produced by [`Transform::fit`].
    type Fitted: FittedTransform;

    /// Learn parameters from a training series.
    fn fit(&self, series: &[f64]) -> Result<Self::Fitted>;

    /// Fit, then apply the fitted parameters to the same series.
    fn fit_apply(&self, series: &[f64]) -> Result<(Self::Fitted, Vec<f64>)> {
        let fitted = self.fit(series)?;
        let data = fitted.apply(series)?;
        Ok((fitted, data))
    }

    /// Short name of the transform kind.
    fn name(&self) -> &'static str;
}

/// Fitted parameters that can transform and untransform series.
pub trait FittedTransform {
    /// Forward transform using the stored parameters.
    fn apply(&self, series: &[f64]) -> Result<Vec<f64>>;

    /// Inverse transform of values aligned with the training series.
    fn invert(&self, transformed: &[f64]) -> Result<Vec<f64>>;

    /// Inverse transform of values that continue past the training series.
    ///
    /// Identical to [`FittedTransform::invert`] for pointwise transforms.
    fn invert_forecast(&self, forecast: &[f64]) -> Result<Vec<f64>> {
        self.invert(forecast)
    }
}
