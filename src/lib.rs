//! # tsprep
//!
//! Reversible data preparation for time series forecasting.
//!
//! Provides Box-Cox power transforms, lag differencing, standardization
//! and min-max normalization, each split into a fit step that produces an
//! immutable parameter record and apply/invert steps that reuse it. A
//! [`TransformPipeline`](transform::TransformPipeline) chains them, fits
//! each stage on the previous stage's output, and inverts in exact reverse
//! order.
//!
//! Fit only on training data. Test and forecast values go through
//! [`FittedTransform::apply`](transform::FittedTransform::apply) with the
//! stored parameters.
//!
//! ```
//! use tsprep::prelude::*;
//!
//! let train: Vec<f64> = (0..48)
//!     .map(|i| {
//!         let season = 10.0 * (i as f64 * std::f64::consts::PI / 6.0).sin();
//!         100.0 + i as f64 + season + (i % 5) as f64
//!     })
//!     .collect();
//!
//! let fitted = TransformPipeline::canonical(12).fit(&train).unwrap();
//! let model_input = fitted.apply(&train).unwrap();
//! let restored = fitted.invert(&model_input).unwrap();
//!
//! assert_eq!(restored.len(), train.len());
//! assert!((restored[47] - train[47]).abs() < 1e-6);
//! ```

#![allow(clippy::neg_cmp_op_on_partial_ord)]

pub mod error;
pub mod transform;
pub mod utils;

pub use error::{Result, TransformError};

pub mod prelude {
    pub use crate::error::{Result, TransformError};
    pub use crate::transform::{
        FittedPipeline, FittedTransform, Transform, TransformPipeline, TransformSpec,
    };
}
