//! Ordered, reversible transform pipelines.
//!
//! A [`TransformPipeline`] lists transform stages; fitting it on a training
//! series yields a [`FittedPipeline`] that applies stages front to back and
//! inverts them back to front. A fitted pipeline cannot be refitted, so
//! test data always goes through parameters learned on training data.
//!
//! The conventional order is power transform, seasonal difference, trend
//! difference, standardization, normalization (see
//! [`TransformPipeline::canonical`]). Other orders are accepted.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{
    BoxCoxParams, DifferenceParams, DifferenceTransform, FittedTransform, NormalizeParams,
    Normalizer, PowerTransform, StandardizeParams, Standardizer, Transform,
};
use crate::error::{Result, TransformError};
use crate::utils::stats::ensure_finite;

/// Kind of a pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    Power,
    Difference,
    Standardize,
    Normalize,
}

impl TransformKind {
    /// Snake-case name, as used in serialized parameters.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransformKind::Power => "power",
            TransformKind::Difference => "difference",
            TransformKind::Standardize => "standardize",
            TransformKind::Normalize => "normalize",
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unfitted pipeline stage.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformSpec {
    Power(PowerTransform),
    Difference(DifferenceTransform),
    Standardize(Standardizer),
    Normalize(Normalizer),
}

impl TransformSpec {
    /// Kind of transform this stage fits.
    pub fn kind(&self) -> TransformKind {
        match self {
            TransformSpec::Power(_) => TransformKind::Power,
            TransformSpec::Difference(_) => TransformKind::Difference,
            TransformSpec::Standardize(_) => TransformKind::Standardize,
            TransformSpec::Normalize(_) => TransformKind::Normalize,
        }
    }
}

impl Transform for TransformSpec {
    type Fitted = TransformParameters;

    fn fit(&self, series: &[f64]) -> Result<TransformParameters> {
        Ok(match self {
            TransformSpec::Power(t) => TransformParameters::Power(t.fit(series)?),
            TransformSpec::Difference(t) => TransformParameters::Difference(t.fit(series)?),
            TransformSpec::Standardize(t) => TransformParameters::Standardize(t.fit(series)?),
            TransformSpec::Normalize(t) => TransformParameters::Normalize(t.fit(series)?),
        })
    }

    fn name(&self) -> &'static str {
        self.kind().as_str()
    }
}

impl From<PowerTransform> for TransformSpec {
    fn from(t: PowerTransform) -> Self {
        TransformSpec::Power(t)
    }
}

impl From<DifferenceTransform> for TransformSpec {
    fn from(t: DifferenceTransform) -> Self {
        TransformSpec::Difference(t)
    }
}

impl From<Standardizer> for TransformSpec {
    fn from(t: Standardizer) -> Self {
        TransformSpec::Standardize(t)
    }
}

impl From<Normalizer> for TransformSpec {
    fn from(t: Normalizer) -> Self {
        TransformSpec::Normalize(t)
    }
}

/// Fitted parameters of one stage, tagged with the stage kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformParameters {
    Power(BoxCoxParams),
    Difference(DifferenceParams),
    Standardize(StandardizeParams),
    Normalize(NormalizeParams),
}

impl TransformParameters {
    /// Kind of transform these parameters belong to.
    pub fn kind(&self) -> TransformKind {
        match self {
            TransformParameters::Power(_) => TransformKind::Power,
            TransformParameters::Difference(_) => TransformKind::Difference,
            TransformParameters::Standardize(_) => TransformKind::Standardize,
            TransformParameters::Normalize(_) => TransformKind::Normalize,
        }
    }

    /// Check the record's invariants, e.g. after deserializing it.
    pub fn validate(&self) -> Result<()> {
        match self {
            TransformParameters::Power(p) => p.validate(),
            TransformParameters::Difference(p) => p.validate(),
            TransformParameters::Standardize(p) => p.validate(),
            TransformParameters::Normalize(p) => p.validate(),
        }
    }

    fn as_fitted(&self) -> &dyn FittedTransform {
        match self {
            TransformParameters::Power(p) => p,
            TransformParameters::Difference(p) => p,
            TransformParameters::Standardize(p) => p,
            TransformParameters::Normalize(p) => p,
        }
    }
}

impl FittedTransform for TransformParameters {
    fn apply(&self, series: &[f64]) -> Result<Vec<f64>> {
        self.as_fitted().apply(series)
    }

    fn invert(&self, transformed: &[f64]) -> Result<Vec<f64>> {
        self.as_fitted().invert(transformed)
    }

    fn invert_forecast(&self, forecast: &[f64]) -> Result<Vec<f64>> {
        self.as_fitted().invert_forecast(forecast)
    }
}

/// Ordered list of transform stages, not yet fitted.
///
/// # Example
///
/// ```
/// use tsprep::transform::{FittedTransform, Transform, TransformPipeline};
///
/// let train: Vec<f64> = (1..=9).map(|i| i as f64).collect();
/// let pipeline = TransformPipeline::new().standardize().normalize();
///
/// let fitted = pipeline.fit(&train).unwrap();
/// let transformed = fitted.apply(&train).unwrap();
/// let restored = fitted.invert(&transformed).unwrap();
///
/// for (orig, rec) in train.iter().zip(&restored) {
///     assert!((orig - rec).abs() < 1e-9);
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformPipeline {
    stages: Vec<TransformSpec>,
}

impl TransformPipeline {
    /// Create an empty (identity) pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Power transform, seasonal difference, trend difference,
    /// standardization, normalization.
    ///
    /// The seasonal stage is left out when `seasonal_period <= 1`.
    pub fn canonical(seasonal_period: usize) -> Self {
        let pipeline = Self::new().power();
        let pipeline = if seasonal_period > 1 {
            pipeline.difference(seasonal_period)
        } else {
            pipeline
        };
        pipeline.difference(1).standardize().normalize()
    }

    /// Append any stage.
    pub fn then(mut self, stage: impl Into<TransformSpec>) -> Self {
        self.stages.push(stage.into());
        self
    }

    /// Append a Box-Cox stage with estimated lambda.
    pub fn power(self) -> Self {
        self.then(PowerTransform::new())
    }

    /// Append a Box-Cox stage with a fixed lambda.
    pub fn power_with_lambda(self, lambda: f64) -> Self {
        self.then(PowerTransform::with_lambda(lambda))
    }

    /// Append a lag-`interval` differencing stage.
    pub fn difference(self, interval: usize) -> Self {
        self.then(DifferenceTransform::new(interval))
    }

    /// Append a standardization stage.
    pub fn standardize(self) -> Self {
        self.then(Standardizer::new())
    }

    /// Append a `[0, 1]` normalization stage.
    pub fn normalize(self) -> Self {
        self.then(Normalizer::new())
    }

    /// Append a `[low, high]` normalization stage.
    pub fn normalize_to(self, low: f64, high: f64) -> Self {
        self.then(Normalizer::with_range(low, high))
    }

    /// Stages in forward order.
    pub fn stages(&self) -> &[TransformSpec] {
        &self.stages
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns true for the identity pipeline.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl Transform for TransformPipeline {
    type Fitted = FittedPipeline;

    /// Fit each stage on the output of the previous one.
    ///
    /// Call this on the training partition only.
    fn fit(&self, training: &[f64]) -> Result<FittedPipeline> {
        self.fit_apply(training).map(|(fitted, _)| fitted)
    }

    fn fit_apply(&self, training: &[f64]) -> Result<(FittedPipeline, Vec<f64>)> {
        ensure_finite(training)?;

        let mut current = training.to_vec();
        let mut stages = Vec::with_capacity(self.stages.len());
        for (index, spec) in self.stages.iter().enumerate() {
            let params = spec.fit(&current)?;
            current = params.apply(&current)?;
            log::debug!(
                "pipeline stage {index} ({}) fitted, {} values out",
                spec.kind(),
                current.len()
            );
            stages.push(FittedStage { index, params });
        }

        log::debug!(
            "fitted pipeline with {} stages on {} training values",
            stages.len(),
            training.len()
        );
        Ok((FittedPipeline { stages }, current))
    }

    fn name(&self) -> &'static str {
        "pipeline"
    }
}

/// One fitted stage and its position in the forward order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedStage {
    pub index: usize,
    pub params: TransformParameters,
}

/// A pipeline with every stage fitted.
///
/// Serializes as the list of its stages; deserialization checks that the
/// order indices are exactly `0..n` and that every record is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FittedStage>", into = "Vec<FittedStage>")]
pub struct FittedPipeline {
    stages: Vec<FittedStage>,
}

impl FittedPipeline {
    /// Rebuild a fitted pipeline from stages, e.g. loaded from storage.
    ///
    /// Stages may arrive in any order; their indices must cover `0..n`
    /// exactly once, and each parameter record must pass its `validate`.
    pub fn from_stages(mut stages: Vec<FittedStage>) -> Result<Self> {
        stages.sort_by_key(|stage| stage.index);
        if let Some((expected, stage)) = stages
            .iter()
            .enumerate()
            .find(|(expected, stage)| stage.index != *expected)
        {
            return Err(TransformError::InvalidParameter(format!(
                "stage index {} found where {expected} was expected",
                stage.index
            )));
        }
        for stage in &stages {
            stage.params.validate()?;
        }
        Ok(Self { stages })
    }

    /// Fitted stages in forward order.
    pub fn stages(&self) -> &[FittedStage] {
        &self.stages
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns true for the identity pipeline.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl FittedTransform for FittedPipeline {
    /// Apply every stage front to back with the stored parameters.
    fn apply(&self, series: &[f64]) -> Result<Vec<f64>> {
        self.stages
            .iter()
            .try_fold(series.to_vec(), |current, stage| stage.params.apply(&current))
    }

    /// Invert every stage back to front.
    ///
    /// Difference stages rebuild from their stored leading training values,
    /// so only the transformed training series can be inverted; anything
    /// else fails with [`TransformError::MissingLagValue`].
    fn invert(&self, transformed: &[f64]) -> Result<Vec<f64>> {
        self.stages
            .iter()
            .rev()
            .try_fold(transformed.to_vec(), |current, stage| {
                stage.params.invert(&current)
            })
    }

    /// Invert values that follow the end of the training series.
    ///
    /// Difference stages continue from their stored trailing training values.
    fn invert_forecast(&self, forecast: &[f64]) -> Result<Vec<f64>> {
        self.stages
            .iter()
            .rev()
            .try_fold(forecast.to_vec(), |current, stage| {
                stage.params.invert_forecast(&current)
            })
    }
}

impl TryFrom<Vec<FittedStage>> for FittedPipeline {
    type Error = TransformError;

    fn try_from(stages: Vec<FittedStage>) -> Result<Self> {
        Self::from_stages(stages)
    }
}

impl From<FittedPipeline> for Vec<FittedStage> {
    fn from(pipeline: FittedPipeline) -> Self {
        pipeline.stages
    }
}
