//! Per-feature min-max scaling to [0, 1].

use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::core::error::AnalyticsError;
use crate::core::Result;

/// Min and max of one feature channel, captured on the training sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizationBounds {
    pub min: f64,
    pub max: f64,
}

impl NormalizationBounds {
    /// Capture bounds; a constant channel cannot be scaled.
    pub fn fit(values: impl IntoIterator<Item = f64>, context: &str) -> Result<Self> {
        let mut count = 0usize;
        let (min, max) = values.into_iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            count += 1;
            (lo.min(v), hi.max(v))
        });
        if count == 0 {
            return Err(AnalyticsError::insufficient_data(context, 1, 0));
        }
        if max == min {
            return Err(AnalyticsError::degenerate(format!("normalization of constant feature '{}'", context)));
        }
        Ok(Self { min, max })
    }

    #[inline]
    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// Map into [0, 1]. Values outside the training range fall outside [0, 1].
    #[inline]
    pub fn normalize(&self, value: f64) -> f64 {
        (value - self.min) / self.range()
    }

    #[inline]
    pub fn denormalize(&self, value: f64) -> f64 {
        value * self.range() + self.min
    }
}

/// Bounds for every column of a feature matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureScaler {
    bounds: Vec<NormalizationBounds>,
}

impl FeatureScaler {
    /// Fit one bound per column of `data` (rows are time steps).
    pub fn fit(data: &Array2<f64>, names: &[String]) -> Result<Self> {
        let bounds = data
            .axis_iter(Axis(1))
            .zip(names)
            .map(|(column, name)| NormalizationBounds::fit(column.iter().copied(), name))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { bounds })
    }

    /// Scale every column with its own bounds.
    pub fn transform(&self, data: &Array2<f64>) -> Array2<f64> {
        let mut out = data.clone();
        for (mut column, bounds) in out.axis_iter_mut(Axis(1)).zip(&self.bounds) {
            column.mapv_inplace(|v| bounds.normalize(v));
        }
        out
    }

    pub fn bounds(&self, feature: usize) -> &NormalizationBounds {
        &self.bounds[feature]
    }

    pub fn num_features(&self) -> usize {
        self.bounds.len()
    }
}
