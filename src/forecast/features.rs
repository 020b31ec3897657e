//! Feature matrix assembly from OHLCV series.

use ndarray::Array2;

use crate::core::error::AnalyticsError;
use crate::core::timeseries::trim_to_common_length;
use crate::core::types::PriceSeries;
use crate::core::Result;

pub const OPEN: usize = 0;
pub const CLOSE: usize = 1;
pub const VOLUME: usize = 2;
pub const HIGH: usize = 3;
pub const LOW: usize = 4;

/// Time-major feature matrix: one row per day, one column per channel.
///
/// Column order is open, close, volume, high, low, then one close column per
/// companion index.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    names: Vec<String>,
    values: Array2<f64>,
}

impl FeatureFrame {
    /// Build the frame over the most recent window common to all series.
    pub fn from_series(stock: &PriceSeries, companions: &[PriceSeries]) -> Result<Self> {
        let mut all = Vec::with_capacity(companions.len() + 1);
        all.push(stock.clone());
        all.extend(companions.iter().cloned());

        if let Some(empty) = all.iter().find(|s| s.is_empty()) {
            return Err(AnalyticsError::insufficient_data(
                format!("forecast features ({})", empty.symbol()),
                1,
                0,
            ));
        }
        let trimmed = trim_to_common_length(&all);
        let (stock, companions) = (&trimmed[0], &trimmed[1..]);

        let mut names: Vec<String> = ["open", "close", "volume", "high", "low"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut columns = vec![
            stock.opens(),
            stock.closes(),
            stock.volumes(),
            stock.highs(),
            stock.lows(),
        ];
        for companion in companions {
            names.push(format!("{}_close", companion.symbol()));
            columns.push(companion.closes());
        }

        let rows = stock.len();
        let values = Array2::from_shape_fn((rows, columns.len()), |(t, f)| columns[f][t]);
        Ok(Self { names, values })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Number of time steps.
    pub fn len(&self) -> usize {
        self.values.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn num_features(&self) -> usize {
        self.values.ncols()
    }
}
