//! Core data types for equilens.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::{AnalyticsError, Result};

/// Type alias for price values.
pub type Price = f64;

/// One daily OHLCV record as delivered by the market-data provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: u64,
}

impl PricePoint {
    /// Create a new price point.
    pub fn new(date: NaiveDate, open: Price, high: Price, low: Price, close: Price, volume: u64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    fn is_valid(&self) -> bool {
        [self.open, self.high, self.low, self.close]
            .iter()
            .all(|p| p.is_finite() && *p > 0.0)
    }
}

/// Chronological order of a raw record list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeriesOrder {
    /// Index 0 is the oldest record.
    OldestFirst,
    /// Index 0 is the most recent record (typical for REST end-of-day APIs).
    NewestFirst,
}

impl Default for SeriesOrder {
    fn default() -> Self {
        SeriesOrder::OldestFirst
    }
}

/// A validated daily price series, always stored oldest-first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series from raw records in the given order.
    ///
    /// Newest-first input is reversed here, so every consumer sees oldest-first data.
    /// Fails when dates are not strictly increasing after reordering or when a
    /// price is non-positive or non-finite.
    pub fn from_points(
        symbol: impl Into<String>,
        mut points: Vec<PricePoint>,
        order: SeriesOrder,
    ) -> Result<Self> {
        let symbol = symbol.into();
        if order == SeriesOrder::NewestFirst {
            points.reverse();
        }

        if let Some(pos) = points.windows(2).position(|w| w[0].date >= w[1].date) {
            return Err(AnalyticsError::invalid_parameter(format!(
                "{}: dates not strictly increasing at {} -> {}",
                symbol,
                points[pos].date,
                points[pos + 1].date
            )));
        }
        if let Some(bad) = points.iter().find(|p| !p.is_valid()) {
            return Err(AnalyticsError::invalid_parameter(format!(
                "{}: invalid prices on {}",
                symbol, bad.date
            )));
        }

        Ok(Self { symbol, points })
    }

    /// Build a series from closes only, assigning consecutive calendar dates from `start`.
    ///
    /// Open, high and low are set to the close and volume to zero.
    pub fn from_closes(symbol: impl Into<String>, start: NaiveDate, closes: &[Price]) -> Result<Self> {
        let points = closes
            .iter()
            .zip(start.iter_days())
            .map(|(&close, date)| PricePoint::new(date, close, close, close, close, 0))
            .collect();
        Self::from_points(symbol, points, SeriesOrder::OldestFirst)
    }

    /// Ticker or index symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Records, oldest first.
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Date of the most recent record.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    pub fn closes(&self) -> Vec<Price> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn opens(&self) -> Vec<Price> {
        self.points.iter().map(|p| p.open).collect()
    }

    pub fn highs(&self) -> Vec<Price> {
        self.points.iter().map(|p| p.high).collect()
    }

    pub fn lows(&self) -> Vec<Price> {
        self.points.iter().map(|p| p.low).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.volume as f64).collect()
    }

    /// Keep only the most recent `len` records.
    pub fn tail(&self, len: usize) -> Self {
        let start = self.points.len().saturating_sub(len);
        Self {
            symbol: self.symbol.clone(),
            points: self.points[start..].to_vec(),
        }
    }
}
