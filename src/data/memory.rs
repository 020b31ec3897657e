//! In-memory price source for offline use and tests.

use std::collections::HashMap;

use chrono::NaiveDate;

use super::source::PriceSource;
use crate::core::types::{PricePoint, SeriesOrder};
use crate::core::Result;

/// Serves preloaded records, filtered to the requested date range.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    series: HashMap<String, Vec<PricePoint>>,
    order: SeriesOrder,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records are stored and returned in `order`.
    pub fn with_order(order: SeriesOrder) -> Self {
        Self {
            series: HashMap::new(),
            order,
        }
    }

    pub fn insert(&mut self, symbol: impl Into<String>, points: Vec<PricePoint>) {
        self.series.insert(symbol.into(), points);
    }

    pub fn with_series(mut self, symbol: impl Into<String>, points: Vec<PricePoint>) -> Self {
        self.insert(symbol, points);
        self
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }
}

impl PriceSource for InMemorySource {
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<PricePoint>> {
        Ok(self
            .series
            .get(symbol)
            .map(|points| {
                points
                    .iter()
                    .filter(|p| p.date >= start && p.date <= end)
                    .copied()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn order(&self) -> SeriesOrder {
        self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AnalyticsError;
    use crate::data::source::{fetch_range, fetch_series, TimeRange};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn points(days: &[u32]) -> Vec<PricePoint> {
        days.iter()
            .map(|&d| PricePoint::new(day(d), 10.0, 11.0, 9.0, 10.0 + d as f64, 100))
            .collect()
    }

    #[test]
    fn test_filters_range() {
        let source = InMemorySource::new().with_series("TCS", points(&[1, 2, 3, 6, 7]));
        let series = fetch_series(&source, "TCS", day(2), day(6)).unwrap();
        assert_eq!(series.closes(), vec![12.0, 13.0, 16.0]);
    }

    #[test]
    fn test_unknown_symbol_is_upstream_unavailable() {
        let source = InMemorySource::new();
        let err = fetch_series(&source, "INFY", day(1), day(7)).unwrap_err();
        assert_eq!(err, AnalyticsError::upstream_unavailable("INFY"));
    }

    #[test]
    fn test_newest_first_source_is_reordered() {
        let source = InMemorySource::with_order(SeriesOrder::NewestFirst).with_series("TCS", points(&[7, 6, 3]));
        let series = fetch_series(&source, "TCS", day(1), day(7)).unwrap();
        assert_eq!(series.closes(), vec![13.0, 16.0, 17.0]);
        assert_eq!(series.last_date(), Some(day(7)));
    }

    #[test]
    fn test_partial_range_accepted() {
        let source = InMemorySource::new().with_series("TCS", points(&[6, 7]));
        let series = fetch_range(&source, "TCS", TimeRange::OneMonth, day(7)).unwrap();
        assert_eq!(series.len(), 2);
    }
}
