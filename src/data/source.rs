//! Upstream price provider contract.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::error::AnalyticsError;
use crate::core::types::{PricePoint, PriceSeries, SeriesOrder};
use crate::core::Result;

/// Source of daily OHLCV records for a symbol.
///
/// Implementations return whatever the provider has for `[start, end]`; a
/// partial range is acceptable. The order of the returned records is reported by
/// [`PriceSource::order`].
pub trait PriceSource {
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<PricePoint>>;

    fn order(&self) -> SeriesOrder {
        SeriesOrder::OldestFirst
    }
}

/// Fetch and validate a series; an empty response is `UpstreamUnavailable`.
pub fn fetch_series<S: PriceSource + ?Sized>(
    source: &S,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PriceSeries> {
    if start > end {
        return Err(AnalyticsError::invalid_parameter(format!(
            "start {} is after end {}",
            start, end
        )));
    }
    let points = source.fetch(symbol, start, end)?;
    if points.is_empty() {
        warn!(symbol, %start, %end, "no data returned");
        return Err(AnalyticsError::upstream_unavailable(symbol));
    }
    debug!(symbol, records = points.len(), "fetched series");
    PriceSeries::from_points(symbol, points, source.order())
}

/// Fetch the `range` ending at `end`.
pub fn fetch_range<S: PriceSource + ?Sized>(
    source: &S,
    symbol: &str,
    range: TimeRange,
    end: NaiveDate,
) -> Result<PriceSeries> {
    let start = range
        .start_date(end)
        .ok_or_else(|| AnalyticsError::invalid_parameter(format!("{} before {} is out of range", range, end)))?;
    fetch_series(source, symbol, start, end)
}

/// Look-back window presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "1week")]
    OneWeek,
    #[serde(rename = "1month")]
    OneMonth,
    #[serde(rename = "3months")]
    ThreeMonths,
    #[serde(rename = "1year")]
    OneYear,
    #[serde(rename = "5years")]
    FiveYears,
}

impl TimeRange {
    pub const ALL: [TimeRange; 5] = [
        TimeRange::OneWeek,
        TimeRange::OneMonth,
        TimeRange::ThreeMonths,
        TimeRange::OneYear,
        TimeRange::FiveYears,
    ];

    /// Calendar start date; month arithmetic clamps to the end of shorter months.
    pub fn start_date(&self, end: NaiveDate) -> Option<NaiveDate> {
        match self {
            TimeRange::OneWeek => end.checked_sub_days(Days::new(7)),
            TimeRange::OneMonth => end.checked_sub_months(Months::new(1)),
            TimeRange::ThreeMonths => end.checked_sub_months(Months::new(3)),
            TimeRange::OneYear => end.checked_sub_months(Months::new(12)),
            TimeRange::FiveYears => end.checked_sub_months(Months::new(60)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::OneWeek => "1week",
            TimeRange::OneMonth => "1month",
            TimeRange::ThreeMonths => "3months",
            TimeRange::OneYear => "1year",
            TimeRange::FiveYears => "5years",
        }
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        TimeRange::OneYear
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self> {
        TimeRange::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| AnalyticsError::invalid_parameter(format!("unknown time range '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_start_dates() {
        let end = date(2024, 3, 31);
        assert_eq!(TimeRange::OneWeek.start_date(end), Some(date(2024, 3, 24)));
        assert_eq!(TimeRange::OneMonth.start_date(end), Some(date(2024, 2, 29)));
        assert_eq!(TimeRange::ThreeMonths.start_date(end), Some(date(2023, 12, 31)));
        assert_eq!(TimeRange::OneYear.start_date(end), Some(date(2023, 3, 31)));
        assert_eq!(TimeRange::FiveYears.start_date(end), Some(date(2019, 3, 31)));
    }

    #[test]
    fn test_parse() {
        assert_eq!("5years".parse::<TimeRange>().unwrap(), TimeRange::FiveYears);
        assert!("2days".parse::<TimeRange>().is_err());
        for range in TimeRange::ALL {
            assert_eq!(range.to_string().parse::<TimeRange>().unwrap(), range);
        }
    }
}
