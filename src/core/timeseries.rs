//! Elementary series transforms shared by every statistic.
//!
//! All functions expect chronologically ordered input (oldest first).

use tracing::warn;

use super::error::{AnalyticsError, Result};
use super::types::PriceSeries;

/// Fractional daily returns of a close series.
///
/// For `n` closes the result has `n - 1` elements with
/// `returns[i] = (closes[i + 1] - closes[i]) / closes[i]`.
/// The first observation has no return and is not emitted.
pub fn daily_returns(closes: &[f64]) -> Result<Vec<f64>> {
    if closes.len() < 2 {
        return Err(AnalyticsError::insufficient_data("daily returns", 2, closes.len()));
    }
    check_closes(closes, "daily returns")?;
    if closes[..closes.len() - 1].iter().any(|&c| c == 0.0) {
        return Err(AnalyticsError::degenerate("daily returns (zero close)"));
    }

    Ok(closes.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect())
}

/// Reject NaN, infinite and negative closes.
///
/// A zero close passes here; callers that divide by it report
/// `DegenerateVariance` themselves.
pub fn check_closes(closes: &[f64], context: &str) -> Result<()> {
    match closes.iter().position(|c| !c.is_finite() || *c < 0.0) {
        Some(pos) => Err(AnalyticsError::invalid_parameter(format!(
            "{}: invalid close {} at index {}",
            context, closes[pos], pos
        ))),
        None => Ok(()),
    }
}

/// Daily returns expressed in percent (fractional returns × 100).
pub fn percent_returns(closes: &[f64]) -> Result<Vec<f64>> {
    Ok(daily_returns(closes)?.into_iter().map(|r| r * 100.0).collect())
}

/// Truncate two slices to their common length, keeping the most recent observations.
///
/// The outputs always have identical length. They represent the same trading
/// dates only if the inputs were already date-aligned.
pub fn align_by_trimming<'a, T>(a: &'a [T], b: &'a [T]) -> (&'a [T], &'a [T]) {
    let len = a.len().min(b.len());
    (&a[a.len() - len..], &b[b.len() - len..])
}

/// Align two price series with the trim-to-shortest policy.
pub fn align_series(a: &PriceSeries, b: &PriceSeries) -> (PriceSeries, PriceSeries) {
    let len = a.len().min(b.len());
    let (a, b) = (a.tail(len), b.tail(len));
    if !ends_together(&a, &b) {
        warn!(
            left = a.symbol(),
            right = b.symbol(),
            "aligned series end on different dates; results are approximate"
        );
    }
    (a, b)
}

/// Whether both series end on the same date.
pub fn ends_together(a: &PriceSeries, b: &PriceSeries) -> bool {
    a.last_date() == b.last_date()
}

/// Trim any number of series to the shortest length, keeping the most recent records.
pub fn trim_to_common_length(series: &[PriceSeries]) -> Vec<PriceSeries> {
    let len = series.iter().map(PriceSeries::len).min().unwrap_or(0);
    series.iter().map(|s| s.tail(len)).collect()
}
