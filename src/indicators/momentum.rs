//! Momentum indicators: RSI.

use crate::core::error::AnalyticsError;
use crate::core::stats::round_to;
use crate::core::timeseries::check_closes;
use crate::core::Result;

/// Default RSI lookback.
pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Split close-to-close changes into parallel gain and loss arrays.
///
/// Losses are stored as positive magnitudes; the unused side is 0.
fn gains_and_losses(closes: &[f64]) -> (Vec<f64>, Vec<f64>) {
    closes
        .windows(2)
        .map(|w| {
            let change = w[1] - w[0];
            if change > 0.0 {
                (change, 0.0)
            } else {
                (0.0, -change)
            }
        })
        .unzip()
}

/// Relative Strength Index (Wilder) of the most recent bar.
///
/// # Arguments
/// * `closes` - Close prices, oldest first
/// * `period` - Lookback period (default: 14)
///
/// # Returns
/// RSI on a 0-100 scale rounded to 2 decimals.
///
/// The seed averages divide the sum of the first `period` changes by `period`.
/// With exactly `period` closes only `period - 1` changes exist and the seed is
/// taken over those.
pub fn rsi(closes: &[f64], period: usize) -> Result<f64> {
    if period == 0 {
        return Err(AnalyticsError::invalid_parameter("RSI period must be > 0"));
    }
    if closes.len() < period {
        return Err(AnalyticsError::insufficient_data("RSI", period, closes.len()));
    }
    if closes.len() < 2 {
        return Err(AnalyticsError::insufficient_data("RSI", 2, closes.len()));
    }
    check_closes(closes, "RSI")?;

    let (gains, losses) = gains_and_losses(closes);
    let p = period as f64;
    let seed = period.min(gains.len());

    let mut avg_gain = gains[..seed].iter().sum::<f64>() / p;
    let mut avg_loss = losses[..seed].iter().sum::<f64>() / p;

    // Wilder's smoothed moving average
    for i in seed..gains.len() {
        avg_gain = (avg_gain * (p - 1.0) + gains[i]) / p;
        avg_loss = (avg_loss * (p - 1.0) + losses[i]) / p;
    }

    let rs = if avg_loss == 0.0 { 100.0 } else { avg_gain / avg_loss };
    Ok(round_to(100.0 - 100.0 / (1.0 + rs), 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rsi_all_gains() {
        let closes: Vec<f64> = (1..=20).map(|i| i as f64).collect();
        let value = rsi(&closes, 14).unwrap();
        // avg_loss == 0 gives RS = 100
        assert!((value - round_to(100.0 - 100.0 / 101.0, 2)).abs() < 1e-10);
    }

    #[test]
    fn test_rsi_all_losses() {
        let closes: Vec<f64> = (1..=20).rev().map(|i| i as f64).collect();
        assert_eq!(rsi(&closes, 14).unwrap(), 0.0);
    }

    #[test]
    fn test_rsi_known_value() {
        // changes: +1, -1, +2, -1 ; period 2
        // seed: gain 0.5, loss 0.5 ; then (0.5+2)/2=1.25, 0.25 ; then 0.625, 0.625
        let value = rsi(&[10.0, 11.0, 10.0, 12.0, 11.0], 2).unwrap();
        assert!((value - 50.0).abs() < 1e-10);
    }

    #[test]
    fn test_rsi_rejects_invalid_closes() {
        let mut closes: Vec<f64> = (1..=20).map(|i| i as f64).collect();
        closes[7] = f64::NAN;
        assert!(matches!(rsi(&closes, 14).unwrap_err(), AnalyticsError::InvalidParameter { .. }));
        closes[7] = f64::INFINITY;
        assert!(matches!(rsi(&closes, 14).unwrap_err(), AnalyticsError::InvalidParameter { .. }));
        closes[7] = -3.0;
        assert!(matches!(rsi(&closes, 14).unwrap_err(), AnalyticsError::InvalidParameter { .. }));
    }

    #[test]
    fn test_rsi_insufficient() {
        let err = rsi(&[1.0, 2.0, 3.0], 14).unwrap_err();
        assert!(matches!(err, AnalyticsError::InsufficientData { required: 14, available: 3, .. }));
        assert!(rsi(&[1.0, 2.0], 0).is_err());
    }
}
