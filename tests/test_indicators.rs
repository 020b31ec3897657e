//! Integration tests for equilens indicators.

use equilens::core::AnalyticsError;
use equilens::indicators::{rsi, volatility, DEFAULT_RSI_PERIOD};

fn sample_closes() -> Vec<f64> {
    // Trending series with oscillation
    (0..60)
        .map(|i| 100.0 + i as f64 * 0.4 + (i as f64 * 0.7).sin() * 3.0)
        .collect()
}

#[test]
fn test_rsi_range() {
    let closes = sample_closes();
    let value = rsi(&closes, DEFAULT_RSI_PERIOD).unwrap();
    assert!((0.0..=100.0).contains(&value), "RSI out of range: {}", value);
}

#[test]
fn test_rsi_uptrend_above_downtrend() {
    let up: Vec<f64> = (0..30).map(|i| 100.0 + i as f64 + (i % 3) as f64 * 0.5).collect();
    let down: Vec<f64> = up.iter().rev().copied().collect();
    assert!(rsi(&up, 14).unwrap() > 50.0);
    assert!(rsi(&down, 14).unwrap() < 50.0);
}

#[test]
fn test_rsi_only_gains() {
    let closes: Vec<f64> = (0..20).map(|i| 10.0 + i as f64).collect();
    // A loss-free window caps RS at 100
    assert_eq!(rsi(&closes, 14).unwrap(), 99.01);
}

#[test]
fn test_rsi_rounded_to_two_decimals() {
    let value = rsi(&sample_closes(), 14).unwrap();
    assert!(((value * 100.0).round() - value * 100.0).abs() < 1e-6);
}

#[test]
fn test_rsi_invalid_inputs() {
    assert!(matches!(
        rsi(&[1.0, 2.0, 3.0], 14).unwrap_err(),
        AnalyticsError::InsufficientData { .. }
    ));
    assert!(matches!(
        rsi(&sample_closes(), 0).unwrap_err(),
        AnalyticsError::InvalidParameter { .. }
    ));
}

#[test]
fn test_volatility_scenario() {
    let value = volatility(&[100.0, 102.0, 101.0, 105.0, 107.0]).unwrap();
    assert!((value - 1.76).abs() < 1e-10);
}

#[test]
fn test_volatility_scale_invariant() {
    let base = volatility(&[10.0, 11.0, 9.0, 12.0]).unwrap();
    let scaled = volatility(&[100.0, 110.0, 90.0, 120.0]).unwrap();
    assert_eq!(base, scaled);
}

#[test]
fn test_empty_data() {
    assert!(volatility(&[]).is_err());
    assert!(rsi(&[], 14).is_err());
}
