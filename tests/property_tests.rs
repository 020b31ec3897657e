//! Property-based tests for equilens numerics.

use proptest::prelude::*;

use equilens::core::{daily_returns, CancelFlag, SimulationConfig};
use equilens::forecast::NormalizationBounds;
use equilens::indicators::rsi;
use equilens::portfolio::{covariance_matrix, mean_returns, min_variance_portfolio, simulate, AssetReturns};

fn closes_strategy(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0f64..1000.0, min_len..max_len)
}

fn returns_strategy(assets: usize, len: usize) -> impl Strategy<Value = Vec<Vec<f64>>> {
    prop::collection::vec(prop::collection::vec(-5.0f64..5.0, len), assets)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn returns_have_one_fewer_element(closes in closes_strategy(2, 60)) {
        let returns = daily_returns(&closes).unwrap();
        prop_assert_eq!(returns.len(), closes.len() - 1);
        for (i, r) in returns.iter().enumerate() {
            let expected = (closes[i + 1] - closes[i]) / closes[i];
            prop_assert!((r - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn rsi_is_bounded(closes in closes_strategy(15, 80), period in 2usize..15) {
        let value = rsi(&closes, period).unwrap();
        prop_assert!((0.0..=100.0).contains(&value));
    }

    #[test]
    fn normalization_round_trips(values in prop::collection::vec(-1e4f64..1e4, 2..40)) {
        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        prop_assume!(hi - lo > 1e-6);

        let bounds = NormalizationBounds::fit(values.iter().copied(), "x").unwrap();
        for v in &values {
            let scaled = bounds.normalize(*v);
            prop_assert!((-1e-12..=1.0 + 1e-12).contains(&scaled));
            prop_assert!((bounds.denormalize(scaled) - v).abs() < 1e-7);
        }
    }

    #[test]
    fn simulated_portfolios_are_valid(returns in returns_strategy(3, 20), seed in any::<u64>()) {
        let returns = AssetReturns {
            symbols: vec!["A".into(), "B".into(), "C".into()],
            returns,
        };
        let covariance = covariance_matrix(&returns).unwrap();
        prop_assume!((0..3).all(|i| covariance.get(i, i) > 1e-9));

        let config = SimulationConfig::default().with_trials(200).with_seed(seed);
        let result = simulate(&returns.symbols, &mean_returns(&returns), &covariance, &config, &CancelFlag::new()).unwrap();

        for p in &result.trials {
            let sum: f64 = p.weights.iter().sum();
            prop_assert!((sum - 1.0).abs() < 1e-9);
            prop_assert!(p.risk >= 0.0);
        }

        let lowest = result.trials.iter().map(|p| p.risk).fold(f64::INFINITY, f64::min);
        prop_assert_eq!(min_variance_portfolio(&result.trials).unwrap().risk, lowest);
    }
}
