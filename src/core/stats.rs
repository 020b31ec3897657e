//! Descriptive statistics over plain slices.
//!
//! Population (÷ n) and sample (÷ n − 1) variants are both provided; each metric
//! documents which one it uses.

/// Arithmetic mean. Returns NaN for an empty slice.
#[inline]
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sum of (a_i - mean_a)(b_i - mean_b) over paired samples.
fn co_deviation(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    let (mean_a, mean_b) = (mean(a), mean(b));
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - mean_a) * (y - mean_b))
        .sum()
}

/// Population covariance (÷ n).
pub fn population_covariance(a: &[f64], b: &[f64]) -> f64 {
    co_deviation(a, b) / a.len() as f64
}

/// Sample covariance with Bessel's correction (÷ n − 1).
pub fn sample_covariance(a: &[f64], b: &[f64]) -> f64 {
    co_deviation(a, b) / (a.len() as f64 - 1.0)
}

/// Population variance (÷ n).
pub fn population_variance(values: &[f64]) -> f64 {
    population_covariance(values, values)
}

/// Sample variance (÷ n − 1).
pub fn sample_variance(values: &[f64]) -> f64 {
    sample_covariance(values, values)
}

/// Round half away from zero to the given number of decimals.
#[inline]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variances() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&data) - 5.0).abs() < 1e-12);
        assert!((population_variance(&data) - 4.0).abs() < 1e-12);
        assert!((sample_variance(&data) - 32.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_covariance_sign() {
        let a = [1.0, 2.0, 3.0];
        let b = [3.0, 2.0, 1.0];
        assert!(population_covariance(&a, &b) < 0.0);
        assert!((sample_covariance(&a, &a) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(-0.996, 2), -1.0);
    }
}
