//! Sliding-window training examples.

use ndarray::{s, Array1, Array2, Array3};

use crate::core::error::AnalyticsError;
use crate::core::Result;

/// Windows of `window` consecutive rows, each labelled with the next row's `target` column.
///
/// # Returns
/// `(inputs [examples, window, features], labels [examples])` with
/// `examples = rows - window`.
pub fn build_sequences(data: &Array2<f64>, window: usize, target: usize) -> Result<(Array3<f64>, Array1<f64>)> {
    let (rows, features) = data.dim();
    if window == 0 {
        return Err(AnalyticsError::invalid_parameter("window must be > 0"));
    }
    if target >= features {
        return Err(AnalyticsError::invalid_parameter(format!(
            "target column {} out of range for {} features",
            target, features
        )));
    }
    if rows <= window {
        return Err(AnalyticsError::insufficient_data("sliding windows", window + 1, rows));
    }

    let examples = rows - window;
    let mut inputs = Array3::zeros((examples, window, features));
    let mut labels = Array1::zeros(examples);

    for i in 0..examples {
        inputs
            .slice_mut(s![i, .., ..])
            .assign(&data.slice(s![i..i + window, ..]));
        labels[i] = data[[i + window, target]];
    }

    Ok((inputs, labels))
}
