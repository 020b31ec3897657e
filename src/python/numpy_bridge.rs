//! numpy array conversion helpers.

use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::prelude::*;

/// Copy a numpy array into a Vec, contiguous or not.
pub fn numpy_to_vec_f64(arr: &PyReadonlyArray1<f64>) -> Vec<f64> {
    match arr.as_slice() {
        Ok(slice) => slice.to_vec(),
        Err(_) => arr.as_array().iter().copied().collect(),
    }
}

/// Copy into a Vec, reversing when the caller's data is newest-first.
pub fn numpy_to_oldest_first(arr: &PyReadonlyArray1<f64>, newest_first: bool) -> Vec<f64> {
    let mut values = numpy_to_vec_f64(arr);
    if newest_first {
        values.reverse();
    }
    values
}

pub fn vec_to_numpy_f64<'py>(py: Python<'py>, vec: Vec<f64>) -> &'py PyArray1<f64> {
    PyArray1::from_vec(py, vec)
}
