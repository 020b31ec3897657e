//! Error types for equilens.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for equilens operations.
pub type Result<T> = std::result::Result<T, AnalyticsError>;

/// Error types for the analytics engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    /// Input shorter than the minimum window or period.
    #[error("Insufficient data for {context}: need at least {required} elements, got {available}")]
    InsufficientData {
        context: String,
        required: usize,
        available: usize,
    },

    /// Zero variance, zero std-dev or zero price causing a division by zero.
    #[error("Degenerate input in {context}: division by zero")]
    DegenerateVariance { context: String },

    /// The upstream data provider returned nothing for a symbol.
    #[error("No data available for symbol {symbol}")]
    UpstreamUnavailable { symbol: String },

    /// Two series expected to correspond element for element do not.
    #[error("Alignment mismatch: left has {left} elements, right has {right}")]
    AlignmentMismatch { left: usize, right: usize },

    /// Data length mismatch between arrays.
    #[error("Data length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// No simulated portfolio satisfies the risk constraint.
    #[error("No portfolio has risk <= {max_risk}; the least risky trial has risk {min_risk}")]
    NoFeasiblePortfolio { max_risk: f64, min_risk: f64 },

    /// Invalid parameter value.
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    /// The caller cancelled a long-running computation.
    #[error("{context} was cancelled")]
    Cancelled { context: String },

    /// A background worker terminated abnormally.
    #[error("Worker failed: {message}")]
    WorkerFailed { message: String },
}

/// Coarse failure category, used by the presentation layer to choose a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    InsufficientData,
    NumericDegenerate,
    UpstreamUnavailable,
    AlignmentMismatch,
    NoFeasiblePortfolio,
    InvalidInput,
    Cancelled,
    Internal,
}

impl AnalyticsError {
    /// Create an insufficient data error.
    pub fn insufficient_data(context: impl Into<String>, required: usize, available: usize) -> Self {
        Self::InsufficientData {
            context: context.into(),
            required,
            available,
        }
    }

    /// Create a degenerate variance (division by zero) error.
    pub fn degenerate(context: impl Into<String>) -> Self {
        Self::DegenerateVariance {
            context: context.into(),
        }
    }

    /// Create an upstream unavailable error.
    pub fn upstream_unavailable(symbol: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            symbol: symbol.into(),
        }
    }

    /// Create an alignment mismatch error.
    pub fn alignment_mismatch(left: usize, right: usize) -> Self {
        Self::AlignmentMismatch { left, right }
    }

    /// Create a length mismatch error.
    pub fn length_mismatch(expected: usize, actual: usize) -> Self {
        Self::LengthMismatch { expected, actual }
    }

    /// Create an invalid parameter error.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    /// Create a cancellation error.
    pub fn cancelled(context: impl Into<String>) -> Self {
        Self::Cancelled {
            context: context.into(),
        }
    }

    /// Failure category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InsufficientData { .. } => ErrorKind::InsufficientData,
            Self::DegenerateVariance { .. } => ErrorKind::NumericDegenerate,
            Self::UpstreamUnavailable { .. } => ErrorKind::UpstreamUnavailable,
            Self::AlignmentMismatch { .. } => ErrorKind::AlignmentMismatch,
            Self::NoFeasiblePortfolio { .. } => ErrorKind::NoFeasiblePortfolio,
            Self::LengthMismatch { .. } | Self::InvalidParameter { .. } => ErrorKind::InvalidInput,
            Self::Cancelled { .. } => ErrorKind::Cancelled,
            Self::WorkerFailed { .. } => ErrorKind::Internal,
        }
    }
}

#[cfg(feature = "python")]
impl From<AnalyticsError> for pyo3::PyErr {
    fn from(err: AnalyticsError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}
