//! Single-series indicators.
//!
//! Pure functions over oldest-first close slices returning a scalar for the
//! most recent bar.

pub mod momentum;
pub mod volatility;

pub use momentum::{rsi, DEFAULT_RSI_PERIOD};
pub use volatility::volatility;
