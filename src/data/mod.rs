//! Upstream market data collaborators.

pub mod memory;
pub mod source;

pub use memory::InMemorySource;
pub use source::{fetch_range, fetch_series, PriceSource, TimeRange};
