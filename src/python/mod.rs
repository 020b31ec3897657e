//! Python bindings (PyO3).
//!
//! Callers may hand over newest-first data; every entry point takes a
//! `newest_first` flag and reorders before anything reaches the core.

pub mod bindings;
pub mod numpy_bridge;
