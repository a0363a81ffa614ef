//! Utility functions for display formatting.

pub mod format;

pub use format::{fit_column, format_price, truncate_string};
