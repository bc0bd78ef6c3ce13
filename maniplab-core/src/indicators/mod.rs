//! Price-derived indicators.

pub mod atr;

pub use atr::{atr, true_range};
