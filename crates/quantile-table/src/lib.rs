//! Quantile Boundary Tables
//!
//! Loads and validates the per-feature quantile boundaries that were computed
//! offline for the discrimination model, and exposes them by exact feature name.

mod error;
pub mod global;
mod table;

pub use error::LoadError;
pub use table::QuantileTable;

/// Number of boundaries shipped for every feature
pub const BOUNDARY_COUNT: usize = 254;

/// Smallest boundary sequence that still defines a bucket
pub const MIN_BOUNDARIES: usize = 2;
