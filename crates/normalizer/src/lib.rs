//! Quantile Normalization
//!
//! Converts raw geochemical measurements into the bounded integer code space
//! (1-255, with 0 reserved for missing values) the discrimination model was
//! trained on.

mod batch;
mod error;
mod mapping;

pub use batch::{NormalizedBatch, NormalizedValue, Normalizer};
pub use error::{NormalizeError, UnresolvedFeature};
pub use mapping::{
    map_value, FALLBACK_CODE, LOWER_CLAMP_CODE, MISSING_CODE, UPPER_CLAMP_CODE,
};
