//! Single-value Bucket Mapping

use quantile_table::BOUNDARY_COUNT;

/// Code reserved for missing (NaN) measurements
pub const MISSING_CODE: u8 = 0;

/// Code for values at or below the first boundary
pub const LOWER_CLAMP_CODE: u8 = 1;

/// Code for values above the last boundary
pub const UPPER_CLAMP_CODE: u8 = 255;

/// Code returned when no bucket matches inside the scanned range
///
/// Training-time preprocessing returned 254 here rather than clamping to 255;
/// the model was fit on that output, so it is kept as-is.
pub const FALLBACK_CODE: u8 = 254;

/// Map one raw value onto its bucket code
///
/// `boundaries` must be non-decreasing (as guaranteed by `QuantileTable`).
/// Buckets are left-open, right-closed: a value in `(b[j-1], b[j]]` gets code
/// `j + 1`. Only the first [`BOUNDARY_COUNT`] boundaries take part in the
/// bucket search.
pub fn map_value(raw: f64, boundaries: &[f64]) -> u8 {
    if raw.is_nan() {
        return MISSING_CODE;
    }

    let (first, last) = match (boundaries.first(), boundaries.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return FALLBACK_CODE,
    };

    if raw <= first {
        return LOWER_CLAMP_CODE;
    }
    if raw > last {
        return UPPER_CLAMP_CODE;
    }

    // First boundary >= raw; everything before it is < raw
    let window = &boundaries[..boundaries.len().min(BOUNDARY_COUNT)];
    let j = window.partition_point(|&b| b < raw);
    if j == 0 || j >= window.len() {
        return FALLBACK_CODE;
    }

    (j + 1) as u8
}
