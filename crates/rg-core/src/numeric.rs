//! Missing-value handling for raw per-cell arrays.

/// Value stored in raw per-cell arrays for cells without data.
///
/// Readers fill missing cells with this value. It is never a valid result
/// and every statistics fold skips it.
pub const UNDEFINED_VALUE: f64 = f64::INFINITY;

/// True for the missing-value sentinel and any other non-finite value.
#[inline]
pub fn is_missing(v: f64) -> bool {
    !v.is_finite()
}

/// `Some(v)` unless `v` is missing.
#[inline]
pub fn defined(v: f64) -> Option<f64> {
    if is_missing(v) { None } else { Some(v) }
}
