//! Linear remapping of scalars between ranges
//!
//! Both screen axes are produced by the same remap: longitudes (or eastings) from
//! `[west, east]` onto `[0, width]`, latitudes (or northings) from `[north, south]` onto
//! `[0, height]`.

use crate::{DataError, Result};

/// Linearly remap `value` from `[domain_min, domain_max]` onto `[range_min, range_max]`
///
/// The output is not clamped: values outside the domain land outside the range, so
/// features extending beyond the viewing window keep their true screen position.
///
/// # Arguments
/// * `value` - The value to remap
/// * `domain_min`, `domain_max` - Source range
/// * `range_min`, `range_max` - Target range
///
/// # Returns
/// The remapped value. A degenerate domain (`domain_min == domain_max`) yields an
/// infinite or NaN result; use [`try_project`] when the domain is not known to be valid.
#[inline(always)]
pub fn project(value: f64, domain_min: f64, domain_max: f64, range_min: f64, range_max: f64) -> f64 {
    range_min + (value - domain_min) * (range_max - range_min) / (domain_max - domain_min)
}

/// Checked variant of [`project`] that rejects a degenerate domain
#[inline]
pub fn try_project(
    value: f64,
    domain_min: f64,
    domain_max: f64,
    range_min: f64,
    range_max: f64,
) -> Result<f64> {
    if domain_min == domain_max {
        return Err(DataError::DegenerateRange {
            min: domain_min,
            max: domain_max,
        });
    }
    Ok(project(value, domain_min, domain_max, range_min, range_max))
}
