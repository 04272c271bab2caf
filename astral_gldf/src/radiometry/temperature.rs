//! Effective temperature estimation for catalog objects.

use crate::core::domain::CelestialObject;
use crate::core::tables::SpectralTemperatureTable;

/// Temperature for color indices bluer than the first breakpoint.
const HOTTEST_KELVIN: u32 = 30_000;

/// Temperature for color indices redder than the last breakpoint.
const COOLEST_KELVIN: u32 = 3_000;

/// Maps a B-V color index to an effective temperature in Kelvin.
///
/// Piecewise linear over four ranges:
///
/// | B-V            | Kelvin                          |
/// |----------------|---------------------------------|
/// | `< -0.3`       | 30000                           |
/// | `[-0.3, 0.0)`  | `10000 - 10000 · bv`            |
/// | `[0.0, 0.6)`   | `7500 - 5000 · bv`              |
/// | `[0.6, 1.5)`   | `6000 - 2500 · (bv - 0.6)`      |
/// | `>= 1.5`       | 3000                            |
///
/// Fractions are truncated toward zero.
///
/// # Examples
///
/// ```
/// use astral_gldf::radiometry::temperature::temperature_from_color_index;
///
/// assert_eq!(temperature_from_color_index(0.0), 7500);
/// assert_eq!(temperature_from_color_index(-0.5), 30000);
/// assert_eq!(temperature_from_color_index(2.0), 3000);
/// ```
pub fn temperature_from_color_index(bv: f64) -> u32 {
    if bv.is_nan() {
        return COOLEST_KELVIN;
    }
    if bv < -0.3 {
        HOTTEST_KELVIN
    } else if bv < 0.0 {
        (10_000.0 - bv * 10_000.0) as u32
    } else if bv < 0.6 {
        (7_500.0 - bv * 5_000.0) as u32
    } else if bv < 1.5 {
        (6_000.0 - (bv - 0.6) * 2_500.0) as u32
    } else {
        COOLEST_KELVIN
    }
}

/// Estimates an effective temperature from a color index or spectral type.
///
/// The color index wins when present; otherwise the leading letter of the
/// spectral type is looked up in `table`, which falls back to its default.
///
/// # Arguments
///
/// * `color_index` - B-V color index, if known
/// * `spectral_type` - Spectral classification such as `"K1.5III"`
/// * `table` - Spectral class to temperature lookup
pub fn estimate_temperature(
    color_index: Option<f64>,
    spectral_type: &str,
    table: &SpectralTemperatureTable,
) -> u32 {
    match color_index {
        Some(bv) if bv.is_finite() => temperature_from_color_index(bv),
        _ => table.lookup(spectral_type),
    }
}

/// Convenience wrapper for a catalog object.
pub fn object_temperature(object: &CelestialObject, table: &SpectralTemperatureTable) -> u32 {
    estimate_temperature(object.color_index, &object.spectral_type, table)
}
