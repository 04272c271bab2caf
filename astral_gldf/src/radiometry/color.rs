//! Colorimetric proxies derived from a correlated color temperature.
//!
//! The CIE chromaticity uses the usual cubic approximations of the Planckian
//! locus. Rf, Rg, the CRI proxy and the melanopic factor are illustrative
//! values computed from the CCT alone; they are not measurements and are
//! labelled as synthetic wherever they are written out.

use serde::{Deserialize, Serialize};

/// Fidelity index (Rf) range produced by [`tm30_proxies`].
pub const FIDELITY_RANGE: (i32, i32) = (70, 95);

/// Gamut index (Rg) range produced by [`tm30_proxies`].
pub const GAMUT_RANGE: (i32, i32) = (95, 108);

const BASE_FIDELITY: i32 = 85;

/// Color metrics for one light source.
///
/// # Fields
///
/// * `cct` - Correlated color temperature in Kelvin
/// * `rf` - Synthetic TM-30 fidelity index, within [`FIDELITY_RANGE`]
/// * `rg` - Synthetic TM-30 gamut index, within [`GAMUT_RANGE`]
/// * `x`, `y` - CIE 1931 chromaticity, rounded to 4 decimals
/// * `cri` - Synthetic general color rendering index
/// * `melanopic_factor` - Synthetic melanopic daylight efficacy ratio
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorMetrics {
    pub cct: u32,
    pub rf: i32,
    pub rg: i32,
    pub x: f64,
    pub y: f64,
    pub cri: u32,
    pub melanopic_factor: f64,
}

impl ColorMetrics {
    /// Computes every proxy for a CCT.
    ///
    /// # Examples
    ///
    /// ```
    /// use astral_gldf::radiometry::color::ColorMetrics;
    ///
    /// let metrics = ColorMetrics::from_cct(3000);
    /// assert_eq!((metrics.x, metrics.y), (0.4366, 0.4042));
    /// assert_eq!((metrics.rf, metrics.rg), (90, 102));
    /// ```
    pub fn from_cct(cct: u32) -> Self {
        let (x, y) = cie_xy(cct);
        let (rf, rg) = tm30_proxies(cct);
        Self {
            cct,
            rf,
            rg,
            x,
            y,
            cri: cri_proxy(cct),
            melanopic_factor: melanopic_factor(cct),
        }
    }
}

/// CIE 1931 (x, y) of the Planckian locus at `cct`, rounded to 4 decimals.
///
/// x uses two cubic-in-1/T segments split at 4000 K, y is a cubic in x with
/// three bands split at 2222 K and 4000 K. A zero CCT is treated as 1 K.
pub fn cie_xy(cct: u32) -> (f64, f64) {
    let t = f64::from(cct.max(1));
    let t2 = t * t;
    let t3 = t2 * t;

    let x = if cct < 4000 {
        -0.266_123_9e9 / t3 - 0.234_358_9e6 / t2 + 0.877_695_6e3 / t + 0.179_910
    } else {
        -3.025_846_9e9 / t3 + 2.107_037_9e6 / t2 + 0.222_634_7e3 / t + 0.240_390
    };

    let (a, b, c, d) = if cct < 2222 {
        (-1.106_381_4, -1.348_110_20, 2.185_558_32, -0.202_196_83)
    } else if cct < 4000 {
        (-0.954_947_6, -1.374_185_93, 2.091_370_15, -0.167_488_67)
    } else {
        (3.081_758_0, -5.873_386_70, 3.751_129_97, -0.370_014_83)
    };
    let y = a * x.powi(3) + b * x.powi(2) + c * x + d;

    (round4(x), round4(y))
}

/// Synthetic TM-30 (Rf, Rg) pair.
///
/// Rf starts at 85, gains 5 up to 3000 K, 3 up to 4000 K, nothing up to
/// 5000 K and loses 2 above, then a `sin(cct / 1000)` wobble of up to ±3 is
/// added. Rg is `100 - (cct - 4000) / 500`. Both are truncated toward zero
/// and clamped to their documented ranges.
pub fn tm30_proxies(cct: u32) -> (i32, i32) {
    let cct_f = f64::from(cct);

    let offset = match cct {
        0..=3000 => 5,
        3001..=4000 => 3,
        4001..=5000 => 0,
        _ => -2,
    };
    let wobble = ((cct_f * 0.001).sin() * 3.0) as i32;
    let rf = (BASE_FIDELITY + offset + wobble).clamp(FIDELITY_RANGE.0, FIDELITY_RANGE.1);

    let rg = (100 - ((cct_f - 4000.0) * 0.002) as i32).clamp(GAMUT_RANGE.0, GAMUT_RANGE.1);

    (rf, rg)
}

/// CRI proxy used for light source definitions: 80 from 5000 K up, else 90.
pub fn cri_proxy(cct: u32) -> u32 {
    if cct >= 5000 {
        80
    } else {
        90
    }
}

/// Melanopic factor proxy `0.7 + (cct - 3000) / 10000`.
pub fn melanopic_factor(cct: u32) -> f64 {
    0.7 + (f64::from(cct) - 3000.0) / 10_000.0
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    #[test]
    fn test_daylight_and_warm_white_chromaticity() {
        let (x, y) = cie_xy(6500);
        assert_abs_diff_eq!(x, 0.31, epsilon = 0.01);
        assert_abs_diff_eq!(y, 0.32, epsilon = 0.01);

        let (x, y) = cie_xy(3000);
        assert_abs_diff_eq!(x, 0.44, epsilon = 0.01);
        assert_abs_diff_eq!(y, 0.40, epsilon = 0.01);
    }

    #[test]
    fn test_chromaticity_is_rounded() {
        let (x, y) = cie_xy(5000);
        assert_eq!(x, 0.345);
        assert_eq!(y, 0.3516);
    }

    #[test]
    fn test_tm30_reference_values() {
        assert_eq!(tm30_proxies(3000), (90, 102));
        assert_eq!(tm30_proxies(4000), (86, 100));
        assert_eq!(tm30_proxies(5000), (83, 98));
        assert_eq!(tm30_proxies(6500), (83, 95));
    }

    #[test]
    fn test_secondary_proxies() {
        assert_eq!(cri_proxy(4000), 90);
        assert_eq!(cri_proxy(5000), 80);
        assert_abs_diff_eq!(melanopic_factor(3000), 0.7);
        assert_abs_diff_eq!(melanopic_factor(6500), 1.05, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_cct_does_not_divide_by_zero() {
        let (x, y) = cie_xy(0);
        assert!(x.is_finite() && y.is_finite());
    }

    proptest! {
        #[test]
        fn prop_tm30_within_ranges(cct in 0u32..60_000) {
            let (rf, rg) = tm30_proxies(cct);
            prop_assert!((FIDELITY_RANGE.0..=FIDELITY_RANGE.1).contains(&rf));
            prop_assert!((GAMUT_RANGE.0..=GAMUT_RANGE.1).contains(&rg));
        }

        #[test]
        fn prop_chromaticity_has_four_decimals(cct in 1_000u32..25_000) {
            let metrics = ColorMetrics::from_cct(cct);
            prop_assert_eq!(round4(metrics.x), metrics.x);
            prop_assert_eq!(round4(metrics.y), metrics.y);
        }
    }
}
