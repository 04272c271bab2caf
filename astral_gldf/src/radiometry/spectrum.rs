//! Relative spectral power distributions on a fixed visible-light grid.
//!
//! Every [`SpectralCurve`] covers 380 nm to 780 nm in 5 nm steps (81 samples),
//! ascending, with intensities normalized to a unit peak. A curve that has no
//! positive sample is kept as all zeros instead of being divided by zero.
//!
//! Two generators are provided:
//!
//! - [`SpectralCurve::blackbody`] evaluates a simplified Planck law and is used
//!   for stars.
//! - [`SpectralCurve::led`] builds a phosphor-converted white LED from a blue
//!   pump, a CCT-dependent phosphor lobe and, for warm CCTs, a red lobe.

use serde::{Deserialize, Serialize};

/// First wavelength of the grid in nanometres.
pub const WAVELENGTH_START_NM: u16 = 380;

/// Last wavelength of the grid in nanometres (inclusive).
pub const WAVELENGTH_END_NM: u16 = 780;

/// Grid step in nanometres.
pub const WAVELENGTH_STEP_NM: u16 = 5;

/// Number of samples on the grid.
pub const SAMPLE_COUNT: usize =
    ((WAVELENGTH_END_NM - WAVELENGTH_START_NM) / WAVELENGTH_STEP_NM) as usize + 1;

/// Exponents above this are treated as zero radiance.
const MAX_PLANCK_EXPONENT: f64 = 700.0;

/// Rounded SI constants for the Planck proxy.
pub struct SI {}

impl SI {
    /// Planck constant in J·s
    pub const PLANCK_CONSTANT: f64 = 6.626e-34;

    /// Speed of light in m/s
    pub const SPEED_OF_LIGHT: f64 = 3e8;

    /// Boltzmann constant in J/K
    pub const BOLTZMANN_CONSTANT: f64 = 1.381e-23;
}

/// One point of a spectral curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectralSample {
    pub wavelength_nm: u16,
    pub intensity: f64,
}

/// Iterator over the fixed wavelength grid.
pub fn wavelength_grid() -> impl Iterator<Item = u16> {
    (WAVELENGTH_START_NM..=WAVELENGTH_END_NM).step_by(WAVELENGTH_STEP_NM as usize)
}

/// Relative spectral power distribution on the fixed grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralCurve {
    samples: Vec<SpectralSample>,
}

impl SpectralCurve {
    /// Evaluates `f` on the grid, clamps negatives and non-finite values to
    /// zero, then normalizes to a unit peak.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(f64) -> f64,
    {
        let raw: Vec<SpectralSample> = wavelength_grid()
            .map(|wavelength_nm| {
                let value = f(f64::from(wavelength_nm));
                let intensity = if value.is_finite() && value > 0.0 {
                    value
                } else {
                    0.0
                };
                SpectralSample {
                    wavelength_nm,
                    intensity,
                }
            })
            .collect();

        Self::normalized(raw)
    }

    fn normalized(mut samples: Vec<SpectralSample>) -> Self {
        let peak = samples
            .iter()
            .map(|s| s.intensity)
            .fold(0.0_f64, f64::max);

        if peak > 0.0 {
            for sample in &mut samples {
                sample.intensity /= peak;
            }
        } else {
            for sample in &mut samples {
                sample.intensity = 0.0;
            }
        }

        Self { samples }
    }

    /// Simplified Planck curve for an effective temperature in Kelvin.
    ///
    /// Radiance at wavelength λ is `λ⁻⁵ / (exp(hc / λkT) - 1)`. Bins whose
    /// exponent exceeds 700 contribute zero, and a non-positive temperature
    /// yields an all-zero curve.
    ///
    /// # Examples
    ///
    /// ```
    /// use astral_gldf::radiometry::spectrum::{SpectralCurve, SAMPLE_COUNT};
    ///
    /// let sun = SpectralCurve::blackbody(5800.0);
    /// assert_eq!(sun.len(), SAMPLE_COUNT);
    /// assert_eq!(sun.peak(), 1.0);
    /// ```
    pub fn blackbody(temperature_k: f64) -> Self {
        if temperature_k.is_nan() || temperature_k <= 0.0 {
            return Self::from_fn(|_| 0.0);
        }

        Self::from_fn(|wavelength_nm| {
            let wavelength_m = wavelength_nm * 1e-9;
            let exponent = (SI::PLANCK_CONSTANT * SI::SPEED_OF_LIGHT)
                / (wavelength_m * SI::BOLTZMANN_CONSTANT * temperature_k);
            if exponent > MAX_PLANCK_EXPONENT {
                0.0
            } else {
                (1.0 / wavelength_m.powi(5)) / exponent.exp_m1()
            }
        })
    }

    /// Parametric white LED spectrum for a correlated color temperature.
    ///
    /// - blue pump: amplitude 0.6, centre 450 nm, σ 15 nm
    /// - phosphor: amplitude 0.8, centre `580 - 0.02 · (cct - 4000)` nm,
    ///   σ `80 + 0.01 · (cct - 3000)` nm
    /// - red phosphor (cct ≤ 4000 K only): amplitude `0.4 · (4000 - cct) / 3000`,
    ///   centre 620 nm, σ 40 nm
    /// - ripple: multiplied by `1 + 0.02 · sin(0.1 · λ)`
    ///
    /// # Examples
    ///
    /// ```
    /// use astral_gldf::radiometry::spectrum::SpectralCurve;
    ///
    /// let warm = SpectralCurve::led(3000);
    /// assert!(warm.intensity_at(620).unwrap() > warm.intensity_at(420).unwrap());
    /// ```
    pub fn led(cct: u32) -> Self {
        let cct = f64::from(cct);
        let phosphor_center = 580.0 - (cct - 4000.0) * 0.02;
        let phosphor_width = 80.0 + (cct - 3000.0) * 0.01;
        let red_amplitude = if cct <= 4000.0 {
            (4000.0 - cct) / 3000.0 * 0.4
        } else {
            0.0
        };

        Self::from_fn(|wavelength_nm| {
            let blue = gaussian(wavelength_nm, 0.6, 450.0, 15.0);
            let phosphor = gaussian(wavelength_nm, 0.8, phosphor_center, phosphor_width);
            let red = if red_amplitude > 0.0 {
                gaussian(wavelength_nm, red_amplitude, 620.0, 40.0)
            } else {
                0.0
            };

            (blue + phosphor + red) * (1.0 + 0.02 * (wavelength_nm * 0.1).sin())
        })
    }

    pub fn samples(&self) -> &[SpectralSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Largest intensity, `1.0` for any non-degenerate curve.
    pub fn peak(&self) -> f64 {
        self.samples
            .iter()
            .map(|s| s.intensity)
            .fold(0.0_f64, f64::max)
    }

    /// `true` when every sample is zero.
    pub fn is_degenerate(&self) -> bool {
        self.samples.iter().all(|s| s.intensity == 0.0)
    }

    /// Intensity at a grid wavelength, `None` off the grid.
    pub fn intensity_at(&self, wavelength_nm: u16) -> Option<f64> {
        self.samples
            .iter()
            .find(|s| s.wavelength_nm == wavelength_nm)
            .map(|s| s.intensity)
    }

    /// Wavelength of the peak sample.
    pub fn peak_wavelength(&self) -> Option<u16> {
        self.samples
            .iter()
            .filter(|s| s.intensity > 0.0)
            .max_by(|a, b| a.intensity.total_cmp(&b.intensity))
            .map(|s| s.wavelength_nm)
    }
}

fn gaussian(x: f64, amplitude: f64, center: f64, sigma: f64) -> f64 {
    if sigma <= 0.0 {
        return 0.0;
    }
    amplitude * (-(x - center).powi(2) / (2.0 * sigma * sigma)).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn assert_curve_shape(curve: &SpectralCurve) {
        assert_eq!(curve.len(), SAMPLE_COUNT);
        assert_eq!(curve.samples()[0].wavelength_nm, 380);
        assert_eq!(curve.samples()[SAMPLE_COUNT - 1].wavelength_nm, 780);
        for pair in curve.samples().windows(2) {
            assert_eq!(pair[1].wavelength_nm - pair[0].wavelength_nm, 5);
        }
        assert!(curve.samples().iter().all(|s| s.intensity >= 0.0));
        if !curve.is_degenerate() {
            assert_eq!(curve.peak(), 1.0);
        }
    }

    #[test]
    fn test_grid_has_81_samples() {
        assert_eq!(SAMPLE_COUNT, 81);
        assert_eq!(wavelength_grid().count(), 81);
    }

    #[test]
    fn test_blackbody_peak_moves_with_temperature() {
        // Wien: hot stars peak in the blue, cool stars beyond the red end.
        let hot = SpectralCurve::blackbody(20_000.0);
        let cool = SpectralCurve::blackbody(3_000.0);
        assert_eq!(hot.peak_wavelength(), Some(380));
        assert_eq!(cool.peak_wavelength(), Some(780));

        let sunlike = SpectralCurve::blackbody(5_800.0);
        let peak = sunlike.peak_wavelength().unwrap();
        assert!((480..=520).contains(&peak), "peak at {}", peak);
    }

    #[test]
    fn test_blackbody_degenerate_temperatures() {
        for temperature in [0.0, -100.0, f64::NAN] {
            let curve = SpectralCurve::blackbody(temperature);
            assert_curve_shape(&curve);
            assert!(curve.is_degenerate());
        }
    }

    #[test]
    fn test_blackbody_overflow_guard() {
        // At 10 K every exponent is far above 700.
        let curve = SpectralCurve::blackbody(10.0);
        assert!(curve.is_degenerate());
    }

    #[test]
    fn test_led_red_lobe_only_for_warm() {
        let warm = SpectralCurve::led(3000);
        let cool = SpectralCurve::led(6500);
        assert!(warm.intensity_at(650).unwrap() > cool.intensity_at(650).unwrap());
        assert_curve_shape(&warm);
        assert_curve_shape(&cool);
    }

    #[test]
    fn test_from_fn_clamps_negative_values() {
        let curve = SpectralCurve::from_fn(|wl| if wl < 500.0 { -1.0 } else { 2.0 });
        assert_eq!(curve.intensity_at(400), Some(0.0));
        assert_eq!(curve.intensity_at(600), Some(1.0));
    }

    proptest! {
        #[test]
        fn prop_blackbody_curve_shape(temperature in 500.0f64..60_000.0) {
            let curve = SpectralCurve::blackbody(temperature);
            prop_assert_eq!(curve.len(), SAMPLE_COUNT);
            prop_assert!(curve.samples().iter().all(|s| s.intensity >= 0.0 && s.intensity <= 1.0));
            prop_assert!(curve.is_degenerate() || curve.peak() == 1.0);
        }

        #[test]
        fn prop_led_curve_shape(cct in 1_800u32..10_000) {
            let curve = SpectralCurve::led(cct);
            prop_assert_eq!(curve.len(), SAMPLE_COUNT);
            prop_assert!(curve.samples().iter().all(|s| s.intensity >= 0.0 && s.intensity <= 1.0));
            prop_assert_eq!(curve.peak(), 1.0);
        }
    }
}
