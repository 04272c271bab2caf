//! Synthetic angular intensity distributions (photometric solids).
//!
//! Angles follow the C-plane / gamma convention: the horizontal angle is the
//! C-plane, the vertical angle is gamma measured from nadir. Both axes are
//! kept sorted ascending so serializers can iterate in a fixed order.

use serde::{Deserialize, Serialize};

/// Peak intensity of synthesized distributions in candela.
pub const PEAK_INTENSITY_CD: f64 = 1000.0;

/// Beam half-widths below this are replaced by it.
const MIN_BEAM_WIDTH_DEG: f64 = 1.0;

/// C-planes of the reference configuration: 0..=90 step 15.
pub fn reference_horizontal_angles() -> Vec<u16> {
    (0..=90).step_by(15).collect()
}

/// Gamma angles of the reference configuration: 0..=90 step 5.
pub fn reference_vertical_angles() -> Vec<u16> {
    (0..=90).step_by(5).collect()
}

/// CCT-dependent Gaussian beam half-width in degrees.
///
/// `35 + (cct - 3000) / 500`, never below one degree.
pub fn beam_half_width(cct: u32) -> f64 {
    clamp_beam_width(35.0 + (f64::from(cct) - 3000.0) / 500.0)
}

fn clamp_beam_width(width: f64) -> f64 {
    if width.is_finite() && width > MIN_BEAM_WIDTH_DEG {
        width
    } else {
        MIN_BEAM_WIDTH_DEG
    }
}

/// Intensity table indexed by (horizontal, vertical) angle.
///
/// Values are stored row-major with the vertical angle as the outer index,
/// matching the serialization order.
///
/// # Examples
///
/// ```
/// use astral_gldf::radiometry::angular::AngularIntensityGrid;
///
/// let grid = AngularIntensityGrid::led_reference(5000);
/// assert_eq!((grid.horizontal_count(), grid.vertical_count()), (7, 19));
/// assert!(grid.intensity_at(0, 0).unwrap() >= grid.intensity_at(0, 45).unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AngularIntensityGrid {
    horizontal_angles: Vec<u16>,
    vertical_angles: Vec<u16>,
    values: Vec<f64>,
}

impl AngularIntensityGrid {
    /// Builds a grid by evaluating `f(horizontal, vertical)` on every cell.
    ///
    /// Angles are sorted and deduplicated; negative or non-finite values
    /// become zero.
    pub fn from_fn<F>(horizontal_angles: &[u16], vertical_angles: &[u16], f: F) -> Self
    where
        F: Fn(f64, f64) -> f64,
    {
        let horizontal_angles = sorted_unique(horizontal_angles);
        let vertical_angles = sorted_unique(vertical_angles);

        let mut values = Vec::with_capacity(horizontal_angles.len() * vertical_angles.len());
        for &vertical in &vertical_angles {
            for &horizontal in &horizontal_angles {
                let value = f(f64::from(horizontal), f64::from(vertical));
                values.push(if value.is_finite() && value > 0.0 {
                    value
                } else {
                    0.0
                });
            }
        }

        Self {
            horizontal_angles,
            vertical_angles,
            values,
        }
    }

    /// Gaussian falloff around nadir with a slight C-plane asymmetry.
    ///
    /// `I(c, γ) = 1000 · exp(-γ² / 2w²) · (1 + 0.02 · sin(4c))` where `w` is
    /// [`beam_half_width`] for the CCT.
    pub fn synthesize(cct: u32, horizontal_angles: &[u16], vertical_angles: &[u16]) -> Self {
        let width = beam_half_width(cct);
        Self::from_fn(horizontal_angles, vertical_angles, |c, gamma| {
            let falloff = (-(gamma * gamma) / (2.0 * width * width)).exp();
            let modulation = 1.0 + 0.02 * (c * 4.0).to_radians().sin();
            PEAK_INTENSITY_CD * falloff * modulation
        })
    }

    /// [`synthesize`](Self::synthesize) on the 7 × 19 reference angle sets.
    pub fn led_reference(cct: u32) -> Self {
        Self::synthesize(
            cct,
            &reference_horizontal_angles(),
            &reference_vertical_angles(),
        )
    }

    /// A point source: one C-plane, full intensity at nadir only.
    pub fn point_source(vertical_angles: &[u16]) -> Self {
        Self::from_fn(&[0], vertical_angles, |_, gamma| {
            if gamma == 0.0 {
                PEAK_INTENSITY_CD
            } else {
                0.0
            }
        })
    }

    pub fn horizontal_angles(&self) -> &[u16] {
        &self.horizontal_angles
    }

    pub fn vertical_angles(&self) -> &[u16] {
        &self.vertical_angles
    }

    pub fn horizontal_count(&self) -> usize {
        self.horizontal_angles.len()
    }

    pub fn vertical_count(&self) -> usize {
        self.vertical_angles.len()
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Intensity at an exact angle pair, `None` when either angle is not on the grid.
    pub fn intensity_at(&self, horizontal: u16, vertical: u16) -> Option<f64> {
        let h = self.horizontal_angles.binary_search(&horizontal).ok()?;
        let v = self.vertical_angles.binary_search(&vertical).ok()?;
        self.values
            .get(v * self.horizontal_angles.len() + h)
            .copied()
    }

    /// Iterates `(horizontal, vertical, intensity)` with vertical ascending as
    /// the outer loop and horizontal ascending as the inner loop.
    pub fn cells(&self) -> impl Iterator<Item = (u16, u16, f64)> + '_ {
        let width = self.horizontal_angles.len();
        self.values.iter().enumerate().map(move |(index, &value)| {
            (
                self.horizontal_angles[index % width],
                self.vertical_angles[index / width],
                value,
            )
        })
    }

    pub fn max_intensity(&self) -> f64 {
        self.values.iter().copied().fold(0.0_f64, f64::max)
    }
}

fn sorted_unique(angles: &[u16]) -> Vec<u16> {
    let mut sorted = angles.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted
}
