//! Domain models for catalog objects, observers and horizon positions.
//!
//! These are the read-only inputs of one generation run. A `CelestialObject`
//! is produced by the catalog loader, an `ObserverFrame` is created per request,
//! and `HorizonPosition` values are derived from the two by a horizon transform.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound for rated luminous flux written into product documents.
pub const MAX_RATED_FLUX: u64 = 2_000_000_000;

/// A star (or other point source) loaded from a catalog.
///
/// Positions are equatorial J2000 in degrees. The magnitude is the apparent
/// visual magnitude; lower is brighter.
///
/// # Fields
///
/// * `name` - Display name (proper name or a catalog designation)
/// * `catalog_id` - Hipparcos number when the catalog provides one
/// * `ra_deg` - Right ascension in degrees, `[0, 360)`
/// * `dec_deg` - Declination in degrees, `[-90, 90]`
/// * `magnitude` - Apparent magnitude
/// * `spectral_type` - Spectral classification string such as `"A1V"`
/// * `color_index` - B-V color index, if measured
///
/// # Examples
///
/// ```
/// use astral_gldf::core::domain::CelestialObject;
///
/// let vega = CelestialObject::new("Vega", 279.235, 38.784, 0.03, "A0V")
///     .with_color_index(0.0);
/// assert!(vega.has_valid_position());
/// assert_eq!(vega.color_index, Some(0.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CelestialObject {
    pub name: String,
    pub catalog_id: Option<u32>,
    pub ra_deg: f64,
    pub dec_deg: f64,
    pub magnitude: f64,
    pub spectral_type: String,
    pub color_index: Option<f64>,
}

impl CelestialObject {
    /// Creates an object without catalog id or color index.
    pub fn new(
        name: impl Into<String>,
        ra_deg: f64,
        dec_deg: f64,
        magnitude: f64,
        spectral_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            catalog_id: None,
            ra_deg,
            dec_deg,
            magnitude,
            spectral_type: spectral_type.into(),
            color_index: None,
        }
    }

    pub fn with_catalog_id(mut self, catalog_id: u32) -> Self {
        self.catalog_id = Some(catalog_id);
        self
    }

    pub fn with_color_index(mut self, color_index: f64) -> Self {
        self.color_index = Some(color_index);
        self
    }

    /// Returns `true` when RA lies in `[0, 360)` and Dec in `[-90, 90]`.
    pub fn has_valid_position(&self) -> bool {
        (0.0..360.0).contains(&self.ra_deg) && (-90.0..=90.0).contains(&self.dec_deg)
    }

    /// Synthetic rated lumens derived from the apparent magnitude.
    ///
    /// A magnitude 0 star maps to 1000 lm; every 5 magnitudes is a factor
    /// of 100. The result is capped at [`MAX_RATED_FLUX`].
    ///
    /// # Examples
    ///
    /// ```
    /// use astral_gldf::core::domain::CelestialObject;
    ///
    /// let star = CelestialObject::new("Zero", 0.0, 0.0, 0.0, "G2V");
    /// assert_eq!(star.rated_lumens(), 1000);
    /// ```
    pub fn rated_lumens(&self) -> u64 {
        let flux = 10f64.powf(-self.magnitude / 2.5) * 1000.0;
        if !flux.is_finite() || flux >= MAX_RATED_FLUX as f64 {
            MAX_RATED_FLUX
        } else if flux <= 0.0 {
            0
        } else {
            flux as u64
        }
    }
}

/// Observer location and observation instant.
///
/// Created once per generation request and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObserverFrame {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub instant: DateTime<Utc>,
}

impl ObserverFrame {
    pub fn new(latitude_deg: f64, longitude_deg: f64, instant: DateTime<Utc>) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
            instant,
        }
    }
}

/// Altitude/azimuth of one object as seen by one observer.
///
/// Altitude lies in `[-90, 90]`, azimuth in `[0, 360)` measured from north
/// through east.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorizonPosition {
    pub altitude_deg: f64,
    pub azimuth_deg: f64,
}

impl HorizonPosition {
    /// An object is visible when it is strictly above the horizon.
    ///
    /// # Examples
    ///
    /// ```
    /// use astral_gldf::core::domain::HorizonPosition;
    ///
    /// assert!(HorizonPosition { altitude_deg: 0.5, azimuth_deg: 10.0 }.is_visible());
    /// assert!(!HorizonPosition { altitude_deg: 0.0, azimuth_deg: 10.0 }.is_visible());
    /// ```
    pub fn is_visible(&self) -> bool {
        self.altitude_deg > 0.0
    }
}

/// A catalog object paired with its computed horizon position.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleObject {
    pub object: CelestialObject,
    pub position: HorizonPosition,
}
