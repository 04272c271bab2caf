//! Equatorial to horizon coordinate transforms.
//!
//! Two interchangeable strategies implement [`HorizonTransform`]:
//!
//! - [`ApproximateTransform`] uses the linear sidereal-rate formula and plain
//!   spherical trigonometry. It is always available and exactly reproducible.
//! - `PreciseTransform` (feature `precise-ephemeris`) delegates to the Meeus
//!   routines of the `astro` crate.
//!
//! The strategy is chosen once with [`select_transform`]; callers hold a
//! `Box<dyn HorizonTransform>` and never branch on the strategy again.
//! The two strategies agree to within a few degrees, not bit for bit.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::domain::{CelestialObject, HorizonPosition, ObserverFrame, VisibleObject};
use crate::time::days_since_j2000;

/// GMST at J2000.0 in degrees.
const GMST_AT_J2000_DEG: f64 = 280.46;

/// Sidereal rotation in degrees per solar day.
const SIDEREAL_RATE_DEG_PER_DAY: f64 = 360.985_647_4;

/// Denominators below this are treated as zero (observer at a pole or object at zenith).
const DEGENERATE_DENOMINATOR: f64 = 1e-12;

/// Converts equatorial coordinates into altitude/azimuth for one observer.
pub trait HorizonTransform {
    /// Short strategy name used in logs.
    fn name(&self) -> &'static str;

    /// Computes the horizon position of `object` for the observer's location
    /// and instant.
    fn transform(&self, object: &CelestialObject, observer: &ObserverFrame) -> HorizonPosition;
}

/// Which horizon transform to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EphemerisStrategy {
    /// Precise when compiled in, approximate otherwise.
    #[default]
    Auto,
    Approximate,
    Precise,
}

impl FromStr for EphemerisStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "approximate" | "approx" | "simple" => Ok(Self::Approximate),
            "precise" => Ok(Self::Precise),
            other => Err(format!(
                "Unknown ephemeris strategy '{}' (expected auto, approximate or precise)",
                other
            )),
        }
    }
}

impl fmt::Display for EphemerisStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Auto => "auto",
            Self::Approximate => "approximate",
            Self::Precise => "precise",
        };
        f.write_str(name)
    }
}

/// Returns `true` when the precise strategy was compiled in.
pub fn precise_available() -> bool {
    cfg!(feature = "precise-ephemeris")
}

/// Builds the horizon transform for a strategy.
///
/// `Auto` picks the precise transform when available. Requesting `Precise`
/// without the `precise-ephemeris` feature degrades to the approximate
/// transform with a warning rather than failing.
///
/// # Examples
///
/// ```
/// use astral_gldf::transformations::horizon::{select_transform, EphemerisStrategy};
///
/// let transform = select_transform(EphemerisStrategy::Approximate);
/// assert_eq!(transform.name(), "approximate");
/// ```
pub fn select_transform(strategy: EphemerisStrategy) -> Box<dyn HorizonTransform> {
    match strategy {
        EphemerisStrategy::Approximate => Box::new(ApproximateTransform),
        EphemerisStrategy::Auto | EphemerisStrategy::Precise => precise_or_fallback(strategy),
    }
}

#[cfg(feature = "precise-ephemeris")]
fn precise_or_fallback(_strategy: EphemerisStrategy) -> Box<dyn HorizonTransform> {
    Box::new(super::precise::PreciseTransform)
}

#[cfg(not(feature = "precise-ephemeris"))]
fn precise_or_fallback(strategy: EphemerisStrategy) -> Box<dyn HorizonTransform> {
    if strategy == EphemerisStrategy::Precise {
        log::warn!("Precise ephemeris not compiled in; using approximate horizon transform");
    }
    Box::new(ApproximateTransform)
}

/// Linear sidereal-time transform.
///
/// Local sidereal time is `280.46° + 360.9856474° · d + longitude`, where `d`
/// is days since J2000.0. Output depends only on the inputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproximateTransform;

impl ApproximateTransform {
    /// Local sidereal time in degrees, normalized to `[0, 360)`.
    ///
    /// # Arguments
    ///
    /// * `days_since_j2000` - Fractional days since 2000-01-01T12:00Z
    /// * `longitude_deg` - Observer longitude, east positive
    pub fn local_sidereal_degrees(days_since_j2000: f64, longitude_deg: f64) -> f64 {
        (GMST_AT_J2000_DEG + SIDEREAL_RATE_DEG_PER_DAY * days_since_j2000 + longitude_deg)
            .rem_euclid(360.0)
    }
}

impl HorizonTransform for ApproximateTransform {
    fn name(&self) -> &'static str {
        "approximate"
    }

    fn transform(&self, object: &CelestialObject, observer: &ObserverFrame) -> HorizonPosition {
        let ra = object.ra_deg.to_radians();
        let dec = object.dec_deg.to_radians();
        let lat = observer.latitude_deg.to_radians();

        let lst = Self::local_sidereal_degrees(
            days_since_j2000(&observer.instant),
            observer.longitude_deg,
        )
        .to_radians();
        let hour_angle = lst - ra;

        let sin_alt =
            (dec.sin() * lat.sin() + dec.cos() * lat.cos() * hour_angle.cos()).clamp(-1.0, 1.0);
        let altitude = sin_alt.asin();

        let denominator = lat.cos() * altitude.cos();
        let azimuth_deg = if denominator.abs() < DEGENERATE_DENOMINATOR {
            0.0
        } else {
            let cos_az = ((dec.sin() - lat.sin() * sin_alt) / denominator).clamp(-1.0, 1.0);
            let az = cos_az.acos().to_degrees();
            if hour_angle.sin() > 0.0 {
                360.0 - az
            } else {
                az
            }
        };

        HorizonPosition {
            altitude_deg: clamp_altitude(altitude.to_degrees()),
            azimuth_deg: normalize_azimuth(azimuth_deg),
        }
    }
}

/// Clamps an altitude into `[-90, 90]`; non-finite input maps to 0.
pub(crate) fn clamp_altitude(altitude_deg: f64) -> f64 {
    if altitude_deg.is_finite() {
        altitude_deg.clamp(-90.0, 90.0)
    } else {
        0.0
    }
}

/// Wraps an azimuth into `[0, 360)`; non-finite input maps to 0.
pub(crate) fn normalize_azimuth(azimuth_deg: f64) -> f64 {
    if !azimuth_deg.is_finite() {
        return 0.0;
    }
    let wrapped = azimuth_deg.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Computes horizon positions and keeps objects strictly above the horizon.
///
/// Catalog order is preserved.
pub fn visible_objects(
    objects: &[CelestialObject],
    observer: &ObserverFrame,
    transform: &dyn HorizonTransform,
) -> Vec<VisibleObject> {
    objects
        .iter()
        .filter_map(|object| {
            let position = transform.transform(object, observer);
            position.is_visible().then(|| VisibleObject {
                object: object.clone(),
                position,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn observer_at(lat: f64, lon: f64) -> ObserverFrame {
        ObserverFrame::new(
            lat,
            lon,
            Utc.with_ymd_and_hms(2025, 1, 15, 21, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_lst_at_epoch() {
        assert_eq!(
            ApproximateTransform::local_sidereal_degrees(0.0, 0.0),
            280.46
        );
        let lst = ApproximateTransform::local_sidereal_degrees(0.0, 100.0);
        assert!((lst - 20.46).abs() < 1e-9);
    }

    #[test]
    fn test_polaris_altitude_tracks_latitude() {
        let polaris = CelestialObject::new("Polaris", 37.954, 89.264, 2.02, "F7Ib");
        let position = ApproximateTransform.transform(&polaris, &observer_at(51.77, 7.44));
        assert!(
            (position.altitude_deg - 51.77).abs() < 1.0,
            "{:?}",
            position
        );
    }

    #[test]
    fn test_object_on_meridian_is_south() {
        // Put the object exactly on the local meridian.
        let observer = observer_at(45.0, 0.0);
        let lst = ApproximateTransform::local_sidereal_degrees(
            days_since_j2000(&observer.instant),
            observer.longitude_deg,
        );
        let object = CelestialObject::new("Meridian", lst, 0.0, 1.0, "G2V");
        let position = ApproximateTransform.transform(&object, &observer);

        assert!((position.altitude_deg - 45.0).abs() < 1e-6);
        assert!((position.azimuth_deg - 180.0).abs() < 1e-6);
    }

    #[test]
    fn test_pole_observer_does_not_produce_nan() {
        let object = CelestialObject::new("Any", 120.0, 30.0, 1.0, "G2V");
        let position = ApproximateTransform.transform(&object, &observer_at(90.0, 0.0));
        assert!(position.altitude_deg.is_finite());
        assert!(position.azimuth_deg.is_finite());
        assert!((0.0..360.0).contains(&position.azimuth_deg));
    }

    #[test]
    fn test_transform_is_repeatable() {
        let vega = CelestialObject::new("Vega", 279.235, 38.784, 0.03, "A0V");
        let observer = observer_at(51.77, 7.44);
        let first = ApproximateTransform.transform(&vega, &observer);
        let second = ApproximateTransform.transform(&vega, &observer);
        assert_eq!(first, second);
    }

    #[test]
    fn test_normalize_azimuth_edges() {
        assert_eq!(normalize_azimuth(360.0), 0.0);
        assert_eq!(normalize_azimuth(-90.0), 270.0);
        assert_eq!(normalize_azimuth(f64::NAN), 0.0);
        assert!(normalize_azimuth(-1e-18) < 360.0);
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!(
            "AUTO".parse::<EphemerisStrategy>().unwrap(),
            EphemerisStrategy::Auto
        );
        assert_eq!(
            "approximate".parse::<EphemerisStrategy>().unwrap(),
            EphemerisStrategy::Approximate
        );
        assert!("astropy".parse::<EphemerisStrategy>().is_err());
        assert_eq!(EphemerisStrategy::Precise.to_string(), "precise");
    }

    #[test]
    fn test_select_transform_matches_feature() {
        let transform = select_transform(EphemerisStrategy::Auto);
        if precise_available() {
            assert_eq!(transform.name(), "precise");
        } else {
            assert_eq!(transform.name(), "approximate");
        }
    }

    #[test]
    fn test_visible_objects_keeps_order() {
        let objects = vec![
            CelestialObject::new("Polaris", 37.954, 89.264, 2.02, "F7Ib"),
            CelestialObject::new("Canopus", 95.988, -52.696, -0.74, "F0Ib"),
            CelestialObject::new("Kochab-ish", 222.676, 74.155, 2.08, "K4III"),
        ];
        let visible = visible_objects(&objects, &observer_at(51.77, 7.44), &ApproximateTransform);
        let names: Vec<_> = visible.iter().map(|v| v.object.name.as_str()).collect();
        assert_eq!(names, vec!["Polaris", "Kochab-ish"]);
    }
}
