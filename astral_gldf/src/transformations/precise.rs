//! Meeus-based horizon transform backed by the `astro` crate.

use std::f64::consts::PI;

use astro::angle::limit_to_two_PI;
use astro::coords::{alt_frm_eq, az_frm_eq};
use astro::time::{julian_day, mn_sidr, CalType, Date};
use chrono::{DateTime, Datelike, Timelike, Utc};

use super::horizon::{clamp_altitude, normalize_azimuth, HorizonTransform};
use crate::core::domain::{CelestialObject, HorizonPosition, ObserverFrame};

/// Ratio of sidereal to solar time.
const SIDEREAL_PER_SOLAR: f64 = 1.002_737_909_35;

/// Horizon transform using mean sidereal time from Meeus, chapter 12.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreciseTransform;

/// Greenwich mean sidereal time in radians for a UTC instant.
fn greenwich_mean_sidereal_time(instant: &DateTime<Utc>) -> f64 {
    let date = instant.date_naive();
    let midnight = Date {
        year: date.year() as i16,
        month: date.month() as u8,
        decimal_day: date.day() as f64,
        cal_type: CalType::Gregorian,
    };
    let jd = julian_day(&midnight);

    let utc_hours = f64::from(instant.time().num_seconds_from_midnight()) / 3600.0
        + f64::from(instant.time().nanosecond()) / 3.6e12;
    let gmst_hours = mn_sidr(jd).to_degrees() / 15.0 + utc_hours * SIDEREAL_PER_SOLAR;

    limit_to_two_PI((gmst_hours * 15.0).to_radians())
}

impl HorizonTransform for PreciseTransform {
    fn name(&self) -> &'static str {
        "precise"
    }

    fn transform(&self, object: &CelestialObject, observer: &ObserverFrame) -> HorizonPosition {
        let ra = object.ra_deg.to_radians();
        let dec = object.dec_deg.to_radians();
        let lat = observer.latitude_deg.to_radians();
        let long = observer.longitude_deg.to_radians();

        let hour_angle = greenwich_mean_sidereal_time(&observer.instant) + long - ra;

        // Meeus measures azimuth westward from south.
        let azimuth = limit_to_two_PI(az_frm_eq(hour_angle, dec, lat) + PI);
        let altitude = alt_frm_eq(hour_angle, dec, lat);

        HorizonPosition {
            altitude_deg: clamp_altitude(altitude.to_degrees()),
            azimuth_deg: normalize_azimuth(azimuth.to_degrees()),
        }
    }
}
