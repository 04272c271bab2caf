//! Property tests for the horizon transform.

use astral_gldf::core::domain::{CelestialObject, ObserverFrame};
use astral_gldf::time::days_since_j2000;
use astral_gldf::transformations::{
    select_transform, ApproximateTransform, EphemerisStrategy, HorizonTransform,
};
use chrono::{TimeZone, Utc};
use proptest::prelude::*;

fn observer(lat: f64, lon: f64, seconds: i64) -> ObserverFrame {
    ObserverFrame::new(lat, lon, Utc.timestamp_opt(seconds, 0).unwrap())
}

proptest! {
    #[test]
    fn prop_altitude_and_azimuth_in_range(
        ra in 0.0f64..360.0,
        dec in -90.0f64..=90.0,
        lat in -90.0f64..=90.0,
        lon in -180.0f64..=180.0,
        // 1970..2100
        seconds in 0i64..4_102_444_800,
    ) {
        let object = CelestialObject::new("P", ra, dec, 1.0, "G2V");
        let position = ApproximateTransform.transform(&object, &observer(lat, lon, seconds));

        prop_assert!(position.altitude_deg.is_finite());
        prop_assert!((-90.0..=90.0).contains(&position.altitude_deg));
        prop_assert!(position.azimuth_deg >= 0.0 && position.azimuth_deg < 360.0);
    }

    #[test]
    fn prop_transform_is_idempotent(
        ra in 0.0f64..360.0,
        dec in -90.0f64..=90.0,
        lat in -89.0f64..=89.0,
        seconds in 946_684_800i64..1_893_456_000,
    ) {
        let object = CelestialObject::new("P", ra, dec, 1.0, "G2V");
        let frame = observer(lat, 7.44, seconds);
        let transform = select_transform(EphemerisStrategy::Auto);

        let first = transform.transform(&object, &frame);
        let second = transform.transform(&object, &frame);
        prop_assert_eq!(first, second);
    }
}

#[test]
fn test_zenith_object_has_altitude_near_ninety() {
    // Observer on the equator; an object at the local sidereal time and dec 0
    // sits at the zenith.
    let frame = observer(0.0, 0.0, 1_736_974_800);
    let lst = ApproximateTransform::local_sidereal_degrees(days_since_j2000(&frame.instant), 0.0);
    let object = CelestialObject::new("Zenith", lst, 0.0, 1.0, "G2V");
    let position = ApproximateTransform.transform(&object, &frame);
    approx::assert_abs_diff_eq!(position.altitude_deg, 90.0, epsilon = 1e-4);
}
