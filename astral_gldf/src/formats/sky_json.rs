//! Lightweight sky summary consumed by the embedded sky viewers.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::core::domain::VisibleObject;
use crate::core::tables::SpectralTemperatureTable;
use crate::error::{ErrorContext, FixtureError, FixtureResult};
use crate::radiometry::temperature::object_temperature;

/// Archive path of the summary inside the container.
pub const SKY_DATA_PATH: &str = "sky_data.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkyLocation {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

/// One visible star as the viewers expect it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkyStar {
    pub name: String,
    pub alt: f64,
    pub az: f64,
    pub mag: f64,
    pub spectral: String,
    pub temp: u32,
    pub ra: f64,
    pub dec: f64,
}

/// The whole summary document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkySummary {
    pub location: SkyLocation,
    pub time: String,
    pub stars: Vec<SkyStar>,
}

impl SkySummary {
    /// Builds the summary from visible objects, rounding alt/az to 2 decimals.
    pub fn new(
        location: SkyLocation,
        instant: &DateTime<Utc>,
        visible: &[VisibleObject],
        temperatures: &SpectralTemperatureTable,
    ) -> Self {
        let stars = visible
            .iter()
            .map(|v| SkyStar {
                name: v.object.name.clone(),
                alt: round2(v.position.altitude_deg),
                az: round2(v.position.azimuth_deg),
                mag: v.object.magnitude,
                spectral: v.object.spectral_type.clone(),
                temp: object_temperature(&v.object, temperatures),
                ra: v.object.ra_deg,
                dec: v.object.dec_deg,
            })
            .collect();

        Self {
            location,
            time: instant.to_rfc3339_opts(SecondsFormat::Secs, false),
            stars,
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> FixtureResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            FixtureError::serialization(e.to_string(), ErrorContext::new("render_sky_summary"))
        })
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::{CelestialObject, HorizonPosition};
    use crate::core::tables::SPECTRAL_TEMPERATURES;
    use chrono::TimeZone;

    #[test]
    fn test_summary_round_trip() {
        let instant = Utc.with_ymd_and_hms(2025, 1, 15, 21, 0, 0).unwrap();
        let visible = vec![VisibleObject {
            object: CelestialObject::new("Capella", 79.172, 45.998, 0.08, "G5III")
                .with_color_index(0.8),
            position: HorizonPosition {
                altitude_deg: 71.23456,
                azimuth_deg: 152.98765,
            },
        }];
        let summary = SkySummary::new(
            SkyLocation {
                name: "Lüdinghausen".to_string(),
                lat: 51.77,
                lng: 7.44,
            },
            &instant,
            &visible,
            &SPECTRAL_TEMPERATURES,
        );

        assert_eq!(summary.time, "2025-01-15T21:00:00+00:00");
        assert_eq!(summary.stars[0].alt, 71.23);
        assert_eq!(summary.stars[0].az, 152.99);
        assert_eq!(summary.stars[0].temp, 5500);

        let json = summary.to_json().unwrap();
        assert!(json.contains("\n  \"location\": {"));
        let parsed: SkySummary = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, summary);
    }
}
