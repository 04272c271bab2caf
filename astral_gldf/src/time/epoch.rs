use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// Julian Date of the J2000.0 epoch (2000-01-01T12:00:00 UTC).
pub const J2000_JULIAN_DAY: f64 = 2_451_545.0;

/// Offset between Julian Date and Modified Julian Date.
pub const MJD_OFFSET: f64 = 2_400_000.5;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// The J2000.0 reference instant.
///
/// # Example
/// ```
/// use astral_gldf::time::j2000_epoch;
/// use chrono::{Datelike, Timelike};
///
/// let epoch = j2000_epoch();
/// assert_eq!((epoch.year(), epoch.hour()), (2000, 12));
/// ```
pub fn j2000_epoch() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(946_728_000, 0).unwrap_or_default()
}

/// Fractional days elapsed since J2000.0 (negative before the epoch).
///
/// # Arguments
/// * `instant` - UTC instant
///
/// # Returns
/// * `f64` - days since 2000-01-01T12:00:00Z
pub fn days_since_j2000(instant: &DateTime<Utc>) -> f64 {
    let delta = instant.signed_duration_since(j2000_epoch());
    let seconds = delta.num_seconds() as f64
        + f64::from(delta.subsec_nanos()) / 1_000_000_000.0;
    seconds / SECONDS_PER_DAY
}

/// Julian Date for a UTC instant.
pub fn julian_day(instant: &DateTime<Utc>) -> f64 {
    J2000_JULIAN_DAY + days_since_j2000(instant)
}

/// Modified Julian Date for a UTC instant.
///
/// # Example
/// ```
/// use astral_gldf::time::{j2000_epoch, modified_julian_day};
///
/// assert_eq!(modified_julian_day(&j2000_epoch()), 51544.5);
/// ```
pub fn modified_julian_day(instant: &DateTime<Utc>) -> f64 {
    julian_day(instant) - MJD_OFFSET
}

/// Parse an observation instant given on the command line or in config.
///
/// Accepts RFC 3339 (`2025-01-15T21:00:00Z`) and the shorter
/// `YYYY-MM-DD HH:MM` / `YYYY-MM-DDTHH:MM` forms, which are read as UTC.
///
/// # Returns
/// * `Ok(DateTime<Utc>)` if one of the formats matches
/// * `Err(String)` describing the rejected input otherwise
pub fn parse_instant(value: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    Err(format!("Unrecognized instant '{}'", value))
}
