//! Immutable reference tables.
//!
//! The bright-star fallback list and the spectral-class temperature table are
//! plain static data. Loaders and the radiometric model take them by reference
//! so tests can substitute their own tables.

use super::domain::CelestialObject;

/// One row of the built-in bright star list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrightStarEntry {
    pub name: &'static str,
    pub ra_deg: f64,
    pub dec_deg: f64,
    pub magnitude: f64,
    pub spectral_type: &'static str,
    pub color_index: f64,
}

impl BrightStarEntry {
    pub fn to_object(&self) -> CelestialObject {
        CelestialObject::new(
            self.name,
            self.ra_deg,
            self.dec_deg,
            self.magnitude,
            self.spectral_type,
        )
        .with_color_index(self.color_index)
    }
}

const fn star(
    name: &'static str,
    ra_deg: f64,
    dec_deg: f64,
    magnitude: f64,
    spectral_type: &'static str,
    color_index: f64,
) -> BrightStarEntry {
    BrightStarEntry {
        name,
        ra_deg,
        dec_deg,
        magnitude,
        spectral_type,
        color_index,
    }
}

/// Fifteen well-known bright stars used when no catalog file is available.
pub static BRIGHT_STARS: [BrightStarEntry; 15] = [
    star("Sirius", 101.287, -16.716, -1.46, "A1V", 0.00),
    star("Canopus", 95.988, -52.696, -0.74, "F0Ib", 0.15),
    star("Arcturus", 213.915, 19.182, -0.05, "K1.5III", 1.23),
    star("Vega", 279.235, 38.784, 0.03, "A0V", 0.00),
    star("Capella", 79.172, 45.998, 0.08, "G5III", 0.80),
    star("Rigel", 78.634, -8.202, 0.13, "B8Ia", -0.03),
    star("Procyon", 114.825, 5.225, 0.34, "F5IV-V", 0.42),
    star("Betelgeuse", 88.793, 7.407, 0.42, "M1Ia", 1.85),
    star("Altair", 297.696, 8.868, 0.77, "A7V", 0.22),
    star("Aldebaran", 68.980, 16.509, 0.85, "K5III", 1.54),
    star("Antares", 247.352, -26.432, 0.96, "M1Ib", 1.83),
    star("Spica", 201.298, -11.161, 0.97, "B1V", -0.23),
    star("Pollux", 116.329, 28.026, 1.14, "K0III", 1.00),
    star("Deneb", 310.358, 45.280, 1.25, "A2Ia", 0.09),
    star("Polaris", 37.954, 89.264, 2.02, "F7Ib", 0.60),
];

/// Maps the leading letter of a spectral classification to an effective
/// temperature in Kelvin.
#[derive(Debug, Clone, Copy)]
pub struct SpectralTemperatureTable {
    pub entries: &'static [(char, u32)],
    pub default_kelvin: u32,
}

impl SpectralTemperatureTable {
    /// Looks up the temperature for a spectral type string.
    ///
    /// Only the first character is considered, case-insensitively. Unknown or
    /// empty strings map to `default_kelvin`.
    ///
    /// # Examples
    ///
    /// ```
    /// use astral_gldf::core::tables::SPECTRAL_TEMPERATURES;
    ///
    /// assert_eq!(SPECTRAL_TEMPERATURES.lookup("m1ia"), 3200);
    /// assert_eq!(SPECTRAL_TEMPERATURES.lookup(""), 5500);
    /// ```
    pub fn lookup(&self, spectral_type: &str) -> u32 {
        let Some(first) = spectral_type.trim().chars().next() else {
            return self.default_kelvin;
        };
        let first = first.to_ascii_uppercase();

        self.entries
            .iter()
            .find(|(class, _)| *class == first)
            .map(|(_, kelvin)| *kelvin)
            .unwrap_or(self.default_kelvin)
    }
}

/// Harvard spectral classes, hottest first. Default is Sun-like.
pub static SPECTRAL_TEMPERATURES: SpectralTemperatureTable = SpectralTemperatureTable {
    entries: &[
        ('O', 35000),
        ('B', 20000),
        ('A', 9000),
        ('F', 7000),
        ('G', 5500),
        ('K', 4500),
        ('M', 3200),
    ],
    default_kelvin: 5500,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bright_stars_have_valid_positions() {
        for entry in BRIGHT_STARS.iter() {
            assert!(entry.to_object().has_valid_position(), "{}", entry.name);
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(SPECTRAL_TEMPERATURES.lookup("B8Ia"), 20000);
        assert_eq!(SPECTRAL_TEMPERATURES.lookup("b8ia"), 20000);
        assert_eq!(SPECTRAL_TEMPERATURES.lookup("  K0III"), 4500);
        assert_eq!(SPECTRAL_TEMPERATURES.lookup("WC8"), 5500);
    }

    #[test]
    fn test_substitute_table() {
        static HOT_ONLY: SpectralTemperatureTable = SpectralTemperatureTable {
            entries: &[('O', 40000)],
            default_kelvin: 1000,
        };
        assert_eq!(HOT_ONLY.lookup("O5"), 40000);
        assert_eq!(HOT_ONLY.lookup("G2V"), 1000);
    }
}
