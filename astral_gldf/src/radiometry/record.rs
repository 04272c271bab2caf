//! Photometric records: everything one TM-33 file carries.
//!
//! A [`PhotometricRecord`] bundles the angular grid, the spectral curve, the
//! color metrics and the descriptive metadata of a single fixture. Records are
//! built in one go by [`PhotometricRecord::for_star`] or
//! [`PhotometricRecord::for_led_module`] and are not mutated afterwards.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::angular::{reference_vertical_angles, AngularIntensityGrid};
use super::color::ColorMetrics;
use super::spectrum::SpectralCurve;
use super::temperature::object_temperature;
use crate::core::domain::CelestialObject;
use crate::core::tables::SpectralTemperatureTable;

/// Luminous efficacy of the reference LED module at 30 W, in lm/W.
const BASE_EFFICACY: f64 = 150.0;

/// Efficacy lost per watt above 30 W.
const EFFICACY_SLOPE: f64 = 0.3;

/// Luminous efficacy in lm/W for an LED module of the given wattage.
pub fn led_efficacy(wattage: u32) -> f64 {
    BASE_EFFICACY - (f64::from(wattage) - 30.0) * EFFICACY_SLOPE
}

/// Rated luminous flux of an LED module, truncated to whole lumens.
///
/// # Examples
///
/// ```
/// use astral_gldf::radiometry::record::led_rated_lumens;
///
/// assert_eq!(led_rated_lumens(30), 4500);
/// assert_eq!(led_rated_lumens(50), 7200);
/// ```
pub fn led_rated_lumens(wattage: u32) -> u64 {
    let lumens = f64::from(wattage) * led_efficacy(wattage);
    if lumens.is_finite() && lumens > 0.0 {
        lumens as u64
    } else {
        0
    }
}

/// Angular symmetry declared in the luminous data block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Symmetry {
    /// Rotationally symmetric; one C-plane describes the solid.
    Full,
    /// Quadrant symmetric; C-planes 0..=90 describe the solid.
    Quad,
}

impl Symmetry {
    pub fn as_str(&self) -> &'static str {
        match self {
            Symmetry::Full => "Symm _ Full",
            Symmetry::Quad => "Symm _ Quad",
        }
    }
}

/// Report header of a photometric file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportHeader {
    pub manufacturer: String,
    pub catalog_number: String,
    pub description: String,
    pub laboratory: String,
    pub report_number: String,
    pub report_date: NaiveDate,
    pub document_creator: String,
    pub document_creation_date: NaiveDate,
}

/// Physical description of the luminaire, dimensions in millimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LuminaireBlock {
    pub length_mm: u32,
    pub width_mm: u32,
    pub height_mm: u32,
    pub mounting: String,
    pub emitter_count: u32,
}

/// Descriptive and electrical data of the single emitter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmitterBlock {
    pub id: String,
    pub description: String,
    pub catalog_number: String,
    pub quantity: u32,
    pub rated_lumens: u64,
    pub input_wattage: u32,
    pub power_factor: Option<f64>,
    pub ballast_factor: Option<f64>,
    pub duv: f64,
}

/// Color rendering values written into the emitter block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorRendering {
    pub ra: u32,
    pub r9: Option<i32>,
    pub rf: Option<i32>,
    pub rg: Option<i32>,
}

/// Static description of a luminaire product line.
///
/// Supplies everything in an LED record that does not depend on CCT or
/// wattage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LuminaireProfile {
    pub manufacturer: String,
    pub series: String,
    pub description: String,
    pub laboratory: String,
    pub document_creator: String,
    pub length_mm: u32,
    pub width_mm: u32,
    pub height_mm: u32,
    pub mounting: String,
    pub ra: u32,
    pub r9: i32,
    pub power_factor: f64,
    pub ballast_factor: f64,
}

impl Default for LuminaireProfile {
    /// The GA15 industrial LED module.
    fn default() -> Self {
        Self {
            manufacturer: "AEC Illuminazione".to_string(),
            series: "GA15".to_string(),
            description: "Industrial LED Module".to_string(),
            laboratory: "Demo Data Generator".to_string(),
            document_creator: "GLDF Demo Generator".to_string(),
            length_mm: 300,
            width_mm: 300,
            height_mm: 120,
            mounting: "Recessed".to_string(),
            ra: 90,
            r9: 50,
            power_factor: 0.95,
            ballast_factor: 1.0,
        }
    }
}

/// Everything needed to render one TM-33 photometric file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotometricRecord {
    /// Free-text lines for the leading XML comment.
    pub notes: Vec<String>,
    pub header: ReportHeader,
    pub luminaire: LuminaireBlock,
    pub emitter: EmitterBlock,
    pub color_rendering: ColorRendering,
    pub metrics: ColorMetrics,
    pub symmetry: Symmetry,
    pub grid: AngularIntensityGrid,
    pub spectrum: SpectralCurve,
}

impl PhotometricRecord {
    /// Builds the record of a star seen as a point source.
    ///
    /// The spectrum is a blackbody at the estimated effective temperature, the
    /// angular grid has a single C-plane with all intensity at nadir and the
    /// rated flux follows the apparent magnitude.
    ///
    /// # Arguments
    ///
    /// * `object` - The catalog object
    /// * `temperatures` - Spectral class lookup used when no color index is known
    /// * `report_date` - Date written into the header, usually the observation date
    pub fn for_star(
        object: &CelestialObject,
        temperatures: &SpectralTemperatureTable,
        report_date: NaiveDate,
    ) -> Self {
        let temperature = object_temperature(object, temperatures);
        let metrics = ColorMetrics::from_cct(temperature);
        let name = object.name.as_str();

        Self {
            notes: vec![
                format!("Stellar Photometry - {}", name),
                format!("Spectral Type: {}", object.spectral_type),
                format!("Temperature: {}K", temperature),
                format!("Magnitude: {}", object.magnitude),
                String::new(),
                "Synthetic point-source fixture derived from catalog data".to_string(),
            ],
            header: ReportHeader {
                manufacturer: "Astral Sky Demo".to_string(),
                catalog_number: name.replace(' ', "_"),
                description: format!("Star: {} ({})", name, object.spectral_type),
                laboratory: "Stellar Photometry Generator".to_string(),
                report_number: format!("STAR-{}", name.replace(' ', "-")),
                report_date,
                document_creator: "astral-gldf".to_string(),
                document_creation_date: report_date,
            },
            luminaire: LuminaireBlock {
                length_mm: 0,
                width_mm: 0,
                height_mm: 0,
                mounting: "Celestial".to_string(),
                emitter_count: 1,
            },
            emitter: EmitterBlock {
                id: format!("star-{}", name.to_lowercase().replace(' ', "-")),
                description: format!("{} - {} star", name, object.spectral_type),
                catalog_number: name.to_string(),
                quantity: 1,
                rated_lumens: object.rated_lumens(),
                input_wattage: 0,
                power_factor: None,
                ballast_factor: None,
                duv: 0.0,
            },
            color_rendering: ColorRendering {
                ra: 100,
                r9: None,
                rf: None,
                rg: None,
            },
            metrics,
            symmetry: Symmetry::Full,
            grid: AngularIntensityGrid::point_source(&reference_vertical_angles()),
            spectrum: SpectralCurve::blackbody(f64::from(temperature)),
        }
    }

    /// Builds the record of an LED module at a given CCT and wattage.
    ///
    /// # Arguments
    ///
    /// * `cct` - Correlated color temperature in Kelvin
    /// * `wattage` - Input power in watts
    /// * `profile` - Product line data shared by every CCT/wattage
    /// * `report_date` - Date written into the header
    ///
    /// # Examples
    ///
    /// ```
    /// use astral_gldf::radiometry::record::{LuminaireProfile, PhotometricRecord};
    /// use chrono::NaiveDate;
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    /// let record = PhotometricRecord::for_led_module(5000, 50, &LuminaireProfile::default(), date);
    /// assert_eq!(record.header.catalog_number, "GA15-5000K");
    /// assert_eq!(record.spectrum.len(), 81);
    /// ```
    pub fn for_led_module(
        cct: u32,
        wattage: u32,
        profile: &LuminaireProfile,
        report_date: NaiveDate,
    ) -> Self {
        let metrics = ColorMetrics::from_cct(cct);
        let lumens = led_rated_lumens(wattage);

        Self {
            notes: vec![
                format!(
                    "{} {} - angular, spectral and colorimetric data",
                    profile.series, profile.description
                ),
                String::new(),
                format!(
                    "CCT: {}K | Rf: {} | Rg: {} | {}W | {}lm",
                    cct, metrics.rf, metrics.rg, wattage, lumens
                ),
                "Rf and Rg are synthetic proxies computed from CCT, not measured values".to_string(),
            ],
            header: ReportHeader {
                manufacturer: profile.manufacturer.clone(),
                catalog_number: format!("{}-{}K", profile.series, cct),
                description: format!("{} {} - {}K CCT", profile.series, profile.description, cct),
                laboratory: profile.laboratory.clone(),
                report_number: format!("{}-TM33-{}K", profile.series, cct),
                report_date,
                document_creator: profile.document_creator.clone(),
                document_creation_date: report_date,
            },
            luminaire: LuminaireBlock {
                length_mm: profile.length_mm,
                width_mm: profile.width_mm,
                height_mm: profile.height_mm,
                mounting: profile.mounting.clone(),
                emitter_count: 1,
            },
            emitter: EmitterBlock {
                id: format!("led-{}k", cct),
                description: format!("LED Module {}K", cct),
                catalog_number: format!("{}-LED-{}K", profile.series, cct),
                quantity: 1,
                rated_lumens: lumens,
                input_wattage: wattage,
                power_factor: Some(profile.power_factor),
                ballast_factor: Some(profile.ballast_factor),
                duv: 0.0,
            },
            color_rendering: ColorRendering {
                ra: profile.ra,
                r9: Some(profile.r9),
                rf: Some(metrics.rf),
                rg: Some(metrics.rg),
            },
            metrics,
            symmetry: Symmetry::Quad,
            grid: AngularIntensityGrid::led_reference(cct),
            spectrum: SpectralCurve::led(cct),
        }
    }

    /// Correlated color temperature written as `FixedCCT`.
    pub fn cct(&self) -> u32 {
        self.metrics.cct
    }
}
