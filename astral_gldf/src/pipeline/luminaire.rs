//! LED luminaire series fixtures.
//!
//! Two ways of attaching light to a large variant matrix:
//!
//! - **shared**: one base photometry and geometry, a light source per
//!   wattage and CCT, and variants that only override mechanical and
//!   electrical data.
//! - **spectral**: one TM-33 photometry and spectrum per CCT, each emitter
//!   pointing at the file of its CCT.
//!
//! Both can be produced in the same run.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use log::info;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::composer::{
    ColorInformation, ContentType, CustomProperty, DocumentHeader, Electrical, EmitterDefinition,
    FileDefinition, GeometryDefinition, HousingColor, LightSourceDefinition, Mechanical,
    PhotometryDefinition, ProductDocument, ProductDocumentBuilder, ProductMetaData,
    SpectrumDefinition, VariantDefinition, VariantGeometry,
};
use crate::formats::tm33;
use crate::packaging::{Container, Folder};
use crate::radiometry::color::ColorMetrics;
use crate::radiometry::record::{led_rated_lumens, LuminaireProfile, PhotometricRecord};
use crate::radiometry::spectrum::SpectralCurve;

pub const WATTAGES: [u32; 6] = [30, 50, 75, 100, 150, 200];
pub const CCTS: [u32; 5] = [3000, 3500, 4000, 5000, 6500];
pub const OPTICS: [&str; 4] = ["Narrow", "Medium", "Wide", "Asymmetric"];
pub const LENGTHS_MM: [u32; 5] = [600, 900, 1200, 1500, 1800];
/// RAL number and display name
pub const HOUSING_COLORS: [(&str, &str); 3] = [
    ("RAL9003", "White"),
    ("RAL9005", "Black"),
    ("RAL9006", "Silver"),
];

/// Light sources combined into the shared-mode variant matrix.
pub const SHARED_VARIANT_LIGHT_SOURCES: usize = 10;
/// Wattages that get a spectral-mode light source.
pub const SPECTRAL_WATTAGES: usize = 3;
/// Lengths that get a spectral-mode variant.
pub const SPECTRAL_LENGTHS: usize = 2;
/// Wattage of the per-CCT TM-33 files.
pub const TM33_WATTAGE: u32 = 50;

/// Object name inside the L3D model that carries the emitter.
pub const LEO_NAME: &str = "LEO";

pub const SHARED_OUTPUT_FILE: &str = "aec_ga15_enriched.gldf";
pub const SPECTRAL_OUTPUT_FILE: &str = "aec_ga15_enriched_spectral.gldf";

const GEOMETRY_FILE: &str = "model.l3d";
const PHOTOMETRY_FILE: &str = "photometry.ldt";
const IMAGE_FILE: &str = "product.jpg";

/// Which composition strategies a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LuminaireMode {
    Shared,
    Spectral,
    #[default]
    Both,
}

impl LuminaireMode {
    pub fn includes_shared(&self) -> bool {
        matches!(self, LuminaireMode::Shared | LuminaireMode::Both)
    }

    pub fn includes_spectral(&self) -> bool {
        matches!(self, LuminaireMode::Spectral | LuminaireMode::Both)
    }
}

impl FromStr for LuminaireMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "shared" => Ok(LuminaireMode::Shared),
            "spectral" => Ok(LuminaireMode::Spectral),
            "both" => Ok(LuminaireMode::Both),
            other => Err(format!(
                "Unknown luminaire mode '{}', expected shared, spectral or both",
                other
            )),
        }
    }
}

impl fmt::Display for LuminaireMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LuminaireMode::Shared => "shared",
            LuminaireMode::Spectral => "spectral",
            LuminaireMode::Both => "both",
        };
        f.write_str(name)
    }
}

/// Payloads reused from the base product.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BaseAssets {
    pub geometry: Vec<u8>,
    /// Only the shared mode needs the base photometry
    pub photometry: Option<Vec<u8>>,
    pub image: Vec<u8>,
}

impl BaseAssets {
    /// Pulls the assets out of an existing product archive.
    pub fn from_archive(path: &Path) -> Result<Self> {
        let container = Container::read_archive(path)
            .with_context(|| format!("Failed to read base archive {}", path.display()))?;
        Self::from_container(&container)
            .with_context(|| format!("Incomplete base archive {}", path.display()))
    }

    pub fn from_container(container: &Container) -> Result<Self> {
        let required = |path: String| -> Result<Vec<u8>> {
            container
                .entry(&path)
                .map(|entry| entry.bytes.clone())
                .with_context(|| format!("Missing {}", path))
        };

        Ok(Self {
            geometry: required(Folder::Geometry.path(GEOMETRY_FILE))?,
            photometry: container
                .entry(&Folder::Photometry.path(PHOTOMETRY_FILE))
                .map(|entry| entry.bytes.clone()),
            image: required(Folder::Image.path(IMAGE_FILE))?,
        })
    }

    pub fn from_files(geometry: &Path, photometry: Option<&Path>, image: &Path) -> Result<Self> {
        let read = |path: &Path| {
            fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
        };
        Ok(Self {
            geometry: read(geometry)?,
            photometry: photometry.map(read).transpose()?,
            image: read(image)?,
        })
    }
}

/// One LED light source of the series.
#[derive(Debug, Clone, PartialEq)]
pub struct LedLightSource {
    pub wattage: u32,
    pub cct: u32,
    pub lumens: u64,
    pub metrics: ColorMetrics,
}

impl LedLightSource {
    pub fn new(wattage: u32, cct: u32) -> Self {
        Self {
            wattage,
            cct,
            lumens: led_rated_lumens(wattage),
            metrics: ColorMetrics::from_cct(cct),
        }
    }

    pub fn id(&self) -> String {
        format!("led_{}W_{}K", self.wattage, self.cct)
    }

    pub fn emitter_id(&self) -> String {
        format!("emitter_{}", self.id())
    }

    /// Rendering index written into the light source: cooler modules are
    /// offered at CRI 80, warmer ones at CRI 90.
    pub fn cri(&self) -> u32 {
        if self.cct >= 5000 {
            80
        } else {
            90
        }
    }

    fn color(&self, with_melanopic: bool) -> ColorInformation {
        let mut color = ColorInformation::from_metrics(&self.metrics, with_melanopic);
        color.color_rendering_index = Some(self.cri());
        color
    }
}

/// Light sources over `wattages` x [`CCTS`], wattage-major.
pub fn light_sources(wattages: &[u32]) -> Vec<LedLightSource> {
    wattages
        .iter()
        .flat_map(|&w| {
            CCTS.iter().map(move |&cct| LedLightSource::new(w, cct))
        })
        .collect()
}

fn photometry_id(cct: u32) -> String {
    format!("photometry_{}K", cct)
}

fn spectrum_id(cct: u32) -> String {
    format!("spectrum_{}K", cct)
}

/// Archive name of the TM-33 file for one CCT.
pub fn tm33_file_name(profile: &LuminaireProfile, cct: u32) -> String {
    format!("{}_{}K.{}", profile.series, cct, tm33::FILE_EXTENSION)
}

/// The GA15 series as document compositions.
#[derive(Debug, Clone)]
pub struct LuminaireSeries {
    pub profile: LuminaireProfile,
    pub author: String,
    /// Header creation time and TM-33 report date
    pub creation_time: DateTime<Utc>,
}

impl Default for LuminaireSeries {
    fn default() -> Self {
        Self {
            profile: LuminaireProfile::default(),
            author: "astral-gldf".to_string(),
            creation_time: Utc
                .with_ymd_and_hms(2024, 1, 15, 0, 0, 0)
                .single()
                .unwrap_or_default(),
        }
    }
}

impl LuminaireSeries {
    fn report_date(&self) -> NaiveDate {
        self.creation_time.date_naive()
    }

    fn header(&self, application: &str, unique_id: &str) -> DocumentHeader {
        DocumentHeader {
            author: self.author.clone(),
            manufacturer: self.profile.manufacturer.clone(),
            created_with_application: application.to_string(),
            creation_time: self.creation_time,
            unique_id: unique_id.to_string(),
        }
    }

    /// Shared-base composition: one photometry and geometry for every variant.
    pub fn compose_shared(&self) -> Result<ProductDocument> {
        let series = &self.profile.series;
        let sources = light_sources(&WATTAGES);

        let mut builder = ProductDocumentBuilder::new(
            self.header("gldf-rs variant demo", "aec-ga15-enriched-variants"),
        )
        .file(FileDefinition::new(
            "geometry_file",
            ContentType::L3d,
            GEOMETRY_FILE,
        ))
        .file(FileDefinition::new(
            "photometry_file",
            ContentType::Eulumdat,
            PHOTOMETRY_FILE,
        ))
        .file(FileDefinition::new(
            "image_file",
            ContentType::Jpeg,
            IMAGE_FILE,
        ))
        .photometry(PhotometryDefinition {
            id: "photometry".to_string(),
            file_id: "photometry_file".to_string(),
        })
        .geometry(GeometryDefinition {
            id: "geometry".to_string(),
            file_id: "geometry_file".to_string(),
            level_of_detail: "High".to_string(),
        });

        for source in &sources {
            builder = builder
                .light_source(LightSourceDefinition {
                    id: source.id(),
                    name: format!(
                        "LED {}W {}K CRI{}",
                        source.wattage,
                        source.cct,
                        source.cri()
                    ),
                    description: None,
                    rated_input_power: f64::from(source.wattage),
                    rated_luminous_flux: Some(source.lumens),
                    spectrum_id: None,
                    color: source.color(false),
                })
                .emitter(EmitterDefinition {
                    id: source.emitter_id(),
                    name: format!("LED Module {}W {}K", source.wattage, source.cct),
                    photometry_id: "photometry".to_string(),
                    light_source_id: source.id(),
                    light_source_count: Some(1),
                    rated_luminous_flux: Some(source.lumens),
                });
        }

        let mut index = 0;
        for &length in &LENGTHS_MM {
            for optic in OPTICS {
                for (ral, color_name) in HOUSING_COLORS {
                    for source in sources.iter().take(SHARED_VARIANT_LIGHT_SOURCES) {
                        index += 1;
                        let optic_code = optic.chars().next().unwrap_or('X');
                        let mut variant = VariantDefinition::new(
                            format!("variant_{}", index),
                            format!(
                                "{} {}mm {} {}K {}W {}",
                                series, length, optic, source.cct, source.wattage, color_name
                            ),
                        );
                        variant.product_number = Some(format!(
                            "{}-{}-{}-{}K-{}W-{}",
                            series, length, optic_code, source.cct, source.wattage, ral
                        ));
                        variant.geometry = Some(VariantGeometry::Model {
                            geometry_id: "geometry".to_string(),
                            emitter_id: source.emitter_id(),
                            external_name: LEO_NAME.to_string(),
                        });
                        variant.mechanical = Some(Mechanical {
                            length_mm: length,
                            width_mm: 120,
                            height_mm: 80,
                            weight_kg: Some(2.0 + f64::from(length) / 1000.0 * 1.5),
                        });
                        variant.electrical = Some(self.electrical());
                        variant.housing_color = Some(HousingColor {
                            ral: ral.trim_start_matches("RAL").to_string(),
                            name: color_name.to_string(),
                        });
                        builder = builder.variant(variant);
                    }
                }
            }
        }

        builder = builder.metadata(ProductMetaData {
            unique_product_id: "aec-ga15-series".to_string(),
            product_number: format!("{} Series", series),
            name: format!("{} Industrial LED Luminaire", series),
            description: format!(
                "{} {} lengths, {} optics, {} colours, {} wattages and {} CCTs on a shared base photometry",
                series,
                LENGTHS_MM.len(),
                OPTICS.len(),
                HOUSING_COLORS.len(),
                WATTAGES.len(),
                CCTS.len()
            ),
            custom_properties: vec![CustomProperty::new("composition", "shared")],
        });

        builder
            .build()
            .context("Shared series document failed validation")
    }

    /// Per-CCT composition: every CCT gets its own TM-33 photometry and
    /// spectrum.
    pub fn compose_spectral(&self) -> Result<ProductDocument> {
        let series = &self.profile.series;
        let sources = light_sources(&WATTAGES[..SPECTRAL_WATTAGES]);

        let mut builder = ProductDocumentBuilder::new(
            self.header("gldf-rs TM-33 demo", "aec-ga15-tm33-spectral"),
        )
        .file(FileDefinition::new(
            "geometry_file",
            ContentType::L3d,
            GEOMETRY_FILE,
        ))
        .file(FileDefinition::new(
            "image_file",
            ContentType::Jpeg,
            IMAGE_FILE,
        ))
        .geometry(GeometryDefinition {
            id: "geometry".to_string(),
            file_id: "geometry_file".to_string(),
            level_of_detail: "High".to_string(),
        });

        for &cct in &CCTS {
            let file_id = photometry_id(cct);
            builder = builder
                .file(FileDefinition::new(
                    &file_id,
                    ContentType::IesXml,
                    tm33_file_name(&self.profile, cct),
                ))
                .photometry(PhotometryDefinition {
                    id: photometry_id(cct),
                    file_id: file_id.clone(),
                })
                .spectrum(SpectrumDefinition {
                    id: spectrum_id(cct),
                    file_id,
                    samples: SpectralCurve::led(cct).samples().to_vec(),
                });
        }

        for source in &sources {
            builder = builder
                .light_source(LightSourceDefinition {
                    id: source.id(),
                    name: format!(
                        "LED {}W {}K Rf{}",
                        source.wattage, source.cct, source.metrics.rf
                    ),
                    description: None,
                    rated_input_power: f64::from(source.wattage),
                    rated_luminous_flux: Some(source.lumens),
                    spectrum_id: Some(spectrum_id(source.cct)),
                    color: source.color(true),
                })
                .emitter(EmitterDefinition {
                    id: source.emitter_id(),
                    name: format!("LED Module {}W {}K", source.wattage, source.cct),
                    photometry_id: photometry_id(source.cct),
                    light_source_id: source.id(),
                    light_source_count: Some(1),
                    rated_luminous_flux: Some(source.lumens),
                });
        }

        let mut index = 0;
        for &length in &LENGTHS_MM[..SPECTRAL_LENGTHS] {
            for source in &sources {
                index += 1;
                let mut variant = VariantDefinition::new(
                    format!("variant_{}", index),
                    format!(
                        "{} {}mm {}K {}W",
                        series,
                        length,
                        source.cct,
                        source.wattage
                    ),
                );
                variant.product_number = Some(format!(
                    "{}-{}-{}K-{}W",
                    series, length, source.cct, source.wattage
                ));
                variant.geometry = Some(VariantGeometry::Model {
                    geometry_id: "geometry".to_string(),
                    emitter_id: source.emitter_id(),
                    external_name: LEO_NAME.to_string(),
                });
                variant.mechanical = Some(Mechanical {
                    length_mm: length,
                    width_mm: 120,
                    height_mm: 80,
                    weight_kg: None,
                });
                variant.electrical = Some(self.electrical());
                builder = builder.variant(variant);
            }
        }

        builder = builder.metadata(ProductMetaData {
            unique_product_id: "aec-ga15-tm33".to_string(),
            product_number: format!("{} Series (TM-33)", series),
            name: format!("{} Industrial LED - IES TM-33 Demo", series),
            description: format!(
                "{} with one TM-33 photometry and spectrum per CCT ({} CCTs)",
                series,
                CCTS.len()
            ),
            custom_properties: vec![
                CustomProperty::new("composition", "spectral"),
                CustomProperty::new("default_emitter_view", "spectral"),
            ],
        });

        builder
            .build()
            .context("Spectral series document failed validation")
    }

    /// TM-33 payloads of the spectral mode, keyed by archive file name.
    pub fn tm33_files(&self) -> Result<Vec<(String, String)>> {
        CCTS.iter()
            .map(|&cct| {
                let record = PhotometricRecord::for_led_module(
                    cct,
                    TM33_WATTAGE,
                    &self.profile,
                    self.report_date(),
                );
                let xml = tm33::serialize(&record)
                    .with_context(|| format!("Failed to serialize TM-33 for {}K", cct))?;
                Ok((tm33_file_name(&self.profile, cct), xml))
            })
            .collect()
    }

    pub fn package_shared(&self, assets: &BaseAssets) -> Result<Container> {
        let Some(ref photometry) = assets.photometry else {
            bail!(
                "Shared composition needs a base photometry ({})",
                PHOTOMETRY_FILE
            );
        };
        let document = self.compose_shared()?;

        let mut container = Container::from_document(&document)?;
        container.add_entry(Folder::Geometry, GEOMETRY_FILE, assets.geometry.clone())?;
        container.add_entry(Folder::Photometry, PHOTOMETRY_FILE, photometry.clone())?;
        container.add_entry(Folder::Image, IMAGE_FILE, assets.image.clone())?;
        Ok(container)
    }

    pub fn package_spectral(&self, assets: &BaseAssets) -> Result<Container> {
        let document = self.compose_spectral()?;

        let mut container = Container::from_document(&document)?;
        container.add_entry(Folder::Geometry, GEOMETRY_FILE, assets.geometry.clone())?;
        container.add_entry(Folder::Image, IMAGE_FILE, assets.image.clone())?;
        for (name, xml) in self.tm33_files()? {
            container.add_entry(Folder::Photometry, &name, xml.into_bytes())?;
        }
        Ok(container)
    }

    fn electrical(&self) -> Electrical {
        Electrical {
            safety_class: "ClassI".to_string(),
            ip_code: "IP66".to_string(),
            power_factor: self.profile.power_factor,
            constant_light_output: true,
        }
    }
}

/// Writes the requested series archives into `output_dir`.
pub fn run_series(
    series: &LuminaireSeries,
    assets: &BaseAssets,
    mode: LuminaireMode,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    if mode.includes_shared() {
        let path = output_dir.join(SHARED_OUTPUT_FILE);
        let container = series.package_shared(assets)?;
        container
            .write_file(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }

    if mode.includes_spectral() {
        let path = output_dir.join(SPECTRAL_OUTPUT_FILE);
        let container = series.package_spectral(assets)?;
        container
            .write_file(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }

    info!(
        "Luminaire series ({} mode): {} archives written",
        mode,
        written.len()
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn assets() -> BaseAssets {
        BaseAssets {
            geometry: b"l3d-geometry".to_vec(),
            photometry: Some(b"EULUMDAT".to_vec()),
            image: vec![0xFF, 0xD8, 0xFF, 0xE0],
        }
    }

    #[test]
    fn test_shared_composition_counts() {
        let document = LuminaireSeries::default().compose_shared().unwrap();
        assert_eq!(document.light_sources().len(), 30);
        assert_eq!(document.emitters().len(), 30);
        assert_eq!(document.photometries().len(), 1);
        assert_eq!(document.variants().len(), 600);
        assert!(document
            .emitters()
            .iter()
            .all(|e| e.photometry_id == "photometry"));
    }

    #[test]
    fn test_shared_variant_fields() {
        let document = LuminaireSeries::default().compose_shared().unwrap();
        let first = &document.variants()[0];
        assert_eq!(first.id, "variant_1");
        assert_eq!(
            first.product_number.as_deref(),
            Some("GA15-600-N-3000K-30W-RAL9003")
        );
        assert_eq!(first.name, "GA15 600mm Narrow 3000K 30W White");
        assert_eq!(first.housing_color.as_ref().unwrap().ral, "9003");
        let weight = first.mechanical.unwrap().weight_kg.unwrap();
        assert!((weight - 2.9).abs() < 1e-9);
    }

    #[test]
    fn test_light_source_cri_split() {
        let document = LuminaireSeries::default().compose_shared().unwrap();
        for source in document.light_sources() {
            let expected = if source.color.cct >= 5000 { 80 } else { 90 };
            assert_eq!(source.color.color_rendering_index, Some(expected));
            assert!(source.color.melanopic_factor.is_none());
        }
    }

    #[test]
    fn test_spectral_composition_counts() {
        let document = LuminaireSeries::default().compose_spectral().unwrap();
        assert_eq!(document.photometries().len(), 5);
        assert_eq!(document.spectrums().len(), 5);
        assert_eq!(document.light_sources().len(), 15);
        assert_eq!(document.variants().len(), 30);
        assert!(document.spectrums().iter().all(|s| s.samples.len() == 81));

        let emitter = document
            .emitters()
            .iter()
            .find(|e| e.id == "emitter_led_50W_4000K")
            .unwrap();
        assert_eq!(emitter.photometry_id, "photometry_4000K");
        assert!(document
            .light_sources()
            .iter()
            .all(|ls| ls.color.melanopic_factor.is_some()));
    }

    #[test]
    fn test_package_spectral_layout() {
        let container = LuminaireSeries::default()
            .package_spectral(&assets())
            .unwrap();
        // product.xml + geometry + image + 5 TM-33 files
        assert_eq!(container.len(), 8);
        assert!(container.entry("ldc/GA15_5000K.iesxml").is_some());
        assert!(container.entry("ldc/photometry.ldt").is_none());
    }

    #[test]
    fn test_package_shared_requires_base_photometry() {
        let mut assets = assets();
        assets.photometry = None;
        let err = LuminaireSeries::default()
            .package_shared(&assets)
            .unwrap_err();
        assert!(err.to_string().contains("photometry.ldt"));
    }

    #[test]
    fn test_base_assets_from_archive() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("base.gldf");
        let shared = LuminaireSeries::default()
            .package_shared(&assets())
            .unwrap();
        shared.write_file(&path).unwrap();

        let read_back = BaseAssets::from_archive(&path).unwrap();
        assert_eq!(read_back, assets());
    }

    #[test]
    fn test_run_series_both_modes() {
        let dir = tempdir().unwrap();
        let written = run_series(
            &LuminaireSeries::default(),
            &assets(),
            LuminaireMode::Both,
            dir.path(),
        )
        .unwrap();
        assert_eq!(
            written,
            vec![
                dir.path().join(SHARED_OUTPUT_FILE),
                dir.path().join(SPECTRAL_OUTPUT_FILE)
            ]
        );
        assert!(written.iter().all(|p| p.exists()));
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!(
            "Spectral".parse::<LuminaireMode>(),
            Ok(LuminaireMode::Spectral)
        );
        assert_eq!(LuminaireMode::Both.to_string(), "both");
        assert!("all".parse::<LuminaireMode>().is_err());
    }
}
