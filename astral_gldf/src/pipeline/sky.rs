//! Night sky fixture generation.
//!
//! One run turns an observer location and instant into a single archive:
//! a TM-33 file per visible star under the photometric ceiling, the product
//! document tying them together, and the auxiliary sky summary and star map
//! for every star under the (wider) summary ceiling.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

use crate::composer::{
    object_slug, ColorInformation, ContentType, CustomProperty, DocumentHeader, EmitterDefinition,
    FileDefinition, LightSourceDefinition, ObjectIds, PhotometryDefinition, ProductDocument,
    ProductDocumentBuilder, ProductMetaData, VariantDefinition, VariantGeometry,
};
use crate::config::GeneratorConfig;
use crate::core::domain::{ObserverFrame, VisibleObject};
use crate::core::tables::{SpectralTemperatureTable, SPECTRAL_TEMPERATURES};
use crate::formats::autolisp::{render_star_map, StarMapHeader};
use crate::formats::sky_json::{SkyLocation, SkySummary, SKY_DATA_PATH};
use crate::formats::tm33;
use crate::io::loaders::{CatalogLoader, CatalogSource};
use crate::packaging::{Container, FileBlob, Folder, InMemoryBlob};
use crate::radiometry::record::PhotometricRecord;
use crate::radiometry::temperature::object_temperature;
use crate::transformations::horizon::{select_transform, visible_objects, EphemerisStrategy};

/// Application name written into the document header.
pub const APPLICATION_NAME: &str = "astral-gldf";

/// Archive path (under `other/`) of the AutoLISP star map.
pub const STAR_MAP_PATH: &str = "autolisp/star_sky.lsp";

/// Manifest file that marks a viewer directory.
pub const VIEWER_MANIFEST: &str = "manifest.json";

/// Observer and ceilings of one sky run.
#[derive(Debug, Clone, PartialEq)]
pub struct SkyRequest {
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub instant: DateTime<Utc>,
    /// Stars at or below this magnitude get a TM-33 file and a variant
    pub photometric_magnitude_limit: f64,
    /// Stars at or below this magnitude go into the summary and star map
    pub summary_magnitude_limit: f64,
}

impl SkyRequest {
    pub fn new(
        location: impl Into<String>,
        latitude: f64,
        longitude: f64,
        instant: DateTime<Utc>,
    ) -> Self {
        Self {
            location: location.into(),
            latitude,
            longitude,
            instant,
            photometric_magnitude_limit: 4.0,
            summary_magnitude_limit: 6.5,
        }
    }

    pub fn with_limits(mut self, photometric: f64, summary: f64) -> Self {
        self.photometric_magnitude_limit = photometric;
        self.summary_magnitude_limit = summary;
        self
    }

    /// Observer settings and instant from a config; `None` when the config
    /// has no fixed instant.
    pub fn from_config(config: &GeneratorConfig) -> Result<Option<Self>> {
        let instant = config.observation_instant()?;
        Ok(instant.map(|instant| {
            Self::new(
                config.observer.location.clone(),
                config.observer.latitude,
                config.observer.longitude,
                instant,
            )
            .with_limits(
                config.catalog.photometric_magnitude_limit,
                config.catalog.summary_magnitude_limit,
            )
        }))
    }

    pub fn observer(&self) -> ObserverFrame {
        ObserverFrame::new(self.latitude, self.longitude, self.instant)
    }

    /// Ceiling used for the single catalog read.
    pub fn load_limit(&self) -> f64 {
        self.photometric_magnitude_limit
            .max(self.summary_magnitude_limit)
    }

    fn location_id(&self) -> String {
        self.location.to_lowercase().replace(' ', "-")
    }
}

/// Document identity and transform choice of the sky pipeline.
#[derive(Debug, Clone)]
pub struct SkyPipelineConfig {
    pub author: String,
    pub manufacturer: String,
    pub strategy: EphemerisStrategy,
    /// Embedded viewers to pass through, if any
    pub viewer_dir: Option<PathBuf>,
}

impl Default for SkyPipelineConfig {
    fn default() -> Self {
        Self {
            author: "astral-gldf".to_string(),
            manufacturer: "Astral Sky Demo".to_string(),
            strategy: EphemerisStrategy::Auto,
            viewer_dir: None,
        }
    }
}

/// Everything a sky run produced.
#[derive(Debug)]
pub struct SkyRun {
    pub container: Container,
    pub document: ProductDocument,
    /// Visible stars under the photometric ceiling
    pub photometric: Vec<VisibleObject>,
    pub summary: SkySummary,
    pub catalog_source: CatalogSource,
    pub loaded: usize,
    pub transform: &'static str,
}

/// Archive file name for a location.
///
/// # Examples
///
/// ```
/// use astral_gldf::pipeline::sky::output_file_name;
///
/// assert_eq!(output_file_name("Lüdinghausen"), "astral_sky_lüdinghausen.gldf");
/// assert_eq!(output_file_name("New York"), "astral_sky_new_york.gldf");
/// ```
pub fn output_file_name(location: &str) -> String {
    format!(
        "astral_sky_{}.gldf",
        location.to_lowercase().replace(' ', "_")
    )
}

/// Collects viewer payloads from `dir`.
///
/// Every subdirectory holding a `manifest.json` is a viewer; its files are
/// passed through as `viewer/<name>/<file>`. Subdirectories are visited in
/// name order and files sorted so the archive layout is stable.
pub fn viewer_blobs(dir: &Path) -> Result<Vec<FileBlob>> {
    let viewers = sorted_entries(dir)?
        .into_iter()
        .filter(|path| path.is_dir() && path.join(VIEWER_MANIFEST).is_file())
        .collect::<Vec<_>>();

    let mut blobs = Vec::new();
    for viewer in viewers {
        let Some(name) = viewer.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        for file in sorted_entries(&viewer)?.into_iter().filter(|p| p.is_file()) {
            if let Some(file_name) = file.file_name().and_then(|n| n.to_str()) {
                blobs.push(FileBlob::new(
                    format!("viewer/{}/{}", name, file_name),
                    &file,
                ));
            }
        }
        debug!("Embedding viewer {}", name);
    }
    Ok(blobs)
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)
        .with_context(|| {
            format!("Failed to read viewer directory {}", dir.display())
        })?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("Failed to list {}", dir.display()))?;
    entries.sort();
    Ok(entries)
}

/// Catalog to archive pipeline for one observer.
pub struct SkyPipeline {
    config: SkyPipelineConfig,
    loader: CatalogLoader,
    temperatures: &'static SpectralTemperatureTable,
}

impl SkyPipeline {
    pub fn new(config: SkyPipelineConfig, loader: CatalogLoader) -> Self {
        Self {
            config,
            loader,
            temperatures: &SPECTRAL_TEMPERATURES,
        }
    }

    /// Pipeline wired from a generator config.
    pub fn from_config(config: &GeneratorConfig) -> Self {
        let mut loader = CatalogLoader::new()
            .with_data_dir(&config.catalog.data_dir)
            .allow_fallback(config.catalog.allow_fallback);
        if let Some(ref path) = config.catalog.path {
            loader = loader.with_path(path);
        }

        Self::new(
            SkyPipelineConfig {
                author: config.output.author.clone(),
                manufacturer: config.output.manufacturer.clone(),
                strategy: config.ephemeris.strategy,
                viewer_dir: config.output.viewer_dir.clone(),
            },
            loader,
        )
    }

    pub fn with_temperatures(mut self, table: &'static SpectralTemperatureTable) -> Self {
        self.temperatures = table;
        self
    }

    /// Runs the whole pipeline in memory.
    pub fn run(&self, request: &SkyRequest) -> Result<SkyRun> {
        // Step 1: Load the catalog once at the wider ceiling
        let catalog = self
            .loader
            .load(request.load_limit())
            .context("Failed to load star catalog")?;

        // Step 2: Compute horizon positions
        let transform = select_transform(self.config.strategy);
        let observer = request.observer();
        let visible = visible_objects(&catalog.objects, &observer, transform.as_ref());
        info!(
            "{} of {} stars above the horizon ({} transform)",
            visible.len(),
            catalog.len(),
            transform.name()
        );

        // Step 3: Split by ceiling
        let photometric: Vec<VisibleObject> = visible
            .iter()
            .filter(|v| v.object.magnitude <= request.photometric_magnitude_limit)
            .cloned()
            .collect();
        let summary_set: Vec<VisibleObject> = visible
            .iter()
            .filter(|v| v.object.magnitude <= request.summary_magnitude_limit)
            .cloned()
            .collect();

        // Step 4: Photometric files
        let report_date = request.instant.date_naive();
        let mut photometric_files = Vec::with_capacity(photometric.len());
        for (index, star) in photometric.iter().enumerate() {
            let ids = ObjectIds::new(object_slug(&star.object, index));
            let record = PhotometricRecord::for_star(&star.object, self.temperatures, report_date);
            let xml = tm33::serialize(&record).with_context(|| {
                format!("Failed to serialize TM-33 for {}", star.object.name)
            })?;
            photometric_files.push((ids, xml));
        }

        // Step 5: Compose the product document
        let document = self
            .compose(request, &photometric, &photometric_files)
            .context("Failed to compose sky product document")?;

        // Step 6: Package
        let summary = SkySummary::new(
            SkyLocation {
                name: request.location.clone(),
                lat: request.latitude,
                lng: request.longitude,
            },
            &request.instant,
            &summary_set,
            self.temperatures,
        );
        let star_map = render_star_map(
            &StarMapHeader {
                location: &request.location,
                latitude_deg: request.latitude,
                longitude_deg: request.longitude,
                instant: request.instant,
            },
            &summary_set,
        );

        let mut container = Container::from_document(&document)?;
        for (ids, xml) in &photometric_files {
            container.add_entry(
                Folder::Photometry,
                &ids.file_name(),
                xml.as_bytes().to_vec(),
            )?;
        }
        container.add_blob(&InMemoryBlob::new(SKY_DATA_PATH, summary.to_json()?))?;
        container.add_blob(&InMemoryBlob::new(STAR_MAP_PATH, star_map))?;
        if let Some(ref dir) = self.config.viewer_dir {
            for blob in viewer_blobs(dir)? {
                container.add_blob(&blob)?;
            }
        }

        info!(
            "Sky run for {}: {} photometric stars, {} summary stars, {} archive entries",
            request.location,
            photometric.len(),
            summary.stars.len(),
            container.len()
        );

        Ok(SkyRun {
            container,
            document,
            photometric,
            summary,
            catalog_source: catalog.source,
            loaded: catalog.objects.len(),
            transform: transform.name(),
        })
    }

    /// Runs the pipeline and writes the archive into `output_dir`.
    pub fn run_to_file(&self, request: &SkyRequest, output_dir: &Path) -> Result<PathBuf> {
        let run = self.run(request)?;
        let path = output_dir.join(output_file_name(&request.location));
        run.container
            .write_file(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    fn compose(
        &self,
        request: &SkyRequest,
        stars: &[VisibleObject],
        files: &[(ObjectIds, String)],
    ) -> Result<ProductDocument> {
        let location_id = request.location_id();
        let mut builder = ProductDocumentBuilder::new(DocumentHeader {
            author: self.config.author.clone(),
            manufacturer: self.config.manufacturer.clone(),
            created_with_application: APPLICATION_NAME.to_string(),
            creation_time: request.instant,
            unique_id: format!("astral-sky-{}", location_id),
        });

        for (star, (ids, _)) in stars.iter().zip(files) {
            let object = &star.object;
            let position = &star.position;

            builder = builder
                .file(FileDefinition::new(
                    &ids.file,
                    ContentType::IesXml,
                    ids.file_name(),
                ))
                .photometry(PhotometryDefinition {
                    id: ids.photometry.clone(),
                    file_id: ids.file.clone(),
                })
                .light_source(LightSourceDefinition {
                    id: ids.light_source.clone(),
                    name: object.name.clone(),
                    description: Some(format!(
                        "{} star, mag {}",
                        object.spectral_type, object.magnitude
                    )),
                    rated_input_power: 0.0,
                    rated_luminous_flux: None,
                    spectrum_id: None,
                    color: ColorInformation::cct_only(object_temperature(
                        object,
                        self.temperatures,
                    )),
                })
                .emitter(EmitterDefinition {
                    id: ids.emitter.clone(),
                    name: object.name.clone(),
                    photometry_id: ids.photometry.clone(),
                    light_source_id: ids.light_source.clone(),
                    light_source_count: None,
                    rated_luminous_flux: Some(object.rated_lumens()),
                });

            let mut variant = VariantDefinition::new(&ids.variant, &object.name);
            variant.description = Some(format!(
                "Alt: {:.1}, Az: {:.1}, Mag: {}",
                position.altitude_deg, position.azimuth_deg, object.magnitude
            ));
            variant.geometry = Some(VariantGeometry::Emitter {
                emitter_id: ids.emitter.clone(),
            });
            variant.custom_properties = vec![
                CustomProperty::new("altitude", format!("{:.2}", position.altitude_deg)),
                CustomProperty::new("azimuth", format!("{:.2}", position.azimuth_deg)),
                CustomProperty::new("magnitude", object.magnitude),
                CustomProperty::new("ra", format!("{:.4}", object.ra_deg)),
                CustomProperty::new("dec", format!("{:.4}", object.dec_deg)),
                CustomProperty::new("spectral_type", &object.spectral_type),
            ];
            builder = builder.variant(variant);
        }

        builder = builder.metadata(ProductMetaData {
            unique_product_id: format!("astral-sky-{}", location_id),
            product_number: "Astral Sky".to_string(),
            name: format!("Night Sky over {}", request.location),
            description: format!(
                "Visible stars from {} ({:.2}N, {:.2}E) at {}. Contains {} stars with TM-33 spectral data.",
                request.location,
                request.latitude,
                request.longitude,
                request.instant.format("%Y-%m-%d %H:%M UTC"),
                stars.len()
            ),
            custom_properties: vec![
                CustomProperty::new("default_emitter_view", "spectral"),
                CustomProperty::new("sky_location", &request.location),
                CustomProperty::new("sky_latitude", request.latitude),
                CustomProperty::new("sky_longitude", request.longitude),
            ],
        });

        Ok(builder.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::PRODUCT_XML_PATH;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn request() -> SkyRequest {
        SkyRequest::new(
            "Lüdinghausen",
            51.77,
            7.44,
            Utc.with_ymd_and_hms(2025, 1, 15, 21, 0, 0).unwrap(),
        )
    }

    fn fallback_pipeline(data_dir: &Path) -> SkyPipeline {
        let config = SkyPipelineConfig {
            strategy: EphemerisStrategy::Approximate,
            ..Default::default()
        };
        SkyPipeline::new(config, CatalogLoader::new().with_data_dir(data_dir))
    }

    #[test]
    fn test_run_with_fallback_catalog() {
        let dir = tempdir().unwrap();
        let run = fallback_pipeline(dir.path()).run(&request()).unwrap();

        assert!(run.catalog_source.is_fallback());
        assert_eq!(run.transform, "approximate");
        assert!(!run.photometric.is_empty());
        assert!(run.photometric.len() < run.loaded);
        assert!(run
            .photometric
            .iter()
            .all(|v| v.position.altitude_deg > 0.0));

        let n = run.photometric.len();
        assert_eq!(run.document.variants().len(), n);
        assert_eq!(run.document.files().len(), n);
        // product.xml + N photometric files + summary + star map
        assert_eq!(run.container.len(), n + 3);
        assert_eq!(run.container.entries()[0].path, PRODUCT_XML_PATH);
        assert!(run.container.entry("other/sky_data.json").is_some());
        assert!(run.container.entry("other/autolisp/star_sky.lsp").is_some());
    }

    #[test]
    fn test_photometric_ceiling_is_narrower_than_summary() {
        let dir = tempdir().unwrap();
        let request = request().with_limits(1.0, 6.5);
        let run = fallback_pipeline(dir.path()).run(&request).unwrap();

        assert!(run.photometric.iter().all(|v| v.object.magnitude <= 1.0));
        assert!(run.summary.stars.len() >= run.photometric.len());
        assert!(run.summary.stars.iter().any(|s| s.mag > 1.0));
    }

    #[test]
    fn test_runs_are_byte_identical() {
        let dir = tempdir().unwrap();
        let pipeline = fallback_pipeline(dir.path());
        let first = pipeline.run(&request()).unwrap();
        let second = pipeline.run(&request()).unwrap();
        assert_eq!(
            first.container.to_bytes().unwrap(),
            second.container.to_bytes().unwrap()
        );
    }

    #[test]
    fn test_variant_properties() {
        let dir = tempdir().unwrap();
        let run = fallback_pipeline(dir.path()).run(&request()).unwrap();
        let variant = &run.document.variants()[0];
        let ids: Vec<&str> = variant
            .custom_properties
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(
            ids,
            vec![
                "altitude",
                "azimuth",
                "magnitude",
                "ra",
                "dec",
                "spectral_type",
            ]
        );
        assert_eq!(run.document.metadata().custom_properties.len(), 4);
        assert_eq!(run.document.header().creation_time, request().instant);
    }

    #[test]
    fn test_viewer_passthrough() {
        let data = tempdir().unwrap();
        let viewers = tempdir().unwrap();
        let globe = viewers.path().join("globe");
        fs::create_dir(&globe).unwrap();
        fs::write(globe.join(VIEWER_MANIFEST), b"{\"name\":\"globe\"}").unwrap();
        fs::write(globe.join("viewer.wasm"), [0u8, 97, 115, 109]).unwrap();
        // No manifest, not a viewer
        fs::create_dir(viewers.path().join("scratch")).unwrap();
        fs::write(viewers.path().join("scratch").join("notes.txt"), b"x").unwrap();

        let mut pipeline = fallback_pipeline(data.path());
        pipeline.config.viewer_dir = Some(viewers.path().to_path_buf());
        let run = pipeline.run(&request()).unwrap();

        let container = &run.container;
        let wasm = container.entry("other/viewer/globe/viewer.wasm").unwrap();
        assert_eq!(wasm.bytes, vec![0u8, 97, 115, 109]);
        assert!(container.entry("other/viewer/globe/manifest.json").is_some());
        assert!(container.entry("other/viewer/scratch/notes.txt").is_none());
    }

    #[test]
    fn test_run_to_file() {
        let data = tempdir().unwrap();
        let out = tempdir().unwrap();
        let path = fallback_pipeline(data.path())
            .run_to_file(&request(), out.path())
            .unwrap();
        assert_eq!(path, out.path().join("astral_sky_lüdinghausen.gldf"));

        let read_back = Container::read_archive(&path).unwrap();
        assert!(read_back.product_xml().is_some());
    }

    #[test]
    fn test_missing_catalog_without_fallback_fails() {
        let dir = tempdir().unwrap();
        let pipeline = SkyPipeline::new(
            SkyPipelineConfig::default(),
            CatalogLoader::new()
                .with_data_dir(dir.path())
                .allow_fallback(false),
        );
        let err = pipeline.run(&request()).unwrap_err();
        assert!(format!("{:#}", err).contains("hygdata_v42.csv"));
    }
}
