#![allow(dead_code)]

use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;

use astral_gldf::composer::{
    ColorInformation, ContentType, DocumentHeader, EmitterDefinition, FileDefinition,
    LightSourceDefinition, PhotometryDefinition, ProductDocumentBuilder,
};
use astral_gldf::io::loaders::CatalogLoader;
use astral_gldf::pipeline::{SkyPipeline, SkyPipelineConfig, SkyRequest};
use astral_gldf::transformations::EphemerisStrategy;
use chrono::{DateTime, TimeZone, Utc};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores variables on unwind and serializes access to process-global env
/// vars, since tests run in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

// ==================== Fixture Builders ====================

pub const OBSERVER_LAT: f64 = 51.77;
pub const OBSERVER_LNG: f64 = 7.44;

pub fn fixed_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, 21, 0, 0).unwrap()
}

pub fn sky_request() -> SkyRequest {
    SkyRequest::new("Lüdinghausen", OBSERVER_LAT, OBSERVER_LNG, fixed_instant())
}

/// Sky pipeline that reads from an empty data directory and therefore uses
/// the built-in bright star table.
pub fn fallback_sky_pipeline(empty_data_dir: &Path) -> SkyPipeline {
    SkyPipeline::new(
        SkyPipelineConfig {
            strategy: EphemerisStrategy::Approximate,
            ..Default::default()
        },
        CatalogLoader::new().with_data_dir(empty_data_dir),
    )
}

pub fn test_header(unique_id: &str) -> DocumentHeader {
    DocumentHeader {
        author: "tests".to_string(),
        manufacturer: "Test Manufacturer".to_string(),
        created_with_application: "astral-gldf tests".to_string(),
        creation_time: fixed_instant(),
        unique_id: unique_id.to_string(),
    }
}

/// A builder holding one complete file/photometry/light source/emitter chain.
pub fn minimal_builder() -> ProductDocumentBuilder {
    ProductDocumentBuilder::new(test_header("minimal"))
        .file(FileDefinition::new(
            "file_a",
            ContentType::IesXml,
            "a.iesxml",
        ))
        .photometry(PhotometryDefinition {
            id: "photometry_a".to_string(),
            file_id: "file_a".to_string(),
        })
        .light_source(LightSourceDefinition {
            id: "lightsource_a".to_string(),
            name: "A".to_string(),
            description: None,
            rated_input_power: 10.0,
            rated_luminous_flux: Some(1500),
            spectrum_id: None,
            color: ColorInformation::cct_only(4000),
        })
        .emitter(EmitterDefinition {
            id: "emitter_a".to_string(),
            name: "A".to_string(),
            photometry_id: "photometry_a".to_string(),
            light_source_id: "lightsource_a".to_string(),
            light_source_count: Some(1),
            rated_luminous_flux: Some(1500),
        })
}
