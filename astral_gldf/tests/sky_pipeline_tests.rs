//! End-to-end tests for the night sky pipeline.
//!
//! Every run uses a fixed instant, so archives must be reproducible byte for
//! byte and the visible subset of the bright star table must not change.

use std::fs;

use astral_gldf::core::tables::BRIGHT_STARS;
use astral_gldf::formats::SkySummary;
use astral_gldf::io::loaders::{CatalogLoader, CATALOG_FILE_NAME};
use astral_gldf::pipeline::{SkyPipeline, SkyPipelineConfig};
use astral_gldf::transformations::EphemerisStrategy;
use tempfile::tempdir;

mod support;

use support::{fallback_sky_pipeline, sky_request};

#[test]
fn test_fallback_sky_is_a_strict_nonempty_subset() {
    let dir = tempdir().unwrap();
    let run = fallback_sky_pipeline(dir.path())
        .run(&sky_request().with_limits(6.5, 6.5))
        .unwrap();

    assert!(run.catalog_source.is_fallback());
    assert_eq!(run.loaded, BRIGHT_STARS.len());

    let names: Vec<&str> = run
        .photometric
        .iter()
        .map(|v| v.object.name.as_str())
        .collect();
    assert!(!names.is_empty());
    assert!(names.len() < BRIGHT_STARS.len());

    // Circumpolar at 51.77N
    assert!(names.contains(&"Polaris"));
    // Never rises at 51.77N
    assert!(!names.contains(&"Canopus"));

    for visible in &run.photometric {
        assert!(visible.position.altitude_deg > 0.0);
        assert!(visible.position.altitude_deg <= 90.0);
        assert!((0.0..360.0).contains(&visible.position.azimuth_deg));
    }
}

#[test]
fn test_repeated_runs_are_identical() {
    let dir = tempdir().unwrap();
    let pipeline = fallback_sky_pipeline(dir.path());

    let first = pipeline.run(&sky_request()).unwrap();
    let second = pipeline.run(&sky_request()).unwrap();

    assert_eq!(first.photometric, second.photometric);
    assert_eq!(first.container.checksum(), second.container.checksum());
    assert_eq!(
        first.container.to_bytes().unwrap(),
        second.container.to_bytes().unwrap()
    );
}

#[test]
fn test_summary_and_star_map_payloads() {
    let dir = tempdir().unwrap();
    let run = fallback_sky_pipeline(dir.path())
        .run(&sky_request())
        .unwrap();

    let json = &run.container.entry("other/sky_data.json").unwrap().bytes;
    let summary: SkySummary = serde_json::from_slice(json).unwrap();
    assert_eq!(summary, run.summary);
    assert_eq!(summary.location.name, "Lüdinghausen");
    assert_eq!(summary.time, "2025-01-15T21:00:00+00:00");

    let lisp = String::from_utf8(
        run.container
            .entry("other/autolisp/star_sky.lsp")
            .unwrap()
            .bytes
            .clone(),
    )
    .unwrap();
    assert!(lisp.contains("(draw-star \"Polaris\""));
}

#[test]
fn test_product_xml_references_every_photometric_file() {
    let dir = tempdir().unwrap();
    let run = fallback_sky_pipeline(dir.path())
        .run(&sky_request())
        .unwrap();

    let xml = String::from_utf8(run.container.product_xml().unwrap().to_vec()).unwrap();
    for file in run.document.files() {
        assert!(xml.contains(&format!(">{}<", file.file_name)));
        let path = format!("ldc/{}", file.file_name);
        let entry = run.container.entry(&path).unwrap();
        assert!(!entry.bytes.is_empty());
    }
}

#[test]
fn test_catalog_file_takes_precedence_over_fallback() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join(CATALOG_FILE_NAME),
        "id,hip,proper,ra,dec,mag,ci,spect\n\
         11734,11767,Polaris,2.529750,89.264109,1.97,0.636,F7Ib\n\
         30365,30438,Canopus,6.399197,-52.695661,-0.62,0.164,A9II\n\
         1,,,0.5,10.0,bad,,G0\n",
    )
    .unwrap();

    let pipeline = SkyPipeline::new(
        SkyPipelineConfig {
            strategy: EphemerisStrategy::Approximate,
            ..Default::default()
        },
        CatalogLoader::new().with_data_dir(dir.path()),
    );
    let run = pipeline.run(&sky_request()).unwrap();

    assert!(!run.catalog_source.is_fallback());
    assert_eq!(run.loaded, 2);
    assert_eq!(run.photometric.len(), 1);
    assert_eq!(run.photometric[0].object.name, "Polaris");
    assert!(run.container.entry("ldc/polaris.iesxml").is_some());
}
