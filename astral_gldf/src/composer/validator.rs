//! Reference integrity validation for product documents.
//!
//! Checks that identifiers are unique within their section and that every
//! reference field names an identifier defined elsewhere in the same
//! document. Duplicates and dangling references are errors; files nothing
//! refers to are only warnings.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::document::ProductDocument;

/// Validation outcome with categorized issues and statistics.
///
/// Errors make `is_valid` false, warnings are informational.
///
/// # Fields
///
/// * `is_valid` - `false` if any errors were found, `true` otherwise
/// * `errors` - Duplicate ids and dangling references
/// * `warnings` - Non-fatal issues such as unreferenced files
/// * `stats` - Entity and issue counts
///
/// # Examples
///
/// ```
/// use astral_gldf::composer::validator::ValidationResult;
///
/// let mut result = ValidationResult::new();
/// assert!(result.is_valid);
///
/// result.add_error("Emitter e1 references unknown photometry p9".to_string());
/// assert!(!result.is_valid);
/// assert_eq!(result.errors.len(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub stats: ValidationStats,
}

/// Counts gathered during validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationStats {
    pub files: usize,
    pub photometries: usize,
    pub spectrums: usize,
    pub light_sources: usize,
    pub emitters: usize,
    pub geometries: usize,
    pub variants: usize,
    pub duplicate_ids: usize,
    pub dangling_references: usize,
    pub unreferenced_files: usize,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            stats: ValidationStats::default(),
        }
    }

    /// Adds an error and marks the result as invalid.
    pub fn add_error(&mut self, error: String) {
        self.is_valid = false;
        self.errors.push(error);
    }

    /// Adds a warning without invalidating the result.
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Validator for composed product documents.
pub struct DocumentValidator;

impl DocumentValidator {
    /// Validates every section of `document`.
    ///
    /// Reference rules:
    ///
    /// - photometry → file
    /// - spectrum → file
    /// - light source → spectrum (when present)
    /// - emitter → photometry and light source
    /// - geometry → file
    /// - variant → geometry (when present) and emitter
    ///
    /// # Returns
    ///
    /// `ValidationResult` with all errors, warnings and statistics.
    pub fn validate(document: &ProductDocument) -> ValidationResult {
        let mut result = ValidationResult::new();

        let stats = &mut result.stats;
        stats.files = document.files().len();
        stats.photometries = document.photometries().len();
        stats.spectrums = document.spectrums().len();
        stats.light_sources = document.light_sources().len();
        stats.emitters = document.emitters().len();
        stats.geometries = document.geometries().len();
        stats.variants = document.variants().len();

        // Step 1: unique ids per section
        let file_ids = Self::collect_ids(
            "File",
            document.files().iter().map(|f| f.id.as_str()),
            &mut result,
        );
        let photometry_ids = Self::collect_ids(
            "Photometry",
            document.photometries().iter().map(|p| p.id.as_str()),
            &mut result,
        );
        let spectrum_ids = Self::collect_ids(
            "Spectrum",
            document.spectrums().iter().map(|s| s.id.as_str()),
            &mut result,
        );
        let light_source_ids = Self::collect_ids(
            "LightSource",
            document.light_sources().iter().map(|l| l.id.as_str()),
            &mut result,
        );
        let emitter_ids = Self::collect_ids(
            "Emitter",
            document.emitters().iter().map(|e| e.id.as_str()),
            &mut result,
        );
        let geometry_ids = Self::collect_ids(
            "Geometry",
            document.geometries().iter().map(|g| g.id.as_str()),
            &mut result,
        );
        Self::collect_ids(
            "Variant",
            document.variants().iter().map(|v| v.id.as_str()),
            &mut result,
        );

        // Step 2: references
        let mut referenced_files: HashSet<&str> = HashSet::new();

        for photometry in document.photometries() {
            referenced_files.insert(&photometry.file_id);
            Self::check_reference(
                &file_ids,
                "Photometry",
                &photometry.id,
                "file",
                &photometry.file_id,
                &mut result,
            );
        }

        for spectrum in document.spectrums() {
            referenced_files.insert(&spectrum.file_id);
            Self::check_reference(
                &file_ids,
                "Spectrum",
                &spectrum.id,
                "file",
                &spectrum.file_id,
                &mut result,
            );
        }

        for light_source in document.light_sources() {
            if let Some(ref spectrum_id) = light_source.spectrum_id {
                Self::check_reference(
                    &spectrum_ids,
                    "LightSource",
                    &light_source.id,
                    "spectrum",
                    spectrum_id,
                    &mut result,
                );
            }
        }

        for emitter in document.emitters() {
            Self::check_reference(
                &photometry_ids,
                "Emitter",
                &emitter.id,
                "photometry",
                &emitter.photometry_id,
                &mut result,
            );
            Self::check_reference(
                &light_source_ids,
                "Emitter",
                &emitter.id,
                "light source",
                &emitter.light_source_id,
                &mut result,
            );
        }

        for geometry in document.geometries() {
            referenced_files.insert(&geometry.file_id);
            Self::check_reference(
                &file_ids,
                "Geometry",
                &geometry.id,
                "file",
                &geometry.file_id,
                &mut result,
            );
        }

        for variant in document.variants() {
            if let Some(ref geometry) = variant.geometry {
                if let Some(geometry_id) = geometry.geometry_id() {
                    Self::check_reference(
                        &geometry_ids,
                        "Variant",
                        &variant.id,
                        "geometry",
                        geometry_id,
                        &mut result,
                    );
                }
                Self::check_reference(
                    &emitter_ids,
                    "Variant",
                    &variant.id,
                    "emitter",
                    geometry.emitter_id(),
                    &mut result,
                );
            }
        }

        // Step 3: unreferenced files
        for file in document.files() {
            if !referenced_files.contains(file.id.as_str()) {
                result.stats.unreferenced_files += 1;
                result.add_warning(format!(
                    "File {} ({}) is not referenced by any definition",
                    file.id, file.file_name
                ));
            }
        }

        result
    }

    fn collect_ids<'a, I>(section: &str, ids: I, result: &mut ValidationResult) -> HashSet<&'a str>
    where
        I: Iterator<Item = &'a str>,
    {
        let mut seen = HashSet::new();
        for id in ids {
            if id.is_empty() {
                result.add_error(format!("{} with empty id", section));
            } else if !seen.insert(id) {
                result.stats.duplicate_ids += 1;
                result.add_error(format!("Duplicate {} id: {}", section, id));
            }
        }
        seen
    }

    fn check_reference(
        known: &HashSet<&str>,
        owner_kind: &str,
        owner_id: &str,
        target_kind: &str,
        target_id: &str,
        result: &mut ValidationResult,
    ) {
        if !known.contains(target_id) {
            result.stats.dangling_references += 1;
            result.add_error(format!(
                "{} {} references unknown {} {}",
                owner_kind, owner_id, target_kind, target_id
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::document::*;
    use chrono::{TimeZone, Utc};

    fn header() -> DocumentHeader {
        DocumentHeader {
            author: "tester".to_string(),
            manufacturer: "Astral Sky Demo".to_string(),
            created_with_application: "astral-gldf".to_string(),
            creation_time: Utc.with_ymd_and_hms(2025, 1, 15, 21, 0, 0).unwrap(),
            unique_id: "test-doc".to_string(),
        }
    }

    fn light_source(id: &str) -> LightSourceDefinition {
        LightSourceDefinition {
            id: id.to_string(),
            name: id.to_string(),
            description: None,
            rated_input_power: 0.0,
            rated_luminous_flux: None,
            spectrum_id: None,
            color: ColorInformation::cct_only(5500),
        }
    }

    fn emitter(id: &str, photometry: &str, light_source: &str) -> EmitterDefinition {
        EmitterDefinition {
            id: id.to_string(),
            name: id.to_string(),
            photometry_id: photometry.to_string(),
            light_source_id: light_source.to_string(),
            light_source_count: None,
            rated_luminous_flux: None,
        }
    }

    fn consistent_builder() -> ProductDocumentBuilder {
        ProductDocumentBuilder::new(header())
            .file(FileDefinition::new(
                "file_vega",
                ContentType::IesXml,
                "vega.iesxml",
            ))
            .photometry(PhotometryDefinition {
                id: "photometry_vega".to_string(),
                file_id: "file_vega".to_string(),
            })
            .light_source(light_source("lightsource_vega"))
            .emitter(emitter(
                "emitter_vega",
                "photometry_vega",
                "lightsource_vega",
            ))
            .variant(VariantDefinition {
                geometry: Some(VariantGeometry::Emitter {
                    emitter_id: "emitter_vega".to_string(),
                }),
                ..VariantDefinition::new("variant_vega", "Vega")
            })
    }

    #[test]
    fn test_consistent_document_is_valid() {
        let result = consistent_builder().validate();
        assert!(result.is_valid, "{:?}", result.errors);
        assert_eq!(result.stats.emitters, 1);
        assert_eq!(result.stats.dangling_references, 0);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_dangling_photometry_reference() {
        let result = consistent_builder()
            .emitter(emitter(
                "emitter_ghost",
                "photometry_missing",
                "lightsource_vega",
            ))
            .validate();
        assert!(!result.is_valid);
        assert_eq!(result.stats.dangling_references, 1);
        assert!(result.errors[0].contains("photometry_missing"));
    }

    #[test]
    fn test_duplicate_ids() {
        let result = consistent_builder()
            .light_source(light_source("lightsource_vega"))
            .validate();
        assert!(!result.is_valid);
        assert_eq!(result.stats.duplicate_ids, 1);
    }

    #[test]
    fn test_variant_geometry_must_exist() {
        let result = consistent_builder()
            .variant(VariantDefinition {
                geometry: Some(VariantGeometry::Model {
                    geometry_id: "geometry".to_string(),
                    emitter_id: "emitter_vega".to_string(),
                    external_name: "LEO".to_string(),
                }),
                ..VariantDefinition::new("variant_2", "With model")
            })
            .validate();
        assert!(!result.is_valid);
        assert!(result
            .errors
            .iter()
            .any(|e| e.contains("unknown geometry geometry")));
    }

    #[test]
    fn test_spectrum_reference_and_unreferenced_file() {
        let mut source = light_source("lightsource_3000k");
        source.spectrum_id = Some("spectrum_3000K".to_string());

        let result = consistent_builder()
            .file(FileDefinition::new(
                "image_file",
                ContentType::Jpeg,
                "product.jpg",
            ))
            .light_source(source)
            .validate();

        assert!(!result.is_valid);
        assert_eq!(result.stats.unreferenced_files, 1);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.errors[0].contains("spectrum_3000K"));
    }
}
