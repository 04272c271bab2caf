//! Product document model and builder.
//!
//! A [`ProductDocument`] is assembled section by section through a
//! [`ProductDocumentBuilder`]. `build()` runs the integrity check and only
//! hands out a document whose references all resolve; the result is
//! read-only.

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::validator::{DocumentValidator, ValidationResult};
use crate::error::{ErrorContext, FixtureError, FixtureResult};
use crate::radiometry::color::ColorMetrics;
use crate::radiometry::spectrum::SpectralSample;

/// Content type of a referenced file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentType {
    /// TM-33 photometric file (`ldc/iesxml`)
    IesXml,
    /// EULUMDAT photometric file (`ldc/eulumdat`)
    Eulumdat,
    /// L3D geometry (`geometry/l3d`)
    L3d,
    /// JPEG image (`image/jpg`)
    Jpeg,
    /// Anything else, written verbatim
    Other(String),
}

impl ContentType {
    pub fn as_str(&self) -> &str {
        match self {
            ContentType::IesXml => "ldc/iesxml",
            ContentType::Eulumdat => "ldc/eulumdat",
            ContentType::L3d => "geometry/l3d",
            ContentType::Jpeg => "image/jpg",
            ContentType::Other(value) => value,
        }
    }
}

/// Header section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentHeader {
    pub author: String,
    pub manufacturer: String,
    pub created_with_application: String,
    pub creation_time: DateTime<Utc>,
    pub unique_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileDefinition {
    pub id: String,
    pub content_type: ContentType,
    pub file_name: String,
}

impl FileDefinition {
    pub fn new(
        id: impl Into<String>,
        content_type: ContentType,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            content_type,
            file_name: file_name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotometryDefinition {
    pub id: String,
    pub file_id: String,
}

/// Spectrum with a file reference and an inline copy of its samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrumDefinition {
    pub id: String,
    pub file_id: String,
    pub samples: Vec<SpectralSample>,
}

/// `ColorInformation` block of a fixed light source.
///
/// Everything except the CCT is optional; star light sources carry the CCT
/// only.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ColorInformation {
    pub color_rendering_index: Option<u32>,
    pub cct: u32,
    pub chromaticity: Option<(f64, f64)>,
    pub tm30: Option<(i32, i32)>,
    pub melanopic_factor: Option<f64>,
}

impl ColorInformation {
    /// CCT only.
    pub fn cct_only(cct: u32) -> Self {
        Self {
            cct,
            ..Default::default()
        }
    }

    /// Full block from computed metrics; the melanopic factor is opt-in.
    pub fn from_metrics(metrics: &ColorMetrics, with_melanopic: bool) -> Self {
        Self {
            color_rendering_index: Some(metrics.cri),
            cct: metrics.cct,
            chromaticity: Some((metrics.x, metrics.y)),
            tm30: Some((metrics.rf, metrics.rg)),
            melanopic_factor: with_melanopic.then_some(metrics.melanopic_factor),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightSourceDefinition {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub rated_input_power: f64,
    pub rated_luminous_flux: Option<u64>,
    pub spectrum_id: Option<String>,
    pub color: ColorInformation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmitterDefinition {
    pub id: String,
    pub name: String,
    pub photometry_id: String,
    pub light_source_id: String,
    pub light_source_count: Option<u32>,
    pub rated_luminous_flux: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryDefinition {
    pub id: String,
    pub file_id: String,
    pub level_of_detail: String,
}

/// `id`/value pair rendered under `CustomProperties`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomProperty {
    pub id: String,
    pub value: String,
}

impl CustomProperty {
    pub fn new(id: impl Into<String>, value: impl ToString) -> Self {
        Self {
            id: id.into(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductMetaData {
    pub unique_product_id: String,
    pub product_number: String,
    pub name: String,
    pub description: String,
    pub custom_properties: Vec<CustomProperty>,
}

/// How a variant is attached to light emission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VariantGeometry {
    /// Emitter without a 3D model.
    Emitter { emitter_id: String },
    /// Emitter placed on a named object of a model geometry.
    Model {
        geometry_id: String,
        emitter_id: String,
        external_name: String,
    },
}

impl VariantGeometry {
    pub fn emitter_id(&self) -> &str {
        match self {
            VariantGeometry::Emitter { emitter_id } => emitter_id,
            VariantGeometry::Model { emitter_id, .. } => emitter_id,
        }
    }

    pub fn geometry_id(&self) -> Option<&str> {
        match self {
            VariantGeometry::Emitter { .. } => None,
            VariantGeometry::Model { geometry_id, .. } => Some(geometry_id),
        }
    }
}

/// Product size in millimetres and weight in kilograms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mechanical {
    pub length_mm: u32,
    pub width_mm: u32,
    pub height_mm: u32,
    pub weight_kg: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Electrical {
    pub safety_class: String,
    pub ip_code: String,
    pub power_factor: f64,
    pub constant_light_output: bool,
}

/// Housing colour by RAL number (digits only) and display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HousingColor {
    pub ral: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantDefinition {
    pub id: String,
    pub product_number: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub geometry: Option<VariantGeometry>,
    pub mechanical: Option<Mechanical>,
    pub electrical: Option<Electrical>,
    pub housing_color: Option<HousingColor>,
    pub custom_properties: Vec<CustomProperty>,
}

impl VariantDefinition {
    /// A variant with a name only; fill the optional blocks directly.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            product_number: None,
            name: name.into(),
            description: None,
            geometry: None,
            mechanical: None,
            electrical: None,
            housing_color: None,
            custom_properties: Vec::new(),
        }
    }
}

/// A validated, immutable product document.
///
/// Deserialization goes through the same integrity check as
/// [`ProductDocumentBuilder::build`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedDocument")]
pub struct ProductDocument {
    header: DocumentHeader,
    files: Vec<FileDefinition>,
    photometries: Vec<PhotometryDefinition>,
    spectrums: Vec<SpectrumDefinition>,
    light_sources: Vec<LightSourceDefinition>,
    emitters: Vec<EmitterDefinition>,
    geometries: Vec<GeometryDefinition>,
    metadata: ProductMetaData,
    variants: Vec<VariantDefinition>,
}

/// Wire form of a document before its references are checked.
#[derive(Deserialize)]
struct UncheckedDocument {
    header: DocumentHeader,
    #[serde(default)]
    files: Vec<FileDefinition>,
    #[serde(default)]
    photometries: Vec<PhotometryDefinition>,
    #[serde(default)]
    spectrums: Vec<SpectrumDefinition>,
    #[serde(default)]
    light_sources: Vec<LightSourceDefinition>,
    #[serde(default)]
    emitters: Vec<EmitterDefinition>,
    #[serde(default)]
    geometries: Vec<GeometryDefinition>,
    #[serde(default)]
    metadata: ProductMetaData,
    #[serde(default)]
    variants: Vec<VariantDefinition>,
}

impl TryFrom<UncheckedDocument> for ProductDocument {
    type Error = FixtureError;

    fn try_from(unchecked: UncheckedDocument) -> FixtureResult<Self> {
        ProductDocumentBuilder {
            document: ProductDocument {
                header: unchecked.header,
                files: unchecked.files,
                photometries: unchecked.photometries,
                spectrums: unchecked.spectrums,
                light_sources: unchecked.light_sources,
                emitters: unchecked.emitters,
                geometries: unchecked.geometries,
                metadata: unchecked.metadata,
                variants: unchecked.variants,
            },
        }
        .build()
    }
}

impl ProductDocument {
    pub fn header(&self) -> &DocumentHeader {
        &self.header
    }

    pub fn files(&self) -> &[FileDefinition] {
        &self.files
    }

    pub fn photometries(&self) -> &[PhotometryDefinition] {
        &self.photometries
    }

    pub fn spectrums(&self) -> &[SpectrumDefinition] {
        &self.spectrums
    }

    pub fn light_sources(&self) -> &[LightSourceDefinition] {
        &self.light_sources
    }

    pub fn emitters(&self) -> &[EmitterDefinition] {
        &self.emitters
    }

    pub fn geometries(&self) -> &[GeometryDefinition] {
        &self.geometries
    }

    pub fn metadata(&self) -> &ProductMetaData {
        &self.metadata
    }

    pub fn variants(&self) -> &[VariantDefinition] {
        &self.variants
    }

    /// Looks up a file definition by id.
    pub fn file(&self, id: &str) -> Option<&FileDefinition> {
        self.files.iter().find(|f| f.id == id)
    }
}

/// Accumulates document sections until [`build`](Self::build).
///
/// # Examples
///
/// ```
/// use astral_gldf::composer::document::*;
/// use chrono::{TimeZone, Utc};
///
/// let header = DocumentHeader {
///     author: "astral".into(),
///     manufacturer: "Astral Sky Demo".into(),
///     created_with_application: "astral-gldf".into(),
///     creation_time: Utc.with_ymd_and_hms(2025, 1, 15, 21, 0, 0).unwrap(),
///     unique_id: "demo".into(),
/// };
///
/// let result = ProductDocumentBuilder::new(header)
///     .photometry(PhotometryDefinition { id: "p".into(), file_id: "missing".into() })
///     .build();
/// assert!(result.unwrap_err().is_integrity_violation());
/// ```
#[derive(Debug, Clone)]
pub struct ProductDocumentBuilder {
    document: ProductDocument,
}

impl ProductDocumentBuilder {
    pub fn new(header: DocumentHeader) -> Self {
        Self {
            document: ProductDocument {
                header,
                files: Vec::new(),
                photometries: Vec::new(),
                spectrums: Vec::new(),
                light_sources: Vec::new(),
                emitters: Vec::new(),
                geometries: Vec::new(),
                metadata: ProductMetaData::default(),
                variants: Vec::new(),
            },
        }
    }

    pub fn file(mut self, file: FileDefinition) -> Self {
        self.document.files.push(file);
        self
    }

    pub fn photometry(mut self, photometry: PhotometryDefinition) -> Self {
        self.document.photometries.push(photometry);
        self
    }

    pub fn spectrum(mut self, spectrum: SpectrumDefinition) -> Self {
        self.document.spectrums.push(spectrum);
        self
    }

    pub fn light_source(mut self, light_source: LightSourceDefinition) -> Self {
        self.document.light_sources.push(light_source);
        self
    }

    pub fn emitter(mut self, emitter: EmitterDefinition) -> Self {
        self.document.emitters.push(emitter);
        self
    }

    pub fn geometry(mut self, geometry: GeometryDefinition) -> Self {
        self.document.geometries.push(geometry);
        self
    }

    pub fn metadata(mut self, metadata: ProductMetaData) -> Self {
        self.document.metadata = metadata;
        self
    }

    pub fn variant(mut self, variant: VariantDefinition) -> Self {
        self.document.variants.push(variant);
        self
    }

    /// Runs the integrity check without consuming the builder.
    pub fn validate(&self) -> ValidationResult {
        DocumentValidator::validate(&self.document)
    }

    /// Validates and returns the finished document.
    ///
    /// # Errors
    ///
    /// `FixtureError::IntegrityViolation` listing every failed check when an
    /// id is duplicated or a reference does not resolve.
    pub fn build(self) -> FixtureResult<ProductDocument> {
        let result = self.validate();

        for warning in &result.warnings {
            warn!("{}", warning);
        }

        if !result.is_valid {
            return Err(FixtureError::integrity(
                result.errors,
                ErrorContext::new("build_product_document")
                    .with_entity("document")
                    .with_entity_id(&self.document.header.unique_id),
            ));
        }

        debug!(
            "Built product document {}: {} files, {} emitters, {} variants",
            self.document.header.unique_id,
            result.stats.files,
            result.stats.emitters,
            result.stats.variants
        );

        Ok(self.document)
    }
}
