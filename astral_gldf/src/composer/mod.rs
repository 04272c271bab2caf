//! GLDF product document composition.
//!
//! Documents are built section by section, checked for reference integrity
//! and rendered as `product.xml`.

pub mod document;
pub mod ids;
pub mod product_xml;
pub mod validator;

pub use document::{
    ColorInformation, ContentType, CustomProperty, DocumentHeader, Electrical, EmitterDefinition,
    FileDefinition, GeometryDefinition, HousingColor, LightSourceDefinition, Mechanical,
    PhotometryDefinition, ProductDocument, ProductDocumentBuilder, ProductMetaData,
    SpectrumDefinition, VariantDefinition, VariantGeometry,
};
pub use ids::{object_slug, slugify, ObjectIds};
pub use product_xml::PRODUCT_XML_PATH;
pub use validator::{DocumentValidator, ValidationResult, ValidationStats};
