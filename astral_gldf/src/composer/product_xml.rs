//! `product.xml` rendering for validated documents.

use std::io::Write;

use quick_xml::Writer;

use super::document::{
    ColorInformation, CustomProperty, ProductDocument, VariantDefinition, VariantGeometry,
};
use crate::error::{ErrorContext, FixtureError, FixtureResult};
use crate::formats::xml::{self, XmlEventsExt};

/// Schema location written on the root element.
pub const SCHEMA_LOCATION: &str = "https://gldf.io/xsd/gldf/1.0.0/gldf.xsd";

/// Archive path of the product document.
pub const PRODUCT_XML_PATH: &str = "product.xml";

const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
const LANGUAGE: &str = "en";

impl ProductDocument {
    /// Renders the document as `product.xml`.
    pub fn to_xml(&self) -> FixtureResult<String> {
        let bytes = write_document(self, Vec::new()).map_err(|e| {
            FixtureError::serialization(
                e.to_string(),
                ErrorContext::new("render_product_xml").with_entity_id(&self.header().unique_id),
            )
        })?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn localized<W: Write>(xml: &mut Writer<W>, element: &str, text: &str) -> xml::Result<()> {
    xml.open(element, &[])?;
    xml.text_element("Locale", &[("language", LANGUAGE)], text)?;
    xml.close(element)
}

fn custom_properties<W: Write>(
    xml: &mut Writer<W>,
    properties: &[CustomProperty],
) -> xml::Result<()> {
    xml.open("CustomProperties", &[])?;
    for property in properties {
        xml.open("Property", &[("id", property.id.as_str())])?;
        xml.leaf("Value", &property.value)?;
        xml.close("Property")?;
    }
    xml.close("CustomProperties")
}

fn color_information<W: Write>(xml: &mut Writer<W>, color: &ColorInformation) -> xml::Result<()> {
    xml.open("ColorInformation", &[])?;
    if let Some(cri) = color.color_rendering_index {
        xml.leaf("ColorRenderingIndex", cri)?;
    }
    xml.leaf("CorrelatedColorTemperature", color.cct)?;
    if let Some((x, y)) = color.chromaticity {
        xml.open("RatedChromacityCoordinateValues", &[])?;
        xml.leaf("X", x)?;
        xml.leaf("Y", y)?;
        xml.close("RatedChromacityCoordinateValues")?;
    }
    if let Some((rf, rg)) = color.tm30 {
        xml.open("IES-TM-30-15", &[])?;
        xml.leaf("Rf", rf)?;
        xml.leaf("Rg", rg)?;
        xml.close("IES-TM-30-15")?;
    }
    if let Some(melanopic) = color.melanopic_factor {
        xml.leaf("MelanopicFactor", format!("{:.2}", melanopic))?;
    }
    xml.close("ColorInformation")
}

fn variant<W: Write>(xml: &mut Writer<W>, variant: &VariantDefinition) -> xml::Result<()> {
    xml.open("Variant", &[("id", variant.id.as_str())])?;
    if let Some(ref number) = variant.product_number {
        localized(xml, "ProductNumber", number)?;
    }
    localized(xml, "Name", &variant.name)?;
    if let Some(ref description) = variant.description {
        localized(xml, "Description", description)?;
    }

    match variant.geometry {
        Some(VariantGeometry::Emitter { ref emitter_id }) => {
            xml.open("Geometry", &[])?;
            xml.empty("EmitterReference", &[("emitterId", emitter_id.as_str())])?;
            xml.close("Geometry")?;
        }
        Some(VariantGeometry::Model {
            ref geometry_id,
            ref emitter_id,
            ref external_name,
        }) => {
            xml.open("Geometry", &[])?;
            xml.open(
                "ModelGeometryReference",
                &[("geometryId", geometry_id.as_str())],
            )?;
            xml.open("EmitterReference", &[("emitterId", emitter_id.as_str())])?;
            xml.leaf("EmitterObjectExternalName", external_name)?;
            xml.close("EmitterReference")?;
            xml.close("ModelGeometryReference")?;
            xml.close("Geometry")?;
        }
        None => {}
    }

    let has_attributes = variant.mechanical.is_some()
        || variant.electrical.is_some()
        || variant.housing_color.is_some()
        || !variant.custom_properties.is_empty();

    if has_attributes {
        xml.open("DescriptiveAttributes", &[])?;

        if let Some(ref mechanical) = variant.mechanical {
            xml.open("Mechanical", &[])?;
            xml.open("ProductSize", &[])?;
            xml.leaf("Length", mechanical.length_mm)?;
            xml.leaf("Width", mechanical.width_mm)?;
            xml.leaf("Height", mechanical.height_mm)?;
            xml.close("ProductSize")?;
            if let Some(weight) = mechanical.weight_kg {
                xml.leaf("Weight", format!("{:.1}", weight))?;
            }
            xml.close("Mechanical")?;
        }

        if let Some(ref electrical) = variant.electrical {
            xml.open("Electrical", &[])?;
            xml.leaf("ElectricalSafetyClass", &electrical.safety_class)?;
            xml.leaf("IngressProtectionIPCode", &electrical.ip_code)?;
            xml.leaf("PowerFactor", electrical.power_factor)?;
            xml.leaf("ConstantLightOutput", electrical.constant_light_output)?;
            xml.close("Electrical")?;
        }

        if let Some(ref color) = variant.housing_color {
            xml.open("Marketing", &[])?;
            xml.open("HousingColors", &[])?;
            xml.open("HousingColor", &[("ral", color.ral.as_str())])?;
            xml.text_element("Locale", &[("language", LANGUAGE)], &color.name)?;
            xml.close("HousingColor")?;
            xml.close("HousingColors")?;
            xml.close("Marketing")?;
        }

        if !variant.custom_properties.is_empty() {
            custom_properties(xml, &variant.custom_properties)?;
        }

        xml.close("DescriptiveAttributes")?;
    }

    xml.close("Variant")
}

/// Streams `document` as GLDF `product.xml` into `writer`.
pub fn write_document<W: Write>(document: &ProductDocument, writer: W) -> xml::Result<W> {
    let mut xml = xml::indented_writer(writer);
    xml.declaration()?;
    xml.open(
        "Root",
        &[
            ("xmlns:xsi", XSI_NAMESPACE),
            ("xsi:noNamespaceSchemaLocation", SCHEMA_LOCATION),
        ],
    )?;

    let header = document.header();
    xml.open("Header", &[])?;
    xml.leaf("Author", &header.author)?;
    xml.leaf("Manufacturer", &header.manufacturer)?;
    xml.empty(
        "FormatVersion",
        &[("major", "1"), ("minor", "0"), ("pre-release", "3")],
    )?;
    xml.leaf("CreatedWithApplication", &header.created_with_application)?;
    xml.leaf(
        "GldfCreationTimeCode",
        header.creation_time.format("%Y-%m-%dT%H:%M:%SZ"),
    )?;
    xml.leaf("UniqueGldfId", &header.unique_id)?;
    xml.close("Header")?;

    xml.open("GeneralDefinitions", &[])?;

    xml.open("Files", &[])?;
    for file in document.files() {
        xml.text_element(
            "File",
            &[
                ("id", file.id.as_str()),
                ("contentType", file.content_type.as_str()),
                ("type", "localFileName"),
            ],
            &file.file_name,
        )?;
    }
    xml.close("Files")?;

    if !document.photometries().is_empty() {
        xml.open("Photometries", &[])?;
        for photometry in document.photometries() {
            xml.open("Photometry", &[("id", photometry.id.as_str())])?;
            xml.empty(
                "PhotometryFileReference",
                &[("fileId", photometry.file_id.as_str())],
            )?;
            xml.close("Photometry")?;
        }
        xml.close("Photometries")?;
    }

    if !document.spectrums().is_empty() {
        xml.open("Spectrums", &[])?;
        for spectrum in document.spectrums() {
            xml.open("Spectrum", &[("id", spectrum.id.as_str())])?;
            xml.empty(
                "SpectrumFileReference",
                &[("fileId", spectrum.file_id.as_str())],
            )?;
            for sample in &spectrum.samples {
                let wavelength = sample.wavelength_nm.to_string();
                xml.text_element(
                    "Intensity",
                    &[("wavelength", wavelength.as_str())],
                    &format!("{:.4}", sample.intensity),
                )?;
            }
            xml.close("Spectrum")?;
        }
        xml.close("Spectrums")?;
    }

    if !document.light_sources().is_empty() {
        xml.open("LightSources", &[])?;
        for source in document.light_sources() {
            xml.open("FixedLightSource", &[("id", source.id.as_str())])?;
            localized(&mut xml, "Name", &source.name)?;
            if let Some(ref description) = source.description {
                localized(&mut xml, "Description", description)?;
            }
            xml.leaf("RatedInputPower", source.rated_input_power)?;
            if let Some(flux) = source.rated_luminous_flux {
                xml.leaf("RatedLuminousFlux", flux)?;
            }
            if let Some(ref spectrum_id) = source.spectrum_id {
                xml.empty("SpectrumReference", &[("spectrumId", spectrum_id.as_str())])?;
            }
            color_information(&mut xml, &source.color)?;
            xml.close("FixedLightSource")?;
        }
        xml.close("LightSources")?;
    }

    if !document.emitters().is_empty() {
        xml.open("Emitters", &[])?;
        for emitter in document.emitters() {
            xml.open("Emitter", &[("id", emitter.id.as_str())])?;
            xml.open("FixedLightEmitter", &[])?;
            localized(&mut xml, "Name", &emitter.name)?;
            xml.empty(
                "PhotometryReference",
                &[("photometryId", emitter.photometry_id.as_str())],
            )?;
            match emitter.light_source_count {
                Some(count) => {
                    let count = count.to_string();
                    xml.empty(
                        "LightSourceReference",
                        &[
                            ("fixedLightSourceId", emitter.light_source_id.as_str()),
                            ("lightSourceCount", count.as_str()),
                        ],
                    )?;
                }
                None => {
                    xml.empty(
                        "LightSourceReference",
                        &[("fixedLightSourceId", emitter.light_source_id.as_str())],
                    )?;
                }
            }
            if let Some(flux) = emitter.rated_luminous_flux {
                xml.leaf("RatedLuminousFlux", flux)?;
            }
            xml.close("FixedLightEmitter")?;
            xml.close("Emitter")?;
        }
        xml.close("Emitters")?;
    }

    if !document.geometries().is_empty() {
        xml.open("Geometries", &[])?;
        for geometry in document.geometries() {
            xml.open("ModelGeometry", &[("id", geometry.id.as_str())])?;
            xml.empty(
                "GeometryFileReference",
                &[
                    ("fileId", geometry.file_id.as_str()),
                    ("levelOfDetail", geometry.level_of_detail.as_str()),
                ],
            )?;
            xml.close("ModelGeometry")?;
        }
        xml.close("Geometries")?;
    }

    xml.close("GeneralDefinitions")?;

    let metadata = document.metadata();
    xml.open("ProductDefinitions", &[])?;
    xml.open("ProductMetaData", &[])?;
    xml.leaf("UniqueProductId", &metadata.unique_product_id)?;
    localized(&mut xml, "ProductNumber", &metadata.product_number)?;
    localized(&mut xml, "Name", &metadata.name)?;
    localized(&mut xml, "Description", &metadata.description)?;
    if !metadata.custom_properties.is_empty() {
        xml.open("DescriptiveAttributes", &[])?;
        custom_properties(&mut xml, &metadata.custom_properties)?;
        xml.close("DescriptiveAttributes")?;
    }
    xml.close("ProductMetaData")?;

    if !document.variants().is_empty() {
        xml.open("Variants", &[])?;
        for definition in document.variants() {
            variant(&mut xml, definition)?;
        }
        xml.close("Variants")?;
    }

    xml.close("ProductDefinitions")?;
    xml.close("Root")?;

    xml::finish(xml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::document::*;
    use crate::radiometry::color::ColorMetrics;
    use crate::radiometry::spectrum::SpectralCurve;
    use chrono::{TimeZone, Utc};

    fn document() -> ProductDocument {
        let header = DocumentHeader {
            author: "astral".to_string(),
            manufacturer: "AEC Illuminazione".to_string(),
            created_with_application: "astral-gldf".to_string(),
            creation_time: Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
            unique_id: "aec-ga15-tm33-spectral".to_string(),
        };
        let metrics = ColorMetrics::from_cct(3000);

        ProductDocumentBuilder::new(header)
            .file(FileDefinition::new(
                "geometry_file",
                ContentType::L3d,
                "model.l3d",
            ))
            .file(FileDefinition::new(
                "photometry_3000K",
                ContentType::IesXml,
                "GA15_3000K.iesxml",
            ))
            .photometry(PhotometryDefinition {
                id: "photometry_3000K".to_string(),
                file_id: "photometry_3000K".to_string(),
            })
            .spectrum(SpectrumDefinition {
                id: "spectrum_3000K".to_string(),
                file_id: "photometry_3000K".to_string(),
                samples: SpectralCurve::led(3000).samples().to_vec(),
            })
            .light_source(LightSourceDefinition {
                id: "led_30W_3000K".to_string(),
                name: "LED 30W 3000K Rf90".to_string(),
                description: None,
                rated_input_power: 30.0,
                rated_luminous_flux: Some(4500),
                spectrum_id: Some("spectrum_3000K".to_string()),
                color: ColorInformation::from_metrics(&metrics, true),
            })
            .emitter(EmitterDefinition {
                id: "emitter_led_30W_3000K".to_string(),
                name: "LED Module 30W 3000K".to_string(),
                photometry_id: "photometry_3000K".to_string(),
                light_source_id: "led_30W_3000K".to_string(),
                light_source_count: Some(1),
                rated_luminous_flux: Some(4500),
            })
            .geometry(GeometryDefinition {
                id: "geometry".to_string(),
                file_id: "geometry_file".to_string(),
                level_of_detail: "High".to_string(),
            })
            .metadata(ProductMetaData {
                unique_product_id: "aec-ga15-tm33".to_string(),
                product_number: "GA15 Series (TM-33)".to_string(),
                name: "GA15 Industrial LED".to_string(),
                description: "Per-CCT photometry".to_string(),
                custom_properties: vec![CustomProperty::new("default_emitter_view", "spectral")],
            })
            .variant(VariantDefinition {
                product_number: Some("GA15-600-3000K-30W".to_string()),
                geometry: Some(VariantGeometry::Model {
                    geometry_id: "geometry".to_string(),
                    emitter_id: "emitter_led_30W_3000K".to_string(),
                    external_name: "LEO".to_string(),
                }),
                mechanical: Some(Mechanical {
                    length_mm: 600,
                    width_mm: 120,
                    height_mm: 80,
                    weight_kg: Some(2.9),
                }),
                housing_color: Some(HousingColor {
                    ral: "9003".to_string(),
                    name: "White".to_string(),
                }),
                ..VariantDefinition::new("variant_1", "GA15 600mm 3000K 30W")
            })
            .build()
            .unwrap()
    }

    #[test]
    fn test_root_and_header() {
        let xml = document().to_xml().unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Root xmlns:xsi="));
        assert!(xml.contains(
            "xsi:noNamespaceSchemaLocation=\"https://gldf.io/xsd/gldf/1.0.0/gldf.xsd\""
        ));
        assert!(xml.contains("<FormatVersion major=\"1\" minor=\"0\" pre-release=\"3\"/>"));
        assert!(xml.contains("<GldfCreationTimeCode>2024-01-15T00:00:00Z</GldfCreationTimeCode>"));
        assert!(xml.ends_with("</Root>\n"));
    }

    #[test]
    fn test_sections_and_references() {
        let xml = document().to_xml().unwrap();
        assert!(xml.contains(
            "<File id=\"photometry_3000K\" contentType=\"ldc/iesxml\" type=\"localFileName\">GA15_3000K.iesxml</File>"
        ));
        assert!(xml.contains("<PhotometryFileReference fileId=\"photometry_3000K\"/>"));
        assert_eq!(xml.matches("<Intensity wavelength=").count(), 81);
        assert!(xml.contains("<SpectrumReference spectrumId=\"spectrum_3000K\"/>"));
        assert!(xml.contains("<X>0.4366</X>"));
        assert!(xml.contains("<MelanopicFactor>0.70</MelanopicFactor>"));
        assert!(xml.contains(
            "<LightSourceReference fixedLightSourceId=\"led_30W_3000K\" lightSourceCount=\"1\"/>"
        ));
        assert!(xml.contains(
            "<GeometryFileReference fileId=\"geometry_file\" levelOfDetail=\"High\"/>"
        ));
        assert!(xml.contains("<EmitterObjectExternalName>LEO</EmitterObjectExternalName>"));
        assert!(xml.contains("<Weight>2.9</Weight>"));
        assert!(xml.contains("<HousingColor ral=\"9003\">"));
        assert!(xml.contains("<Property id=\"default_emitter_view\">"));
    }
}
