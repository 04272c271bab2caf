//! IES TM-33 (`IESTM33-22` root) photometric file serializer.
//!
//! One document carries the angular intensity grid, the spectral power
//! distribution and the color rendering values of a single emitter, so no
//! EULUMDAT or IES companion file is needed.
//!
//! Numeric formatting is fixed:
//!
//! | Field                 | Format             |
//! |-----------------------|--------------------|
//! | `IntensityData`       | 1 decimal          |
//! | spectral `Values`     | 4 decimals         |
//! | `Wavelengths`         | integers           |
//! | `Duv`                 | 3 decimals         |
//! | `PowerFactor`         | 2 decimals         |
//! | `BallastFactor`       | 1 decimal          |

use std::io::Write;

use log::debug;

use super::xml::{self, XmlEventsExt};
use crate::error::{ErrorContext, FixtureError, FixtureResult};
use crate::radiometry::record::PhotometricRecord;

/// Root element name.
pub const ROOT_ELEMENT: &str = "IESTM33-22";

/// Schema version written into `<Version>`.
pub const SCHEMA_VERSION: &str = "1.1";

/// File extension used inside containers.
pub const FILE_EXTENSION: &str = "iesxml";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Renders a record into a TM-33 document.
///
/// # Examples
///
/// ```
/// use astral_gldf::formats::tm33;
/// use astral_gldf::radiometry::record::{LuminaireProfile, PhotometricRecord};
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
/// let record = PhotometricRecord::for_led_module(4000, 30, &LuminaireProfile::default(), date);
/// let xml = tm33::serialize(&record).unwrap();
/// assert!(xml.contains("<FixedCCT>4000</FixedCCT>"));
/// ```
pub fn serialize(record: &PhotometricRecord) -> FixtureResult<String> {
    let bytes = write_record(record, Vec::new()).map_err(|e| {
        FixtureError::serialization(
            e.to_string(),
            ErrorContext::new("serialize_tm33").with_entity_id(&record.emitter.id),
        )
    })?;
    debug!(
        "Serialized TM-33 for {} ({} bytes)",
        record.emitter.id,
        bytes.len()
    );
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Streams a record into `writer` and hands the writer back.
pub fn write_record<W: Write>(record: &PhotometricRecord, writer: W) -> xml::Result<W> {
    let mut xml = xml::indented_writer(writer);

    xml.declaration()?;
    xml.comment_block(&record.notes)?;
    xml.open(ROOT_ELEMENT, &[])?;
    xml.leaf("Version", SCHEMA_VERSION)?;

    let header = &record.header;
    xml.open("Header", &[])?;
    xml.leaf("Manufacturer", &header.manufacturer)?;
    xml.leaf("CatalogNumber", &header.catalog_number)?;
    xml.leaf("Description", &header.description)?;
    xml.leaf("Laboratory", &header.laboratory)?;
    xml.leaf("ReportNumber", &header.report_number)?;
    xml.leaf("ReportDate", header.report_date.format(DATE_FORMAT))?;
    xml.leaf("DocumentCreator", &header.document_creator)?;
    xml.leaf(
        "DocumentCreationDate",
        header.document_creation_date.format(DATE_FORMAT),
    )?;
    xml.close("Header")?;

    let luminaire = &record.luminaire;
    xml.open("Luminaire", &[])?;
    xml.open("Dimensions", &[])?;
    xml.leaf("Length", luminaire.length_mm)?;
    xml.leaf("Width", luminaire.width_mm)?;
    xml.leaf("Height", luminaire.height_mm)?;
    xml.close("Dimensions")?;
    xml.leaf("Mounting", &luminaire.mounting)?;
    xml.leaf("NumEmitters", luminaire.emitter_count)?;
    xml.close("Luminaire")?;

    let emitter = &record.emitter;
    xml.open("Emitter", &[])?;
    xml.leaf("ID", &emitter.id)?;
    xml.leaf("Description", &emitter.description)?;
    xml.leaf("CatalogNumber", &emitter.catalog_number)?;
    xml.leaf("Quantity", emitter.quantity)?;
    xml.leaf("RatedLumens", emitter.rated_lumens)?;
    xml.leaf("InputWattage", emitter.input_wattage)?;
    if let Some(power_factor) = emitter.power_factor {
        xml.leaf("PowerFactor", format!("{:.2}", power_factor))?;
    }
    if let Some(ballast_factor) = emitter.ballast_factor {
        xml.leaf("BallastFactor", format!("{:.1}", ballast_factor))?;
    }
    xml.leaf("FixedCCT", record.cct())?;
    xml.leaf("Duv", format!("{:.3}", emitter.duv))?;

    let rendering = &record.color_rendering;
    xml.open("ColorRendering", &[])?;
    xml.leaf("Ra", rendering.ra)?;
    if let Some(r9) = rendering.r9 {
        xml.leaf("R9", r9)?;
    }
    if let Some(rf) = rendering.rf {
        xml.leaf("Rf", rf)?;
    }
    if let Some(rg) = rendering.rg {
        xml.leaf("Rg", rg)?;
    }
    xml.close("ColorRendering")?;

    xml.open("LuminousData", &[])?;
    xml.leaf("PhotometryType", "CIE _ C")?;
    xml.leaf("Metric", "Luminous")?;
    xml.leaf("SymmType", record.symmetry.as_str())?;
    xml.leaf("Multiplier", "1.0")?;
    for (horizontal, vertical, intensity) in record.grid.cells() {
        let horz = horizontal.to_string();
        let vert = vertical.to_string();
        xml.text_element(
            "IntensityData",
            &[("horz", horz.as_str()), ("vert", vert.as_str())],
            &format!("{:.1}", intensity),
        )?;
    }
    xml.close("LuminousData")?;

    let samples = record.spectrum.samples();
    let wavelengths: Vec<String> = samples
        .iter()
        .map(|s| s.wavelength_nm.to_string())
        .collect();
    let values: Vec<String> = samples
        .iter()
        .map(|s| format!("{:.4}", s.intensity))
        .collect();
    xml.open("SpectralDistribution", &[])?;
    xml.leaf("Wavelengths", wavelengths.join(" "))?;
    xml.leaf("Values", values.join(" "))?;
    xml.close("SpectralDistribution")?;

    xml.close("Emitter")?;
    xml.close(ROOT_ELEMENT)?;

    xml::finish(xml)
}
