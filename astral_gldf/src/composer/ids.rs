//! Identifier derivation for product document entities.
//!
//! Identifiers are derived from display names and are lossy: distinct names
//! can collapse to the same slug ("Alpha-Centauri" and "Alpha Centauri"). No
//! disambiguation is attempted here; the document validator reports the
//! resulting duplicate ids.

use crate::core::domain::CelestialObject;

/// Lowercases `name`, turns spaces and hyphens into underscores and drops
/// everything outside `[a-z0-9_]`. A leading digit gets a `star_` prefix.
///
/// Returns `None` when nothing usable is left.
///
/// # Examples
///
/// ```
/// use astral_gldf::composer::ids::slugify;
///
/// assert_eq!(slugify("Alpha Centauri").as_deref(), Some("alpha_centauri"));
/// assert_eq!(slugify("61 Cyg-A").as_deref(), Some("star_61_cyg_a"));
/// assert_eq!(slugify("***"), None);
/// ```
pub fn slugify(name: &str) -> Option<String> {
    let slug: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
        .collect();

    match slug.chars().next() {
        None => None,
        Some(first) if first.is_ascii_digit() => Some(format!("star_{}", slug)),
        Some(_) => Some(slug),
    }
}

/// Stable identifier for a catalog object.
///
/// Falls back to `star_<catalog id>` and then `star_<index>` when the name
/// has no usable characters.
pub fn object_slug(object: &CelestialObject, index: usize) -> String {
    slugify(&object.name).unwrap_or_else(|| match object.catalog_id {
        Some(id) => format!("star_{}", id),
        None => format!("star_{}", index),
    })
}

/// Entity identifiers of one catalog object inside a sky document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectIds {
    pub slug: String,
    pub file: String,
    pub photometry: String,
    pub light_source: String,
    pub emitter: String,
    pub variant: String,
}

impl ObjectIds {
    pub fn new(slug: impl Into<String>) -> Self {
        let slug = slug.into();
        Self {
            file: format!("file_{}", slug),
            photometry: format!("photometry_{}", slug),
            light_source: format!("lightsource_{}", slug),
            emitter: format!("emitter_{}", slug),
            variant: format!("variant_{}", slug),
            slug,
        }
    }

    /// Archive file name of the object's photometric file.
    pub fn file_name(&self) -> String {
        format!("{}.iesxml", self.slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_rules() {
        assert_eq!(slugify("  Vega ").as_deref(), Some("vega"));
        assert_eq!(slugify("HIP 11767").as_deref(), Some("hip_11767"));
        assert_eq!(slugify("Lüdinghausen").as_deref(), Some("ldinghausen"));
        assert_eq!(
            slugify("Zubeneschamali (β Lib)").as_deref(),
            Some("zubeneschamali__lib")
        );
        assert_eq!(slugify(""), None);
    }

    #[test]
    fn test_slugs_can_collide() {
        assert_eq!(slugify("Alpha-Centauri"), slugify("Alpha Centauri"));
    }

    #[test]
    fn test_object_slug_fallbacks() {
        let unnamed = CelestialObject::new("βγ", 0.0, 0.0, 3.0, "");
        assert_eq!(object_slug(&unnamed, 7), "star_7");
        assert_eq!(
            object_slug(&unnamed.clone().with_catalog_id(42), 7),
            "star_42"
        );
    }

    #[test]
    fn test_object_ids() {
        let ids = ObjectIds::new("sirius");
        assert_eq!(ids.file, "file_sirius");
        assert_eq!(ids.photometry, "photometry_sirius");
        assert_eq!(ids.light_source, "lightsource_sirius");
        assert_eq!(ids.emitter, "emitter_sirius");
        assert_eq!(ids.variant, "variant_sirius");
        assert_eq!(ids.file_name(), "sirius.iesxml");
    }
}
