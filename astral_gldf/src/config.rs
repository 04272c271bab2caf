//! Generator configuration file support.
//!
//! Settings are read from a TOML file, then environment overrides are
//! applied, then command-line flags (in the binary) win over both.
//!
//! ```toml
//! [observer]
//! latitude = 51.77
//! longitude = 7.44
//! location = "Lüdinghausen"
//! instant = "2025-01-15T21:00:00Z"
//!
//! [catalog]
//! photometric_magnitude_limit = 4.0
//! summary_magnitude_limit = 6.5
//!
//! [ephemeris]
//! strategy = "auto"
//!
//! [output]
//! directory = "tests/data"
//! ```

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ErrorContext, FixtureError, FixtureResult};
use crate::time::epoch::parse_instant;
use crate::transformations::horizon::EphemerisStrategy;

/// Overrides `[catalog] path`.
pub const ENV_CATALOG_PATH: &str = "ASTRAL_CATALOG_PATH";
/// Overrides `[ephemeris] strategy`.
pub const ENV_EPHEMERIS: &str = "ASTRAL_EPHEMERIS";
/// Overrides `[output] directory`.
pub const ENV_OUTPUT_DIR: &str = "ASTRAL_OUTPUT_DIR";

/// Config file name searched by [`GeneratorConfig::from_default_location`].
pub const CONFIG_FILE_NAME: &str = "astral.toml";

/// Complete generator configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub observer: ObserverSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub ephemeris: EphemerisSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

/// Observer location and optional fixed instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObserverSettings {
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    #[serde(default = "default_location")]
    pub location: String,
    /// RFC 3339 instant; the binary uses the current time when absent
    #[serde(default)]
    pub instant: Option<String>,
}

/// Catalog source and magnitude ceilings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSettings {
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_allow_fallback")]
    pub allow_fallback: bool,
    /// Objects at or below this magnitude get a TM-33 file
    #[serde(default = "default_photometric_magnitude_limit")]
    pub photometric_magnitude_limit: f64,
    /// Objects at or below this magnitude go into the sky summary
    #[serde(default = "default_summary_magnitude_limit")]
    pub summary_magnitude_limit: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EphemerisSettings {
    #[serde(default)]
    pub strategy: EphemerisStrategy,
}

/// Output location and document identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,
    #[serde(default = "default_author")]
    pub author: String,
    #[serde(default = "default_manufacturer")]
    pub manufacturer: String,
    /// Directory of embedded viewers to pass through, if any
    #[serde(default)]
    pub viewer_dir: Option<PathBuf>,
}

fn default_latitude() -> f64 {
    51.77
}

fn default_longitude() -> f64 {
    7.44
}

fn default_location() -> String {
    "Lüdinghausen".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_allow_fallback() -> bool {
    true
}

fn default_photometric_magnitude_limit() -> f64 {
    4.0
}

fn default_summary_magnitude_limit() -> f64 {
    6.5
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("tests/data")
}

fn default_author() -> String {
    "astral-gldf".to_string()
}

fn default_manufacturer() -> String {
    "Astral Sky Demo".to_string()
}

impl Default for ObserverSettings {
    fn default() -> Self {
        Self {
            latitude: default_latitude(),
            longitude: default_longitude(),
            location: default_location(),
            instant: None,
        }
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            path: None,
            data_dir: default_data_dir(),
            allow_fallback: default_allow_fallback(),
            photometric_magnitude_limit: default_photometric_magnitude_limit(),
            summary_magnitude_limit: default_summary_magnitude_limit(),
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            author: default_author(),
            manufacturer: default_manufacturer(),
            viewer_dir: None,
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(GeneratorConfig)` if successful
    /// * `Err(FixtureError::Configuration)` if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> FixtureResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            FixtureError::configuration_with_context(
                format!("Failed to read config file: {}", e),
                ErrorContext::new("load_config").with_path(path),
            )
        })?;

        let config = Self::from_toml_str(&content).map_err(|e| match e {
            FixtureError::Configuration { message, context } => FixtureError::Configuration {
                message,
                context: context.with_path(path),
            },
            other => other,
        })?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from TOML text and validate it.
    pub fn from_toml_str(content: &str) -> FixtureResult<Self> {
        let config: GeneratorConfig = toml::from_str(content).map_err(|e| {
            FixtureError::configuration_with_context(
                format!("Failed to parse config file: {}", e),
                ErrorContext::new("parse_config"),
            )
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `astral.toml` in:
    /// 1. Current directory
    /// 2. `astral_gldf/` directory
    /// 3. Parent directory
    ///
    /// # Returns
    /// * `Ok(GeneratorConfig)` if found and parsed successfully
    /// * `Err(FixtureError::Configuration)` if no config file found or parse error
    pub fn from_default_location() -> FixtureResult<Self> {
        let search_paths = [
            PathBuf::from(CONFIG_FILE_NAME),
            PathBuf::from("astral_gldf").join(CONFIG_FILE_NAME),
            PathBuf::from("..").join(CONFIG_FILE_NAME),
        ];

        for path in &search_paths {
            if path.exists() {
                return Self::from_file(path);
            }
        }

        Err(FixtureError::configuration(format!(
            "No {} found in standard locations",
            CONFIG_FILE_NAME
        )))
    }

    /// Applies `ASTRAL_*` environment overrides.
    pub fn apply_env_overrides(mut self) -> FixtureResult<Self> {
        if let Some(path) = env_value(ENV_CATALOG_PATH) {
            debug!("{} overrides catalog path: {}", ENV_CATALOG_PATH, path);
            self.catalog.path = Some(PathBuf::from(path));
        }

        if let Some(value) = env_value(ENV_EPHEMERIS) {
            self.ephemeris.strategy = value.parse().map_err(|e: String| {
                FixtureError::configuration_with_context(
                    e,
                    ErrorContext::new("apply_env_overrides").with_entity_id(ENV_EPHEMERIS),
                )
            })?;
            debug!("{} overrides ephemeris strategy: {}", ENV_EPHEMERIS, value);
        }

        if let Some(dir) = env_value(ENV_OUTPUT_DIR) {
            debug!("{} overrides output directory: {}", ENV_OUTPUT_DIR, dir);
            self.output.directory = PathBuf::from(dir);
        }

        Ok(self)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> FixtureResult<()> {
        let observer = &self.observer;
        if !(-90.0..=90.0).contains(&observer.latitude) {
            return Err(FixtureError::configuration(format!(
                "observer.latitude out of range: {}",
                observer.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&observer.longitude) {
            return Err(FixtureError::configuration(format!(
                "observer.longitude out of range: {}",
                observer.longitude
            )));
        }

        let catalog = &self.catalog;
        for (name, value) in [
            (
                "photometric_magnitude_limit",
                catalog.photometric_magnitude_limit,
            ),
            ("summary_magnitude_limit", catalog.summary_magnitude_limit),
        ] {
            if !value.is_finite() {
                return Err(FixtureError::configuration(format!(
                    "catalog.{} must be finite",
                    name
                )));
            }
        }

        self.observation_instant().map(|_| ())
    }

    /// The configured observation instant, if one is set.
    pub fn observation_instant(&self) -> FixtureResult<Option<DateTime<Utc>>> {
        self.observer
            .instant
            .as_deref()
            .map(|value| {
                parse_instant(value).map_err(|e| {
                    FixtureError::configuration_with_context(
                        e,
                        ErrorContext::new("parse_instant").with_entity_id("observer.instant"),
                    )
                })
            })
            .transpose()
    }
}

fn env_value(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = GeneratorConfig::from_toml_str("").unwrap();
        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.observer.latitude, 51.77);
        assert_eq!(config.observer.longitude, 7.44);
        assert_eq!(config.observer.location, "Lüdinghausen");
        assert_eq!(config.catalog.photometric_magnitude_limit, 4.0);
        assert_eq!(config.catalog.summary_magnitude_limit, 6.5);
        assert_eq!(config.ephemeris.strategy, EphemerisStrategy::Auto);
        assert_eq!(config.output.directory, PathBuf::from("tests/data"));
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[observer]
latitude = -33.86
longitude = 151.21
location = "Sydney"
instant = "2025-06-21T12:00:00Z"

[catalog]
path = "/srv/hyg.csv.gz"
allow_fallback = false
photometric_magnitude_limit = 3.0

[ephemeris]
strategy = "approximate"

[output]
directory = "out"
viewer_dir = "viewers"
"#;

        let config = GeneratorConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.observer.location, "Sydney");
        assert_eq!(config.catalog.path, Some(PathBuf::from("/srv/hyg.csv.gz")));
        assert!(!config.catalog.allow_fallback);
        assert_eq!(config.catalog.photometric_magnitude_limit, 3.0);
        assert_eq!(config.catalog.summary_magnitude_limit, 6.5);
        assert_eq!(config.ephemeris.strategy, EphemerisStrategy::Approximate);
        assert_eq!(config.output.viewer_dir, Some(PathBuf::from("viewers")));
        assert_eq!(config.output.manufacturer, "Astral Sky Demo");
        assert_eq!(
            config.observation_instant().unwrap(),
            Some(Utc.with_ymd_and_hms(2025, 6, 21, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(GeneratorConfig::from_toml_str("[observer]\nlatitude = 95.0\n").is_err());
        assert!(GeneratorConfig::from_toml_str("[ephemeris]\nstrategy = \"astropy\"\n").is_err());
        assert!(GeneratorConfig::from_toml_str("[observer]\ninstant = \"tonight\"\n").is_err());
    }

    #[test]
    fn test_from_missing_file() {
        let err = GeneratorConfig::from_file("/nonexistent/astral.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/astral.toml"));
    }
}
