use anyhow::{Context, Result};
use log::{info, warn};
use std::path::{Path, PathBuf};

use crate::core::domain::CelestialObject;
use crate::core::tables::{BrightStarEntry, BRIGHT_STARS};
use crate::error::FixtureError;
use crate::parsing::catalog_parser::{self, CatalogParseOutcome};

/// Default catalog directory, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Catalog file looked up inside the data directory.
pub const CATALOG_FILE_NAME: &str = "hygdata_v42.csv";

/// Compressed catalog looked up when the plain file is missing.
pub const CATALOG_GZ_FILE_NAME: &str = "hygdata_v42.csv.gz";

/// Where the loaded objects came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Csv(PathBuf),
    GzipCsv(PathBuf),
    Fallback,
}

impl CatalogSource {
    pub fn is_fallback(&self) -> bool {
        matches!(self, CatalogSource::Fallback)
    }
}

/// Result of loading the star catalog
#[derive(Debug, Clone)]
pub struct CatalogLoadResult {
    pub source: CatalogSource,
    pub objects: Vec<CelestialObject>,
    pub skipped: usize,
}

impl CatalogLoadResult {
    fn from_outcome(source: CatalogSource, outcome: CatalogParseOutcome) -> Self {
        Self {
            source,
            objects: outcome.objects,
            skipped: outcome.skipped,
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Resolves and loads the star catalog.
///
/// Resolution order:
/// 1. the explicit path, when one is set (missing is an error)
/// 2. `<data_dir>/hygdata_v42.csv`
/// 3. `<data_dir>/hygdata_v42.csv.gz`
/// 4. the fallback table, when allowed
///
/// The magnitude ceiling applies to every source, the fallback table
/// included.
#[derive(Debug, Clone)]
pub struct CatalogLoader {
    path: Option<PathBuf>,
    data_dir: PathBuf,
    allow_fallback: bool,
    fallback: &'static [BrightStarEntry],
}

impl Default for CatalogLoader {
    fn default() -> Self {
        Self {
            path: None,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            allow_fallback: true,
            fallback: &BRIGHT_STARS,
        }
    }
}

impl CatalogLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn allow_fallback(mut self, allow: bool) -> Self {
        self.allow_fallback = allow;
        self
    }

    pub fn with_fallback(mut self, table: &'static [BrightStarEntry]) -> Self {
        self.fallback = table;
        self
    }

    /// Finds the catalog file to read, if any.
    pub fn resolve(&self) -> Option<PathBuf> {
        if let Some(ref path) = self.path {
            return path.exists().then(|| path.clone());
        }
        [CATALOG_FILE_NAME, CATALOG_GZ_FILE_NAME]
            .iter()
            .map(|name| self.data_dir.join(name))
            .find(|candidate| candidate.exists())
    }

    /// Loads objects with `magnitude <= magnitude_limit`.
    ///
    /// # Errors
    ///
    /// `FixtureError::CatalogUnavailable` (downcastable from the returned
    /// error) when nothing can be read and the fallback is disabled, or when
    /// an explicit path does not exist. Read failures of an existing file are
    /// returned with context.
    pub fn load(&self, magnitude_limit: f64) -> Result<CatalogLoadResult> {
        if let Some(path) = self.resolve() {
            let result = Self::load_from_file(&path, magnitude_limit)?;
            info!(
                "Loaded {} objects from {} (mag <= {}, {} rows skipped)",
                result.len(),
                path.display(),
                magnitude_limit,
                result.skipped
            );
            return Ok(result);
        }

        let searched = self
            .path
            .clone()
            .unwrap_or_else(|| self.data_dir.join(CATALOG_FILE_NAME));

        if self.path.is_some() || !self.allow_fallback {
            return Err(FixtureError::catalog_unavailable(&searched).into());
        }

        warn!(
            "Star catalog not found at {}, using {} built-in bright stars",
            searched.display(),
            self.fallback.len()
        );
        Ok(Self::load_fallback(self.fallback, magnitude_limit))
    }

    /// Load a catalog file (auto-detects plain or gzip CSV)
    pub fn load_from_file(path: &Path, magnitude_limit: f64) -> Result<CatalogLoadResult> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .context("Catalog file has no extension")?;

        match extension.to_lowercase().as_str() {
            "csv" => {
                let outcome = catalog_parser::parse_catalog_csv(path, magnitude_limit)
                    .context("Failed to parse catalog CSV")?;
                Ok(CatalogLoadResult::from_outcome(
                    CatalogSource::Csv(path.to_path_buf()),
                    outcome,
                ))
            }
            "gz" => {
                let outcome = catalog_parser::parse_catalog_csv_gz(path, magnitude_limit)
                    .context("Failed to parse compressed catalog CSV")?;
                Ok(CatalogLoadResult::from_outcome(
                    CatalogSource::GzipCsv(path.to_path_buf()),
                    outcome,
                ))
            }
            _ => anyhow::bail!("Unsupported catalog format: {}", extension),
        }
    }

    /// The fallback table filtered by the magnitude ceiling.
    pub fn load_fallback(table: &[BrightStarEntry], magnitude_limit: f64) -> CatalogLoadResult {
        CatalogLoadResult {
            source: CatalogSource::Fallback,
            objects: table
                .iter()
                .filter(|entry| entry.magnitude <= magnitude_limit)
                .map(BrightStarEntry::to_object)
                .collect(),
            skipped: 0,
        }
    }
}
