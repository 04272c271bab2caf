//! Error types for fixture generation.
//!
//! Only structural and resource failures surface as errors. Malformed catalog
//! rows are skipped and numeric degeneracies are clamped where they occur, so
//! neither has a variant here.

use std::fmt;
use std::path::{Path, PathBuf};

/// Result type for fixture generation operations
pub type FixtureResult<T> = Result<T, FixtureError>;

/// Structured context attached to fixture errors.
///
/// Records where the failure happened and which resource or entity was
/// involved, so a failed run can be diagnosed from the message alone.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation being performed (e.g., "load_catalog", "write_archive")
    pub operation: Option<String>,
    /// The entity kind involved (e.g., "emitter", "file")
    pub entity: Option<String>,
    /// The entity id if applicable
    pub entity_id: Option<String>,
    /// Filesystem path of the resource involved
    pub path: Option<PathBuf>,
    /// Additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with an operation name.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    /// Set the entity kind.
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Set the entity id.
    pub fn with_entity_id(mut self, id: impl ToString) -> Self {
        self.entity_id = Some(id.to_string());
        self
    }

    /// Set the resource path.
    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set additional details.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(ref op) = self.operation {
            parts.push(format!("operation={}", op));
        }
        if let Some(ref entity) = self.entity {
            parts.push(format!("entity={}", entity));
        }
        if let Some(ref id) = self.entity_id {
            parts.push(format!("id={}", id));
        }
        if let Some(ref path) = self.path {
            parts.push(format!("path={}", path.display()));
        }
        if let Some(ref details) = self.details {
            parts.push(format!("details={}", details));
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Error type for fixture generation
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    /// No catalog file could be found and the fallback list is disabled.
    #[error("Catalog unavailable: {}", .path.display())]
    CatalogUnavailable { path: PathBuf },

    /// The catalog file exists but could not be opened or decoded.
    #[error("Catalog read error: {message} {context}")]
    CatalogRead {
        message: String,
        context: ErrorContext,
    },

    /// A composed document failed its reference integrity check.
    #[error("Integrity violation: {message} {context}")]
    IntegrityViolation {
        message: String,
        violations: Vec<String>,
        context: ErrorContext,
    },

    /// Building or writing the container archive failed.
    #[error("Archive error: {message} {context}")]
    Archive {
        message: String,
        context: ErrorContext,
    },

    /// Configuration file or override could not be used.
    #[error("Configuration error: {message} {context}")]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    /// A JSON or text document could not be rendered.
    #[error("Serialization error: {message} {context}")]
    Serialization {
        message: String,
        context: ErrorContext,
    },
}

impl FixtureError {
    /// Create a catalog-unavailable error for the searched path.
    pub fn catalog_unavailable(path: impl AsRef<Path>) -> Self {
        Self::CatalogUnavailable {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create a catalog read error with context.
    pub fn catalog_read(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::CatalogRead {
            message: message.into(),
            context,
        }
    }

    /// Create an integrity violation from the list of failed checks.
    pub fn integrity(violations: Vec<String>, context: ErrorContext) -> Self {
        let message = match violations.len() {
            1 => violations[0].clone(),
            n => format!(
                "{} violations, first: {}",
                n,
                violations.first().map(String::as_str).unwrap_or("")
            ),
        };
        Self::IntegrityViolation {
            message,
            violations,
            context,
        }
    }

    /// Create an archive error with context.
    pub fn archive_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::Archive {
            message: message.into(),
            context,
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create a configuration error with context.
    pub fn configuration_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::Configuration {
            message: message.into(),
            context,
        }
    }

    /// Create a serialization error with context.
    pub fn serialization(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::Serialization {
            message: message.into(),
            context,
        }
    }

    /// Check whether this error is a structural integrity failure.
    pub fn is_integrity_violation(&self) -> bool {
        matches!(self, Self::IntegrityViolation { .. })
    }

    /// The failed checks of an integrity violation, empty otherwise.
    pub fn violations(&self) -> &[String] {
        match self {
            Self::IntegrityViolation { violations, .. } => violations,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_display() {
        let ctx = ErrorContext::new("write_archive")
            .with_entity("file")
            .with_entity_id("ldc/vega.iesxml")
            .with_path("/tmp/out.gldf");
        assert_eq!(
            ctx.to_string(),
            "[operation=write_archive, entity=file, id=ldc/vega.iesxml, path=/tmp/out.gldf]"
        );
    }

    #[test]
    fn test_catalog_unavailable_names_path() {
        let err = FixtureError::catalog_unavailable("data/hygdata_v42.csv");
        assert!(err.to_string().contains("data/hygdata_v42.csv"));
        assert!(!err.is_integrity_violation());
    }

    #[test]
    fn test_integrity_message_summarizes() {
        let err = FixtureError::integrity(
            vec!["a".to_string(), "b".to_string()],
            ErrorContext::new("compose"),
        );
        assert!(err.is_integrity_violation());
        assert_eq!(err.violations().len(), 2);
        assert!(err.to_string().contains("2 violations, first: a"));
    }
}
