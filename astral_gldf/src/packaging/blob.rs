//! Opaque payloads copied into a container without inspection.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ErrorContext, FixtureError, FixtureResult};

/// A named byte payload.
///
/// The container never looks inside; whatever `bytes` returns is stored as
/// is under the auxiliary folder. `name` is relative to that folder and may
/// contain `/` separators.
pub trait BlobSource {
    fn name(&self) -> &str;

    fn bytes(&self) -> FixtureResult<Vec<u8>>;
}

/// Payload held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InMemoryBlob {
    name: String,
    bytes: Vec<u8>,
}

impl InMemoryBlob {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

impl BlobSource for InMemoryBlob {
    fn name(&self) -> &str {
        &self.name
    }

    fn bytes(&self) -> FixtureResult<Vec<u8>> {
        Ok(self.bytes.clone())
    }
}

/// Payload read from disk when the container asks for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBlob {
    name: String,
    path: PathBuf,
}

impl FileBlob {
    pub fn new(name: impl Into<String>, path: impl AsRef<Path>) -> Self {
        Self {
            name: name.into(),
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BlobSource for FileBlob {
    fn name(&self) -> &str {
        &self.name
    }

    fn bytes(&self) -> FixtureResult<Vec<u8>> {
        fs::read(&self.path).map_err(|e| {
            FixtureError::archive_with_context(
                e.to_string(),
                ErrorContext::new("read_blob")
                    .with_entity("blob")
                    .with_entity_id(&self.name)
                    .with_path(&self.path),
            )
        })
    }
}
