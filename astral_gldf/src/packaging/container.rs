//! GLDF container assembly and archive I/O.
//!
//! Layout inside the archive:
//!
//! ```text
//! product.xml
//! ldc/        photometric files
//! image/      images
//! geometry/   geometry models
//! other/      auxiliary payloads, copied byte-for-byte
//! ```

use std::fs;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use log::{debug, info};
use sha2::{Digest, Sha256};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::blob::BlobSource;
use crate::composer::document::ProductDocument;
use crate::composer::product_xml::PRODUCT_XML_PATH;
use crate::error::{ErrorContext, FixtureError, FixtureResult};

/// Upper bound on the buffer reserved up front for one archive entry.
///
/// The declared size comes from the archive header and is not trusted.
const MAX_ENTRY_PREALLOCATION: u64 = 64 << 20;

/// Top-level folder of a container entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Folder {
    Photometry,
    Image,
    Geometry,
    Other,
}

impl Folder {
    pub fn prefix(&self) -> &'static str {
        match self {
            Folder::Photometry => "ldc",
            Folder::Image => "image",
            Folder::Geometry => "geometry",
            Folder::Other => "other",
        }
    }

    /// Archive path of `name` inside this folder.
    pub fn path(&self, name: &str) -> String {
        format!("{}/{}", self.prefix(), name)
    }
}

/// One named payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerEntry {
    pub path: String,
    pub bytes: Vec<u8>,
}

/// Ordered set of named payloads ready for archival.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Container {
    entries: Vec<ContainerEntry>,
}

impl Container {
    /// Starts a container whose first entry is the given `product.xml` text.
    pub fn new(product_xml: impl Into<Vec<u8>>) -> Self {
        Self {
            entries: vec![ContainerEntry {
                path: PRODUCT_XML_PATH.to_string(),
                bytes: product_xml.into(),
            }],
        }
    }

    /// Renders `document` and starts a container with it.
    pub fn from_document(document: &ProductDocument) -> FixtureResult<Self> {
        Ok(Self::new(document.to_xml()?))
    }

    /// Adds `bytes` as `<folder>/<name>`.
    ///
    /// # Errors
    ///
    /// `FixtureError::Archive` when the name is empty, absolute or climbs out
    /// of the folder, or when the path is already taken.
    pub fn add_entry(
        &mut self,
        folder: Folder,
        name: &str,
        bytes: impl Into<Vec<u8>>,
    ) -> FixtureResult<()> {
        validate_name(name)?;
        self.push(folder.path(name), bytes.into())
    }

    /// Copies an opaque payload under `other/`.
    pub fn add_blob(&mut self, blob: &dyn BlobSource) -> FixtureResult<()> {
        let bytes = blob.bytes()?;
        debug!(
            "Passing through blob {} ({} bytes)",
            blob.name(),
            bytes.len()
        );
        self.add_entry(Folder::Other, blob.name(), bytes)
    }

    fn push(&mut self, path: String, bytes: Vec<u8>) -> FixtureResult<()> {
        if self.entry(&path).is_some() {
            return Err(FixtureError::archive_with_context(
                "Duplicate entry path",
                ErrorContext::new("add_entry")
                    .with_entity("entry")
                    .with_entity_id(&path),
            ));
        }
        self.entries.push(ContainerEntry { path, bytes });
        Ok(())
    }

    pub fn entries(&self) -> &[ContainerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, path: &str) -> Option<&ContainerEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    /// The `product.xml` payload, if present.
    pub fn product_xml(&self) -> Option<&[u8]> {
        self.entry(PRODUCT_XML_PATH).map(|e| e.bytes.as_slice())
    }

    pub fn total_bytes(&self) -> usize {
        self.entries.iter().map(|e| e.bytes.len()).sum()
    }

    /// SHA-256 over entry paths and payloads, in order.
    pub fn checksum(&self) -> String {
        let mut hasher = Sha256::new();
        for entry in &self.entries {
            hasher.update(entry.path.as_bytes());
            hasher.update([0u8]);
            hasher.update((entry.bytes.len() as u64).to_le_bytes());
            hasher.update(&entry.bytes);
        }
        hex::encode(hasher.finalize())
    }

    /// Writes the archive into `writer` and hands it back.
    ///
    /// Every entry is deflated and stamped 1980-01-01 00:00, so identical
    /// containers produce identical archives.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> FixtureResult<W> {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default());

        let mut zip = ZipWriter::new(writer);
        for entry in &self.entries {
            let context = || {
                ErrorContext::new("write_archive")
                    .with_entity("entry")
                    .with_entity_id(&entry.path)
            };
            zip.start_file(entry.path.as_str(), options).map_err(|e| {
                FixtureError::archive_with_context(e.to_string(), context())
            })?;
            zip.write_all(&entry.bytes).map_err(|e| {
                FixtureError::archive_with_context(e.to_string(), context())
            })?;
        }
        zip.finish().map_err(|e| {
            FixtureError::archive_with_context(e.to_string(), ErrorContext::new("finish_archive"))
        })
    }

    /// Archive bytes in memory.
    pub fn to_bytes(&self) -> FixtureResult<Vec<u8>> {
        Ok(self.write_to(Cursor::new(Vec::new()))?.into_inner())
    }

    /// Writes the archive to `path`, creating parent directories.
    ///
    /// Returns the archive size in bytes.
    pub fn write_file(&self, path: impl AsRef<Path>) -> FixtureResult<usize> {
        let path = path.as_ref();
        let context = || ErrorContext::new("write_archive").with_path(path);

        let bytes = self.to_bytes()?;
        let parent = path.parent().unwrap_or(Path::new(""));
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                FixtureError::archive_with_context(e.to_string(), context())
            })?;
        }
        fs::write(path, &bytes).map_err(|e| {
            FixtureError::archive_with_context(e.to_string(), context())
        })?;

        info!(
            "Wrote {} ({} entries, {} bytes, sha256 {})",
            path.display(),
            self.len(),
            bytes.len(),
            self.checksum()
        );
        Ok(bytes.len())
    }

    /// Reads every file entry of an existing archive, in archive order.
    pub fn read_archive(path: impl AsRef<Path>) -> FixtureResult<Self> {
        let path = path.as_ref();
        let file = fs::File::open(path).map_err(|e| {
            FixtureError::archive_with_context(
                e.to_string(),
                ErrorContext::new("read_archive").with_path(path),
            )
        })?;
        Self::read_from(file).map_err(|e| match e {
            FixtureError::Archive { message, context } => FixtureError::Archive {
                message,
                context: context.with_path(path),
            },
            other => other,
        })
    }

    /// Reads every file entry from an archive reader.
    pub fn read_from<R: Read + Seek>(reader: R) -> FixtureResult<Self> {
        let archive_error = |e: zip::result::ZipError| {
            FixtureError::archive_with_context(e.to_string(), ErrorContext::new("read_archive"))
        };

        let mut archive = ZipArchive::new(reader).map_err(archive_error)?;
        let mut entries = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let mut file = archive.by_index(index).map_err(archive_error)?;
            if file.is_dir() {
                continue;
            }
            let mut bytes = Vec::with_capacity(entry_capacity(file.size()));
            file.read_to_end(&mut bytes).map_err(|e| {
                FixtureError::archive_with_context(
                    e.to_string(),
                    ErrorContext::new("read_archive").with_entity_id(file.name()),
                )
            })?;
            entries.push(ContainerEntry {
                path: file.name().to_string(),
                bytes,
            });
        }

        debug!("Read archive with {} entries", entries.len());
        Ok(Self { entries })
    }
}

fn entry_capacity(declared_size: u64) -> usize {
    declared_size.min(MAX_ENTRY_PREALLOCATION) as usize
}

fn validate_name(name: &str) -> FixtureResult<()> {
    let bad = name.is_empty()
        || name.starts_with('/')
        || name.contains('\\')
        || name
            .split('/')
            .any(|part| part.is_empty() || part == "." || part == "..");
    if bad {
        return Err(FixtureError::archive_with_context(
            "Invalid entry name",
            ErrorContext::new("add_entry").with_entity_id(name),
        ));
    }
    Ok(())
}
