//! Container packaging.

pub mod blob;
pub mod container;

pub use blob::{BlobSource, FileBlob, InMemoryBlob};
pub use container::{Container, ContainerEntry, Folder};
