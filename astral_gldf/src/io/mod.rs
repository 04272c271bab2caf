//! High-level data loading utilities.
//!
//! Loaders combine file discovery, format detection and parsing, and fall
//! back to the built-in bright star table when no catalog file exists.
//!
//! # Example
//!
//! ```no_run
//! use astral_gldf::io::loaders::CatalogLoader;
//!
//! let result = CatalogLoader::new().load(6.5).expect("Failed to load");
//! println!("Loaded {} stars from {:?}", result.objects.len(), result.source);
//! ```

pub mod loaders;


pub use loaders::{CatalogLoadResult, CatalogLoader, CatalogSource};
