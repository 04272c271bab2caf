//! Synthetic photometric fixture generator.
//!
//! Turns star catalog rows and LED series definitions into GLDF product
//! archives: IES TM-33 photometric files, a validated `product.xml`, and
//! auxiliary payloads packed into one zip container.
//!
//! # Example
//!
//! ```no_run
//! use astral_gldf::io::loaders::CatalogLoader;
//! use astral_gldf::pipeline::{SkyPipeline, SkyPipelineConfig, SkyRequest};
//! use chrono::Utc;
//!
//! let pipeline = SkyPipeline::new(SkyPipelineConfig::default(), CatalogLoader::new());
//! let request = SkyRequest::new("Lüdinghausen", 51.77, 7.44, Utc::now());
//! let run = pipeline.run(&request).expect("sky run failed");
//! println!("{} stars, checksum {}", run.photometric.len(), run.container.checksum());
//! ```

pub mod composer;
pub mod config;
pub mod core;
pub mod error;
pub mod formats;
pub mod io;
pub mod packaging;
pub mod parsing;
pub mod pipeline;
pub mod radiometry;
pub mod time;
pub mod transformations;

pub use error::{ErrorContext, FixtureError, FixtureResult};
