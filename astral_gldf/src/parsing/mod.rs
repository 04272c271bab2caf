//! Parsers for star catalog input.
//!
//! # Parsers
//!
//! - [`catalog_parser`]: Parse HYG-format star catalog CSV (plain or gzip)
//!
//! # Example
//!
//! ```no_run
//! use astral_gldf::parsing::catalog_parser::parse_catalog_csv;
//! use std::path::Path;
//!
//! let outcome = parse_catalog_csv(Path::new("data/hygdata_v42.csv"), 6.5)
//!     .expect("Failed to parse catalog");
//! println!("{} stars, {} rows skipped", outcome.objects.len(), outcome.skipped);
//! ```

pub mod catalog_parser;


pub use catalog_parser::{CatalogParseOutcome, HygRow};
