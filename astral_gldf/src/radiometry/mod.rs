//! Synthetic radiometric model.
//!
//! Pure functions of their inputs: temperature estimation, spectral curves,
//! angular intensity grids and color metric proxies, composed into
//! [`PhotometricRecord`]s.

pub mod angular;
pub mod color;
pub mod record;
pub mod spectrum;
pub mod temperature;

pub use angular::AngularIntensityGrid;
pub use color::ColorMetrics;
pub use record::{LuminaireProfile, PhotometricRecord, Symmetry};
pub use spectrum::{SpectralCurve, SpectralSample};
pub use temperature::{estimate_temperature, object_temperature, temperature_from_color_index};
