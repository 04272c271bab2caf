//! End-to-end fixture generation runs.
//!
//! - [`sky`]: catalog, observer and instant to one night-sky archive
//! - [`luminaire`]: the LED series in shared-base and per-CCT spectral form

pub mod luminaire;
pub mod sky;

pub use luminaire::{run_series, BaseAssets, LuminaireMode, LuminaireSeries};
pub use sky::{output_file_name, SkyPipeline, SkyPipelineConfig, SkyRequest, SkyRun};
