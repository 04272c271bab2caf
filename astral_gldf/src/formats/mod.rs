//! Text formats written into fixture containers.

pub mod autolisp;
pub mod sky_json;
pub mod tm33;
pub mod xml;

pub use sky_json::{SkyLocation, SkyStar, SkySummary};
pub use xml::{XmlError, XmlEventsExt};
