//! Coordinate transformations from the equatorial frame to the local horizon.

pub mod horizon;
#[cfg(feature = "precise-ephemeris")]
pub mod precise;

pub use horizon::{
    precise_available, select_transform, visible_objects, ApproximateTransform,
    EphemerisStrategy, HorizonTransform,
};
#[cfg(feature = "precise-ephemeris")]
pub use precise::PreciseTransform;
