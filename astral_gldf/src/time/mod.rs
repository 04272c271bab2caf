pub mod epoch;

pub use epoch::{
    days_since_j2000, j2000_epoch, julian_day, modified_julian_day, parse_instant,
    J2000_JULIAN_DAY,
};
