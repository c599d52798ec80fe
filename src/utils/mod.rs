pub mod format;
pub mod location;

pub use location::{bbox_for_location, center_for_location, DEFAULT_VIENNA_BBOX, VIENNA_CENTER};
