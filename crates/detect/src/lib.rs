//! Multi-scale scanning, pyramid driving, and clustering for a
//! `pico_cascade::Cascade`.

mod cluster;
mod params;
mod pyramid;
mod scanner;

pub use cluster::cluster_detections;
pub use params::DetectParams;
pub use pyramid::{level_size_range, scan_pyramid, PyramidLevel};
pub use scanner::{find_objects, Detection};

pub use pico_error::DetectError;
