use serde::Deserialize;

use pico_detect::DetectParams;

/// On-disk TOML mirror of `DetectParams`. Every field is optional so a
/// config file only needs to override what differs from the defaults;
/// CLI flags layered on top of this override it again.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub min_size: Option<f32>,
    pub max_size: Option<f32>,
    pub angle: Option<f32>,
    pub scale_factor: Option<f32>,
    pub stride_factor: Option<f32>,
    pub qthreshold: Option<f32>,
    pub use_pyramid: Option<bool>,
    pub no_clustering: Option<bool>,
    pub cap: Option<usize>,
}

impl FileConfig {
    pub fn load(path: &std::path::Path) -> Result<FileConfig, pico_error::DetectError> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| pico_error::DetectError::Config(e.to_string()))
    }

    /// Applies file values over `base`, where `base` is already the
    /// crate's documented default.
    pub fn apply(self, base: DetectParams) -> DetectParams {
        DetectParams {
            min_size: self.min_size.unwrap_or(base.min_size),
            max_size: self.max_size.unwrap_or(base.max_size),
            angle: self.angle.unwrap_or(base.angle),
            scale_factor: self.scale_factor.unwrap_or(base.scale_factor),
            stride_factor: self.stride_factor.unwrap_or(base.stride_factor),
            qthreshold: self.qthreshold.unwrap_or(base.qthreshold),
            use_pyramid: self.use_pyramid.unwrap_or(base.use_pyramid),
            no_clustering: self.no_clustering.unwrap_or(base.no_clustering),
            cap: self.cap.or(base.cap),
        }
    }
}
