/// Scan and clustering parameters, shared by the pyramid driver, the
/// scanner, and the cluster engine. Defaults mirror the reference PICO
/// driver's command-line defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectParams {
    /// Smallest window side, in pixels, the scanner will test.
    pub min_size: f32,
    /// Largest window side, in pixels, the scanner will test.
    pub max_size: f32,
    /// Rotation applied to every window, in turns (0.0..1.0).
    pub angle: f32,
    /// Ratio between consecutive window sizes in the scan schedule.
    /// Must be strictly greater than 1.0.
    pub scale_factor: f32,
    /// Window stride as a fraction of the current window size.
    pub stride_factor: f32,
    /// Minimum accepted confidence; applied by the caller as a
    /// post-filter, never inside the scanner or cluster engine.
    pub qthreshold: f32,
    /// When set, the caller drives the scan across a supplied image
    /// pyramid instead of a single full-resolution image.
    pub use_pyramid: bool,
    /// When set, raw detections are returned unclustered.
    pub no_clustering: bool,
    /// Maximum number of raw detections `find_objects` will collect
    /// before stopping the scan early. `None` means unbounded.
    pub cap: Option<usize>,
}

impl Default for DetectParams {
    fn default() -> DetectParams {
        DetectParams {
            min_size: 128.0,
            max_size: 1024.0,
            angle: 0.0,
            scale_factor: 1.1,
            stride_factor: 0.1,
            qthreshold: 5.0,
            use_pyramid: false,
            no_clustering: false,
            cap: Some(2048),
        }
    }
}

impl DetectParams {
    /// Checks the invariants the scanner and pyramid driver rely on.
    pub fn validate(&self) -> Result<(), pico_error::DetectError> {
        if self.min_size <= 0.0 {
            return Err(pico_error::DetectError::InvalidGeometry(format!(
                "min_size must be positive, got {}",
                self.min_size
            )));
        }
        if self.max_size < self.min_size {
            return Err(pico_error::DetectError::InvalidGeometry(format!(
                "max_size {} is smaller than min_size {}",
                self.max_size, self.min_size
            )));
        }
        if self.scale_factor <= 1.0 {
            return Err(pico_error::DetectError::InvalidGeometry(format!(
                "scale_factor must exceed 1.0, got {}",
                self.scale_factor
            )));
        }
        if self.stride_factor <= 0.0 {
            return Err(pico_error::DetectError::InvalidGeometry(format!(
                "stride_factor must be positive, got {}",
                self.stride_factor
            )));
        }
        Ok(())
    }
}
