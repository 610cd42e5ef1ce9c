use thiserror::Error;

/// Errors surfaced by the cascade loader, evaluator, and host shim.
///
/// Rejection of an individual window (out-of-bounds sample, stage
/// threshold miss) is not an error — see `pico_cascade::Evaluation`.
/// Neither is a full output buffer in the scanner. Only conditions that
/// make the whole call meaningless are represented here.
#[derive(Error, Debug)]
pub enum DetectError {
    /// The cascade blob failed the size-arithmetic check, or declares a
    /// `tdepth`/`ntrees` that makes the layout nonsensical.
    #[error("malformed cascade: {0}")]
    MalformedCascade(String),

    /// Image or scan geometry violates a precondition of `find_objects`.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// I/O failure reading a cascade or image file (host shim only).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding failure (host shim only).
    #[error("failed to decode image: {0}")]
    ImageDecode(String),

    /// Malformed TOML configuration file (host shim only).
    #[error("invalid configuration: {0}")]
    Config(String),
}
