mod config;
mod render;

use std::path::PathBuf;

use clap::Parser;

use pico_cascade::{Cascade, Image};
use pico_detect::{cluster_detections, find_objects, scan_pyramid, DetectParams, PyramidLevel};

/// Scan an image for cascade matches and write an annotated copy.
#[derive(Parser, Debug)]
#[command(name = "pico", version, about)]
struct Args {
    /// Path to the binary cascade file.
    #[arg(short = 'f', long = "cascade")]
    cascade: PathBuf,

    /// Input image path.
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// Output image path; the annotated frame is written here.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Optional TOML file of parameter overrides, applied before flags.
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Smallest window side, in pixels.
    #[arg(short = 'm', long = "minsize")]
    min_size: Option<f32>,

    /// Largest window side, in pixels.
    #[arg(short = 'M', long = "maxsize")]
    max_size: Option<f32>,

    /// Rotation applied to every window, in turns.
    #[arg(short = 'a', long = "angle")]
    angle: Option<f32>,

    /// Minimum accepted confidence, applied as a post-filter.
    #[arg(short = 'q', long = "qthreshold")]
    qthreshold: Option<f32>,

    /// Ratio between consecutive scan sizes.
    #[arg(short = 'c', long = "scalefactor")]
    scale_factor: Option<f32>,

    /// Window stride as a fraction of window size.
    #[arg(short = 't', long = "stridefactor")]
    stride_factor: Option<f32>,

    /// Scan a downsampled pyramid instead of full resolution only.
    #[arg(short = 'u', long = "usepyr", default_value_t = false)]
    use_pyramid: bool,

    /// Return raw detections without clustering.
    #[arg(short = 'n', long = "noclustering", default_value_t = false)]
    no_clustering: bool,

    /// Emit per-parameter and per-detection tracing at debug level.
    #[arg(short = 'v', long = "verbose", default_value_t = false)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(filter)
        .init();
}

fn build_params(args: &Args) -> Result<DetectParams, pico_error::DetectError> {
    let mut params = DetectParams::default();
    if let Some(path) = &args.config {
        let file_config = config::FileConfig::load(path)?;
        params = file_config.apply(params);
    }

    if let Some(v) = args.min_size {
        params.min_size = v;
    }
    if let Some(v) = args.max_size {
        params.max_size = v;
    }
    if let Some(v) = args.angle {
        params.angle = v;
    }
    if let Some(v) = args.qthreshold {
        params.qthreshold = v;
    }
    if let Some(v) = args.scale_factor {
        params.scale_factor = v;
    }
    if let Some(v) = args.stride_factor {
        params.stride_factor = v;
    }
    params.use_pyramid = params.use_pyramid || args.use_pyramid;
    params.no_clustering = params.no_clustering || args.no_clustering;

    params.validate()?;
    Ok(params)
}

fn main() -> Result<(), pico_error::DetectError> {
    let args = Args::parse();
    init_logging(args.verbose);

    let params = build_params(&args)?;

    let cascade_bytes = std::fs::read(&args.cascade)?;
    let cascade = Cascade::load(&cascade_bytes)?;

    tracing::info!(
        tsr = cascade.template_rows(),
        tsc = cascade.template_cols(),
        tdepth = cascade.depth(),
        ntrees = cascade.num_trees(),
        min_size = params.min_size,
        max_size = params.max_size,
        angle = params.angle,
        scale_factor = params.scale_factor,
        stride_factor = params.stride_factor,
        qthreshold = params.qthreshold,
        use_pyramid = params.use_pyramid,
        no_clustering = params.no_clustering,
        "loaded cascade and parameters"
    );

    let frame = render::load(&args.input)?;
    let image = Image::new(&frame.gray, frame.rows, frame.cols, frame.cols).ok_or_else(|| {
        pico_error::DetectError::InvalidGeometry("decoded image has an empty dimension".into())
    })?;

    let mut detections = if params.use_pyramid {
        let pyramid = render::build_pyramid(&frame.original);
        let levels: Vec<PyramidLevel> = pyramid
            .iter()
            .enumerate()
            .filter_map(|(octave, level)| {
                Image::new(&level.pixels, level.rows, level.cols, level.cols).map(|image| {
                    PyramidLevel {
                        image,
                        octave: octave as u32,
                    }
                })
            })
            .collect();
        tracing::debug!(levels = levels.len(), "scanning image pyramid");
        scan_pyramid(&cascade, &levels, &params)?
    } else {
        find_objects(&cascade, &image, &params)?
    };
    if !params.no_clustering {
        detections = cluster_detections(&detections);
    }
    detections.retain(|d| d.confidence >= params.qthreshold);

    tracing::info!(count = detections.len(), "detections after filtering");
    for d in &detections {
        tracing::debug!(row = d.row, col = d.col, size = d.size, confidence = d.confidence, "detection");
    }

    if let Some(output) = &args.output {
        render::save_annotated(&frame, &detections, output)?;
    }

    Ok(())
}
