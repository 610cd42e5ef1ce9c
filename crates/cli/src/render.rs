use image::{imageops::FilterType, DynamicImage, Rgba};

use pico_detect::Detection;

/// Number of octaves `build_pyramid` produces: level 0 is full
/// resolution, level `i` is downsampled by `1 << i`.
pub const PYRAMID_LEVELS: u32 = 5;

/// Owned grayscale buffer for one pyramid level, paired with its
/// dimensions.
pub struct PyramidBuffer {
    pub pixels: Vec<u8>,
    pub rows: usize,
    pub cols: usize,
}

/// Builds a `PYRAMID_LEVELS`-level grayscale pyramid from `original`:
/// level 0 is the full-resolution frame, levels 1..4 are linearly
/// resampled down by successive octaves via `image::imageops::resize`.
/// A level whose side would shrink below 1px is skipped.
pub fn build_pyramid(original: &DynamicImage) -> Vec<PyramidBuffer> {
    let full = original.to_luma8();
    let (full_w, full_h) = full.dimensions();

    let mut levels = Vec::new();
    for octave in 0..PYRAMID_LEVELS {
        let w = full_w >> octave;
        let h = full_h >> octave;
        if w < 1 || h < 1 {
            break;
        }

        let luma = if octave == 0 {
            full.clone()
        } else {
            image::imageops::resize(&full, w, h, FilterType::Triangle)
        };

        let (cols, rows) = luma.dimensions();
        levels.push(PyramidBuffer {
            pixels: luma.into_raw(),
            rows: rows as usize,
            cols: cols as usize,
        });
    }

    levels
}

/// A decoded frame: an owned grayscale buffer (what the cascade scans)
/// plus the original image (what gets annotated and saved).
pub struct Frame {
    pub gray: Vec<u8>,
    pub rows: usize,
    pub cols: usize,
    pub original: DynamicImage,
}

pub fn load(path: &std::path::Path) -> Result<Frame, pico_error::DetectError> {
    let original =
        image::open(path).map_err(|e| pico_error::DetectError::ImageDecode(e.to_string()))?;
    let luma = original.to_luma8();
    let (cols, rows) = luma.dimensions();
    Ok(Frame {
        gray: luma.into_raw(),
        rows: rows as usize,
        cols: cols as usize,
        original,
    })
}

/// Draws a square outline around every detection's bounding box (side
/// `size`, centered at `(row, col)`) and writes the result to `path`.
pub fn save_annotated(
    frame: &Frame,
    detections: &[Detection],
    path: &std::path::Path,
) -> Result<(), pico_error::DetectError> {
    let mut canvas = frame.original.to_rgba8();
    let color = Rgba([255, 0, 0, 255]);

    for d in detections {
        let half = d.size / 2.0;
        let top = (d.row - half).round() as i64;
        let left = (d.col - half).round() as i64;
        let bottom = (d.row + half).round() as i64;
        let right = (d.col + half).round() as i64;
        draw_rect_outline(&mut canvas, left, top, right, bottom, color);
    }

    canvas
        .save(path)
        .map_err(|e| pico_error::DetectError::ImageDecode(e.to_string()))
}

fn draw_rect_outline(
    canvas: &mut image::RgbaImage,
    left: i64,
    top: i64,
    right: i64,
    bottom: i64,
    color: Rgba<u8>,
) {
    let (w, h) = (canvas.width() as i64, canvas.height() as i64);
    let in_bounds = |x: i64, y: i64| x >= 0 && y >= 0 && x < w && y < h;

    let mut x = left;
    while x <= right {
        if in_bounds(x, top) {
            canvas.put_pixel(x as u32, top as u32, color);
        }
        if in_bounds(x, bottom) {
            canvas.put_pixel(x as u32, bottom as u32, color);
        }
        x += 1;
    }
    let mut y = top;
    while y <= bottom {
        if in_bounds(left, y) {
            canvas.put_pixel(left as u32, y as u32, color);
        }
        if in_bounds(right, y) {
            canvas.put_pixel(right as u32, y as u32, color);
        }
        y += 1;
    }
}
