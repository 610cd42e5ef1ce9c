use pico_cascade::{Cascade, Evaluation, Image, Window};
use pico_error::DetectError;

use crate::params::DetectParams;

/// One accepted window, in the coordinate space of the image it was
/// evaluated against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub row: f32,
    pub col: f32,
    pub size: f32,
    pub confidence: f32,
}

/// Scans `image` with `cascade` across every size in
/// `[params.min_size, params.max_size]`, growing by `scale_factor` each
/// step, with a stride of `size * stride_factor` pixels in both axes.
///
/// Detections are returned in scan order: ascending size, then row-major
/// within a size. Callers relying on deterministic ordering (the cluster
/// engine) depend on this.
///
/// `params` is validated internally (§7's `InvalidGeometry` conditions —
/// `scale_factor <= 1`, `stride_factor <= 0`, etc.) rather than trusted
/// to every caller: an unvalidated `scale_factor <= 1` would otherwise
/// make the size schedule loop forever.
pub fn find_objects(
    cascade: &Cascade,
    image: &Image,
    params: &DetectParams,
) -> Result<Vec<Detection>, DetectError> {
    params.validate()?;

    let sizes = size_schedule(params);
    let cap = params.cap.unwrap_or(usize::MAX);

    #[cfg(feature = "parallel-scan")]
    let mut out: Vec<Detection> = {
        use rayon::prelude::*;
        let mut out: Vec<Detection> = sizes
            .par_iter()
            .map(|&size| scan_one_size(cascade, image, params.angle, params.stride_factor, size))
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
            .collect();
        out.sort_by(|a, b| {
            a.size
                .partial_cmp(&b.size)
                .unwrap()
                .then(a.row.partial_cmp(&b.row).unwrap())
                .then(a.col.partial_cmp(&b.col).unwrap())
        });
        out
    };

    #[cfg(not(feature = "parallel-scan"))]
    let mut out: Vec<Detection> = Vec::new();
    #[cfg(not(feature = "parallel-scan"))]
    {
        'scan: for size in sizes {
            for d in scan_one_size(cascade, image, params.angle, params.stride_factor, size) {
                out.push(d);
                if out.len() >= cap {
                    break 'scan;
                }
            }
        }
    }

    out.truncate(cap);
    Ok(out)
}

fn size_schedule(params: &DetectParams) -> Vec<f32> {
    let mut sizes = Vec::new();
    let mut size = params.min_size;
    while size <= params.max_size {
        sizes.push(size);
        size *= params.scale_factor;
    }
    sizes
}

fn scan_one_size(
    cascade: &Cascade,
    image: &Image,
    angle: f32,
    stride_factor: f32,
    size: f32,
) -> Vec<Detection> {
    let mut out = Vec::new();
    let stride = (size * stride_factor).round_ties_even().max(1.0);
    let half = size / 2.0;

    let mut row = half;
    while row + half <= image.rows() as f32 {
        let mut col = half;
        while col + half <= image.cols() as f32 {
            let window = Window::new(row, col, size, angle);
            if let Evaluation::Accepted { confidence } = cascade.evaluate(image, &window) {
                out.push(Detection {
                    row,
                    col,
                    size,
                    confidence,
                });
            }
            col += stride;
        }
        row += stride;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accept_all_cascade() -> Cascade {
        // tdepth = 0: one constant leaf per tree, threshold always met.
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1.0f32.to_le_bytes());
        bytes.extend_from_slice(&1.0f32.to_le_bytes());
        bytes.extend_from_slice(&0i32.to_le_bytes());
        bytes.extend_from_slice(&1i32.to_le_bytes());
        bytes.extend_from_slice(&0.0f32.to_le_bytes()); // single leaf
        bytes.extend_from_slice(&(-1000.0f32).to_le_bytes()); // threshold
        Cascade::load(&bytes).unwrap()
    }

    #[test]
    fn s4_single_scale_window_count() {
        let cascade = accept_all_cascade();
        let pixels = vec![0u8; 100 * 100];
        let image = Image::new(&pixels, 100, 100, 100).unwrap();

        let size = 20.0f32;
        let stride_factor = 0.1f32;
        let params = DetectParams {
            min_size: size,
            max_size: size,
            stride_factor,
            cap: None,
            ..DetectParams::default()
        };

        let detections = find_objects(&cascade, &image, &params).unwrap();

        let delta = (size * stride_factor).round_ties_even().max(1.0);
        let per_axis = |extent: f32| -> usize { ((extent - size) / delta).floor() as usize + 1 };
        let expected = per_axis(100.0) * per_axis(100.0);

        assert_eq!(detections.len(), expected);
    }

    #[test]
    fn s6_cap_truncates_without_panicking() {
        let cascade = accept_all_cascade();
        let pixels = vec![0u8; 200 * 200];
        let image = Image::new(&pixels, 200, 200, 200).unwrap();

        let params = DetectParams {
            min_size: 20.0,
            max_size: 40.0,
            cap: Some(1),
            ..DetectParams::default()
        };

        let detections = find_objects(&cascade, &image, &params).unwrap();
        assert_eq!(detections.len(), 1);
    }

    #[test]
    fn scan_order_is_ascending_size_then_row_then_col() {
        let cascade = accept_all_cascade();
        let pixels = vec![0u8; 60 * 60];
        let image = Image::new(&pixels, 60, 60, 60).unwrap();

        let params = DetectParams {
            min_size: 10.0,
            max_size: 20.0,
            stride_factor: 0.5,
            cap: None,
            ..DetectParams::default()
        };

        let detections = find_objects(&cascade, &image, &params).unwrap();
        for pair in detections.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let ordering = a
                .size
                .partial_cmp(&b.size)
                .unwrap()
                .then(a.row.partial_cmp(&b.row).unwrap())
                .then(a.col.partial_cmp(&b.col).unwrap());
            assert_ne!(ordering, std::cmp::Ordering::Greater);
        }
    }

    #[test]
    fn rejects_non_advancing_scale_factor_instead_of_looping_forever() {
        let cascade = accept_all_cascade();
        let pixels = vec![0u8; 20 * 20];
        let image = Image::new(&pixels, 20, 20, 20).unwrap();

        let params = DetectParams {
            scale_factor: 1.0,
            ..DetectParams::default()
        };

        assert!(find_objects(&cascade, &image, &params).is_err());
    }
}
