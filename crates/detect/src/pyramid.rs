use pico_cascade::{Cascade, Image};
use pico_error::DetectError;

use crate::params::DetectParams;
use crate::scanner::{find_objects, Detection};

/// One level of a caller-supplied image pyramid: the downsampled image
/// plus the integer octave it was downsampled by (level 0 is full
/// resolution, level `i` is downsampled by `1 << i`).
pub struct PyramidLevel<'a> {
    pub image: Image<'a>,
    pub octave: u32,
}

/// Per-octave size clamp: level 0 always starts at `max(16, min_size)`;
/// levels 1-4 narrow the window toward the range where that octave adds
/// resolution the base level can't reach, `max(64, min_size >> i)` to
/// `min(128, max_size >> i)`. The driver does not resize images itself —
/// it only clamps the size range it scans at each supplied level.
pub fn level_size_range(level: &PyramidLevel, params: &DetectParams) -> (f32, f32) {
    let shift = |v: f32, amount: u32| -> f32 {
        ((v as i64) >> amount.min(62)).max(0) as f32
    };

    if level.octave == 0 {
        (16.0_f32.max(params.min_size), 128.0_f32.min(params.max_size))
    } else {
        let lo = 64.0_f32.max(shift(params.min_size, level.octave));
        let hi = 128.0_f32.min(shift(params.max_size, level.octave)).max(lo);
        (lo, hi)
    }
}

/// Runs `find_objects` once per pyramid level with the level's clamped
/// size range, then rescales every detection back to full-resolution
/// coordinates by multiplying by `1 << octave`.
pub fn scan_pyramid(
    cascade: &Cascade,
    levels: &[PyramidLevel],
    params: &DetectParams,
) -> Result<Vec<Detection>, DetectError> {
    let mut out = Vec::new();
    for level in levels {
        let (min_size, max_size) = level_size_range(level, params);
        if min_size > max_size {
            continue;
        }
        let level_params = DetectParams {
            min_size,
            max_size,
            ..params.clone()
        };
        let factor = (1u32 << level.octave) as f32;
        out.extend(
            find_objects(cascade, &level.image, &level_params)?
                .into_iter()
                .map(|d| Detection {
                    row: d.row * factor,
                    col: d.col * factor,
                    size: d.size * factor,
                    confidence: d.confidence,
                }),
        );
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(octave: u32, pixels: &[u8], side: usize) -> PyramidLevel<'_> {
        PyramidLevel {
            image: Image::new(pixels, side, side, side).unwrap(),
            octave,
        }
    }

    #[test]
    fn level_zero_clamps_to_16_and_128() {
        let pixels = vec![0u8; 4];
        let params = DetectParams {
            min_size: 8.0,
            max_size: 4096.0,
            ..DetectParams::default()
        };
        let l = level(0, &pixels, 2);
        assert_eq!(level_size_range(&l, &params), (16.0, 128.0));
    }

    #[test]
    fn level_two_shifts_by_four() {
        let pixels = vec![0u8; 4];
        let params = DetectParams {
            min_size: 128.0,
            max_size: 1024.0,
            ..DetectParams::default()
        };
        let l = level(2, &pixels, 2);
        // min_size >> 2 = 32, clamped up to 64; max_size >> 2 = 256, clamped down to 128.
        assert_eq!(level_size_range(&l, &params), (64.0, 128.0));
    }
}
