use crate::image::Image;
use crate::tree::Tree;
use crate::window::Window;

/// Outcome of running a cascade against one window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Evaluation {
    /// Every stage passed. `confidence` is the cumulative leaf score
    /// across all trees, used downstream for cluster merging.
    Accepted { confidence: f32 },
    /// A stage threshold was missed, or a comparison pixel fell outside
    /// the image. Not an error — most windows end up here.
    Rejected,
}

const TURN_RADIANS: f32 = std::f32::consts::TAU;

/// Walks every tree in `trees` against `window` in `image`, stopping at
/// the first stage whose cumulative score misses its threshold.
///
/// Node offsets are signed bytes in roughly [-128, 127], scaled by the
/// cascade's own template scales `tsr`/`tsc` and the window's size, then
/// rotated by `window.angle` (one full turn per unit) before sampling.
pub(crate) fn classify(
    trees: &[Tree],
    image: &Image,
    window: &Window,
    tsr: f32,
    tsc: f32,
) -> Evaluation {
    let theta = window.angle * TURN_RADIANS;
    let (sin_t, cos_t) = theta.sin_cos();

    let mut confidence = 0.0f32;

    for tree in trees {
        let tdepth = tree_depth(tree.nodes.len());
        let mut idx: usize = 1;

        let leaf = 'walk: loop {
            if idx >= 1 << tdepth {
                break 'walk idx - (1 << tdepth);
            }
            let node = &tree.nodes[idx - 1];

            let p1 = sample_node_pixel(image, window, sin_t, cos_t, tsr, tsc, node.r1, node.c1);
            let p2 = sample_node_pixel(image, window, sin_t, cos_t, tsr, tsc, node.r2, node.c2);
            let (p1, p2) = match (p1, p2) {
                (Some(a), Some(b)) => (a, b),
                _ => return Evaluation::Rejected,
            };

            // Right child (2i + 1) when p1 <= p2, left child (2i) otherwise.
            let bit = if p1 <= p2 { 1 } else { 0 };
            idx = 2 * idx + bit;
        };

        confidence += tree.leaves[leaf];
        if confidence < tree.threshold {
            return Evaluation::Rejected;
        }
    }

    Evaluation::Accepted { confidence }
}

fn tree_depth(num_nodes: usize) -> u32 {
    // num_nodes == 2^tdepth - 1
    (num_nodes + 1).trailing_zeros()
}

#[allow(clippy::too_many_arguments)]
fn sample_node_pixel(
    image: &Image,
    window: &Window,
    sin_t: f32,
    cos_t: f32,
    tsr: f32,
    tsc: f32,
    r: i8,
    c: i8,
) -> Option<u8> {
    let (r, c) = (r as f32, c as f32);

    let dr = (cos_t * r + sin_t * c) * tsr * window.size / 256.0;
    let dc = (-sin_t * r + cos_t * c) * tsc * window.size / 256.0;

    let row = (window.row + dr).round_ties_even() as i32;
    let col = (window.col + dc).round_ties_even() as i32;

    image.sample(row, col)
}
