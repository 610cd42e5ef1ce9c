//! Binary cascade format and window evaluator.
//!
//! A cascade is a sequence of decision trees sharing one depth. Each
//! tree contributes a signed leaf value to a running score; the score is
//! checked against the tree's own threshold after every tree, and a miss
//! rejects the window immediately. Surviving every tree accepts it.

mod evaluator;
mod header;
mod image;
mod tree;
mod window;

use header::RawHeader;
use tree::Tree;

pub use evaluator::Evaluation;
pub use image::Image;
pub use window::Window;

use pico_error::DetectError;

/// A fully parsed cascade: shared template size (`tsr` x `tsc`) plus the
/// ordered list of trees, all at the same depth.
#[derive(Debug, Clone)]
pub struct Cascade {
    template_rows: f32,
    template_cols: f32,
    depth: u32,
    trees: Vec<Tree>,
}

impl Cascade {
    /// Parses a cascade blob: 16-byte header, then `ntrees` fixed-size
    /// tree records back to back. Rejects a zero-tree cascade and any
    /// size mismatch between the declared layout and the actual blob
    /// length — both make the classifier meaningless rather than merely
    /// degenerate.
    pub fn load(bytes: &[u8]) -> Result<Cascade, DetectError> {
        let header = RawHeader::parse(bytes)
            .ok_or_else(|| DetectError::MalformedCascade("blob shorter than 16-byte header".into()))?;

        if header.tdepth < 0 {
            return Err(DetectError::MalformedCascade(format!(
                "negative tdepth {}",
                header.tdepth
            )));
        }
        if header.ntrees < 1 {
            return Err(DetectError::MalformedCascade(format!(
                "cascade declares {} trees, need at least 1",
                header.ntrees
            )));
        }
        // A tdepth this large would make 1usize << tdepth overflow or
        // require a cascade many times larger than any real one.
        const MAX_TDEPTH: i32 = 30;
        if header.tdepth > MAX_TDEPTH {
            return Err(DetectError::MalformedCascade(format!(
                "tdepth {} exceeds sanity limit of {}",
                header.tdepth, MAX_TDEPTH
            )));
        }

        let tdepth = header.tdepth as u32;
        let ntrees = header.ntrees as usize;

        let mut offset = header::HEADER_BYTES;
        let mut trees = Vec::with_capacity(ntrees);
        for i in 0..ntrees {
            let (tree, consumed) = Tree::parse(&bytes[offset..], tdepth).ok_or_else(|| {
                DetectError::MalformedCascade(format!(
                    "truncated tree record {i} at byte offset {offset}"
                ))
            })?;
            trees.push(tree);
            offset += consumed;
        }

        if offset != bytes.len() {
            return Err(DetectError::MalformedCascade(format!(
                "{} trailing bytes after the last declared tree",
                bytes.len() - offset
            )));
        }

        tracing::debug!(
            tsr = header.tsr,
            tsc = header.tsc,
            tdepth,
            ntrees,
            blob_len = bytes.len(),
            consumed = offset,
            "parsed cascade"
        );

        Ok(Cascade {
            template_rows: header.tsr,
            template_cols: header.tsc,
            depth: tdepth,
            trees,
        })
    }

    pub fn template_rows(&self) -> f32 {
        self.template_rows
    }

    pub fn template_cols(&self) -> f32 {
        self.template_cols
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Runs every tree against `window` in `image`. See `Evaluation`.
    pub fn evaluate(&self, image: &Image, window: &Window) -> Evaluation {
        evaluator::classify(
            &self.trees,
            image,
            window,
            self.template_rows,
            self.template_cols,
        )
    }
}
