//! Single-window cascade evaluation.
//!
//! The classifier walks every tree of a [`FaceCascade`] over one detection
//! window. Each internal node compares two pixel intensities at positions
//! derived from the node's signed offsets, the window center and the
//! window scale; offsets are fractions of the scale in units of 1/256, so
//! the walk runs in 24.8 fixed point with a single shift per probe.
//!
//! The running leaf sum is checked against the stage threshold after every
//! tree: falling to or below it rejects the window immediately, which is
//! what makes scanning whole images cheap. An accepted window scores
//! `sum - thresholds[last]`.

use crate::cascade::FaceCascade;
use crate::image::ImageView;

impl FaceCascade {
    /// Evaluate the cascade on the window centered at `(row, col)` with
    /// side length `scale`.
    ///
    /// Returns `None` when a stage rejects the window, otherwise the final
    /// score. Probe positions are not bounds-checked: the caller must keep
    /// the whole window inside the image, as the scanner's margin does.
    pub fn classify(
        &self,
        img: &ImageView<'_>,
        row: usize,
        col: usize,
        scale: usize,
    ) -> Option<f32> {
        let leaves = 1usize << self.tree_depth;
        let r = (row * 256) as i32;
        let c = (col * 256) as i32;
        let s = scale as i32;
        let stride = img.stride;

        let mut sum = 0.0f32;
        let mut node_base = 0usize;
        let mut leaf_base = 0usize;

        for t in 0..self.tree_count as usize {
            let mut k = 1usize;
            for _ in 0..self.tree_depth {
                let off = node_base + 4 * k;
                let o = &self.codes[off..off + 4];

                let p1 = img.pixels[((r + o[0] as i32 * s) >> 8) as usize * stride
                    + ((c + o[1] as i32 * s) >> 8) as usize];
                let p2 = img.pixels[((r + o[2] as i32 * s) >> 8) as usize * stride
                    + ((c + o[3] as i32 * s) >> 8) as usize];

                k = 2 * k + usize::from(p1 <= p2);
            }
            sum += self.preds[leaf_base + k - leaves];

            if sum <= self.thresholds[t] {
                return None;
            }
            node_base += 4 * leaves;
            leaf_base += leaves;
        }

        Some(sum - self.thresholds[self.tree_count as usize - 1])
    }

    /// Like [`classify`](Self::classify), with every probe offset rotated
    /// by the precomputed `(cos, sin)` of the detection angle.
    ///
    /// Rotation can push a probe past the axis-aligned scan margin, so
    /// this variant clamps probe coordinates to the image. With a zero
    /// angle it is bit-identical to the unrotated walk.
    pub fn classify_rotated(
        &self,
        img: &ImageView<'_>,
        row: usize,
        col: usize,
        scale: usize,
        cos: f32,
        sin: f32,
    ) -> Option<f32> {
        let leaves = 1usize << self.tree_depth;
        let r = (row * 256) as i32;
        let c = (col * 256) as i32;
        let s = scale as f32;
        let stride = img.stride;
        let max_row = img.rows as i32 - 1;
        let max_col = img.cols as i32 - 1;

        let mut sum = 0.0f32;
        let mut node_base = 0usize;
        let mut leaf_base = 0usize;

        for t in 0..self.tree_count as usize {
            let mut k = 1usize;
            for _ in 0..self.tree_depth {
                let off = node_base + 4 * k;
                let o0 = self.codes[off] as f32;
                let o1 = self.codes[off + 1] as f32;
                let o2 = self.codes[off + 2] as f32;
                let o3 = self.codes[off + 3] as f32;

                let r1 = ((r + ((o0 * cos - o1 * sin) * s) as i32) >> 8).clamp(0, max_row);
                let c1 = ((c + ((o0 * sin + o1 * cos) * s) as i32) >> 8).clamp(0, max_col);
                let r2 = ((r + ((o2 * cos - o3 * sin) * s) as i32) >> 8).clamp(0, max_row);
                let c2 = ((c + ((o2 * sin + o3 * cos) * s) as i32) >> 8).clamp(0, max_col);

                let p1 = img.pixels[r1 as usize * stride + c1 as usize];
                let p2 = img.pixels[r2 as usize * stride + c2 as usize];

                k = 2 * k + usize::from(p1 <= p2);
            }
            sum += self.preds[leaf_base + k - leaves];

            if sum <= self.thresholds[t] {
                return None;
            }
            node_base += 4 * leaves;
            leaf_base += leaves;
        }

        Some(sum - self.thresholds[self.tree_count as usize - 1])
    }
}
