//! Perturbation-median pupil localization.
//!
//! The refiner jitters the anchor `perturbs` times, runs the stacked
//! regression cascade from each jittered start, and reports the
//! coordinate-wise median of the results. The median across many random
//! starts is what makes the localization robust enough to anchor the
//! landmark refiners downstream.
//!
//! Randomness comes from a caller-supplied seed; two calls with the same
//! cascade, image, anchor and seed produce bit-identical results.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cascade::PupilCascade;
use crate::image::ImageView;
use crate::types::PupilLoc;

impl PupilCascade {
    /// Refine a pupil anchor on the image.
    ///
    /// `anchor.perturbs` controls the number of random trials; the field
    /// is carried into the result so chained calls keep the setting.
    /// `angle` is the global detection rotation in radians, `seed` drives
    /// the perturbation RNG.
    pub fn run_detector(
        &self,
        anchor: &PupilLoc,
        img: &ImageView<'_>,
        angle: f32,
        seed: u64,
    ) -> PupilLoc {
        self.refine(anchor, img, angle, false, seed)
    }

    /// Shared perturbation loop for pupil and landmark refinement.
    /// `mirror` flips the horizontal probe offsets (landmark reuse for
    /// left/right-symmetric points).
    pub(crate) fn refine(
        &self,
        anchor: &PupilLoc,
        img: &ImageView<'_>,
        angle: f32,
        mirror: bool,
        seed: u64,
    ) -> PupilLoc {
        let n = anchor.perturbs;
        if n == 0 {
            return PupilLoc::new(0.0, 0.0, 0.0, 0);
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut rows = Vec::with_capacity(n);
        let mut cols = Vec::with_capacity(n);
        let mut scales = Vec::with_capacity(n);

        for _ in 0..n {
            // Draw order is part of the reproducibility contract:
            // scale jitter first, then row, then column.
            let u_scale: f32 = rng.gen();
            let u_row: f32 = rng.gen();
            let u_col: f32 = rng.gen();

            let scale = anchor.scale * (0.925 + 0.15 * u_scale);
            let row = anchor.row + anchor.scale * 0.15 * (0.5 - u_row);
            let col = anchor.col + anchor.scale * 0.15 * (0.5 - u_col);

            let (row, col, scale) = self.localize(img, row, col, scale, angle, mirror);
            rows.push(row);
            cols.push(col);
            scales.push(scale);
        }

        rows.sort_by(f32::total_cmp);
        cols.sort_by(f32::total_cmp);
        scales.sort_by(f32::total_cmp);

        // Lower median over the sorted trials, coordinate-wise.
        PupilLoc::new(rows[n / 2], cols[n / 2], scales[n / 2], n)
    }

    /// Run the stacked regressor from one starting point: every stage
    /// sums the two-component leaf deltas of its trees, moves the center
    /// by `delta * scale`, then shrinks the window by the stage scale
    /// multiplier. Probes are clamped to the image.
    fn localize(
        &self,
        img: &ImageView<'_>,
        mut row: f32,
        mut col: f32,
        mut scale: f32,
        angle: f32,
        mirror: bool,
    ) -> (f32, f32, f32) {
        let leaves = 1usize << self.tree_depth;
        let rotated = angle != 0.0;
        let (sin, cos) = angle.sin_cos();
        let flip = if mirror { -1.0f32 } else { 1.0 };
        let flip_i = if mirror { -1i32 } else { 1 };

        let stride = img.stride;
        let max_row = img.rows as i32 - 1;
        let max_col = img.cols as i32 - 1;

        let mut node_base = 0usize;
        let mut pred_base = 0usize;

        for _ in 0..self.stages {
            let r = (256.0 * row) as i32;
            let c = (256.0 * col) as i32;
            let s = scale as i32;
            let sf = scale;

            let mut dr = 0.0f32;
            let mut dc = 0.0f32;

            for _ in 0..self.trees_per_stage {
                let mut k = 1usize;
                for _ in 0..self.tree_depth {
                    let off = node_base + 4 * k;
                    let (r1, c1, r2, c2) = if rotated {
                        let o0 = self.codes[off] as f32;
                        let o1 = flip * self.codes[off + 1] as f32;
                        let o2 = self.codes[off + 2] as f32;
                        let o3 = flip * self.codes[off + 3] as f32;
                        (
                            ((r + ((o0 * cos - o1 * sin) * sf) as i32) >> 8).clamp(0, max_row),
                            ((c + ((o0 * sin + o1 * cos) * sf) as i32) >> 8).clamp(0, max_col),
                            ((r + ((o2 * cos - o3 * sin) * sf) as i32) >> 8).clamp(0, max_row),
                            ((c + ((o2 * sin + o3 * cos) * sf) as i32) >> 8).clamp(0, max_col),
                        )
                    } else {
                        let o0 = self.codes[off] as i32;
                        let o1 = flip_i * self.codes[off + 1] as i32;
                        let o2 = self.codes[off + 2] as i32;
                        let o3 = flip_i * self.codes[off + 3] as i32;
                        (
                            ((r + o0 * s) >> 8).clamp(0, max_row),
                            ((c + o1 * s) >> 8).clamp(0, max_col),
                            ((r + o2 * s) >> 8).clamp(0, max_row),
                            ((c + o3 * s) >> 8).clamp(0, max_col),
                        )
                    };

                    let p1 = img.pixels[r1 as usize * stride + c1 as usize];
                    let p2 = img.pixels[r2 as usize * stride + c2 as usize];
                    k = 2 * k + usize::from(p1 <= p2);
                }

                let leaf = pred_base + 2 * (k - leaves);
                dr += self.preds[leaf];
                dc += self.preds[leaf + 1];

                node_base += 4 * leaves;
                pred_base += 2 * leaves;
            }

            row += dr * scale;
            col += dc * scale;
            scale *= self.scale_mult;
        }

        (row, col, scale)
    }
}
