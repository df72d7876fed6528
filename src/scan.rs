//! Multi-scale sliding-window scanning and detection clustering.

use serde::{Deserialize, Serialize};

use crate::cascade::FaceCascade;
use crate::error::{Error, Result};
use crate::image::ImageView;
use crate::types::Detection;

/// Parameters of the sliding-window scan.
///
/// Window sizes grow geometrically from `min_size` to `max_size` by
/// `scale_factor`; the grid step at each size is `shift_factor * size`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanParams {
    /// Smallest window side in pixels.
    pub min_size: usize,
    /// Largest window side in pixels.
    pub max_size: usize,
    /// Grid step as a fraction of the window size, in (0, 1].
    pub shift_factor: f32,
    /// Window growth factor between scales, > 1.
    pub scale_factor: f32,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            min_size: 20,
            max_size: 1000,
            shift_factor: 0.1,
            scale_factor: 1.1,
        }
    }
}

impl ScanParams {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.min_size < 1 {
            return Err(Error::BadParams("min_size must be at least 1".into()));
        }
        if self.min_size > self.max_size {
            return Err(Error::BadParams(format!(
                "min_size {} exceeds max_size {}",
                self.min_size, self.max_size
            )));
        }
        if self.shift_factor <= 0.0 || self.shift_factor > 1.0 {
            return Err(Error::BadParams(format!(
                "shift_factor {} outside (0, 1]",
                self.shift_factor
            )));
        }
        if self.scale_factor <= 1.0 {
            return Err(Error::BadParams(format!(
                "scale_factor {} must be greater than 1",
                self.scale_factor
            )));
        }
        Ok(())
    }
}

impl FaceCascade {
    /// Scan the image at every scale and grid position, returning all
    /// positively scored windows in (size, row, col) order.
    ///
    /// `angle` is the global rotation in radians; zero uses the plain
    /// classifier. The margin of `size / 2 + 1` keeps every probed window
    /// strictly inside the image, so candidate emission never touches the
    /// border.
    pub fn run_cascade(
        &self,
        img: &ImageView<'_>,
        params: &ScanParams,
        angle: f32,
    ) -> Result<Vec<Detection>> {
        params.validate()?;

        let rotated = angle != 0.0;
        let (sin, cos) = angle.sin_cos();

        let mut detections = Vec::new();
        let mut size = params.min_size;

        while size <= params.max_size {
            let step = ((params.shift_factor * size as f32).round() as usize).max(1);
            let margin = size / 2 + 1;

            for row in (margin..img.rows.saturating_sub(margin)).step_by(step) {
                for col in (margin..img.cols.saturating_sub(margin)).step_by(step) {
                    let score = if rotated {
                        self.classify_rotated(img, row, col, size, cos, sin)
                    } else {
                        self.classify(img, row, col, size)
                    };
                    if let Some(q) = score {
                        if q > 0.0 {
                            detections.push(Detection::new(
                                row as f32, col as f32, size as f32, q,
                            ));
                        }
                    }
                }
            }

            let next = (size as f32 * params.scale_factor).round() as usize;
            // Rounding can stall small sizes under a factor close to 1.
            size = next.max(size + 1);
        }

        tracing::debug!(candidates = detections.len(), "scan complete");

        Ok(detections)
    }
}

/// Cluster raw candidates by greedy agglomeration on square IoU.
///
/// Candidates are visited in emission order. Each unassigned candidate
/// seeds a cluster and absorbs every later unassigned candidate whose IoU
/// with the seed exceeds `iou_threshold`. A cluster is reported as the
/// score-weighted mean of its members' row, column and scale, scored with
/// the sum of member scores.
///
/// A threshold of 1.0 returns the candidate list unchanged; 0.0 merges
/// every candidate that overlaps its seed at all.
pub fn cluster_detections(detections: &[Detection], iou_threshold: f32) -> Vec<Detection> {
    let mut assigned = vec![false; detections.len()];
    let mut clusters = Vec::new();

    for i in 0..detections.len() {
        if assigned[i] {
            continue;
        }
        assigned[i] = true;

        let seed = &detections[i];
        let mut row_sum = seed.row * seed.score;
        let mut col_sum = seed.col * seed.score;
        let mut scale_sum = seed.scale * seed.score;
        let mut score_sum = seed.score;

        for j in (i + 1)..detections.len() {
            if assigned[j] {
                continue;
            }
            let d = &detections[j];
            if seed.iou(d) > iou_threshold {
                assigned[j] = true;
                row_sum += d.row * d.score;
                col_sum += d.col * d.score;
                scale_sum += d.scale * d.score;
                score_sum += d.score;
            }
        }

        clusters.push(Detection::new(
            row_sum / score_sum,
            col_sum / score_sum,
            scale_sum / score_sum,
            score_sum,
        ));
    }

    clusters
}
