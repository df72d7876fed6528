use serde::{Deserialize, Serialize};

/// A scored face detection.
///
/// `(row, col)` is the window center in pixels, `scale` the window side
/// length. Raw scanner output is grid-aligned; clustered output carries
/// score-weighted means and the summed member score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub row: f32,
    pub col: f32,
    pub scale: f32,
    pub score: f32,
}

impl Detection {
    pub const fn new(row: f32, col: f32, scale: f32, score: f32) -> Self {
        Self {
            row,
            col,
            scale,
            score,
        }
    }

    /// Euclidean distance between two detection centers.
    pub fn center_distance(&self, other: &Detection) -> f32 {
        let dr = self.row - other.row;
        let dc = self.col - other.col;
        (dr * dr + dc * dc).sqrt()
    }

    /// Intersection-over-union of the two axis-aligned squares.
    pub fn iou(&self, other: &Detection) -> f32 {
        let h1 = self.scale / 2.0;
        let h2 = other.scale / 2.0;

        let overlap_rows =
            ((self.row + h1).min(other.row + h2) - (self.row - h1).max(other.row - h2)).max(0.0);
        let overlap_cols =
            ((self.col + h1).min(other.col + h2) - (self.col - h1).max(other.col - h2)).max(0.0);

        let intersection = overlap_rows * overlap_cols;
        let union = self.scale * self.scale + other.scale * other.scale - intersection;
        if union <= 0.0 {
            return 0.0;
        }
        intersection / union
    }
}

/// A pupil or facial-landmark localization.
///
/// `perturbs` is the number of random perturbations used during
/// refinement; it is carried from input to output so chained calls keep
/// the caller's setting. A result with `row <= 0` or `col <= 0` means no
/// point was produced and should be discarded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PupilLoc {
    pub row: f32,
    pub col: f32,
    pub scale: f32,
    pub perturbs: usize,
}

impl PupilLoc {
    pub const fn new(row: f32, col: f32, scale: f32, perturbs: usize) -> Self {
        Self {
            row,
            col,
            scale,
            perturbs,
        }
    }

    /// Whether the refiner produced a usable point.
    pub fn is_valid(&self) -> bool {
        self.row > 0.0 && self.col > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iou_identical_squares() {
        let a = Detection::new(50.0, 50.0, 20.0, 1.0);
        assert!((a.iou(&a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn iou_disjoint_squares() {
        let a = Detection::new(10.0, 10.0, 10.0, 1.0);
        let b = Detection::new(100.0, 100.0, 10.0, 1.0);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn iou_half_shifted() {
        // Squares offset by half a side overlap half their area, so the
        // ratio is (1/2) / (3/2).
        let a = Detection::new(0.0, 0.0, 10.0, 1.0);
        let b = Detection::new(0.0, 5.0, 10.0, 1.0);
        assert!((a.iou(&b) - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn iou_is_symmetric() {
        let a = Detection::new(30.0, 40.0, 24.0, 1.0);
        let b = Detection::new(36.0, 44.0, 30.0, 1.0);
        assert!((a.iou(&b) - b.iou(&a)).abs() < 1e-6);
    }

    #[test]
    fn degenerate_localization_is_invalid() {
        assert!(!PupilLoc::new(0.0, 0.0, 0.0, 15).is_valid());
        assert!(!PupilLoc::new(12.0, -3.0, 8.0, 15).is_valid());
        assert!(PupilLoc::new(12.0, 9.0, 8.0, 15).is_valid());
    }
}
