//! Facial-landmark refinement anchored on the pupil pair.
//!
//! Landmark cascades share the pupil cascade format; what differs is the
//! starting frame. A landmark anchor is the midpoint of the two pupils
//! with the inter-pupil distance as its scale, so a single trained
//! cascade can be reused for the mirrored point on the other side of the
//! face by flipping the horizontal probe offsets.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::cascade::PupilCascade;
use crate::error::Result;
use crate::image::ImageView;
use crate::types::PupilLoc;

impl PupilCascade {
    /// Localize a facial landmark relative to the detected pupil pair.
    ///
    /// `mirror` negates the horizontal probe offsets, producing the
    /// left/right-symmetric point from the same cascade. The result may
    /// be degenerate (`row`/`col` at or below zero); callers filter with
    /// [`PupilLoc::is_valid`].
    pub fn find_landmark(
        &self,
        left: &PupilLoc,
        right: &PupilLoc,
        img: &ImageView<'_>,
        perturbs: usize,
        mirror: bool,
        angle: f32,
        seed: u64,
    ) -> PupilLoc {
        let dr = left.row - right.row;
        let dc = left.col - right.col;
        let anchor = PupilLoc::new(
            (left.row + right.row) / 2.0,
            (left.col + right.col) / 2.0,
            (dr * dr + dc * dc).sqrt(),
            perturbs,
        );
        self.refine(&anchor, img, angle, mirror, seed)
    }
}

/// Load every cascade in a landmark directory, keyed by file name.
///
/// The directory layout follows the conventional landmark sets: one
/// packed blob per file, names like `lp46` or `lp84` acting as opaque
/// keys. Multiple files may share a name across nested variants, so each
/// key maps to a list.
pub fn load_cascade_dir<P: AsRef<Path>>(dir: P) -> Result<HashMap<String, Vec<PupilCascade>>> {
    let mut cascades: HashMap<String, Vec<PupilCascade>> = HashMap::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let blob = fs::read(&path)?;
        cascades
            .entry(name.to_owned())
            .or_default()
            .push(PupilCascade::decode(&blob)?);
    }

    Ok(cascades)
}
