//! Convenience aggregate tying the three cascade kinds together.
//!
//! Nothing here adds algorithmic behavior: a [`Session`] just groups a
//! face cascade, a pupil cascade and a map of landmark cascades so
//! callers do not have to thread three handles plus a seed through every
//! call. All state is explicit and immutable; share a session by cloning
//! it.

use std::collections::HashMap;

use crate::cascade::{FaceCascade, PupilCascade};
use crate::error::Result;
use crate::image::ImageView;
use crate::scan::{cluster_detections, ScanParams};
use crate::types::{Detection, PupilLoc};

/// Landmark keys conventionally trained on eye-relative points; these run
/// both straight and mirrored to cover the symmetric side of the face.
const EYE_CASCADE_NAMES: [&str; 5] = ["lp46", "lp44", "lp42", "lp38", "lp312"];

/// The nose tip is conventionally retrieved from the mirrored `lp84`
/// mouth-corner cascade.
const NOSE_MIRROR_NAME: &str = "lp84";

/// Left/right pupil anchor offsets relative to a face detection, as
/// fractions of the face scale.
const EYE_ROW_OFFSET: f32 = 0.075;
const LEFT_EYE_COL_OFFSET: f32 = 0.175;
const RIGHT_EYE_COL_OFFSET: f32 = 0.185;
const EYE_SCALE_RATIO: f32 = 0.25;

/// A face cascade, a pupil cascade and any number of landmark cascades,
/// grouped for the full face → eyes → landmarks pipeline.
#[derive(Debug, Clone)]
pub struct Session {
    pub face: FaceCascade,
    pub pupil: PupilCascade,
    pub landmarks: HashMap<String, Vec<PupilCascade>>,
    /// Seed handed to every refinement call; fix it to make whole-image
    /// results reproducible.
    pub seed: u64,
}

impl Session {
    pub fn new(face: FaceCascade, pupil: PupilCascade) -> Self {
        Self {
            face,
            pupil,
            landmarks: HashMap::new(),
            seed: 0,
        }
    }

    pub fn with_landmarks(mut self, landmarks: HashMap<String, Vec<PupilCascade>>) -> Self {
        self.landmarks = landmarks;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Scan for faces and cluster the raw candidates.
    pub fn detect(
        &self,
        img: &ImageView<'_>,
        params: &ScanParams,
        angle: f32,
        iou_threshold: f32,
    ) -> Result<Vec<Detection>> {
        let raw = self.face.run_cascade(img, params, angle)?;
        Ok(cluster_detections(&raw, iou_threshold))
    }

    /// Refine both pupils of a detected face using the conventional
    /// anchor offsets. Either result may be degenerate; filter with
    /// [`PupilLoc::is_valid`].
    pub fn locate_eyes(
        &self,
        face: &Detection,
        img: &ImageView<'_>,
        angle: f32,
        perturbs: usize,
    ) -> (PupilLoc, PupilLoc) {
        let row = face.row - EYE_ROW_OFFSET * face.scale;
        let scale = face.scale * EYE_SCALE_RATIO;

        let left = PupilLoc::new(
            row,
            face.col - LEFT_EYE_COL_OFFSET * face.scale,
            scale,
            perturbs,
        );
        let right = PupilLoc::new(
            row,
            face.col + RIGHT_EYE_COL_OFFSET * face.scale,
            scale,
            perturbs,
        );

        (
            self.pupil.run_detector(&left, img, angle, self.seed),
            self.pupil.run_detector(&right, img, angle, self.seed),
        )
    }

    /// Run every loaded landmark cascade against the pupil pair.
    ///
    /// Eye cascades run straight and mirrored; `lp84` additionally runs
    /// mirrored for the nose tip. Degenerate localizations are dropped,
    /// so a key may map to fewer results than cascade runs.
    pub fn detect_landmarks(
        &self,
        left: &PupilLoc,
        right: &PupilLoc,
        img: &ImageView<'_>,
        perturbs: usize,
        angle: f32,
    ) -> HashMap<String, Vec<PupilLoc>> {
        let mut points: HashMap<String, Vec<PupilLoc>> = HashMap::new();

        for (name, cascades) in &self.landmarks {
            let mirror_too =
                EYE_CASCADE_NAMES.contains(&name.as_str()) || name == NOSE_MIRROR_NAME;
            let mut found = Vec::new();

            for cascade in cascades {
                let flp =
                    cascade.find_landmark(left, right, img, perturbs, false, angle, self.seed);
                if flp.is_valid() {
                    found.push(flp);
                }
                if mirror_too {
                    let flp =
                        cascade.find_landmark(left, right, img, perturbs, true, angle, self.seed);
                    if flp.is_valid() {
                        found.push(flp);
                    }
                }
            }

            if !found.is_empty() {
                points.insert(name.clone(), found);
            }
        }

        points
    }
}
