//! Shared builders for packed cascade blobs and synthetic scenes.
//!
//! Tests always go through the real codec: blobs are packed byte-for-byte
//! the way production cascade files are, never assembled from decoded
//! tables.

#![allow(dead_code)]

use picofind::{FaceCascade, PupilCascade};

pub fn push_u32(blob: &mut Vec<u8>, v: u32) {
    blob.extend_from_slice(&v.to_le_bytes());
}

pub fn push_f32(blob: &mut Vec<u8>, v: f32) {
    blob.extend_from_slice(&v.to_le_bytes());
}

/// Pack a face cascade of depth-1 trees. Each tree is its four signed
/// probe offsets, two leaf predictions and the stage threshold.
pub fn face_blob_depth1(trees: &[([i8; 4], [f32; 2], f32)]) -> Vec<u8> {
    let mut blob = vec![0u8; 8];
    push_u32(&mut blob, 1);
    push_u32(&mut blob, trees.len() as u32);
    for (codes, preds, threshold) in trees {
        blob.extend(codes.iter().map(|&c| c as u8));
        push_f32(&mut blob, preds[0]);
        push_f32(&mut blob, preds[1]);
        push_f32(&mut blob, *threshold);
    }
    blob
}

pub fn face_cascade_depth1(trees: &[([i8; 4], [f32; 2], f32)]) -> FaceCascade {
    FaceCascade::decode(&face_blob_depth1(trees)).unwrap()
}

/// A cascade that accepts every window with a positive score.
pub fn accept_all_face() -> FaceCascade {
    face_cascade_depth1(&[([0, 0, 0, 0], [1.0, 1.0], -10.0)])
}

/// Pack a pupil cascade with one depth-1 tree per stage. Each stage is
/// its probe offsets and the two-component deltas of both leaves.
pub fn pupil_blob_depth1(scale_mult: f32, stages: &[([i8; 4], [f32; 2], [f32; 2])]) -> Vec<u8> {
    let mut blob = Vec::new();
    push_u32(&mut blob, stages.len() as u32);
    push_f32(&mut blob, scale_mult);
    push_u32(&mut blob, 1);
    push_u32(&mut blob, 1);
    for (codes, leaf0, leaf1) in stages {
        blob.extend(codes.iter().map(|&c| c as u8));
        for v in leaf0.iter().chain(leaf1.iter()) {
            push_f32(&mut blob, *v);
        }
    }
    blob
}

pub fn pupil_cascade_depth1(
    scale_mult: f32,
    stages: &[([i8; 4], [f32; 2], [f32; 2])],
) -> PupilCascade {
    PupilCascade::decode(&pupil_blob_depth1(scale_mult, stages)).unwrap()
}

/// Pupil cascade whose every leaf delta is zero: refinement returns the
/// perturbed anchor untouched.
pub fn zero_delta_pupil() -> PupilCascade {
    pupil_cascade_depth1(1.0, &[([0, 0, 0, 0], [0.0, 0.0], [0.0, 0.0])])
}

pub fn constant_image(rows: usize, cols: usize, value: u8) -> Vec<u8> {
    vec![value; rows * cols]
}

/// Intensity = Euclidean distance from the center, quartered. The value
/// rises strictly away from `(center_row, center_col)`, which lets a
/// symmetric probe pair single out the exact center.
pub fn radial_image(rows: usize, cols: usize, center_row: f32, center_col: f32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            let dr = row as f32 - center_row;
            let dc = col as f32 - center_col;
            pixels.push(((dr * dr + dc * dc).sqrt() / 4.0) as u8);
        }
    }
    pixels
}

/// The four-tree "bullseye" detector: a window passes only when both its
/// vertical and its horizontal quarter-window probe pairs read equal
/// quantized intensities, which on a radial image happens at the center
/// alone. Every accepted window scores 0.5.
pub fn bullseye_face() -> FaceCascade {
    face_cascade_depth1(&[
        ([-64, 0, 64, 0], [-1.0, 1.0], 0.5),
        ([0, -64, 0, 64], [-1.0, 1.0], 1.5),
        ([64, 0, -64, 0], [-1.0, 1.0], 2.5),
        ([0, 64, 0, -64], [-1.0, 1.0], 3.5),
    ])
}
