//! # picofind
//!
//! Pure Rust face, pupil and facial-landmark detection built on
//! pixel-intensity-comparison tree cascades.
//!
//! This crate provides:
//! - **Face detection**: a multi-scale sliding-window scan driven by a
//!   soft cascade of shallow binary trees, with optional global rotation
//! - **Clustering**: greedy IoU-based non-maximum suppression of the raw
//!   candidate windows
//! - **Pupil localization**: a perturbation-median regressor refining an
//!   anchor inside each detected face
//! - **Facial landmarks**: the same regressor anchored on the pupil pair,
//!   with mirror support for left/right-symmetric points
//!
//! ## Algorithm Overview
//!
//! 1. Decode packed cascade blobs into flat evaluation tables
//! 2. Slide a window grid over the image at geometrically growing scales;
//!    every internal tree node compares two pixels at offsets scaled to
//!    the window, and stage thresholds reject most windows after a few
//!    trees
//! 3. Cluster positive windows by intersection-over-union
//! 4. Refine pupils and landmarks by running a stacked regression cascade
//!    from many randomly perturbed starts and taking the per-coordinate
//!    median
//!
//! Everything is a pure function over an [`ImageView`] and read-only
//! cascade tables: no global state, and bit-identical results for a fixed
//! RNG seed.
//!
//! ## Quick Start
//!
//! ```rust
//! use picofind::{cluster_detections, FaceCascade, ImageView, ScanParams};
//!
//! // Pack a toy one-tree cascade: the split probes a quarter window
//! // below and above the center (offsets are 1/256ths of the scale).
//! let mut blob = vec![0u8; 8];
//! blob.extend_from_slice(&1u32.to_le_bytes()); // tree depth
//! blob.extend_from_slice(&1u32.to_le_bytes()); // tree count
//! blob.extend_from_slice(&[64, 0, 192, 0]); // offsets (64, 0, -64, 0)
//! blob.extend_from_slice(&(-1.0f32).to_le_bytes()); // leaf predictions
//! blob.extend_from_slice(&1.0f32.to_le_bytes());
//! blob.extend_from_slice(&(-5.0f32).to_le_bytes()); // stage threshold
//! let cascade = FaceCascade::decode(&blob)?;
//!
//! // A vertical gradient image, brighter toward the bottom.
//! let pixels: Vec<u8> = (0..64 * 64).map(|i| (i / 64) as u8).collect();
//! let image = ImageView::contiguous(&pixels, 64, 64)?;
//!
//! let params = ScanParams {
//!     min_size: 16,
//!     max_size: 16,
//!     ..ScanParams::default()
//! };
//! let raw = cascade.run_cascade(&image, &params, 0.0)?;
//! let faces = cluster_detections(&raw, 0.2);
//! assert!(!faces.is_empty());
//! # Ok::<(), picofind::Error>(())
//! ```
//!
//! Real cascades come as packed binary files; decode a face cascade with
//! [`FaceCascade::decode`], a pupil or landmark cascade with
//! [`PupilCascade::decode`], and a whole landmark directory with
//! [`load_cascade_dir`]. A [`Session`] groups the three for the full
//! face → eyes → landmarks pipeline.

mod cascade;
mod classify;
mod error;
mod image;
mod landmark;
mod pupil;
mod scan;
mod session;
mod types;

pub use cascade::{FaceCascade, PupilCascade};
pub use error::{Error, Result};
pub use image::ImageView;
pub use landmark::load_cascade_dir;
pub use scan::{cluster_detections, ScanParams};
pub use session::Session;
pub use types::{Detection, PupilLoc};
