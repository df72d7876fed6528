//! Decoders for the packed binary cascade formats.
//!
//! Two formats exist, both little-endian:
//!
//! - the **face** format: an 8-byte reserved header, tree depth and tree
//!   count as `u32`, then one record per tree (split codes, leaf
//!   predictions, stage threshold);
//! - the **pupil/landmark** format: stage count, per-stage scale
//!   multiplier, trees per stage and tree depth, then one record per tree
//!   with two-component leaves and no thresholds.
//!
//! Decoded tables are immutable; clone a cascade freely to share it across
//! callers. Decoding validates lengths up front so a truncated or
//! inconsistent blob fails here, never during a scan.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Sanity bound on the declared tree depth; a deeper tree would claim
/// multi-megabyte nodes from a few header bytes.
const MAX_TREE_DEPTH: u32 = 20;

/// Cursor over a packed cascade blob.
///
/// Every read is length-checked and reports truncation as
/// [`Error::MalformedCascade`] with the failing offset.
struct BlobReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BlobReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.data.len() - self.pos < n {
            return Err(Error::MalformedCascade(format!(
                "blob truncated: need {} bytes at offset {}, have {}",
                n,
                self.pos,
                self.data.len() - self.pos
            )));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }

    fn read_u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_f32(&mut self) -> Result<f32> {
        let b = self.take(4)?;
        Ok(f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read `n` split-code bytes, reinterpreted as signed offsets.
    fn read_codes(&mut self, n: usize, out: &mut Vec<i8>) -> Result<()> {
        let raw = self.take(n)?;
        out.extend(raw.iter().map(|&b| b as i8));
        Ok(())
    }
}

/// A decoded face-detection cascade: `tree_count` depth-`tree_depth`
/// binary trees with per-stage rejection thresholds.
///
/// Layout of the flattened tables, with `L = 2^tree_depth`:
/// node `i` of tree `t` starts at `codes[t * 4 * L + 4 * i]` (node 0 is a
/// zero pad so the 1-indexed walk needs no offset fixups), leaf `j` of
/// tree `t` is `preds[t * L + j]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceCascade {
    pub(crate) tree_depth: u32,
    pub(crate) tree_count: u32,
    pub(crate) codes: Vec<i8>,
    pub(crate) preds: Vec<f32>,
    pub(crate) thresholds: Vec<f32>,
}

impl FaceCascade {
    /// Decode a packed face cascade blob.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut r = BlobReader::new(data);

        // Reserved header.
        r.skip(8)?;
        let tree_depth = r.read_u32()?;
        let tree_count = r.read_u32()?;

        if tree_depth > MAX_TREE_DEPTH {
            return Err(Error::MalformedCascade(format!(
                "tree depth {} exceeds the supported maximum of {}",
                tree_depth, MAX_TREE_DEPTH
            )));
        }
        if tree_count == 0 {
            return Err(Error::MalformedCascade("cascade declares zero trees".into()));
        }

        let leaves = 1usize << tree_depth;
        let mut codes = Vec::with_capacity(tree_count as usize * 4 * leaves);
        let mut preds = Vec::with_capacity(tree_count as usize * leaves);
        let mut thresholds = Vec::with_capacity(tree_count as usize);

        for _ in 0..tree_count {
            // Pad node 0 so node i sits at byte offset 4*i.
            codes.extend_from_slice(&[0i8; 4]);
            r.read_codes(4 * (leaves - 1), &mut codes)?;

            for _ in 0..leaves {
                preds.push(r.read_f32()?);
            }
            thresholds.push(r.read_f32()?);
        }

        tracing::debug!(tree_depth, tree_count, "face cascade decoded");

        Ok(Self {
            tree_depth,
            tree_count,
            codes,
            preds,
            thresholds,
        })
    }

    /// Depth of each tree.
    pub fn tree_depth(&self) -> u32 {
        self.tree_depth
    }

    /// Number of trees (cascade stages).
    pub fn tree_count(&self) -> u32 {
        self.tree_count
    }

    /// Load a previously cached decoded cascade.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = fs::read(path)?;
        Ok(bincode::deserialize(&bytes)?)
    }

    /// Cache the decoded tables so later runs skip the blob parse.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, bincode::serialize(self)?)?;
        Ok(())
    }
}

/// A decoded pupil or facial-landmark cascade in stacked-regression form:
/// `stages` outer iterations of `trees_per_stage` trees whose leaves carry
/// a two-component `(Δrow, Δcol)` delta.
///
/// Same flattened-table layout as [`FaceCascade`], except each leaf
/// occupies two consecutive `preds` entries and there are no thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PupilCascade {
    pub(crate) stages: u32,
    pub(crate) scale_mult: f32,
    pub(crate) trees_per_stage: u32,
    pub(crate) tree_depth: u32,
    pub(crate) codes: Vec<i8>,
    pub(crate) preds: Vec<f32>,
}

impl PupilCascade {
    /// Decode a packed pupil/landmark cascade blob.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut r = BlobReader::new(data);

        let stages = r.read_u32()?;
        let scale_mult = r.read_f32()?;
        let trees_per_stage = r.read_u32()?;
        let tree_depth = r.read_u32()?;

        if stages == 0 || trees_per_stage == 0 {
            return Err(Error::MalformedCascade(
                "cascade declares zero stages or zero trees per stage".into(),
            ));
        }
        if tree_depth > MAX_TREE_DEPTH {
            return Err(Error::MalformedCascade(format!(
                "tree depth {} exceeds the supported maximum of {}",
                tree_depth, MAX_TREE_DEPTH
            )));
        }
        if !scale_mult.is_finite() || scale_mult <= 0.0 {
            return Err(Error::MalformedCascade(format!(
                "scale multiplier {} is not a positive finite number",
                scale_mult
            )));
        }

        let leaves = 1usize << tree_depth;
        let trees = stages as usize * trees_per_stage as usize;
        let mut codes = Vec::with_capacity(trees * 4 * leaves);
        let mut preds = Vec::with_capacity(trees * leaves * 2);

        for _ in 0..trees {
            codes.extend_from_slice(&[0i8; 4]);
            r.read_codes(4 * (leaves - 1), &mut codes)?;

            for _ in 0..leaves * 2 {
                preds.push(r.read_f32()?);
            }
        }

        tracing::debug!(
            stages,
            trees_per_stage,
            tree_depth,
            "pupil cascade decoded"
        );

        Ok(Self {
            stages,
            scale_mult,
            trees_per_stage,
            tree_depth,
            codes,
            preds,
        })
    }

    /// Number of outer regression stages.
    pub fn stages(&self) -> u32 {
        self.stages
    }

    /// Scale multiplier applied to the window after each stage.
    pub fn scale_mult(&self) -> f32 {
        self.scale_mult
    }

    /// Load a previously cached decoded cascade.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = fs::read(path)?;
        Ok(bincode::deserialize(&bytes)?)
    }

    /// Cache the decoded tables so later runs skip the blob parse.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, bincode::serialize(self)?)?;
        Ok(())
    }
}
