//! COCO-style JSON sidecar.
//!
//! The converter mirrors every training example into a single COCO
//! `instances` document written once at the end of a run, so the same data
//! can feed COCO evaluation tooling.
//!
//! # COCO Format Reference
//!
//! COCO bounding boxes use `[x, y, width, height]` in absolute pixels, with
//! `(x, y)` the top-left corner. Boxes here are integers: each corner is
//! truncated toward zero before the extent is taken.
//!
//! # Output Layout
//!
//! Top-level keys are written in the order `images`, `type`, `annotations`,
//! `categories`. Lists keep insertion order; the categories list receives a
//! full copy of the label map for every scanned annotation file, so it
//! repeats.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::label_map::LabelMap;
use super::{AnnotationId, BBoxXYXY, CategoryId, ImageId, Pixel};
use crate::error::SynthrecError;

// ============================================================================
// COCO Schema Types
// ============================================================================

/// In-memory COCO document built up during a conversion run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CocoAccumulator {
    pub images: Vec<CocoImage>,

    #[serde(rename = "type")]
    pub kind: String,

    pub annotations: Vec<CocoAnnotation>,

    pub categories: Vec<CocoCategory>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CocoImage {
    pub file_name: String,
    pub height: u32,
    pub width: u32,
    pub id: ImageId,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CocoAnnotation {
    pub area: i64,
    pub iscrowd: u8,
    pub image_id: ImageId,

    /// `[x, y, width, height]` in integer pixels.
    pub bbox: [i64; 4],

    pub category_id: CategoryId,
    pub id: AnnotationId,
    pub ignore: u8,

    /// Always empty; detection-only.
    pub segmentation: Vec<serde_json::Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CocoCategory {
    pub supercategory: String,
    pub id: CategoryId,
    pub name: String,
}

impl Default for CocoAccumulator {
    fn default() -> Self {
        Self {
            images: Vec::new(),
            kind: "instances".to_string(),
            annotations: Vec::new(),
            categories: Vec::new(),
        }
    }
}

impl CocoAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_image(
        &mut self,
        id: ImageId,
        file_name: impl Into<String>,
        width: u32,
        height: u32,
    ) {
        self.images.push(CocoImage {
            file_name: file_name.into(),
            height,
            width,
            id,
        });
    }

    /// Appends an annotation with the integer COCO box of `bbox`.
    pub fn push_annotation(
        &mut self,
        id: AnnotationId,
        image_id: ImageId,
        category_id: CategoryId,
        bbox: &BBoxXYXY<Pixel>,
    ) {
        let xywh = bbox.to_coco_xywh();
        self.annotations.push(CocoAnnotation {
            area: xywh[2] * xywh[3],
            iscrowd: 0,
            image_id,
            bbox: xywh,
            category_id,
            id,
            ignore: 0,
            segmentation: Vec::new(),
        });
    }

    /// Appends every label map entry, in label map order.
    pub fn extend_categories(&mut self, label_map: &LabelMap) {
        self.categories
            .extend(label_map.iter().map(|(name, id)| CocoCategory {
                supercategory: "none".to_string(),
                id,
                name: name.to_string(),
            }));
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Writes the accumulated document as compact JSON.
pub fn write_coco_json(path: &Path, coco: &CocoAccumulator) -> Result<(), SynthrecError> {
    let file = File::create(path).map_err(SynthrecError::io_at(path))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer(&mut writer, coco).map_err(|source| SynthrecError::CocoJsonWrite {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(SynthrecError::io_at(path))
}

/// Serializes the document to a compact JSON string.
///
/// Useful for testing without file I/O.
pub fn to_coco_string(coco: &CocoAccumulator) -> Result<String, serde_json::Error> {
    serde_json::to_string(coco)
}

/// Parses a sidecar document back.
pub fn from_coco_str(json: &str) -> Result<CocoAccumulator, serde_json::Error> {
    serde_json::from_str(json)
}

// ============================================================================
// Tests
// ============================================================================
