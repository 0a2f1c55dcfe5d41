//! Typed records for the renderer's per-image scene files and camera setup.
//!
//! Parsing goes straight into these structs, so a missing `class` or a
//! malformed corner is rejected with a path-qualified error when the file is
//! read instead of surfacing halfway through a transform.

use serde::{Deserialize, Serialize};

use super::bbox::BBoxXYXY;
use super::space::Pixel;

/// One rendered image's annotation document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneAnnotation {
    /// Labeled objects in the frame. Absent and empty are equivalent.
    #[serde(default)]
    pub objects: Vec<SceneObject>,
}

/// A single labeled object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    #[serde(rename = "class")]
    pub class_name: String,

    /// Fraction of the object visible to the camera.
    pub visibility: f64,

    pub bounding_box: SceneBoundingBox,
}

/// Corners in `[row, col]` pixel order, as the renderer writes them.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneBoundingBox {
    pub top_left: [f64; 2],
    pub bottom_right: [f64; 2],
}

impl SceneObject {
    pub fn new(
        class_name: impl Into<String>,
        visibility: f64,
        top_left: [f64; 2],
        bottom_right: [f64; 2],
    ) -> Self {
        Self {
            class_name: class_name.into(),
            visibility,
            bounding_box: SceneBoundingBox {
                top_left,
                bottom_right,
            },
        }
    }

    /// The object's box in pixel XYXY.
    pub fn pixel_bbox(&self) -> BBoxXYXY<Pixel> {
        BBoxXYXY::from_row_col_corners(self.bounding_box.top_left, self.bounding_box.bottom_right)
    }
}

/// Camera frame size shared by every image in a batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CameraSettings {
    pub width: u32,
    pub height: u32,
}

impl CameraSettings {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}
