//! Axis-aligned boxes in XYXY form.

use super::coord::Coord;
use super::{Normalized, Pixel};

/// An axis-aligned bounding box (xmin, ymin, xmax, ymax).
///
/// The constructor does not reorder corners. A scene file with an inverted
/// box produces an inverted box here, and the inspector reports it.
#[derive(Clone, Copy, PartialEq)]
pub struct BBoxXYXY<TSpace> {
    pub min: Coord<TSpace>,
    pub max: Coord<TSpace>,
}

impl<TSpace> BBoxXYXY<TSpace> {
    #[inline]
    pub fn new(min: Coord<TSpace>, max: Coord<TSpace>) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn from_xyxy(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            min: Coord::new(xmin, ymin),
            max: Coord::new(xmax, ymax),
        }
    }

    #[inline]
    pub fn xmin(&self) -> f64 {
        self.min.x
    }

    #[inline]
    pub fn ymin(&self) -> f64 {
        self.min.y
    }

    #[inline]
    pub fn xmax(&self) -> f64 {
        self.max.x
    }

    #[inline]
    pub fn ymax(&self) -> f64 {
        self.max.y
    }

    /// May be negative if the box is inverted.
    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// May be negative if the box is inverted.
    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Returns true if min <= max on both axes.
    #[inline]
    pub fn is_ordered(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y
    }
}

impl<TSpace> std::fmt::Debug for BBoxXYXY<TSpace> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BBoxXYXY")
            .field("xmin", &self.min.x)
            .field("ymin", &self.min.y)
            .field("xmax", &self.max.x)
            .field("ymax", &self.max.y)
            .finish()
    }
}

impl BBoxXYXY<Pixel> {
    /// Builds a pixel box from scene corners given as `[row, col]`.
    pub fn from_row_col_corners(top_left: [f64; 2], bottom_right: [f64; 2]) -> Self {
        Self::new(
            Coord::from_row_col(top_left),
            Coord::from_row_col(bottom_right),
        )
    }

    /// Divides by the camera frame size.
    pub fn to_normalized(&self, frame_width: f64, frame_height: f64) -> BBoxXYXY<Normalized> {
        BBoxXYXY::from_xyxy(
            self.min.x / frame_width,
            self.min.y / frame_height,
            self.max.x / frame_width,
            self.max.y / frame_height,
        )
    }

    /// Integer COCO box `[x, y, width, height]`.
    ///
    /// Each corner is truncated toward zero before the extent is taken, so
    /// width and height are differences of truncated corners.
    pub fn to_coco_xywh(&self) -> [i64; 4] {
        let xmin = self.min.x as i64;
        let ymin = self.min.y as i64;
        let xmax = self.max.x as i64;
        let ymax = self.max.y as i64;
        [xmin, ymin, xmax - xmin, ymax - ymin]
    }
}

impl BBoxXYXY<Normalized> {
    /// Returns true if every coordinate lies in `0.0..=1.0`.
    pub fn is_within_unit(&self) -> bool {
        [self.min.x, self.min.y, self.max.x, self.max.y]
            .iter()
            .all(|v| (0.0..=1.0).contains(v))
    }
}
