//! Data types and format readers/writers.
//!
//! Scene annotations come in as [`SceneAnnotation`] records with pixel
//! corners. They leave as `tf.train.Example` messages ([`example`]) framed
//! into TFRecord shards ([`io_tfrecord`]), plus a COCO sidecar
//! ([`io_coco_json`]).
//!
//! # Design Principles
//!
//! 1. **Type Safety**: marker types keep pixel and normalized boxes apart,
//!    and newtype ids keep image, annotation and category ids apart.
//!
//! 2. **Parse, then transform**: JSON inputs deserialize straight into typed
//!    records. Schema errors surface at read time with the offending path.
//!
//! 3. **Deterministic output**: feature maps are key-ordered and ids come
//!    from an explicit [`IdAllocator`], so the same input gives the same bytes.
//!
//! # Example
//!
//! ```
//! use synthrec::ir::SceneObject;
//!
//! let obj = SceneObject::new("Hat", 0.9, [100.0, 50.0], [300.0, 150.0]);
//! let norm = obj.pixel_bbox().to_normalized(1000.0, 2000.0);
//! assert!((norm.xmin() - 0.05).abs() < 1e-12);
//! ```

mod bbox;
mod coord;
pub mod example;
mod ids;
pub mod io_coco_json;
pub mod io_scene_json;
pub mod io_tfrecord;
mod label_map;
mod model;
mod space;

// Re-export core types for convenient access
pub use bbox::BBoxXYXY;
pub use coord::Coord;
pub use example::Example;
pub use ids::{AnnotationId, CategoryId, IdAllocator, ImageId};
pub use io_coco_json::CocoAccumulator;
pub use label_map::{LabelMap, BACKGROUND, DEFAULT_CLASSES};
pub use model::{CameraSettings, SceneAnnotation, SceneBoundingBox, SceneObject};
pub use space::{Normalized, Pixel};
