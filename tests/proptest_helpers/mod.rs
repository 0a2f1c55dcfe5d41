#![allow(dead_code)]

use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};
use synthrec::ir::{CameraSettings, SceneAnnotation, SceneObject, DEFAULT_CLASSES};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

pub fn arb_camera() -> BoxedStrategy<CameraSettings> {
    (1u32..=4096, 1u32..=4096)
        .prop_map(|(w, h)| CameraSettings::new(w, h))
        .boxed()
}

fn bbox_from_seed(
    width: u32,
    height: u32,
    a: u32,
    b: u32,
    c: u32,
    d: u32,
) -> ([f64; 2], [f64; 2]) {
    let w = width as f64;
    let h = height as f64;
    let x1 = (a % (width + 1)) as f64;
    let x2 = (b % (width + 1)) as f64;
    let y1 = (c % (height + 1)) as f64;
    let y2 = (d % (height + 1)) as f64;
    let (xmin, xmax) = (x1.min(x2).min(w), x1.max(x2).min(w));
    let (ymin, ymax) = (y1.min(y2).min(h), y1.max(y2).min(h));
    // Corners are [row, col].
    ([ymin, xmin], [ymax, xmax])
}

/// An object from the built-in classes whose box lies inside the frame.
pub fn arb_object_within(camera: CameraSettings) -> BoxedStrategy<SceneObject> {
    (
        0usize..DEFAULT_CLASSES.len(),
        0.0f64..=1.0,
        prop::num::u32::ANY,
    )
        .prop_map(move |(class_idx, visibility, seed)| {
            let (tl, br) = bbox_from_seed(
                camera.width,
                camera.height,
                seed,
                seed.rotate_left(3),
                seed.rotate_left(7),
                seed.rotate_left(11),
            );
            SceneObject::new(DEFAULT_CLASSES[class_idx], visibility, tl, br)
        })
        .boxed()
}

/// A camera and a scene whose objects all fit its frame.
pub fn arb_scene(max_objects: usize) -> BoxedStrategy<(CameraSettings, SceneAnnotation)> {
    arb_camera()
        .prop_flat_map(move |camera| {
            (
                Just(camera),
                proptest::collection::vec(arb_object_within(camera), 0..=max_objects)
                    .prop_map(|objects| SceneAnnotation { objects }),
            )
        })
        .boxed()
}
