//! Fuzz target for scene annotation JSON parsing.
//!
//! Feeds arbitrary bytes to the scene parser and, when they parse, runs the
//! box conversions that follow in a real transform.
//!
//! Run with:
//!   cargo +nightly fuzz run scene_json_parse

#![no_main]

use libfuzzer_sys::fuzz_target;
use synthrec::ir::io_scene_json::from_scene_slice;

fuzz_target!(|data: &[u8]| {
    // Scene files are a few KB; 1MB is plenty.
    if data.len() > 1024 * 1024 {
        return;
    }

    if let Ok(scene) = from_scene_slice(data) {
        for obj in &scene.objects {
            let bbox = obj.pixel_bbox();
            let _ = bbox.to_normalized(640.0, 480.0);
            let _ = bbox.to_coco_xywh();
        }
    }
});
