#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;

/// Smallest byte string `imagesize` recognizes as a JPEG.
pub fn jpeg_bytes(tag: u8) -> Vec<u8> {
    vec![
        0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', tag, 0xFF, 0xD9,
    ]
}

/// `(class, visibility, top_left [row, col], bottom_right [row, col])`
pub type ObjectSpec<'a> = (&'a str, f64, [f64; 2], [f64; 2]);

pub fn scene_json(objects: &[ObjectSpec<'_>]) -> String {
    let objects: Vec<_> = objects
        .iter()
        .map(|(class, visibility, tl, br)| {
            json!({
                "class": class,
                "instance_id": 1,
                "visibility": visibility,
                "location": [0.0, 0.0, 0.0],
                "bounding_box": { "top_left": tl, "bottom_right": br }
            })
        })
        .collect();
    json!({ "camera_data": {}, "objects": objects }).to_string()
}

/// Writes `<stem>.json` and `<stem>.jpg` into `dir`.
pub fn write_scene(dir: &Path, stem: &str, objects: &[ObjectSpec<'_>]) -> PathBuf {
    fs::create_dir_all(dir).expect("create scene dir");
    let ann = dir.join(format!("{}.json", stem));
    fs::write(&ann, scene_json(objects)).expect("write scene json");
    let tag = stem.bytes().fold(0u8, |acc, b| acc.wrapping_add(b));
    fs::write(dir.join(format!("{}.jpg", stem)), jpeg_bytes(tag)).expect("write jpeg");
    ann
}

pub fn write_camera_settings(path: &Path, width: f64, height: f64) {
    let doc = json!({
        "camera_settings": [{
            "name": "Viewpoint",
            "captured_image_size": { "width": width, "height": height }
        }]
    });
    fs::write(path, doc.to_string()).expect("write camera settings");
}

pub fn write_label_map(path: &Path, classes: &[&str]) {
    let doc = json!({ "exported_object_classes": classes });
    fs::write(path, doc.to_string()).expect("write label map");
}

/// A dataset root with `n` scenes in `subdir`, each holding one `Hat`.
pub fn dataset_with_scenes(root: &Path, subdir: &str, n: usize) {
    for i in 0..n {
        write_scene(
            &root.join(subdir),
            &format!("{:06}", i),
            &[("Hat", 0.5, [10.0, 20.0], [110.0, 220.0])],
        );
    }
}
