//! Readers for the renderer's JSON inputs.
//!
//! Three documents feed a conversion run:
//! - one scene annotation per image (`objects` with `[row, col]` corners),
//! - an optional label map export (`exported_object_classes`),
//! - an optional camera settings export (`camera_settings[0].captured_image_size`).

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use super::label_map::LabelMap;
use super::model::{CameraSettings, SceneAnnotation};
use crate::error::SynthrecError;

#[derive(Debug, Deserialize)]
struct LabelMapFile {
    exported_object_classes: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CameraSettingsFile {
    camera_settings: Vec<CameraEntry>,
}

#[derive(Debug, Deserialize)]
struct CameraEntry {
    captured_image_size: CapturedImageSize,
}

#[derive(Debug, Deserialize)]
struct CapturedImageSize {
    width: f64,
    height: f64,
}

/// Reads one scene annotation file.
///
/// # Errors
/// Returns [`SynthrecError::AnnotationParse`] naming the file when the JSON
/// does not match the scene schema.
pub fn read_scene_annotation(path: &Path) -> Result<SceneAnnotation, SynthrecError> {
    let file = File::open(path).map_err(SynthrecError::io_at(path))?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| SynthrecError::AnnotationParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses a scene annotation from a string.
///
/// Useful for testing without file I/O.
pub fn from_scene_str(json: &str) -> Result<SceneAnnotation, serde_json::Error> {
    serde_json::from_str(json)
}

/// Parses a scene annotation from raw bytes.
pub fn from_scene_slice(bytes: &[u8]) -> Result<SceneAnnotation, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Reads a label map export and rebuilds ids from list order.
///
/// Ids that may be present elsewhere in the file are ignored: `background`
/// is 0 and every exported class is numbered by its 1-based position.
pub fn read_label_map(path: &Path) -> Result<LabelMap, SynthrecError> {
    let file = File::open(path).map_err(SynthrecError::io_at(path))?;
    let reader = BufReader::new(file);

    let parsed: LabelMapFile =
        serde_json::from_reader(reader).map_err(|source| SynthrecError::LabelMapParse {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(LabelMap::from_classes(parsed.exported_object_classes))
}

/// Parses a label map export from a string.
pub fn label_map_from_str(json: &str) -> Result<LabelMap, serde_json::Error> {
    let parsed: LabelMapFile = serde_json::from_str(json)?;
    Ok(LabelMap::from_classes(parsed.exported_object_classes))
}

/// Reads the first camera entry of a camera settings export.
pub fn read_camera_settings(path: &Path) -> Result<CameraSettings, SynthrecError> {
    let file = File::open(path).map_err(SynthrecError::io_at(path))?;
    let reader = BufReader::new(file);

    let parsed: CameraSettingsFile =
        serde_json::from_reader(reader).map_err(|source| SynthrecError::CameraSettingsParse {
            path: path.to_path_buf(),
            source,
        })?;

    camera_from_file(parsed)
}

/// Parses a camera settings export from a string.
pub fn camera_settings_from_str(json: &str) -> Result<CameraSettings, SynthrecError> {
    let parsed: CameraSettingsFile =
        serde_json::from_str(json).map_err(|source| SynthrecError::CameraSettingsParse {
            path: Path::new("<string>").to_path_buf(),
            source,
        })?;
    camera_from_file(parsed)
}

fn camera_from_file(parsed: CameraSettingsFile) -> Result<CameraSettings, SynthrecError> {
    let entry =
        parsed
            .camera_settings
            .into_iter()
            .next()
            .ok_or_else(|| SynthrecError::CameraSettingsInvalid {
                message: "camera_settings list is empty".to_string(),
            })?;

    let size = entry.captured_image_size;
    Ok(CameraSettings::new(
        truncate_dimension("width", size.width)?,
        truncate_dimension("height", size.height)?,
    ))
}

/// Truncates toward zero and requires a positive result.
fn truncate_dimension(axis: &str, value: f64) -> Result<u32, SynthrecError> {
    let truncated = value.trunc();
    if !truncated.is_finite() || truncated < 1.0 || truncated > u32::MAX as f64 {
        return Err(SynthrecError::CameraSettingsInvalid {
            message: format!("captured image {} must be a positive integer, got {}", axis, value),
        });
    }
    Ok(truncated as u32)
}
