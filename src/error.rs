use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::inspect::InspectReport;

/// The main error type for synthrec operations.
#[derive(Debug, Error)]
pub enum SynthrecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("IO error on {path}: {source}")]
    FileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse annotation JSON from {path}: {source}")]
    AnnotationParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse label map JSON from {path}: {source}")]
    LabelMapParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse camera settings JSON from {path}: {source}")]
    CameraSettingsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid camera settings: {message}")]
    CameraSettingsInvalid { message: String },

    #[error("Failed to read image {path}: {source}")]
    ImageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Image format not JPEG: {path}")]
    NotJpeg { path: PathBuf },

    #[error("Unknown class '{class_name}' in {path} (not in label map)")]
    UnknownClass { path: PathBuf, class_name: String },

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Failed to write COCO JSON to {path}: {source}")]
    CocoJsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Corrupt TFRecord in {path} at record {record}: {message}")]
    TfRecordCorrupt {
        path: PathBuf,
        record: usize,
        message: String,
    },

    #[error("Failed to decode tf.Example in {path} at record {record}: {source}")]
    ExampleDecode {
        path: PathBuf,
        record: usize,
        #[source]
        source: prost::DecodeError,
    },

    #[error("Inspection found {error_count} error(s) and {warning_count} warning(s)")]
    InspectFailed {
        error_count: usize,
        warning_count: usize,
        report: Box<InspectReport>,
    },
}

impl SynthrecError {
    /// Wraps an I/O error with the path it happened on, for use in `map_err`.
    pub(crate) fn io_at(path: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| SynthrecError::FileIo {
            path: path.to_path_buf(),
            source,
        }
    }
}
