//! Read-back inspection of TFRecord shards.
//!
//! Decodes every example written by the converter and checks:
//! - the image-level features are present with the right kind,
//! - per-object lists are in lock-step,
//! - `image/key/sha256` matches the encoded bytes,
//! - `image/source_id` is unique across all shards,
//! - normalized boxes lie in `[0, 1]` with `min <= max`.
//!
//! Framing and protobuf errors abort inspection; everything else becomes an
//! issue in the report.

mod report;

pub use report::{InspectIssue, InspectReport, IssueCode, LabelCount, Severity, ShardCount};

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use prost::Message;
use sha2::{Digest, Sha256};

use crate::error::SynthrecError;
use crate::ir::io_tfrecord::TfRecordReader;
use crate::ir::{BBoxXYXY, Example, Normalized};

/// Options for shard inspection.
#[derive(Clone, Debug)]
pub struct InspectOptions {
    /// Width of histogram bars (in characters).
    pub bar_width: usize,
    /// Recompute SHA-256 of every encoded image.
    pub verify_keys: bool,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self {
            bar_width: 20,
            verify_keys: true,
        }
    }
}

const INT64_IMAGE_KEYS: [&str; 2] = ["image/height", "image/width"];

const BYTES_IMAGE_KEYS: [&str; 5] = [
    "image/filename",
    "image/source_id",
    "image/key/sha256",
    "image/encoded",
    "image/format",
];

/// Per-object lists that must share one length.
const OBJECT_KEYS: [&str; 10] = [
    "image/object/bbox/xmin",
    "image/object/bbox/xmax",
    "image/object/bbox/ymin",
    "image/object/bbox/ymax",
    "image/object/area",
    "image/object/class/text",
    "image/object/class/label",
    "image/object/difficult",
    "image/object/truncated",
    "image/object/view",
];

/// Inspects `shards` in order and returns a report.
///
/// # Errors
/// Returns an error if a shard cannot be opened, a record fails its CRC or
/// is truncated, or a payload is not a valid `tf.train.Example`.
pub fn inspect_shards(
    shards: &[PathBuf],
    opts: &InspectOptions,
) -> Result<InspectReport, SynthrecError> {
    let mut report = InspectReport {
        bar_width: opts.bar_width,
        ..Default::default()
    };
    let mut labels: BTreeMap<String, usize> = BTreeMap::new();
    let mut source_ids: HashSet<Vec<u8>> = HashSet::new();

    for shard in shards {
        let mut count = 0;
        for (record, payload) in TfRecordReader::open(shard)?.enumerate() {
            let payload = payload?;
            let example = Example::decode(payload.as_slice()).map_err(|source| {
                SynthrecError::ExampleDecode {
                    path: shard.clone(),
                    record,
                    source,
                }
            })?;
            check_example(
                &example,
                shard,
                record,
                opts,
                &mut report,
                &mut labels,
                &mut source_ids,
            );
            count += 1;
        }
        report.records += count;
        report.shards.push(ShardCount {
            path: shard.clone(),
            records: count,
        });
    }

    let mut entries: Vec<LabelCount> = labels
        .into_iter()
        .map(|(label, count)| LabelCount { label, count })
        .collect();
    // Stable sort keeps ties in name order.
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    report.labels = entries;

    Ok(report)
}

fn check_example(
    example: &Example,
    shard: &Path,
    record: usize,
    opts: &InspectOptions,
    report: &mut InspectReport,
    labels: &mut BTreeMap<String, usize>,
    source_ids: &mut HashSet<Vec<u8>>,
) {
    for key in INT64_IMAGE_KEYS {
        if !matches!(example.int64_list(key), Some([_])) {
            report.add(
                Severity::Error,
                IssueCode::MissingFeature,
                shard,
                record,
                format!("'{}' missing or not a single int64", key),
            );
        }
    }
    for key in BYTES_IMAGE_KEYS {
        if !matches!(example.bytes_list(key), Some([_])) {
            report.add(
                Severity::Error,
                IssueCode::MissingFeature,
                shard,
                record,
                format!("'{}' missing or not a single bytes value", key),
            );
        }
    }

    if let Some([id]) = example.bytes_list("image/source_id") {
        if !source_ids.insert(id.clone()) {
            report.add(
                Severity::Error,
                IssueCode::DuplicateSourceId,
                shard,
                record,
                format!("source_id '{}' already seen", String::from_utf8_lossy(id)),
            );
        }
    }

    if opts.verify_keys {
        if let (Some([key]), Some([encoded])) = (
            example.bytes_list("image/key/sha256"),
            example.bytes_list("image/encoded"),
        ) {
            let actual = format!("{:x}", Sha256::digest(encoded));
            if actual.as_bytes() != key.as_slice() {
                report.add(
                    Severity::Error,
                    IssueCode::KeyMismatch,
                    shard,
                    record,
                    "sha256 key does not match encoded image",
                );
            }
        }
    }

    let mut lengths = Vec::with_capacity(OBJECT_KEYS.len());
    for key in OBJECT_KEYS {
        match example.list_len(key) {
            Some(len) => lengths.push((key, len)),
            None => report.add(
                Severity::Error,
                IssueCode::MissingFeature,
                shard,
                record,
                format!("'{}' missing", key),
            ),
        }
    }
    let expected = lengths.first().map(|&(_, len)| len).unwrap_or(0);
    let mismatched: Vec<String> = lengths
        .iter()
        .filter(|&&(_, len)| len != expected)
        .map(|(key, len)| format!("{}={}", key, len))
        .collect();
    if !mismatched.is_empty() {
        report.add(
            Severity::Error,
            IssueCode::LengthMismatch,
            shard,
            record,
            format!(
                "expected {} per-object values, got {}",
                expected,
                mismatched.join(", ")
            ),
        );
    }

    report.objects += expected;
    if expected == 0 {
        report.empty_records += 1;
    }

    if let Some(texts) = example.bytes_list("image/object/class/text") {
        for text in texts {
            *labels
                .entry(String::from_utf8_lossy(text).into_owned())
                .or_insert(0) += 1;
        }
    }

    if mismatched.is_empty() {
        check_boxes(example, shard, record, report);
    }
}

fn check_boxes(example: &Example, shard: &Path, record: usize, report: &mut InspectReport) {
    let (Some(xmin), Some(ymin), Some(xmax), Some(ymax)) = (
        example.float_list("image/object/bbox/xmin"),
        example.float_list("image/object/bbox/ymin"),
        example.float_list("image/object/bbox/xmax"),
        example.float_list("image/object/bbox/ymax"),
    ) else {
        return;
    };

    for i in 0..xmin.len() {
        let bbox: BBoxXYXY<Normalized> = BBoxXYXY::from_xyxy(
            f64::from(xmin[i]),
            f64::from(ymin[i]),
            f64::from(xmax[i]),
            f64::from(ymax[i]),
        );
        if !bbox.is_within_unit() {
            report.add(
                Severity::Warning,
                IssueCode::OutOfRange,
                shard,
                record,
                format!("object {} has coordinates outside [0, 1]: {:?}", i, bbox),
            );
        }
        if !bbox.is_ordered() {
            report.add(
                Severity::Warning,
                IssueCode::InvertedBox,
                shard,
                record,
                format!("object {} has min > max: {:?}", i, bbox),
            );
        }
    }
}
