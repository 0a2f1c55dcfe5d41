//! Summary of a finished conversion run.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// What a conversion run produced.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ConversionReport {
    /// Examples written across all shards.
    pub images: usize,
    /// Objects written across all examples.
    pub objects: usize,
    /// Entries in the sidecar `categories` list (repeats included).
    pub category_entries: usize,
    /// Per input subdirectory counts, in processing order.
    pub subdirectories: Vec<SubdirectoryCounts>,
    /// One entry per shard, in shard order.
    pub shards: Vec<ShardSummary>,
    /// Path of the COCO sidecar.
    pub sidecar: PathBuf,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SubdirectoryCounts {
    pub name: String,
    /// Annotation files opened, including one that tripped the image cap.
    pub files_scanned: usize,
    pub images_converted: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ShardSummary {
    pub path: PathBuf,
    pub records: usize,
}

impl ConversionReport {
    /// Records per shard, in shard order.
    pub fn records_per_shard(&self) -> Vec<usize> {
        self.shards.iter().map(|s| s.records).collect()
    }
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Converted {} image(s) with {} object(s) into {} shard(s)",
            self.images,
            self.objects,
            self.shards.len()
        )?;

        for sub in &self.subdirectories {
            writeln!(
                f,
                "  {}: {} file(s) scanned, {} converted",
                sub.name, sub.files_scanned, sub.images_converted
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Shards:")?;
        for shard in &self.shards {
            writeln!(f, "  {} ({} records)", shard.path.display(), shard.records)?;
        }

        writeln!(f)?;
        writeln!(
            f,
            "COCO sidecar: {} ({} category entries)",
            self.sidecar.display(),
            self.category_entries
        )
    }
}
