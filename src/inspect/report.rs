//! Inspect report types and terminal formatting.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// The result of reading back a set of TFRecord shards.
#[derive(Clone, Debug, Default, Serialize)]
pub struct InspectReport {
    pub shards: Vec<ShardCount>,
    /// Total examples decoded.
    pub records: usize,
    /// Total objects across all examples.
    pub objects: usize,
    /// Examples with no objects.
    pub empty_records: usize,
    /// Object counts per `class/text`, sorted by count descending.
    pub labels: Vec<LabelCount>,
    pub issues: Vec<InspectIssue>,
    #[serde(skip)]
    pub(crate) bar_width: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ShardCount {
    pub path: PathBuf,
    pub records: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

/// A problem found in one record.
#[derive(Clone, Debug, Serialize)]
pub struct InspectIssue {
    pub severity: Severity,
    pub code: IssueCode,
    pub message: String,
    pub shard: PathBuf,
    pub record: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// Stable issue codes for programmatic consumption.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    /// A required feature is absent or has the wrong kind.
    MissingFeature,
    /// Per-object lists differ in length.
    LengthMismatch,
    /// `image/key/sha256` does not match `image/encoded`.
    KeyMismatch,
    /// `image/source_id` repeats across records.
    DuplicateSourceId,
    /// A normalized coordinate lies outside `[0, 1]`.
    OutOfRange,
    /// `min > max` on some axis.
    InvertedBox,
}

impl InspectReport {
    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    pub fn is_ok(&self) -> bool {
        self.error_count() == 0
    }

    pub(crate) fn add(
        &mut self,
        severity: Severity,
        code: IssueCode,
        shard: &std::path::Path,
        record: usize,
        message: impl Into<String>,
    ) {
        self.issues.push(InspectIssue {
            severity,
            code,
            message: message.into(),
            shard: shard.to_path_buf(),
            record,
        });
    }
}

impl fmt::Display for InspectIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(
            f,
            "[{}] {:?} {}#{}: {}",
            tag,
            self.code,
            self.shard.display(),
            self.record,
            self.message
        )
    }
}

impl fmt::Display for InspectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Shards:")?;
        for shard in &self.shards {
            writeln!(
                f,
                "  {:>8}  {}",
                format_number(shard.records),
                shard.path.display()
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Records:        {:>8}", format_number(self.records))?;
        writeln!(f, "Objects:        {:>8}", format_number(self.objects))?;
        writeln!(f, "Empty records:  {:>8}", format_number(self.empty_records))?;

        if !self.labels.is_empty() {
            writeln!(f)?;
            writeln!(f, "Labels:")?;
            let max_count = self.labels.first().map(|l| l.count).unwrap_or(0);
            for entry in &self.labels {
                writeln!(
                    f,
                    "  {:<12} {} {:>8}",
                    truncate_label(&entry.label, 12),
                    render_bar(entry.count, max_count, self.bar_width),
                    format_number(entry.count)
                )?;
            }
        }

        writeln!(f)?;
        if self.issues.is_empty() {
            return writeln!(f, "Inspection passed: no issues found");
        }
        writeln!(
            f,
            "Inspection completed with {} error(s) and {} warning(s):",
            self.error_count(),
            self.warning_count()
        )?;
        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }
        Ok(())
    }
}

/// Format a number with thousands separators.
fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut out = String::with_capacity(s.len() + s.len() / 3);
    for (i, ch) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Render a horizontal bar using Unicode block characters.
fn render_bar(count: usize, max_count: usize, width: usize) -> String {
    if max_count == 0 || width == 0 {
        return String::new();
    }
    let filled = ((count * width) / max_count).min(width);
    "█".repeat(filled) + &"░".repeat(width - filled)
}

/// Truncate a label to fit in the display column.
fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        label.to_string()
    } else {
        let head: String = label.chars().take(max_chars - 1).collect();
        format!("{}…", head)
    }
}
