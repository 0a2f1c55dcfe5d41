//! Scene annotations to sharded TFRecord conversion.
//!
//! [`annotation_to_example`] turns one parsed scene file plus its JPEG into a
//! `tf.train.Example`. [`convert_dataset`] drives it over a dataset
//! directory, spreading examples round-robin across shard files and
//! collecting a COCO sidecar along the way.
//!
//! Everything is single-pass and synchronous. The first error aborts the run;
//! shards already created are left as they are.

pub mod report;

pub use report::{ConversionReport, ShardSummary, SubdirectoryCounts};

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{debug, info, warn};
use prost::Message;
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::error::SynthrecError;
use crate::ir::example::{
    bytes_feature, bytes_list_feature, float_list_feature, int64_feature, int64_list_feature,
};
use crate::ir::io_coco_json::write_coco_json;
use crate::ir::io_scene_json::{read_camera_settings, read_label_map, read_scene_annotation};
use crate::ir::io_tfrecord::TfRecordWriter;
use crate::ir::{
    CameraSettings, CocoAccumulator, Example, IdAllocator, ImageId, LabelMap, SceneAnnotation,
};

/// Objects whose visibility exceeds this are flagged `truncated`.
pub const DEFAULT_VISIBILITY_THRESHOLD: f64 = 0.1;

/// Progress is logged every this many images per subdirectory.
pub const PROGRESS_INTERVAL: usize = 100;

const IMAGE_EXTENSION: &str = "jpg";
const ANNOTATION_EXTENSION: &str = "json";
const VIEW_FRONTAL: &[u8] = b"Frontal";

// ============================================================================
// Selectors
// ============================================================================

/// Dataset split selector.
///
/// This mirrors the CLI's value enum but is decoupled from clap. It is
/// checked against the allow-list and otherwise has no effect on output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Subset {
    #[default]
    Train,
    Val,
    TrainVal,
    Test,
}

impl Subset {
    pub const ALL: [Subset; 4] = [Subset::Train, Subset::Val, Subset::TrainVal, Subset::Test];

    pub fn name(&self) -> &'static str {
        match self {
            Subset::Train => "train",
            Subset::Val => "val",
            Subset::TrainVal => "trainval",
            Subset::Test => "test",
        }
    }
}

/// Dataset release selector; picks the input subdirectories.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Year {
    #[default]
    Esm2020,
    Esm2020Test,
    Merged,
}

impl Year {
    pub const ALL: [Year; 3] = [Year::Esm2020, Year::Esm2020Test, Year::Merged];

    pub fn name(&self) -> &'static str {
        match self {
            Year::Esm2020 => "ESM2020",
            Year::Esm2020Test => "ESM2020_test",
            Year::Merged => "merged",
        }
    }

    /// Subdirectories of the data dir to scan, in order.
    pub fn subdirectories(&self) -> &'static [&'static str] {
        match self {
            Year::Esm2020 => &["ESM2020"],
            Year::Esm2020Test => &["ESM2020_test"],
            Year::Merged => &["ESM2020", "ESM"],
        }
    }
}

macro_rules! impl_selector_parse {
    ($ty:ident, $what:literal) => {
        impl FromStr for $ty {
            type Err = SynthrecError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $ty::ALL
                    .iter()
                    .copied()
                    .find(|v| v.name() == s)
                    .ok_or_else(|| {
                        let allowed: Vec<&str> = $ty::ALL.iter().map(|v| v.name()).collect();
                        SynthrecError::InvalidOption(format!(
                            "{} must be in: [{}], got '{}'",
                            $what,
                            allowed.join(", "),
                            s
                        ))
                    })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

impl_selector_parse!(Subset, "set");
impl_selector_parse!(Year, "year");

// ============================================================================
// Single-example transform
// ============================================================================

/// Shared, read-only inputs of [`annotation_to_example`].
#[derive(Clone, Debug)]
pub struct ExampleContext<'a> {
    /// Dataset root. Image paths are resolved from the annotation path, not
    /// from here.
    pub dataset_dir: &'a Path,
    pub camera: CameraSettings,
    pub label_map: &'a LabelMap,
    /// Accepted for interface compatibility; every object is written with
    /// `difficult = 0`.
    pub ignore_difficult_instances: bool,
    pub visibility_threshold: f64,
}

/// A built example and the facts the driver reports on.
#[derive(Clone, Debug)]
pub struct TransformedExample {
    pub example: Example,
    pub image_id: ImageId,
    pub image_path: PathBuf,
    pub object_count: usize,
}

/// Path of the JPEG paired with an annotation file.
pub fn image_path_for(annotation_path: &Path) -> PathBuf {
    annotation_path.with_extension(IMAGE_EXTENSION)
}

/// Converts one scene annotation and its JPEG to a `tf.train.Example`.
///
/// Boxes are divided by the camera frame size, not by the JPEG's own
/// dimensions. `truncated` is set when an object's visibility is strictly
/// greater than the threshold.
///
/// When `coco` is given, an image entry and one annotation entry per object
/// are appended to it; annotation ids are only drawn in that case.
///
/// # Errors
/// Fails if the JPEG is missing or unreadable, is not JPEG-encoded, or if an
/// object's class is not in the label map.
pub fn annotation_to_example(
    scene: &SceneAnnotation,
    annotation_path: &Path,
    ctx: &ExampleContext<'_>,
    ids: &mut IdAllocator,
    mut coco: Option<&mut CocoAccumulator>,
) -> Result<TransformedExample, SynthrecError> {
    let image_path = image_path_for(annotation_path);
    let encoded = fs::read(&image_path).map_err(|source| SynthrecError::ImageRead {
        path: image_path.clone(),
        source,
    })?;
    if !matches!(
        imagesize::image_type(&encoded),
        Ok(imagesize::ImageType::Jpeg)
    ) {
        return Err(SynthrecError::NotJpeg { path: image_path });
    }
    let key = format!("{:x}", Sha256::digest(&encoded));

    let width = ctx.camera.width;
    let height = ctx.camera.height;
    let file_name = image_path.display().to_string();
    let image_id = ids.next_image_id();

    if let Some(coco) = coco.as_deref_mut() {
        coco.push_image(image_id, file_name.clone(), width, height);
    }

    let n = scene.objects.len();
    let mut xmin = Vec::with_capacity(n);
    let mut ymin = Vec::with_capacity(n);
    let mut xmax = Vec::with_capacity(n);
    let mut ymax = Vec::with_capacity(n);
    let mut area = Vec::with_capacity(n);
    let mut classes = Vec::with_capacity(n);
    let mut classes_text = Vec::with_capacity(n);
    let mut difficult = Vec::with_capacity(n);
    let mut truncated = Vec::with_capacity(n);
    let mut views = Vec::with_capacity(n);

    for obj in &scene.objects {
        let category_id =
            ctx.label_map
                .get(&obj.class_name)
                .ok_or_else(|| SynthrecError::UnknownClass {
                    path: annotation_path.to_path_buf(),
                    class_name: obj.class_name.clone(),
                })?;

        let pixel = obj.pixel_bbox();
        let norm = pixel.to_normalized(f64::from(width), f64::from(height));

        xmin.push(norm.xmin() as f32);
        ymin.push(norm.ymin() as f32);
        xmax.push(norm.xmax() as f32);
        ymax.push(norm.ymax() as f32);
        area.push(norm.area() as f32);
        classes.push(category_id.as_u64() as i64);
        classes_text.push(obj.class_name.as_bytes().to_vec());
        difficult.push(0i64);
        truncated.push(i64::from(obj.visibility > ctx.visibility_threshold));
        views.push(VIEW_FRONTAL.to_vec());

        if let Some(coco) = coco.as_deref_mut() {
            let ann_id = ids.next_annotation_id();
            coco.push_annotation(ann_id, image_id, category_id, &pixel);
        }
    }

    debug_assert!(
        [
            ymin.len(),
            xmax.len(),
            ymax.len(),
            area.len(),
            classes.len(),
            classes_text.len(),
            difficult.len(),
            truncated.len(),
            views.len(),
        ]
        .iter()
        .all(|&len| len == xmin.len()),
        "per-object feature lists out of lock-step"
    );

    let example = Example::from_features([
        ("image/height", int64_feature(i64::from(height))),
        ("image/width", int64_feature(i64::from(width))),
        ("image/filename", bytes_feature(file_name)),
        ("image/source_id", bytes_feature(image_id.to_string())),
        ("image/key/sha256", bytes_feature(key)),
        ("image/encoded", bytes_feature(encoded)),
        ("image/format", bytes_feature("jpeg")),
        ("image/object/bbox/xmin", float_list_feature(xmin)),
        ("image/object/bbox/xmax", float_list_feature(xmax)),
        ("image/object/bbox/ymin", float_list_feature(ymin)),
        ("image/object/bbox/ymax", float_list_feature(ymax)),
        ("image/object/area", float_list_feature(area)),
        ("image/object/class/text", bytes_list_feature(classes_text)),
        ("image/object/class/label", int64_list_feature(classes)),
        ("image/object/difficult", int64_list_feature(difficult)),
        ("image/object/truncated", int64_list_feature(truncated)),
        ("image/object/view", bytes_list_feature(views)),
    ]);

    Ok(TransformedExample {
        example,
        image_id,
        image_path,
        object_count: n,
    })
}

// ============================================================================
// Batch driver
// ============================================================================

/// Options for [`convert_dataset`].
#[derive(Clone, Debug)]
pub struct ConvertOptions {
    /// Root holding one subdirectory per dataset release.
    pub data_dir: PathBuf,
    pub set: Subset,
    /// Accepted for interface compatibility; unused.
    pub annotations_dir: String,
    pub year: Year,
    /// Output prefix. Shards and the sidecar are named from it.
    pub output_path: PathBuf,
    /// `exported_object_classes` JSON. The built-in map is used if `None`.
    pub label_map_json_path: Option<PathBuf>,
    /// Required in practice: without it there is no frame size to
    /// normalize by.
    pub camera_settings_json_path: Option<PathBuf>,
    pub ignore_difficult_instances: bool,
    pub num_shards: usize,
    /// Per-subdirectory cap on converted images.
    pub num_images: Option<usize>,
    pub visibility_threshold: f64,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::new(),
            set: Subset::default(),
            annotations_dir: "Annotations".to_string(),
            year: Year::default(),
            output_path: PathBuf::new(),
            label_map_json_path: None,
            camera_settings_json_path: None,
            ignore_difficult_instances: false,
            num_shards: 1,
            num_images: None,
            visibility_threshold: DEFAULT_VISIBILITY_THRESHOLD,
        }
    }
}

/// Shard file name: `<prefix>-NNNNN-of-NNNNN.tfrecord`.
pub fn shard_path(output_path: &Path, index: usize, num_shards: usize) -> PathBuf {
    let mut name = output_path.as_os_str().to_os_string();
    name.push(format!("-{:05}-of-{:05}.tfrecord", index, num_shards));
    PathBuf::from(name)
}

/// Sidecar file name: `json_<basename>.json` next to the shards.
pub fn sidecar_path(output_path: &Path) -> Result<PathBuf, SynthrecError> {
    let base = output_path.file_name().ok_or_else(|| {
        SynthrecError::InvalidOption(format!(
            "output_path '{}' has no file name component",
            output_path.display()
        ))
    })?;
    let mut name = std::ffi::OsString::from("json_");
    name.push(base);
    name.push(".json");
    Ok(output_dir(output_path).join(name))
}

fn output_dir(output_path: &Path) -> &Path {
    output_path.parent().unwrap_or_else(|| Path::new(""))
}

/// Lists `*.json` files directly inside `dir`, sorted by file name.
pub fn list_annotation_files(dir: &Path) -> Result<Vec<PathBuf>, SynthrecError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            SynthrecError::FileIo {
                path,
                source: e.into(),
            }
        })?;
        let is_annotation =
            entry.path().extension() == Some(std::ffi::OsStr::new(ANNOTATION_EXTENSION));
        if is_annotation && entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Loads the label map from `path`, or the built-in map.
pub fn load_label_map(path: Option<&Path>) -> Result<LabelMap, SynthrecError> {
    match path {
        Some(path) => read_label_map(path),
        None => Ok(LabelMap::default()),
    }
}

/// Loads camera settings from `path`; there is no fallback frame size.
pub fn load_camera_settings(path: Option<&Path>) -> Result<CameraSettings, SynthrecError> {
    match path {
        Some(path) => read_camera_settings(path),
        None => Err(SynthrecError::CameraSettingsInvalid {
            message: "no camera settings file given; captured image size is required".to_string(),
        }),
    }
}

fn validate_options(opts: &ConvertOptions) -> Result<(), SynthrecError> {
    if opts.output_path.as_os_str().is_empty() {
        return Err(SynthrecError::InvalidOption(
            "output_path cannot be empty".to_string(),
        ));
    }
    if opts.num_shards == 0 {
        return Err(SynthrecError::InvalidOption(
            "num_shards must be at least 1".to_string(),
        ));
    }
    if !opts.visibility_threshold.is_finite() {
        return Err(SynthrecError::InvalidOption(format!(
            "visibility_threshold must be finite, got {}",
            opts.visibility_threshold
        )));
    }
    Ok(())
}

/// Converts every annotation file of the selected release(s).
///
/// All options and configuration files are checked before any output is
/// created. Examples go to shard `index % num_shards`, where `index` counts
/// converted images within the current subdirectory. The image cap is also
/// per subdirectory.
///
/// For every scanned annotation file the whole label map is appended to the
/// sidecar's categories, so the list repeats once per file.
pub fn convert_dataset(opts: &ConvertOptions) -> Result<ConversionReport, SynthrecError> {
    validate_options(opts)?;
    let sidecar = sidecar_path(&opts.output_path)?;
    let label_map = load_label_map(opts.label_map_json_path.as_deref())?;
    let camera = load_camera_settings(opts.camera_settings_json_path.as_deref())?;

    debug!(
        "set={} year={} annotations_dir={} label_map_entries={}",
        opts.set,
        opts.year,
        opts.annotations_dir,
        label_map.len()
    );
    if opts.ignore_difficult_instances {
        warn!("ignore_difficult_instances has no effect: no object is marked difficult");
    }

    let out_dir = output_dir(&opts.output_path);
    if !out_dir.as_os_str().is_empty() && !out_dir.exists() {
        fs::create_dir_all(out_dir).map_err(SynthrecError::io_at(out_dir))?;
    }
    info!("Writing to output directory: {}", out_dir.display());

    let shard_paths: Vec<PathBuf> = (0..opts.num_shards)
        .map(|i| shard_path(&opts.output_path, i, opts.num_shards))
        .collect();
    let mut writers = Vec::with_capacity(shard_paths.len());
    for path in &shard_paths {
        debug!("Opening shard {}", path.display());
        writers.push(TfRecordWriter::create(path)?);
    }

    let ctx = ExampleContext {
        dataset_dir: &opts.data_dir,
        camera,
        label_map: &label_map,
        ignore_difficult_instances: opts.ignore_difficult_instances,
        visibility_threshold: opts.visibility_threshold,
    };
    let mut ids = IdAllocator::new();
    let mut coco = CocoAccumulator::new();
    let mut report = ConversionReport::default();

    for subdir in opts.year.subdirectories() {
        let files = list_annotation_files(&opts.data_dir.join(subdir))?;
        let mut counts = SubdirectoryCounts {
            name: (*subdir).to_string(),
            ..Default::default()
        };

        let mut index = 0usize;
        for path in &files {
            let scene = read_scene_annotation(path)?;
            counts.files_scanned += 1;
            coco.extend_categories(&label_map);

            if opts.num_images.is_some_and(|cap| index >= cap) {
                break;
            }
            if index % PROGRESS_INTERVAL == 0 {
                info!("On image {} ({})", index, subdir);
            }

            let transformed =
                annotation_to_example(&scene, path, &ctx, &mut ids, Some(&mut coco))?;
            debug!(
                "{} -> image {} with {} object(s)",
                transformed.image_path.display(),
                transformed.image_id,
                transformed.object_count
            );

            let shard = index % opts.num_shards;
            writers[shard]
                .write_record(&transformed.example.encode_to_vec())
                .map_err(SynthrecError::io_at(&shard_paths[shard]))?;

            report.objects += transformed.object_count;
            counts.images_converted += 1;
            index += 1;
        }

        report.images += counts.images_converted;
        report.subdirectories.push(counts);
    }

    for (writer, path) in writers.into_iter().zip(shard_paths) {
        let records = writer.records_written();
        writer.into_inner().map_err(SynthrecError::io_at(&path))?;
        report.shards.push(ShardSummary { path, records });
    }

    write_coco_json(&sidecar, &coco)?;
    report.category_entries = coco.categories.len();
    report.sidecar = sidecar;

    info!(
        "Wrote {} image(s), {} object(s) to {} shard(s)",
        report.images,
        report.objects,
        report.shards.len()
    );
    Ok(report)
}
