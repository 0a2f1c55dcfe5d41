use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

mod common;

#[test]
fn runs() {
    let mut cmd = Command::cargo_bin("synthrec").unwrap();
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("synthrec"));
}

#[test]
fn outputs_tool_name() {
    let mut cmd = Command::cargo_bin("synthrec").unwrap();
    cmd.arg("-V");
    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("synthrec "));
}

// Convert subcommand tests

#[test]
fn convert_writes_shards_and_sidecar() {
    let tmp = tempfile::tempdir().unwrap();
    common::dataset_with_scenes(&tmp.path().join("data"), "ESM2020", 3);
    let camera = tmp.path().join("camera.json");
    common::write_camera_settings(&camera, 640.0, 480.0);
    let out = tmp.path().join("out/train");

    let mut cmd = Command::cargo_bin("synthrec").unwrap();
    cmd.arg("convert")
        .arg("--data_dir")
        .arg(tmp.path().join("data"))
        .arg("--output_path")
        .arg(&out)
        .arg("--camera_settings_json_path")
        .arg(&camera)
        .args(["--num_shards", "2"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "Converted 3 image(s) with 3 object(s) into 2 shard(s)",
        ))
        .stdout(predicate::str::contains("train-00001-of-00002.tfrecord (1 records)"));

    assert!(tmp.path().join("out/train-00000-of-00002.tfrecord").is_file());
    assert!(tmp.path().join("out/train-00001-of-00002.tfrecord").is_file());
    let sidecar = fs::read_to_string(tmp.path().join("out/json_train.json")).unwrap();
    assert!(sidecar.starts_with(r#"{"images":["#));
}

#[test]
fn convert_defaults_data_dir_to_current_directory() {
    let tmp = tempfile::tempdir().unwrap();
    common::dataset_with_scenes(tmp.path(), "ESM2020", 2);
    common::write_camera_settings(&tmp.path().join("camera.json"), 640.0, 480.0);

    let mut cmd = Command::cargo_bin("synthrec").unwrap();
    cmd.current_dir(tmp.path()).args([
        "convert",
        "--output_path",
        "out/train",
        "--camera_settings_json_path",
        "camera.json",
    ]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("ESM2020: 2 file(s) scanned, 2 converted"));

    assert!(tmp.path().join("out/train-00000-of-00001.tfrecord").is_file());
    assert!(tmp.path().join("out/json_train.json").is_file());
}

#[test]
fn convert_missing_subdirectory_names_path() {
    let tmp = tempfile::tempdir().unwrap();
    let camera = tmp.path().join("camera.json");
    common::write_camera_settings(&camera, 640.0, 480.0);

    let mut cmd = Command::cargo_bin("synthrec").unwrap();
    cmd.arg("convert")
        .arg("--data_dir")
        .arg(tmp.path())
        .arg("--output_path")
        .arg(tmp.path().join("out/train"))
        .arg("--camera_settings_json_path")
        .arg(&camera)
        .args(["--year", "ESM2020_test"]);
    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("ESM2020_test"));
}

#[test]
fn convert_invalid_year_is_usage_error() {
    let mut cmd = Command::cargo_bin("synthrec").unwrap();
    cmd.args(["convert", "--output_path", "out/train", "--year", "VOC2012"]);
    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("VOC2012"));
}

#[test]
fn convert_requires_output_path() {
    let mut cmd = Command::cargo_bin("synthrec").unwrap();
    cmd.args(["convert", "--year", "merged"]);
    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("--output_path"));
}

#[test]
fn convert_without_camera_settings_fails() {
    let tmp = tempfile::tempdir().unwrap();
    common::dataset_with_scenes(tmp.path(), "ESM2020", 1);

    let mut cmd = Command::cargo_bin("synthrec").unwrap();
    cmd.arg("convert")
        .arg("--data_dir")
        .arg(tmp.path())
        .arg("--output_path")
        .arg(tmp.path().join("out/train"));
    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("Error: Invalid camera settings"));
    assert!(!tmp.path().join("out").exists());
}

#[test]
fn convert_rejects_non_jpeg_image() {
    let tmp = tempfile::tempdir().unwrap();
    common::dataset_with_scenes(tmp.path(), "ESM2020", 1);
    fs::write(tmp.path().join("ESM2020/000000.jpg"), b"\x89PNG\r\n\x1a\n\0\0\0\0").unwrap();
    let camera = tmp.path().join("camera.json");
    common::write_camera_settings(&camera, 640.0, 480.0);

    let mut cmd = Command::cargo_bin("synthrec").unwrap();
    cmd.arg("convert")
        .arg("--data_dir")
        .arg(tmp.path())
        .arg("--output_path")
        .arg(tmp.path().join("out/train"))
        .arg("--camera_settings_json_path")
        .arg(&camera);
    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("Image format not JPEG"));
}

#[test]
fn convert_zero_shards_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let camera = tmp.path().join("camera.json");
    common::write_camera_settings(&camera, 640.0, 480.0);

    let mut cmd = Command::cargo_bin("synthrec").unwrap();
    cmd.arg("convert")
        .arg("--data_dir")
        .arg(tmp.path())
        .arg("--output_path")
        .arg(tmp.path().join("train"))
        .arg("--camera_settings_json_path")
        .arg(&camera)
        .args(["--num_shards", "0"]);
    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("num_shards must be at least 1"));
}

// Inspect subcommand tests

fn converted_dataset(tmp: &std::path::Path) -> std::path::PathBuf {
    common::dataset_with_scenes(&tmp.join("data"), "ESM2020", 2);
    let camera = tmp.join("camera.json");
    common::write_camera_settings(&camera, 640.0, 480.0);
    let out = tmp.join("out/train");

    Command::cargo_bin("synthrec")
        .unwrap()
        .arg("convert")
        .arg("--data_dir")
        .arg(tmp.join("data"))
        .arg("--output_path")
        .arg(&out)
        .arg("--camera_settings_json_path")
        .arg(&camera)
        .assert()
        .success();

    tmp.join("out/train-00000-of-00001.tfrecord")
}

#[test]
fn inspect_converted_shard_passes() {
    let tmp = tempfile::tempdir().unwrap();
    let shard = converted_dataset(tmp.path());

    let mut cmd = Command::cargo_bin("synthrec").unwrap();
    cmd.arg("inspect").arg(&shard);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Inspection passed"))
        .stdout(predicate::str::contains("Hat"));
}

#[test]
fn inspect_json_output_format() {
    let tmp = tempfile::tempdir().unwrap();
    let shard = converted_dataset(tmp.path());

    let mut cmd = Command::cargo_bin("synthrec").unwrap();
    cmd.arg("inspect").arg(&shard).args(["--output", "json"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"records\": 2"))
        .stdout(predicate::str::contains("\"issues\": []"));
}

#[test]
fn inspect_truncated_shard_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let shard = converted_dataset(tmp.path());
    let bytes = fs::read(&shard).unwrap();
    fs::write(&shard, &bytes[..bytes.len() - 3]).unwrap();

    let mut cmd = Command::cargo_bin("synthrec").unwrap();
    cmd.arg("inspect").arg(&shard);
    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("Corrupt TFRecord"));
}

#[test]
fn inspect_nonexistent_file_fails() {
    let mut cmd = Command::cargo_bin("synthrec").unwrap();
    cmd.args(["inspect", "nonexistent-00000-of-00001.tfrecord"]);
    cmd.assert().failure();
}
