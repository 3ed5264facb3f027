use std::fs;

use splitfile_engine::{ensure_download_dir, ArtifactWriter};
use tempfile::TempDir;

#[test]
fn creates_missing_download_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("downloads");
    assert!(!new_dir.exists());
    ensure_download_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing_artifact() {
    let temp = TempDir::new().unwrap();
    let writer = ArtifactWriter::new(temp.path().to_path_buf());

    let first = writer.write("report.zip", b"one").unwrap();
    assert_eq!(first.file_name().unwrap(), "report.zip");
    assert_eq!(fs::read(&first).unwrap(), b"one");

    // Replace existing
    let second = writer.write("report.zip", b"two").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read(&second).unwrap(), b"two");
}

#[test]
fn no_partial_file_on_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = ArtifactWriter::new(file_path.clone());
    let result = writer.write("report.zip", b"data");
    assert!(result.is_err());
    assert!(!file_path.with_file_name("report.zip").exists());
}
