use std::{fs, process::Command};

use tempfile::TempDir;

// Nothing to try, so the binary never touches the network.
#[test]
fn exits_nonzero_with_guidance_when_every_source_fails() {
    let tmp = TempDir::new().unwrap();
    let cfg = tmp.path().join("fetch.toml");
    fs::write(&cfg, "archive_urls = []\nsources = []\n").unwrap();
    let out_dir = tmp.path().join("model");

    let output = Command::new(env!("CARGO_BIN_EXE_model-fetch"))
        .arg("--config")
        .arg(&cfg)
        .arg("--output-dir")
        .arg(&out_dir)
        .env("NO_COLOR", "1")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("download the model files manually"), "stdout was: {stdout}");
    assert!(out_dir.is_dir());
}

#[test]
fn local_model_directory_succeeds_offline() {
    let tmp = TempDir::new().unwrap();
    let local = tmp.path().join("local");
    fs::create_dir(&local).unwrap();
    fs::write(local.join("model.json"), "{}").unwrap();
    let cfg = tmp.path().join("fetch.toml");
    fs::write(&cfg, format!("local_dir = {:?}\n", local.display().to_string())).unwrap();
    let out_dir = tmp.path().join("model");

    let status = Command::new(env!("CARGO_BIN_EXE_model-fetch"))
        .arg("--config")
        .arg(&cfg)
        .arg("--output-dir")
        .arg(&out_dir)
        .status()
        .unwrap();

    assert!(status.success());
    assert_eq!(fs::read_to_string(out_dir.join("model.json")).unwrap(), "{}");
}

#[test]
fn unreadable_config_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_model-fetch"))
        .arg("--config")
        .arg(tmp.path().join("missing.toml"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("missing.toml"));
}
