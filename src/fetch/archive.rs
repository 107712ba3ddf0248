use std::{fs::File, io::{self, Cursor}, path::Path};

use colored::Colorize;
use zip::read::ZipArchive;

use crate::{config::FetchConfig, error::FetchError, http::Transport, manifest};

/// Download a zipped bundle into memory and unpack it flat.
pub async fn fetch_archive<T: Transport>(transport: &T, url: &str, config: &FetchConfig) -> Result<Vec<String>, FetchError> {
    println!("Downloading packaged model: {}", url);
    let body = transport.fetch(url, config.timeouts.archive).await?;
    println!("Extracting model files...");
    extract_flat(&body, &config.output_dir, &config.excluded_prefixes)
}

fn is_excluded(name: &str, excluded: &[String]) -> bool {
    name.split(['/', '\\']).any(|part| excluded.iter().any(|p| !p.is_empty() && part.starts_with(p.as_str())))
}

/// Write every file entry of the zip in `bytes` into `out_dir` under its base
/// name. Directory structure inside the archive is dropped; entries under an
/// excluded prefix are skipped.
pub fn extract_flat(bytes: &[u8], out_dir: &Path, excluded: &[String]) -> Result<Vec<String>, FetchError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| FetchError::Archive(e.to_string()))?;
    let mut written = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| FetchError::Archive(e.to_string()))?;
        if entry.is_dir() || is_excluded(entry.name(), excluded) {
            continue;
        }
        let name = manifest::base_name(entry.name()).to_string();
        if !manifest::is_plain_file_name(&name) {
            continue;
        }
        let dest = out_dir.join(&name);
        let mut out = File::create(&dest).map_err(|e| FetchError::file_write(&dest, e))?;
        io::copy(&mut entry, &mut out).map_err(|e| match e.kind() {
            io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => FetchError::Archive(format!("{}: {}", name, e)),
            _ => FetchError::file_write(&dest, e),
        })?;
        println!("{} extracted: {}", "✓".green(), name);
        written.push(name);
    }
    if written.iter().any(|n| n == manifest::DESCRIPTOR_FILE) {
        if let Err(err) = manifest::rewrite_descriptor(&out_dir.join(manifest::DESCRIPTOR_FILE)) {
            tracing::debug!(error = %err, "descriptor from archive left as is");
        }
    }
    let missing = manifest::missing_from_bundle(out_dir, &written);
    if !missing.is_empty() {
        return Err(FetchError::Archive(format!("incomplete model bundle, missing {}", missing.join(", "))));
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::{FileOptions, ZipWriter};

    fn zip_of(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut w = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            if name.ends_with('/') {
                w.add_directory(*name, FileOptions::default()).unwrap();
            } else {
                w.start_file(*name, FileOptions::default()).unwrap();
                w.write_all(data.as_bytes()).unwrap();
            }
        }
        w.finish().unwrap().into_inner()
    }

    fn macosx() -> Vec<String> { vec!["__MACOSX".to_string()] }

    #[test]
    fn flattens_nested_entries() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = zip_of(&[
            ("a/", ""),
            ("a/model.json", "{}"),
            ("a/weights/group1-shard1of1.bin", "\x01\x02"),
        ]);
        let files = extract_flat(&bytes, dir.path(), &macosx()).unwrap();
        assert_eq!(files, vec!["model.json", "group1-shard1of1.bin"]);
        assert_eq!(std::fs::read(dir.path().join("model.json")).unwrap(), b"{}");
        assert_eq!(std::fs::read(dir.path().join("group1-shard1of1.bin")).unwrap(), b"\x01\x02");
        assert!(!dir.path().join("a").exists());
    }

    #[test]
    fn skips_metadata_entries() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = zip_of(&[("__MACOSX/a/._model.json", "junk"), ("a/model.json", "{}")]);
        let files = extract_flat(&bytes, dir.path(), &macosx()).unwrap();
        assert_eq!(files, vec!["model.json"]);
        assert!(!dir.path().join("._model.json").exists());
    }

    #[test]
    fn corrupt_archive_is_an_archive_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract_flat(b"<html>404</html>", dir.path(), &macosx()).unwrap_err();
        assert!(matches!(err, FetchError::Archive(_)));
    }

    #[test]
    fn archive_without_descriptor_fails() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = zip_of(&[("bundle/README.md", "read me")]);
        let err = extract_flat(&bytes, dir.path(), &macosx()).unwrap_err();
        assert!(matches!(&err, FetchError::Archive(msg) if msg.contains("model.json")), "{err}");
    }

    #[test]
    fn archive_missing_a_listed_shard_fails() {
        let dir = tempfile::tempdir().unwrap();
        let descriptor = r#"{"weightsManifest":[{"paths":["w/group1-shard1of2.bin","w/group1-shard2of2.bin"]}]}"#;
        let bytes = zip_of(&[("a/model.json", descriptor), ("a/w/group1-shard1of2.bin", "1")]);
        let err = extract_flat(&bytes, dir.path(), &macosx()).unwrap_err();
        assert!(matches!(&err, FetchError::Archive(msg) if msg.contains("group1-shard2of2.bin")), "{err}");
    }

    #[test]
    fn descriptor_paths_are_flattened_after_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let descriptor = r#"{"weightsManifest":[{"paths":["w/group1-shard1of1.bin"]}]}"#;
        let bytes = zip_of(&[("a/model.json", descriptor), ("a/w/group1-shard1of1.bin", "1")]);
        extract_flat(&bytes, dir.path(), &macosx()).unwrap();
        let doc = manifest::read_descriptor(&dir.path().join("model.json")).unwrap();
        assert_eq!(manifest::weight_files(&doc), vec!["group1-shard1of1.bin"]);
    }

    #[test]
    fn archive_without_files_fails() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = zip_of(&[("a/", ""), ("__MACOSX/x", "junk")]);
        assert!(matches!(extract_flat(&bytes, dir.path(), &macosx()), Err(FetchError::Archive(_))));
    }
}
