//! Reading and patching the TF.js `model.json` descriptor.
//!
//! The document is handled as a `serde_json::Value` so every field other than
//! `weightsManifest[].paths` survives a rewrite untouched.

use std::{fs, path::Path};

use serde_json::Value;

use crate::error::FetchError;

pub const DESCRIPTOR_FILE: &str = "model.json";
const MANIFEST_KEY: &str = "weightsManifest";
const PATHS_KEY: &str = "paths";

/// Last path segment. Handles both separators since some converters emit
/// Windows paths.
pub fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Names that are safe to join onto the output directory.
pub fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

/// Replace every manifest path with its base name. Returns how many entries
/// changed; running it again on the result changes nothing.
pub fn flatten_paths(doc: &mut Value) -> usize {
    let Some(groups) = doc.get_mut(MANIFEST_KEY).and_then(Value::as_array_mut) else { return 0 };
    let mut changed = 0;
    for group in groups {
        let Some(paths) = group.get_mut(PATHS_KEY).and_then(Value::as_array_mut) else { continue };
        for entry in paths {
            let Some(path) = entry.as_str() else { continue };
            let flat = base_name(path);
            if flat == path {
                continue;
            }
            let flat = flat.to_string();
            *entry = Value::String(flat);
            changed += 1;
        }
    }
    changed
}

/// Weight file names in manifest order, first occurrence wins.
pub fn weight_files(doc: &Value) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let groups = doc.get(MANIFEST_KEY).and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[]);
    for group in groups {
        let paths = group.get(PATHS_KEY).and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[]);
        for name in paths.iter().filter_map(Value::as_str) {
            if !out.iter().any(|seen| seen == name) {
                out.push(name.to_string());
            }
        }
    }
    out
}

pub fn read_descriptor(path: &Path) -> Result<Value, FetchError> {
    let data = fs::read_to_string(path)
        .map_err(|e| FetchError::DescriptorParse(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&data).map_err(|e| FetchError::DescriptorParse(format!("{}: {}", path.display(), e)))
}

/// Flatten the manifest paths of the descriptor on disk and write it back.
/// Nothing is written if the file cannot be parsed.
pub fn rewrite_descriptor(path: &Path) -> Result<usize, FetchError> {
    let mut doc = read_descriptor(path)?;
    let changed = flatten_paths(&mut doc);
    let data = serde_json::to_string_pretty(&doc).map_err(|e| FetchError::DescriptorParse(e.to_string()))?;
    fs::write(path, data).map_err(|e| FetchError::file_write(path, e))?;
    Ok(changed)
}

/// What a flat bundle in `dir` still lacks, given the files just `written`:
/// the descriptor itself, or any shard it lists. An unparsable descriptor
/// only has to be present.
pub fn missing_from_bundle(dir: &Path, written: &[String]) -> Vec<String> {
    if !written.iter().any(|n| n == DESCRIPTOR_FILE) {
        return vec![DESCRIPTOR_FILE.to_string()];
    }
    let listed = read_descriptor(&dir.join(DESCRIPTOR_FILE)).map(|doc| weight_files(&doc)).unwrap_or_default();
    listed
        .iter()
        .map(|path| base_name(path))
        .filter(|name| !written.iter().any(|w| w == name))
        .map(str::to_string)
        .collect()
}
