use std::{fs, path::Path};

use colored::Colorize;
use walkdir::WalkDir;

use crate::{error::FetchError, manifest};

/// Copy the regular files directly inside `src` into `out_dir`.
pub fn copy_flat(src: &Path, out_dir: &Path) -> Result<Vec<String>, FetchError> {
    println!("Found local pre-converted model, copying to {}", out_dir.display());
    let mut copied = Vec::new();
    for entry in WalkDir::new(src).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            FetchError::file_write(path, e.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let dest = out_dir.join(&name);
        fs::copy(entry.path(), &dest).map_err(|e| FetchError::file_write(&dest, e))?;
        println!("{} copied: {}", "✓".green(), name);
        copied.push(name);
    }
    let missing = manifest::missing_from_bundle(out_dir, &copied);
    if !missing.is_empty() {
        let reason = format!("local model is incomplete, missing {}", missing.join(", "));
        return Err(FetchError::file_write(src, std::io::Error::new(std::io::ErrorKind::NotFound, reason)));
    }
    Ok(copied)
}
