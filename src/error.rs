use std::{io, path::PathBuf};

use thiserror::Error;

/// Why a single fetch attempt did not produce its files.
///
/// None of these are fatal: the fetcher reports them and moves on to the next
/// strategy.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error for {url}: {reason}")]
    Network { url: String, reason: String },
    #[error("bad archive: {0}")]
    Archive(String),
    #[error("unreadable model descriptor: {0}")]
    DescriptorParse(String),
    #[error("failed to write {}: {source}", path.display())]
    FileWrite { path: PathBuf, #[source] source: io::Error },
}

impl FetchError {
    pub fn network(url: &str, reason: impl ToString) -> Self {
        FetchError::Network { url: url.to_string(), reason: reason.to_string() }
    }

    pub fn file_write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        FetchError::FileWrite { path: path.into(), source }
    }
}
