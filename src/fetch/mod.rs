//! Ordered fallback over every place the model bundle can come from.

use std::{fmt, fs, path::{Path, PathBuf}, time::Duration};

use colored::Colorize;

use crate::{config::FetchConfig, error::FetchError, http::Transport, sources::SourceDescriptor};

pub mod archive;
pub mod local;
pub mod structured;

/// One attempt in the fallback list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Copy a pre-converted model that already sits on disk.
    LocalCopy(PathBuf),
    /// Download one zip holding the whole bundle.
    Archive(String),
    /// Descriptor first, then each weight shard.
    Structured(SourceDescriptor),
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::LocalCopy(dir) => write!(f, "local model at {}", dir.display()),
            Strategy::Archive(url) => write!(f, "archive {}", url),
            Strategy::Structured(src) => write!(f, "{}", src.name),
        }
    }
}

impl Strategy {
    /// Try to put a complete bundle into `config.output_dir`. On success
    /// returns the file names written.
    pub async fn attempt<T: Transport>(&self, transport: &T, config: &FetchConfig) -> Result<Vec<String>, FetchError> {
        match self {
            Strategy::LocalCopy(dir) => local::copy_flat(dir, &config.output_dir),
            Strategy::Archive(url) => archive::fetch_archive(transport, url, config).await,
            Strategy::Structured(src) => structured::fetch_source(transport, src, config).await,
        }
    }
}

/// The attempt that produced the bundle.
#[derive(Debug, Clone)]
pub struct FetchReport {
    pub strategy: Strategy,
    pub files: Vec<String>,
    /// Strategies tried, the winning one included.
    pub attempts: usize,
}

pub struct Fetcher<T: Transport> {
    transport: T,
    config: FetchConfig,
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T, config: FetchConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &FetchConfig { &self.config }

    pub fn transport(&self) -> &T { &self.transport }

    /// Local copy (when configured and present), then every archive, then
    /// every structured source.
    pub fn strategies(&self) -> Vec<Strategy> {
        let mut out = Vec::new();
        if let Some(dir) = self.config.local_dir.as_ref().filter(|d| d.is_dir()) {
            out.push(Strategy::LocalCopy(dir.clone()));
        }
        out.extend(self.config.archive_urls.iter().cloned().map(Strategy::Archive));
        out.extend(self.config.sources.iter().cloned().map(Strategy::Structured));
        out
    }

    /// Walk the strategies until one succeeds. `Ok(None)` means every
    /// candidate failed; `Err` only if the output directory cannot be created.
    pub async fn run(&self) -> Result<Option<FetchReport>, FetchError> {
        let out_dir = &self.config.output_dir;
        if !out_dir.exists() {
            fs::create_dir_all(out_dir).map_err(|e| FetchError::file_write(out_dir, e))?;
            println!("Created directory: {}", out_dir.display());
        }

        let mut attempts = 0;
        for strategy in self.strategies() {
            attempts += 1;
            println!("\n{} {}", "Trying".bold(), strategy);
            match strategy.attempt(&self.transport, &self.config).await {
                Ok(files) => {
                    println!("\n{} Fetched complete model from {}", "✅".green(), strategy);
                    return Ok(Some(FetchReport { strategy, files, attempts }));
                }
                Err(err) => {
                    tracing::warn!(%strategy, error = %err, "attempt failed");
                    println!("{} {} failed: {}. Trying next source...", "×".red(), strategy, err);
                }
            }
        }
        Ok(None)
    }
}

/// Stream one file into the output directory, printing progress lines the
/// operator can follow.
pub(crate) async fn fetch_file<T: Transport>(transport: &T, url: &str, dest: &Path, timeout: Duration) -> Result<u64, FetchError> {
    let name = dest.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    println!("Downloading: {}...", name);
    match transport.download(url, dest, timeout).await {
        Ok(bytes) => {
            println!("{} done: {} ({} bytes)", "✓".green(), name, bytes);
            Ok(bytes)
        }
        Err(err) => {
            println!("{} error: {} - {}", "×".red(), name, err);
            Err(err)
        }
    }
}
