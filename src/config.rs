use serde::{Deserialize, Serialize};
use std::{path::{Path, PathBuf}, time::Duration};

use anyhow::Context;

use crate::{sources::{self, SourceDescriptor}, Result};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub const DEFAULT_TOKEN_HOST: &str = "github.com";
pub const DEFAULT_OUTPUT_DIR_NAME: &str = "yolov8n_web_model";

/// Optional overrides read from a TOML file. Every field left out keeps its
/// built-in value.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub output_dir: Option<PathBuf>,
    pub user_agent: Option<String>,
    pub token: Option<String>,
    pub token_host: Option<String>,
    pub file_timeout_secs: Option<u64>,
    pub archive_timeout_secs: Option<u64>,
    pub archive_urls: Option<Vec<String>>,
    pub sources: Option<Vec<SourceDescriptor>>,
    pub local_dir: Option<PathBuf>,
    pub excluded_prefixes: Option<Vec<String>>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let cfg: Config = toml::from_str(&data).with_context(|| format!("parsing {}", path.display()))?;
        Ok(cfg)
    }
}

/// Sent only to `host` and its subdomains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub token: String,
    pub host: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Descriptor and weight files.
    pub file: Duration,
    pub archive: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { file: Duration::from_secs(30), archive: Duration::from_secs(60) }
    }
}

/// Everything the fetcher needs, passed in explicitly.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub output_dir: PathBuf,
    pub user_agent: String,
    pub auth: Option<AuthConfig>,
    pub timeouts: Timeouts,
    pub archive_urls: Vec<String>,
    pub sources: Vec<SourceDescriptor>,
    pub local_dir: Option<PathBuf>,
    pub excluded_prefixes: Vec<String>,
}

impl FetchConfig {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            auth: None,
            timeouts: Timeouts::default(),
            archive_urls: sources::default_archive_urls(),
            sources: sources::default_sources(),
            local_dir: None,
            excluded_prefixes: vec!["__MACOSX".to_string()],
        }
    }

    /// Output directory next to the running executable, or the working
    /// directory if that cannot be resolved.
    pub fn default_output_dir() -> PathBuf {
        let base = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join(DEFAULT_OUTPUT_DIR_NAME)
    }

    pub fn apply(mut self, cfg: Config) -> Self {
        if let Some(dir) = cfg.output_dir { self.output_dir = dir; }
        if let Some(ua) = cfg.user_agent { self.user_agent = ua; }
        if let Some(token) = cfg.token.filter(|t| !t.trim().is_empty()) {
            let host = cfg.token_host.unwrap_or_else(|| DEFAULT_TOKEN_HOST.to_string());
            self.auth = Some(AuthConfig { token, host });
        }
        if let Some(secs) = cfg.file_timeout_secs { self.timeouts.file = Duration::from_secs(secs); }
        if let Some(secs) = cfg.archive_timeout_secs { self.timeouts.archive = Duration::from_secs(secs); }
        if let Some(urls) = cfg.archive_urls { self.archive_urls = urls; }
        if let Some(sources) = cfg.sources { self.sources = sources; }
        if cfg.local_dir.is_some() { self.local_dir = cfg.local_dir; }
        if let Some(prefixes) = cfg.excluded_prefixes { self.excluded_prefixes = prefixes; }
        self
    }
}
