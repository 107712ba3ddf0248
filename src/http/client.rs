use std::{path::Path, time::Duration};

use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{Client, Response};
use tokio::io::AsyncWriteExt;

use super::{request_headers, Transport};
use crate::{config::{AuthConfig, FetchConfig}, error::FetchError};

/// `Transport` over a shared reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    user_agent: String,
    auth: Option<AuthConfig>,
    show_progress: bool,
}

impl ReqwestTransport {
    pub fn new(config: &FetchConfig) -> crate::Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            user_agent: config.user_agent.clone(),
            auth: config.auth.clone(),
            show_progress: true,
        })
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    async fn get(&self, url: &str, timeout: Duration) -> Result<Response, FetchError> {
        let headers = request_headers(url, &self.user_agent, self.auth.as_ref())?;
        tracing::debug!(url, authorized = headers.contains_key(reqwest::header::AUTHORIZATION), "GET");
        let resp = self
            .client
            .get(url)
            .headers(headers)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| FetchError::network(url, describe(&e)))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::network(url, format!("HTTP {}", status)));
        }
        Ok(resp)
    }

    fn progress_bar(&self, total: Option<u64>) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        match total {
            Some(len) => {
                let bar = ProgressBar::new(len);
                if let Ok(style) = ProgressStyle::with_template("  {bar:30.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec})") {
                    bar.set_style(style.progress_chars("=> "));
                }
                bar
            }
            None => ProgressBar::new_spinner(),
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn download(&self, url: &str, dest: &Path, timeout: Duration) -> Result<u64, FetchError> {
        let resp = self.get(url, timeout).await?;
        let bar = self.progress_bar(resp.content_length());
        let result = write_chunks(url, resp.bytes_stream(), dest, |n| bar.inc(n)).await;
        bar.finish_and_clear();
        if result.is_err() {
            // A truncated shard is worse than a missing one.
            if let Err(e) = tokio::fs::remove_file(dest).await {
                tracing::debug!(dest = %dest.display(), error = %e, "could not remove partial download");
            }
        }
        result
    }

    async fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, FetchError> {
        let resp = self.get(url, timeout).await?;
        let bytes = resp.bytes().await.map_err(|e| FetchError::network(url, describe(&e)))?;
        tracing::debug!(url, len = bytes.len(), "buffered body");
        Ok(bytes.to_vec())
    }
}

fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else {
        err.to_string()
    }
}

/// Copy a body stream into `dest` chunk by chunk. `on_chunk` sees the size of
/// every chunk written.
pub async fn write_chunks<S, B, E, F>(url: &str, stream: S, dest: &Path, mut on_chunk: F) -> Result<u64, FetchError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
    F: FnMut(u64),
{
    let mut stream = std::pin::pin!(stream);
    let mut file = tokio::fs::File::create(dest).await.map_err(|e| FetchError::file_write(dest, e))?;
    let mut written = 0u64;
    while let Some(item) = stream.next().await {
        let chunk = item.map_err(|e| FetchError::network(url, e))?;
        let chunk = chunk.as_ref();
        file.write_all(chunk).await.map_err(|e| FetchError::file_write(dest, e))?;
        written += chunk.len() as u64;
        on_chunk(chunk.len() as u64);
    }
    file.flush().await.map_err(|e| FetchError::file_write(dest, e))?;
    tracing::debug!(url, written, dest = %dest.display(), "download complete");
    Ok(written)
}
