use std::{path::Path, time::Duration};

use async_trait::async_trait;
use reqwest::{header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT}, Url};

use crate::{config::AuthConfig, error::FetchError};

pub mod client;

pub use client::ReqwestTransport;

/// The network seam. One blocking-in-spirit GET at a time; every call is
/// bounded by `timeout`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Stream the body of `url` into `dest`, returning the bytes written.
    async fn download(&self, url: &str, dest: &Path, timeout: Duration) -> Result<u64, FetchError>;

    /// Buffer the whole body of `url` in memory.
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, FetchError>;
}

/// True when `url` points at `host` itself or one of its subdomains.
pub fn host_matches(url: &str, host: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else { return false };
    let Some(target) = parsed.host_str() else { return false };
    let target = target.to_ascii_lowercase();
    let host = host.to_ascii_lowercase();
    target == host || target.ends_with(&format!(".{}", host))
}

/// Headers for one request: the browser-like user agent, plus the bearer
/// token when one is configured for the destination host.
pub fn request_headers(url: &str, user_agent: &str, auth: Option<&AuthConfig>) -> Result<HeaderMap, FetchError> {
    let mut headers = HeaderMap::new();
    let ua = HeaderValue::from_str(user_agent).map_err(|e| FetchError::network(url, format!("invalid user agent: {}", e)))?;
    headers.insert(USER_AGENT, ua);
    if let Some(auth) = auth.filter(|a| host_matches(url, &a.host)) {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", auth.token))
            .map_err(|e| FetchError::network(url, format!("invalid token: {}", e)))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> AuthConfig {
        AuthConfig { token: "ghp_secret".into(), host: "github.com".into() }
    }

    #[test]
    fn user_agent_always_present() {
        let headers = request_headers("https://cdn.jsdelivr.net/x", "agent/1.0", None).unwrap();
        assert_eq!(headers.get(USER_AGENT).unwrap(), "agent/1.0");
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn token_only_sent_to_its_host() {
        let a = auth();
        let gh = request_headers("https://github.com/Hyuto/yolov8-tfjs/raw/master/yolov8n/model.json", "ua", Some(&a)).unwrap();
        assert_eq!(gh.get(AUTHORIZATION).unwrap(), "Bearer ghp_secret");

        let api = request_headers("https://API.github.com/repos", "ua", Some(&a)).unwrap();
        assert!(api.get(AUTHORIZATION).is_some());

        let hf = request_headers("https://huggingface.co/Hyuto/model.json", "ua", Some(&a)).unwrap();
        assert!(hf.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn lookalike_hosts_do_not_match() {
        assert!(!host_matches("https://notgithub.com/x", "github.com"));
        assert!(!host_matches("https://github.com.evil.io/x", "github.com"));
        assert!(!host_matches("not a url", "github.com"));
    }
}
