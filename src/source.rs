use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

/// Why a lookup produced no document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("{address}: not found ({status})")]
    Absent { address: String, status: String },

    #[error("{address}: transport fault: {detail}")]
    Transport { address: String, detail: String },
}

impl FetchError {
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport { .. })
    }
}

/// Retrieves the raw text stored at a document address such as `events/001`.
/// Must tolerate concurrent calls for different addresses.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch(&self, address: &str) -> Result<String, FetchError>;
}

// ── HTTP ──

pub struct HttpSource {
    base_url: String,
    ext: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(base_url: &str, ext: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ext: ext.to_string(),
            client,
        })
    }

    fn url_for(&self, address: &str) -> String {
        format!("{}/{}", self.base_url, with_ext(address, &self.ext))
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    async fn fetch(&self, address: &str) -> Result<String, FetchError> {
        let url = self.url_for(address);
        debug!("GET {}", url);
        let transport = |e: reqwest::Error| FetchError::Transport {
            address: address.to_string(),
            detail: e.to_string(),
        };

        let response = self.client.get(&url).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Absent {
                address: address.to_string(),
                status: status.to_string(),
            });
        }
        response.text().await.map_err(transport)
    }
}

// ── Local directory ──

pub struct DirSource {
    root: PathBuf,
    ext: String,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>, ext: &str) -> Self {
        Self {
            root: root.into(),
            ext: ext.to_string(),
        }
    }
}

#[async_trait]
impl DocumentSource for DirSource {
    async fn fetch(&self, address: &str) -> Result<String, FetchError> {
        let path = self.root.join(with_ext(address, &self.ext));
        debug!("read {}", path.display());
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(FetchError::Absent {
                address: address.to_string(),
                status: "no such file".to_string(),
            }),
            Err(e) => Err(FetchError::Transport {
                address: address.to_string(),
                detail: e.to_string(),
            }),
        }
    }
}

fn with_ext(address: &str, ext: &str) -> String {
    if ext.is_empty() {
        address.to_string()
    } else {
        format!("{}.{}", address, ext)
    }
}

/// URL locations are served over HTTP, anything else is a directory.
pub fn open_source(location: &str, ext: &str, timeout: Duration) -> Result<Box<dyn DocumentSource>> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Ok(Box::new(HttpSource::new(location, ext, timeout)?))
    } else {
        let root = PathBuf::from(location);
        if !root.is_dir() {
            anyhow::bail!("source directory not found: {}", root.display());
        }
        Ok(Box::new(DirSource::new(root, ext)))
    }
}

// ── Retry ──

/// Upper bound for a single backoff sleep.
pub const MAX_BACKOFF_MS: u64 = 30_000;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            base_backoff_ms: 500,
        }
    }
}

/// Retries transport faults with exponential backoff. Absences are final.
pub struct Retrying<S> {
    inner: S,
    policy: RetryPolicy,
}

impl RetryPolicy {
    /// `base * 2^attempt`, saturating and capped at [`MAX_BACKOFF_MS`].
    pub fn backoff(&self, attempt: u32) -> Duration {
        let ms = self
            .base_backoff_ms
            .saturating_mul(2u64.saturating_pow(attempt))
            .min(MAX_BACKOFF_MS);
        Duration::from_millis(ms)
    }
}

impl<S: DocumentSource> Retrying<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<S: DocumentSource> DocumentSource for Retrying<S> {
    async fn fetch(&self, address: &str) -> Result<String, FetchError> {
        let mut attempt = 0;
        loop {
            match self.inner.fetch(address).await {
                Err(e) if e.is_transport() && attempt < self.policy.max_retries => {
                    let backoff = self.policy.backoff(attempt);
                    warn!(
                        "{} (attempt {}/{}), backing off {:.1}s",
                        e,
                        attempt + 1,
                        self.policy.max_retries,
                        backoff.as_secs_f64()
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

#[async_trait]
impl DocumentSource for Box<dyn DocumentSource> {
    async fn fetch(&self, address: &str) -> Result<String, FetchError> {
        (**self).fetch(address).await
    }
}

// ── Test double ──
