//! Transports for raster and summary resources.
//!
//! Rasters are addressed by URL. `http(s)://` URLs go over the network,
//! `file://` URLs and bare paths are read from disk. Tests use the
//! in-memory fetcher.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, instrument};

/// Errors raised while fetching a resource.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// Whether the resource simply does not exist (as opposed to a broken
    /// transport).
    pub fn is_not_found(&self) -> bool {
        match self {
            FetchError::NotFound(_) => true,
            FetchError::Status { status, .. } => *status == 404,
            FetchError::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            FetchError::Transport { .. } => false,
        }
    }
}

/// Fetches the raw bytes behind a URL.
#[async_trait]
pub trait RasterFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError>;
}

// ============================================================================
// HTTP
// ============================================================================

/// Fetcher backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("raster-pipeline/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Transport {
                url: String::new(),
                message: e.to_string(),
            })?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RasterFetcher for HttpFetcher {
    #[instrument(skip(self), level = "debug")]
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        let transport = |e: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        debug!(url = %url, bytes = body.len(), "Fetched over HTTP");
        Ok(body)
    }
}

// ============================================================================
// Filesystem
// ============================================================================

/// Fetcher for `file://` URLs and plain paths.
#[derive(Debug, Clone, Default)]
pub struct FileFetcher;

impl FileFetcher {
    fn path_of(url: &str) -> PathBuf {
        PathBuf::from(url.strip_prefix("file://").unwrap_or(url))
    }
}

#[async_trait]
impl RasterFetcher for FileFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        let path = Self::path_of(url);
        match tokio::fs::read(&path).await {
            Ok(data) => {
                debug!(path = %path.display(), bytes = data.len(), "Read from disk");
                Ok(Bytes::from(data))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(FetchError::NotFound(url.to_string()))
            }
            Err(e) => Err(FetchError::Io(e)),
        }
    }
}

/// Dispatches on the URL scheme: HTTP(S) over the network, everything else
/// from disk.
#[derive(Debug, Clone)]
pub struct UrlFetcher {
    http: HttpFetcher,
    file: FileFetcher,
}

impl UrlFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self {
            http: HttpFetcher::new(timeout)?,
            file: FileFetcher,
        })
    }
}

#[async_trait]
impl RasterFetcher for UrlFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        if url.starts_with("http://") || url.starts_with("https://") {
            self.http.fetch(url).await
        } else {
            self.file.fetch(url).await
        }
    }
}

// ============================================================================
// In-memory
// ============================================================================

/// Fetcher serving registered byte blobs. Counts calls per URL and tracks
/// the peak number of fetches in flight.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    resources: RwLock<HashMap<String, Bytes>>,
    failing: RwLock<HashSet<String>>,
    calls: Mutex<HashMap<String, usize>>,
    latency: Option<Duration>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

/// Decrements the in-flight count when a fetch returns.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every fetch by `latency`, so concurrent callers overlap.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn insert(&self, url: impl Into<String>, data: impl Into<Bytes>) {
        let mut resources = self.resources.write().unwrap_or_else(|e| e.into_inner());
        resources.insert(url.into(), data.into());
    }

    /// Make a URL fail with a transport error.
    pub fn fail(&self, url: impl Into<String>) {
        let mut failing = self.failing.write().unwrap_or_else(|e| e.into_inner());
        failing.insert(url.into());
    }

    /// Number of fetches issued for `url`.
    pub fn calls_for(&self, url: &str) -> usize {
        let calls = self.calls.lock().unwrap_or_else(|e| e.into_inner());
        calls.get(url).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        let calls = self.calls.lock().unwrap_or_else(|e| e.into_inner());
        calls.values().sum()
    }

    /// Most fetches that were ever running at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RasterFetcher for MemoryFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        {
            let mut calls = self.calls.lock().unwrap_or_else(|e| e.into_inner());
            *calls.entry(url.to_string()).or_insert(0) += 1;
        }

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _in_flight = InFlight(&self.in_flight);
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let failing = self
            .failing
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(url);
        if failing {
            return Err(FetchError::Transport {
                url: url.to_string(),
                message: "injected failure".to_string(),
            });
        }

        let resources = self.resources.read().unwrap_or_else(|e| e.into_inner());
        resources
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(url.to_string()))
    }
}
