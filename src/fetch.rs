//! HTTP retrieval of the download page and the archive

use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

/// Default timeout for a single request
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Body of a successful fetch
#[derive(Clone, Debug)]
pub struct FetchedBody {
    /// URL the body was served from, after redirects
    pub final_url: String,
    /// Response body
    pub bytes: Vec<u8>,
}

impl FetchedBody {
    /// Body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Source of remote content.
///
/// Any transport failure or status other than 200 must be reported as
/// [`Error::Fetch`]. Implementations own retry, TLS, and timeout policy.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url`
    async fn fetch(&self, url: &str) -> Result<FetchedBody>;
}

/// [`Fetcher`] backed by a reqwest client
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher whose requests time out after `timeout`
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config {
                message: format!("failed to create HTTP client: {}", e),
                key: None,
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedBody> {
        debug!(url, "fetching");

        let response = self.client.get(url).send().await.map_err(|e| {
            let reason = if e.is_timeout() {
                format!("timed out: {}", e)
            } else if e.is_connect() {
                format!("connection failed: {}", e)
            } else {
                e.to_string()
            };
            Error::Fetch {
                url: url.to_string(),
                reason,
            }
        })?;

        let status = response.status();
        let final_url = response.url().to_string();
        if status != StatusCode::OK {
            return Err(Error::Fetch {
                url: final_url,
                reason: format!("HTTP {}", status),
            });
        }

        let bytes = response.bytes().await.map_err(|e| Error::Fetch {
            url: final_url.clone(),
            reason: format!("failed to read response body: {}", e),
        })?;

        debug!(url, final_url = %final_url, size = bytes.len(), "fetched");
        Ok(FetchedBody {
            final_url,
            bytes: bytes.to_vec(),
        })
    }
}
