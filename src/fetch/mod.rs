//! Asset Fetching
//!
//! Retrieves the raw bytes of an audio asset. Any transport failure or
//! non-success response is reported as [`ChipwaveError::Network`].

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::HttpFetcher;

use crate::{ChipwaveError, Result};
use std::future::Future;
use std::path::PathBuf;

/// Fetch capability used by the sample fetcher
pub trait Fetch: Send + Sync {
    /// Retrieve the full payload behind `url`
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// Reads local paths and `file://` URLs
#[derive(Debug, Clone, Default)]
pub struct FileFetcher {
    root: Option<PathBuf>,
}

impl FileFetcher {
    /// Resolve relative paths against the working directory
    pub fn new() -> Self {
        FileFetcher { root: None }
    }

    /// Resolve relative paths against `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        FileFetcher {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, url: &str) -> PathBuf {
        let path = PathBuf::from(url.strip_prefix("file://").unwrap_or(url));
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path,
        }
    }
}

impl Fetch for FileFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let path = self.resolve(url);
        tokio::fs::read(&path)
            .await
            .map_err(|e| ChipwaveError::Network(format!("{}: {}", path.display(), e)))
    }
}
