use std::path::PathBuf;

use async_trait::async_trait;
use common::error::AppError;
use tracing::debug;
use url::Url;

/// Byte-stream source for the manifest and the corpus table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetSource: Send + Sync {
    async fn fetch(&self, name: &str) -> Result<Vec<u8>, AppError>;
}

/// Reads assets from a local directory.
#[derive(Debug, Clone)]
pub struct LocalAssetSource {
    root: PathBuf,
}

impl LocalAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl AssetSource for LocalAssetSource {
    async fn fetch(&self, name: &str) -> Result<Vec<u8>, AppError> {
        let path = self.root.join(name);
        debug!(path = %path.display(), "reading asset");
        Ok(tokio::fs::read(&path).await?)
    }
}

/// Fetches assets over HTTP relative to a base URL.
#[derive(Debug, Clone)]
pub struct HttpAssetSource {
    client: reqwest::Client,
    base: Url,
}

impl HttpAssetSource {
    pub fn new(client: reqwest::Client, base_url: &str) -> Result<Self, AppError> {
        Ok(Self {
            client,
            base: Url::parse(base_url)?,
        })
    }

    /// Appends `name` to the base as a single percent-encoded path segment.
    pub fn asset_url(&self, name: &str) -> Result<Url, AppError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| AppError::Config(format!("{} cannot be a base URL", self.base)))?
            .pop_if_empty()
            .push(name);
        Ok(url)
    }
}

#[async_trait]
impl AssetSource for HttpAssetSource {
    async fn fetch(&self, name: &str) -> Result<Vec<u8>, AppError> {
        let url = self.asset_url(name)?;
        debug!(%url, "fetching asset");
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}
