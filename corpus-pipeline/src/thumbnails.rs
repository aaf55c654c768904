use std::{
    collections::HashSet,
    sync::{Arc, Mutex, PoisonError},
};

use async_trait::async_trait;
use common::{
    error::AppError,
    storage::{thumbnail_cache::ThumbnailCache, types::corpus_document::CorpusDocument},
};
use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, instrument, warn};

/// Link relations checked on each catalog item, most preferred first.
const THUMBNAIL_PREFERENCE: [&str; 3] = ["thumbnail_medium", "thumbnail_small", "thumbnail_large"];

/// External catalog that can resolve a preview image for a URN.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Returns the preferred thumbnail URL, or `None` when the catalog has none.
    async fn thumbnail_for(&self, urn: &str) -> Result<Option<String>, AppError>;
}

/// Catalog client for the National Library item search API.
#[derive(Debug, Clone)]
pub struct NbCatalogClient {
    client: reqwest::Client,
    catalog_url: String,
}

impl NbCatalogClient {
    pub fn new(client: reqwest::Client, catalog_url: impl Into<String>) -> Self {
        Self {
            client,
            catalog_url: catalog_url.into(),
        }
    }
}

#[async_trait]
impl CatalogClient for NbCatalogClient {
    async fn thumbnail_for(&self, urn: &str) -> Result<Option<String>, AppError> {
        let body: Value = self
            .client
            .get(&self.catalog_url)
            .query(&[("q", urn)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(pick_thumbnail(&body))
    }
}

/// First item in `_embedded.items` exposing a thumbnail link, by resolution preference.
pub fn pick_thumbnail(body: &Value) -> Option<String> {
    body.pointer("/_embedded/items")?
        .as_array()?
        .iter()
        .find_map(|item| {
            let links = item.get("_links")?;
            THUMBNAIL_PREFERENCE.iter().find_map(|rel| {
                links
                    .get(*rel)?
                    .get("href")?
                    .as_str()
                    .map(str::trim)
                    .filter(|href| !href.is_empty())
                    .map(str::to_string)
            })
        })
}

/// Releases an in-flight claim when the lookup finishes or is dropped.
struct InFlightGuard {
    id: String,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

/// Resolves preview images for documents, skipping cached and in-flight ids.
pub struct ThumbnailResolver<C> {
    client: Arc<C>,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl<C> Clone for ThumbnailResolver<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<C: CatalogClient> ThumbnailResolver<C> {
    pub fn new(client: C) -> Self {
        Self {
            client: Arc::new(client),
            in_flight: Arc::default(),
        }
    }

    fn claim(&self, id: &str) -> Option<InFlightGuard> {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        in_flight.insert(id.to_string()).then(|| InFlightGuard {
            id: id.to_string(),
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    /// Looks up every uncached document with a URN concurrently.
    ///
    /// Returns the `(id, url)` pairs that resolved to an image. Failed or empty
    /// lookups are left out so a later call can retry them. The caller records
    /// the results in its cache.
    #[instrument(skip_all, fields(documents = documents.len()))]
    pub async fn resolve(
        &self,
        documents: &[CorpusDocument],
        cache: &ThumbnailCache,
    ) -> Vec<(String, String)> {
        let lookups = documents
            .iter()
            .filter(|doc| !doc.urn.trim().is_empty() && !cache.contains(&doc.id))
            .filter_map(|doc| self.claim(&doc.id).map(|guard| (doc, guard)))
            .map(|(doc, guard)| {
                let client = Arc::clone(&self.client);
                let urn = doc.urn.trim().to_string();
                async move {
                    let result = client.thumbnail_for(&urn).await;
                    let id = guard.id.clone();
                    drop(guard);
                    match result {
                        Ok(Some(url)) => Some((id, url)),
                        Ok(None) => {
                            debug!(%id, %urn, "no thumbnail in catalog");
                            None
                        }
                        Err(err) => {
                            warn!(%id, %urn, error = %err, "thumbnail lookup failed");
                            None
                        }
                    }
                }
            })
            .collect::<Vec<_>>();

        debug!(lookups = lookups.len(), "issuing thumbnail lookups");
        join_all(lookups).await.into_iter().flatten().collect()
    }
}
