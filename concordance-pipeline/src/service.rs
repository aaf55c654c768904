use async_trait::async_trait;
use common::error::AppError;
use serde_json::Value;
use tracing::debug;

use crate::request::ConcordanceRequest;

/// Remote concordance search. Returns the undecoded JSON body.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConcordanceService: Send + Sync {
    async fn search(&self, request: &ConcordanceRequest) -> Result<Value, AppError>;
}

/// HTTP client for the DH-lab concordance endpoint.
#[derive(Debug, Clone)]
pub struct HttpConcordanceService {
    client: reqwest::Client,
    url: String,
}

impl HttpConcordanceService {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl ConcordanceService for HttpConcordanceService {
    async fn search(&self, request: &ConcordanceRequest) -> Result<Value, AppError> {
        debug!(url = %self.url, documents = request.dhlabids.len(), "posting concordance query");
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::SearchService(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::SearchService(format!(
                "the concordance service answered {status}"
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| AppError::SearchService(format!("unreadable response: {e}")))
    }
}
