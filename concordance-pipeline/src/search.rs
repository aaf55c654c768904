use std::collections::HashMap;

use common::{
    error::AppError,
    storage::{
        registry::Registry,
        selection::SelectionState,
        types::{
            concordance_hit::ConcordanceHit,
            corpus_document::{CorpusDocument, UNKNOWN_TITLE},
            year_range::YearRange,
        },
    },
    utils::config::AppConfig,
};
use tracing::{debug, info, instrument};
use url::Url;

use crate::{
    request::{coerce_ids, ConcordanceRequest},
    response::{normalize_response, CanonicalRow},
    service::ConcordanceService,
};

/// Query parameter carrying the search term to the document viewer.
const VIEWER_QUERY_PARAM: &str = "searchText";

/// Fixed request parameters and the viewer base URL.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub window: u32,
    pub limit: u32,
    pub html_formatting: bool,
    pub item_base_url: Url,
}

impl SearchSettings {
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Ok(Self {
            window: config.concordance_window,
            limit: config.concordance_limit,
            html_formatting: config.html_formatting,
            item_base_url: Url::parse(&config.item_base_url)?,
        })
    }
}

pub struct ConcordanceSearch<S> {
    service: S,
    settings: SearchSettings,
}

impl<S: ConcordanceService> ConcordanceSearch<S> {
    pub fn new(service: S, settings: SearchSettings) -> Self {
        Self { service, settings }
    }

    /// Validates the local preconditions and builds the outgoing request.
    pub fn build_request(
        &self,
        query: &str,
        registry: &Registry,
        selection: &SelectionState,
        years: &YearRange,
    ) -> Result<ConcordanceRequest, AppError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::EmptyQuery);
        }
        if registry.is_empty() {
            return Err(AppError::EmptyCorpus);
        }

        let included: Vec<&CorpusDocument> = registry
            .visible(years)
            .filter(|doc| selection.is_selected(&doc.id))
            .collect();
        if included.is_empty() {
            return Err(AppError::EmptySelection);
        }

        let dhlabids = coerce_ids(included.iter().map(|doc| doc.id.as_str()));
        if dhlabids.is_empty() {
            return Err(AppError::NoValidIds);
        }
        if dhlabids.len() < included.len() {
            debug!(
                dropped = included.len().saturating_sub(dhlabids.len()),
                "skipping documents with non-numeric ids"
            );
        }

        Ok(ConcordanceRequest {
            query: query.to_string(),
            dhlabids,
            window: self.settings.window,
            limit: self.settings.limit,
            html_formatting: self.settings.html_formatting,
        })
    }

    /// Runs a concordance search over the included documents.
    ///
    /// Preconditions are checked before any network call. Hits come back in
    /// service order, joined with registry metadata.
    #[instrument(skip_all)]
    pub async fn search(
        &self,
        query: &str,
        registry: &Registry,
        selection: &SelectionState,
        years: &YearRange,
    ) -> Result<Vec<ConcordanceHit>, AppError> {
        let request = self.build_request(query, registry, selection, years)?;
        info!(
            query = %request.query,
            documents = request.dhlabids.len(),
            "running concordance search"
        );

        let body = self.service.search(&request).await?;
        let index = RegistryIndex::new(registry);
        let hits: Vec<ConcordanceHit> = normalize_response(body)?
            .into_iter()
            .map(|row| self.to_hit(row, &index, &request.query))
            .collect();

        info!(hits = hits.len(), "concordance search finished");
        Ok(hits)
    }

    fn to_hit(&self, row: CanonicalRow, index: &RegistryIndex<'_>, query: &str) -> ConcordanceHit {
        let book_id = row.document_id().map(str::trim).unwrap_or_default().to_string();
        let meta = index.lookup(&book_id);

        let urn = non_blank(row.urn.as_deref())
            .or_else(|| non_blank(meta.map(|m| m.urn.as_str())))
            .unwrap_or_default()
            .to_string();
        let document_url = if urn.is_empty() {
            String::new()
        } else {
            document_url(&self.settings.item_base_url, &urn, query)
        };

        ConcordanceHit {
            book_id,
            title: meta
                .map_or(UNKNOWN_TITLE, CorpusDocument::display_title)
                .to_string(),
            year: meta.and_then(|m| m.year),
            urn,
            concordance_markup: row.conc.unwrap_or_default(),
            document_url,
        }
    }
}

/// Registry lookup by exact id, falling back to the integer form sent in the
/// request so ids like `007` still match a returned `7`.
struct RegistryIndex<'a> {
    registry: &'a Registry,
    by_number: HashMap<i64, &'a CorpusDocument>,
}

impl<'a> RegistryIndex<'a> {
    fn new(registry: &'a Registry) -> Self {
        let mut by_number = HashMap::new();
        for doc in registry.documents() {
            if let Ok(number) = doc.id.trim().parse::<i64>() {
                by_number.entry(number).or_insert(doc);
            }
        }
        Self {
            registry,
            by_number,
        }
    }

    fn lookup(&self, id: &str) -> Option<&'a CorpusDocument> {
        self.registry.get(id).or_else(|| {
            id.parse::<i64>()
                .ok()
                .and_then(|number| self.by_number.get(&number).copied())
        })
    }
}

/// Viewer link for a URN, with the query as a highlight hint.
pub fn document_url(base: &Url, urn: &str, query: &str) -> String {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(urn.trim());
    }
    url.query_pairs_mut().append_pair(VIEWER_QUERY_PARAM, query);
    url.into()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
