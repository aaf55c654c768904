use chrono::NaiveDate;
use common::{
    error::AppError,
    storage::{
        registry::Registry,
        selection::SelectionState,
        thumbnail_cache::ThumbnailCache,
        types::{
            concordance_hit::ConcordanceHit, corpus_document::CorpusDocument,
            year_range::YearRange,
        },
    },
    utils::{
        generation::{Generation, GenerationToken},
        manifest::DEFAULT_APP_NAME,
    },
};
use concordance_pipeline::{export_hits, ConcordanceSearch, ConcordanceService, ExportPayload};
use corpus_pipeline::{AssetSource, CatalogClient, CorpusLoader, LoadedCorpus, ThumbnailResolver};
use tracing::{debug, error, info, warn};

/// Whether an async result was committed or dropped because it went stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    Applied,
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionCounts {
    pub total: usize,
    pub visible: usize,
    pub selected: usize,
}

/// Owns every piece of mutable state: registry, selection, thumbnails and hits.
///
/// Async work is split into `begin_*`/`finish_*` pairs. A result is only
/// committed while its generation token is still current.
pub struct Session {
    app_name: String,
    concordance_url: Option<String>,
    registry: Registry,
    selection: SelectionState,
    years: YearRange,
    thumbnails: ThumbnailCache,
    hits: Vec<ConcordanceHit>,
    last_error: Option<AppError>,
    loading: bool,
    loads: Generation,
    searches: Generation,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            concordance_url: None,
            registry: Registry::default(),
            selection: SelectionState::new(),
            years: YearRange::default(),
            thumbnails: ThumbnailCache::new(),
            hits: Vec::new(),
            last_error: None,
            loading: false,
            loads: Generation::new(),
            searches: Generation::new(),
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Concordance endpoint named by the last loaded manifest.
    pub fn concordance_url(&self) -> Option<&str> {
        self.concordance_url.as_deref()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn hits(&self) -> &[ConcordanceHit] {
        &self.hits
    }

    pub fn last_error(&self) -> Option<&AppError> {
        self.last_error.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn thumbnail(&self, id: &str) -> Option<&str> {
        self.thumbnails.get(id)
    }

    /// Handle that lets another task cancel outstanding loads and searches.
    pub fn cancel_handle(&self) -> (Generation, Generation) {
        (self.loads.clone(), self.searches.clone())
    }

    // --- corpus loading -------------------------------------------------

    pub fn begin_load(&mut self) -> GenerationToken {
        self.loading = true;
        self.last_error = None;
        self.loads.begin()
    }

    pub fn finish_load(
        &mut self,
        token: &GenerationToken,
        result: Result<LoadedCorpus, AppError>,
    ) -> Commit {
        if !token.is_current() {
            debug!(load = token.id(), "discarding superseded corpus load");
            return Commit::Superseded;
        }

        self.loading = false;
        match result {
            Ok(loaded) => {
                self.app_name = loaded.manifest.app_name;
                self.concordance_url = Some(loaded.manifest.concordance_url);
                self.registry = loaded.registry;
                self.selection.initialize(self.registry.ids());
                info!(documents = self.registry.len(), "registry replaced");
            }
            Err(err) => {
                error!(error = %err, "corpus load failed");
                self.registry = Registry::default();
                self.last_error = Some(err);
            }
        }
        Commit::Applied
    }

    pub async fn load<S: AssetSource>(&mut self, loader: &CorpusLoader<S>) -> Commit {
        let token = self.begin_load();
        let result = loader.load().await;
        self.finish_load(&token, result)
    }

    // --- selection and derived views ------------------------------------

    pub fn set_year_range(&mut self, years: YearRange) {
        self.years = years;
    }

    /// Year filter with open bounds filled from the corpus.
    pub fn effective_years(&self) -> YearRange {
        self.years.with_defaults(self.registry.year_bounds())
    }

    pub fn visible_documents(&self) -> Vec<&CorpusDocument> {
        let years = self.effective_years();
        self.registry
            .documents()
            .iter()
            .filter(|doc| years.contains(doc.year))
            .collect()
    }

    pub fn counts(&self) -> SelectionCounts {
        let visible = self.visible_documents();
        SelectionCounts {
            total: self.registry.len(),
            visible: visible.len(),
            selected: visible
                .iter()
                .filter(|doc| self.selection.is_selected(&doc.id))
                .count(),
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.is_selected(id)
    }

    /// Flips a document's flag. Ids outside the registry are ignored.
    pub fn toggle(&mut self, id: &str) -> bool {
        if !self.registry.contains(id) {
            warn!(%id, "ignoring toggle for unknown document");
            return false;
        }
        self.selection.toggle(id);
        true
    }

    pub fn select_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        let registry = &self.registry;
        self.selection
            .select_all(ids.into_iter().filter(|id| registry.contains(id)));
    }

    pub fn clear_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        let registry = &self.registry;
        self.selection
            .clear_all(ids.into_iter().filter(|id| registry.contains(id)));
    }

    pub fn select_visible(&mut self) {
        let ids = self.visible_ids();
        self.selection.select_all(ids.iter().map(String::as_str));
    }

    pub fn clear_visible(&mut self) {
        let ids = self.visible_ids();
        self.selection.clear_all(ids.iter().map(String::as_str));
    }

    /// Replaces the flags, e.g. from a saved file. Missing ids stay default-selected.
    pub fn restore_selection(&mut self, selection: SelectionState) {
        self.selection = selection;
        self.selection.initialize(self.registry.ids());
    }

    fn visible_ids(&self) -> Vec<String> {
        self.visible_documents()
            .into_iter()
            .map(|doc| doc.id.clone())
            .collect()
    }

    // --- thumbnails -----------------------------------------------------

    /// Resolves missing thumbnails for the current registry.
    pub async fn refresh_thumbnails<C: CatalogClient>(
        &mut self,
        resolver: &ThumbnailResolver<C>,
    ) -> Commit {
        let token = self.loads.token();
        let found = resolver
            .resolve(self.registry.documents(), &self.thumbnails)
            .await;

        if !token.is_current() {
            debug!(found = found.len(), "discarding thumbnails from a superseded registry");
            return Commit::Superseded;
        }
        for (id, url) in found {
            if self.registry.contains(&id) {
                self.thumbnails.record(&id, url);
            }
        }
        Commit::Applied
    }

    // --- search ---------------------------------------------------------

    pub fn begin_search(&mut self) -> GenerationToken {
        self.last_error = None;
        self.searches.begin()
    }

    /// Commits a search result. Any failure clears the hit list.
    pub fn finish_search(
        &mut self,
        token: &GenerationToken,
        result: Result<Vec<ConcordanceHit>, AppError>,
    ) -> Commit {
        if !token.is_current() {
            debug!(search = token.id(), "discarding superseded search");
            return Commit::Superseded;
        }

        match result {
            Ok(hits) => self.hits = hits,
            Err(err) => {
                self.hits.clear();
                if err.is_precondition() {
                    debug!(error = %err, "search rejected before reaching the service");
                } else {
                    warn!(error = %err, "search failed");
                }
                self.last_error = Some(err);
            }
        }
        Commit::Applied
    }

    pub async fn search<S: ConcordanceService>(
        &mut self,
        searcher: &ConcordanceSearch<S>,
        query: &str,
    ) -> Commit {
        let token = self.begin_search();
        let years = self.effective_years();
        let result = searcher
            .search(query, &self.registry, &self.selection, &years)
            .await;
        self.finish_search(&token, result)
    }

    // --- export ---------------------------------------------------------

    pub fn export(&self, date: NaiveDate) -> Result<Option<ExportPayload>, AppError> {
        export_hits(&self.hits, date)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.loads.invalidate();
        self.searches.invalidate();
    }
}
