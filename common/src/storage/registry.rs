use std::collections::HashMap;

use tracing::warn;

use super::types::{corpus_document::CorpusDocument, year_range::YearRange};

/// Ordered corpus documents plus an id index.
///
/// Every id in the index points at exactly one entry; entry order is table order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    documents: Vec<CorpusDocument>,
    by_id: HashMap<String, usize>,
}

impl Registry {
    /// Builds the registry, keeping the first row for any repeated id.
    pub fn new(documents: impl IntoIterator<Item = CorpusDocument>) -> Self {
        let mut registry = Self::default();
        for document in documents {
            if registry.by_id.contains_key(&document.id) {
                warn!(id = %document.id, "duplicate document id in corpus table, keeping first row");
                continue;
            }
            registry
                .by_id
                .insert(document.id.clone(), registry.documents.len());
            registry.documents.push(document);
        }
        registry
    }

    pub fn documents(&self) -> &[CorpusDocument] {
        &self.documents
    }

    pub fn get(&self, id: &str) -> Option<&CorpusDocument> {
        self.by_id
            .get(id)
            .and_then(|&index| self.documents.get(index))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.documents.iter().map(|d| d.id.as_str())
    }

    /// Smallest and largest known year, if any document has one.
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        let mut years = self.documents.iter().filter_map(|d| d.year);
        let first = years.next()?;
        Some(years.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y))))
    }

    /// Documents passing the year filter, in table order.
    pub fn visible<'a>(&'a self, range: &'a YearRange) -> impl Iterator<Item = &'a CorpusDocument> {
        self.documents.iter().filter(move |d| range.contains(d.year))
    }
}
