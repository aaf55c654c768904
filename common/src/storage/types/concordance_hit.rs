use serde::Serialize;

use super::corpus_document::{display_title, display_year};

/// One concordance occurrence joined with corpus metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConcordanceHit {
    pub book_id: String,
    pub urn: String,
    /// Formatted excerpt, kept exactly as the service returned it.
    pub concordance_markup: String,
    pub title: String,
    pub year: Option<i32>,
    pub document_url: String,
}

impl ConcordanceHit {
    pub fn display_title(&self) -> &str {
        display_title(&self.title)
    }

    pub fn display_year(&self) -> String {
        display_year(self.year)
    }
}
