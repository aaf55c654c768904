use serde::Serialize;

/// JSON body posted to the concordance service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConcordanceRequest {
    pub query: String,
    pub dhlabids: Vec<i64>,
    pub window: u32,
    pub limit: u32,
    pub html_formatting: bool,
}

/// Coerces document ids to integers, dropping any that do not parse.
pub fn coerce_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> Vec<i64> {
    ids.into_iter()
        .filter_map(|id| id.trim().parse::<i64>().ok())
        .collect()
}
