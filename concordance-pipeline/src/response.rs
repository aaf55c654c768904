//! Normalization of concordance service responses.
//!
//! The service answers either with a list of row objects or with an object of
//! parallel index-keyed columns. Both are turned into [`CanonicalRow`]s here;
//! nothing downstream sees the original shape.

use std::{cmp::Ordering, collections::BTreeSet};

use common::error::AppError;
use serde::Deserialize;
use serde_json::{Map, Value};

const DOCID_FIELD: &str = "docid";
const DHLABID_FIELD: &str = "dhlabid";
const URN_FIELD: &str = "urn";
const CONC_FIELD: &str = "conc";

static MISSING_COLUMN: Value = Value::Null;

/// One concordance row with every field optional and stringified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalRow {
    pub docid: Option<String>,
    pub dhlabid: Option<String>,
    pub urn: Option<String>,
    pub conc: Option<String>,
}

impl CanonicalRow {
    /// Document id, preferring `docid` over `dhlabid`.
    pub fn document_id(&self) -> Option<&str> {
        self.docid.as_deref().or(self.dhlabid.as_deref())
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawRow {
    #[serde(default)]
    docid: Value,
    #[serde(default)]
    dhlabid: Value,
    #[serde(default)]
    urn: Value,
    #[serde(default)]
    conc: Value,
}

impl From<RawRow> for CanonicalRow {
    fn from(raw: RawRow) -> Self {
        Self {
            docid: scalar_to_string(&raw.docid),
            dhlabid: scalar_to_string(&raw.dhlabid),
            urn: scalar_to_string(&raw.urn),
            conc: scalar_to_string(&raw.conc),
        }
    }
}

/// The two encodings the service is known to return.
#[derive(Debug)]
enum ResponseShape {
    RowForm(Vec<RawRow>),
    ColumnForm(Map<String, Value>),
}

impl ResponseShape {
    fn detect(body: Value) -> Result<Self, AppError> {
        match body {
            Value::Null => Ok(Self::RowForm(Vec::new())),
            Value::Array(_) => serde_json::from_value(body)
                .map(Self::RowForm)
                .map_err(|e| {
                    AppError::SearchService(format!("unexpected concordance row: {e}"))
                }),
            Value::Object(columns) => Ok(Self::ColumnForm(columns)),
            other => Err(AppError::SearchService(format!(
                "unexpected concordance response: {other}"
            ))),
        }
    }

    fn into_rows(self) -> Vec<CanonicalRow> {
        match self {
            Self::RowForm(rows) => rows.into_iter().map(CanonicalRow::from).collect(),
            Self::ColumnForm(columns) => columns_to_rows(&columns),
        }
    }
}

/// Normalizes a response body of either shape into ordered rows.
pub fn normalize_response(body: Value) -> Result<Vec<CanonicalRow>, AppError> {
    Ok(ResponseShape::detect(body)?.into_rows())
}

fn columns_to_rows(columns: &Map<String, Value>) -> Vec<CanonicalRow> {
    let column = |name: &str| columns.get(name).unwrap_or(&MISSING_COLUMN);
    let docid = column(DOCID_FIELD);
    let dhlabid = column(DHLABID_FIELD);
    let urn = column(URN_FIELD);
    let conc = column(CONC_FIELD);

    let mut keys = BTreeSet::new();
    for field in [docid, dhlabid, urn, conc] {
        keys.extend(index_keys(field));
    }
    let mut keys: Vec<String> = keys.into_iter().collect();
    keys.sort_by(|a, b| compare_index_keys(a, b));

    keys.iter()
        .map(|key| CanonicalRow {
            docid: cell(docid, key),
            dhlabid: cell(dhlabid, key),
            urn: cell(urn, key),
            conc: cell(conc, key),
        })
        .collect()
}

/// Row-index keys of one column. Arrays are keyed by position.
fn index_keys(column: &Value) -> Vec<String> {
    match column {
        Value::Object(map) => map.keys().cloned().collect(),
        Value::Array(items) => (0..items.len()).map(|i| i.to_string()).collect(),
        _ => Vec::new(),
    }
}

fn cell(column: &Value, key: &str) -> Option<String> {
    let value = match column {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    };
    value.and_then(scalar_to_string)
}

/// Numeric keys in ascending numeric order, then any other keys lexically.
fn compare_index_keys(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
