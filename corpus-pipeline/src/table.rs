use common::{error::AppError, storage::types::corpus_document::CorpusDocument};
use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

pub const ID_COLUMN: &str = "id";
pub const LEGACY_ID_COLUMN: &str = "dhlabid";
pub const URN_COLUMN: &str = "urn";
pub const YEAR_COLUMN: &str = "year";
pub const TITLE_COLUMN: &str = "title";

/// Positions of the mapped columns in the header row.
#[derive(Debug, Clone, Copy)]
struct TableColumns {
    id: usize,
    urn: usize,
    year: usize,
    title: usize,
}

impl TableColumns {
    fn locate(headers: &StringRecord) -> Result<Self, AppError> {
        let find = |name: &str| headers.iter().position(|h| h == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| {
                AppError::Corpus(format!("corpus table is missing the `{name}` column"))
            })
        };

        let id = match find(ID_COLUMN).or_else(|| find(LEGACY_ID_COLUMN)) {
            Some(index) => index,
            None => require(ID_COLUMN)?,
        };

        Ok(Self {
            id,
            urn: require(URN_COLUMN)?,
            year: require(YEAR_COLUMN)?,
            title: require(TITLE_COLUMN)?,
        })
    }
}

/// Parses the corpus table strictly: any malformed row fails the whole table.
///
/// Columns are matched by header name; extra columns are ignored and rows
/// with a blank id are skipped.
pub fn parse_table(bytes: &[u8]) -> Result<Vec<CorpusDocument>, AppError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let delimiter = sniff_delimiter(bytes);

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    let columns = TableColumns::locate(&headers)?;

    let mut documents = Vec::new();
    let mut skipped = 0_usize;
    for record in reader.records() {
        let record = record?;
        let field = |index: usize| record.get(index).unwrap_or_default();
        match CorpusDocument::from_columns(
            field(columns.id),
            field(columns.urn),
            field(columns.year),
            field(columns.title),
        ) {
            Some(document) => documents.push(document),
            None => skipped = skipped.saturating_add(1),
        }
    }

    debug!(
        rows = documents.len(),
        skipped,
        delimiter = %char::from(delimiter).escape_default(),
        "parsed corpus table"
    );
    Ok(documents)
}

/// Picks the candidate delimiter that occurs most often in the header line.
fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let header = bytes
        .split(|&b| b == b'\n')
        .next()
        .unwrap_or_default();

    // Ties go to the earlier candidate.
    CANDIDATE_DELIMITERS
        .iter()
        .enumerate()
        .map(|(rank, &d)| (d, rank, header.iter().filter(|&&b| b == d).count()))
        .filter(|&(_, _, count)| count > 0)
        .max_by_key(|&(_, rank, count)| (count, std::cmp::Reverse(rank)))
        .map_or(b',', |(d, _, _)| d)
}
