use chrono::NaiveDate;
use common::{
    error::AppError,
    storage::types::concordance_hit::ConcordanceHit,
    utils::markup::flatten_markup,
};
use csv::{QuoteStyle, Terminator, WriterBuilder};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const HEADER: [&str; 5] = ["Title", "Link", "URN", "DocumentID", "Concordance"];

/// Spreadsheet-ready export of a hit list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub fn export_file_name(date: NaiveDate) -> String {
    format!("concordance-{}.csv", date.format("%Y-%m-%d"))
}

/// Serializes hits as BOM-prefixed, semicolon-delimited, fully quoted text.
///
/// Returns `None` for an empty hit list so no file gets written.
pub fn export_hits(
    hits: &[ConcordanceHit],
    date: NaiveDate,
) -> Result<Option<ExportPayload>, AppError> {
    if hits.is_empty() {
        return Ok(None);
    }

    let mut writer = WriterBuilder::new()
        .delimiter(b';')
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(UTF8_BOM.to_vec());

    writer
        .write_record(HEADER)
        .map_err(|e| AppError::Export(e.to_string()))?;
    for hit in hits {
        writer
            .write_record([
                hit.display_title(),
                hit.document_url.as_str(),
                hit.urn.as_str(),
                hit.book_id.as_str(),
                flatten_markup(&hit.concordance_markup).as_str(),
            ])
            .map_err(|e| AppError::Export(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Export(e.to_string()))?;

    Ok(Some(ExportPayload {
        file_name: export_file_name(date),
        bytes,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).expect("valid date")
    }

    fn hit(title: &str, markup: &str) -> ConcordanceHit {
        ConcordanceHit {
            book_id: "7".into(),
            urn: "URN:7".into(),
            concordance_markup: markup.into(),
            title: title.into(),
            year: Some(1900),
            document_url: "https://www.nb.no/items/URN:7?searchText=Oslo".into(),
        }
    }

    fn body(payload: &ExportPayload) -> &str {
        let text = std::str::from_utf8(&payload.bytes).expect("utf-8");
        text.strip_prefix('\u{feff}').expect("byte-order mark")
    }

    #[test]
    fn empty_hit_list_produces_no_file() {
        assert_eq!(export_hits(&[], date()).expect("export"), None);
    }

    #[test]
    fn writes_header_and_flattened_rows() {
        let payload = export_hits(&[hit("Byer", "  <b>Oslo</b> og\n <i>Bergen</i> ")], date())
            .expect("export")
            .expect("payload");

        assert_eq!(payload.file_name, "concordance-2024-03-09.csv");
        assert!(payload.bytes.starts_with(UTF8_BOM));
        assert_eq!(
            body(&payload),
            "\"Title\";\"Link\";\"URN\";\"DocumentID\";\"Concordance\"\n\
             \"Byer\";\"https://www.nb.no/items/URN:7?searchText=Oslo\";\"URN:7\";\"7\";\"Oslo og Bergen\"\n"
        );
    }

    #[test]
    fn doubles_embedded_quotes() {
        let payload = export_hits(&[hit("He said \"hi\"", "x")], date())
            .expect("export")
            .expect("payload");

        let row = body(&payload).lines().nth(1).expect("data row");
        assert!(row.starts_with("\"He said \"\"hi\"\"\";"));
    }

    #[test]
    fn blank_title_exports_placeholder() {
        let payload = export_hits(&[hit("", "x")], date())
            .expect("export")
            .expect("payload");

        let row = body(&payload).lines().nth(1).expect("data row");
        assert!(row.starts_with("\"Ukjent tittel\";"));
    }
}
