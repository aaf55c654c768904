use serde::{Deserialize, Serialize};

pub const UNKNOWN_TITLE: &str = "Ukjent tittel";
pub const UNKNOWN_YEAR: &str = "ukjent år";

/// One row of the corpus table. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusDocument {
    pub id: String,
    pub urn: String,
    pub year: Option<i32>,
    pub title: String,
}

impl CorpusDocument {
    /// Builds a document from raw column values, returning `None` when the id is blank.
    pub fn from_columns(id: &str, urn: &str, year: &str, title: &str) -> Option<Self> {
        let id = id.trim();
        if id.is_empty() {
            return None;
        }

        Some(Self {
            id: id.to_string(),
            urn: urn.trim().to_string(),
            year: parse_year_str(year),
            title: title.trim().to_string(),
        })
    }

    pub fn display_title(&self) -> &str {
        display_title(&self.title)
    }

    pub fn display_year(&self) -> String {
        display_year(self.year)
    }
}

pub fn display_title(title: &str) -> &str {
    if title.trim().is_empty() {
        UNKNOWN_TITLE
    } else {
        title
    }
}

pub fn display_year(year: Option<i32>) -> String {
    year.map_or_else(|| UNKNOWN_YEAR.to_string(), |y| y.to_string())
}

/// Parses a year cell as a base-10 integer. Anything else is unknown.
pub fn parse_year_str(raw: &str) -> Option<i32> {
    raw.trim().parse::<i32>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_id_is_rejected() {
        assert!(CorpusDocument::from_columns("  ", "URN:1", "1901", "Tittel").is_none());
        assert!(CorpusDocument::from_columns("", "", "", "").is_none());
    }

    #[test]
    fn columns_are_trimmed() {
        let doc = CorpusDocument::from_columns(" 42 ", " URN:NBN:no-nb_digibok_1 ", " 1923 ", " Bok ")
            .expect("document");
        assert_eq!(doc.id, "42");
        assert_eq!(doc.urn, "URN:NBN:no-nb_digibok_1");
        assert_eq!(doc.year, Some(1923));
        assert_eq!(doc.title, "Bok");
    }

    #[test]
    fn unparseable_year_is_unknown_not_an_error() {
        let doc = CorpusDocument::from_columns("1", "", "ca. 1900", "").expect("document");
        assert_eq!(doc.year, None);
        assert_eq!(doc.display_year(), UNKNOWN_YEAR);
        assert_eq!(doc.display_title(), UNKNOWN_TITLE);
    }

    #[test]
    fn year_cells_accept_signed_base_ten_integers() {
        assert_eq!(parse_year_str("1905"), Some(1905));
        assert_eq!(parse_year_str("-12"), Some(-12));
        assert_eq!(parse_year_str("19o5"), None);
        assert_eq!(parse_year_str("1905.5"), None);
        assert_eq!(parse_year_str(""), None);
    }

    #[test]
    fn year_parsing_is_idempotent() {
        for raw in ["1814", " 2001 ", "+1950", "-44", "0007"] {
            let first = parse_year_str(raw).expect("valid year");
            let again = parse_year_str(&first.to_string());
            assert_eq!(again, Some(first), "round trip of {raw:?}");
        }
    }
}
