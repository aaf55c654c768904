use scraper::Html;

/// Flattens concordance markup to a single line of plain text.
///
/// Tags are dropped, character entities are decoded by the HTML parser and
/// whitespace runs collapse to one space.
pub fn flatten_markup(markup: &str) -> String {
    let fragment = Html::parse_fragment(markup);
    let text: String = fragment.root_element().text().collect();
    collapse_whitespace(&text)
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_emphasis_tags() {
        assert_eq!(
            flatten_markup("<b>Oslo</b> og <i>Bergen</i>"),
            "Oslo og Bergen"
        );
    }

    #[test]
    fn decodes_entities_and_collapses_whitespace() {
        assert_eq!(
            flatten_markup("  Fisk &amp;\n\t<em>potet</em>&nbsp;&quot;ja&quot;  "),
            "Fisk & potet \"ja\""
        );
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(flatten_markup("ingen markering"), "ingen markering");
        assert_eq!(flatten_markup(""), "");
    }
}
