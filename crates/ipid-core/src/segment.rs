//! Anchor-based segmentation of page text.
//!
//! A section anchor opens its own field and closes every other one: the text
//! owned by an anchor runs from the end of its first match up to the start of
//! the nearest following match of any other section anchor.

use crate::anchors::{AnchorKind, AnchorTable, CompiledAnchor};
use crate::model::ExtractedField;

/// Extracts field spans from page text using a shared anchor table.
#[derive(Debug, Clone, Copy)]
pub struct FieldExtractor<'a> {
    table: &'a AnchorTable,
}

impl<'a> FieldExtractor<'a> {
    pub fn new(table: &'a AnchorTable) -> Self {
        FieldExtractor { table }
    }

    /// Text owned by the section anchor `anchor_name`, or `""` when the
    /// anchor does not match (or is not a section of this table).
    pub fn extract<'t>(&self, text: &'t str, anchor_name: &str) -> &'t str {
        match self.table.get(anchor_name) {
            Some(anchor) if anchor.kind == AnchorKind::Section => section_span(text, anchor),
            _ => "",
        }
    }

    /// Values captured by a capture anchor: the first match, or every match
    /// for list fields. Values are trimmed; empty values are skipped.
    pub fn capture(&self, text: &str, anchor_name: &str) -> Vec<String> {
        match self.table.get(anchor_name) {
            Some(anchor) if anchor.kind == AnchorKind::Capture => capture_values(text, anchor),
            _ => Vec::new(),
        }
    }

    /// Raw spans for every anchor of the table that feeds a document field.
    ///
    /// Section anchors always yield one entry (possibly empty); capture
    /// anchors yield one entry per captured value.
    pub fn extract_page_fields(&self, text: &str, page_number: usize) -> Vec<ExtractedField> {
        let mut fields = Vec::new();

        for anchor in self.table.anchors() {
            if anchor.field.is_none() {
                continue;
            }
            match anchor.kind {
                AnchorKind::Section => {
                    let value = section_span(text, anchor);
                    tracing::trace!(
                        page = page_number,
                        anchor = %anchor.name,
                        len = value.len(),
                        "section span"
                    );
                    fields.push(ExtractedField {
                        name: anchor.name.clone(),
                        value: value.to_string(),
                        page_number,
                    });
                }
                AnchorKind::Capture => {
                    for value in capture_values(text, anchor) {
                        fields.push(ExtractedField {
                            name: anchor.name.clone(),
                            value,
                            page_number,
                        });
                    }
                }
            }
        }

        fields
    }
}

fn section_span<'t>(text: &'t str, anchor: &CompiledAnchor) -> &'t str {
    let Some(start) = anchor.regex.find(text) else {
        return "";
    };
    let from = start.end();

    let Some(closing) = anchor.closing() else {
        return &text[from..];
    };

    // find_iter yields matches in ascending start order.
    match closing.find_iter(text).find(|m| m.start() > from) {
        Some(end) => &text[from..end.start()],
        None => &text[from..],
    }
}

fn capture_values(text: &str, anchor: &CompiledAnchor) -> Vec<String> {
    let take = |caps: regex::Captures<'_>| -> Option<String> {
        let m = caps.get(1).or_else(|| caps.get(0))?;
        let value = m.as_str().trim();
        if value.is_empty() {
            return None;
        }
        Some(if anchor.uppercase {
            value.to_uppercase()
        } else {
            value.to_string()
        })
    };

    let list = anchor.field.is_some_and(|f| f.is_list());
    if list {
        anchor.regex.captures_iter(text).filter_map(take).collect()
    } else {
        anchor.regex.captures(text).and_then(take).into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchors::builtin::load_builtin;
    use crate::anchors::parse_anchor_table_str;

    const SCENARIO: &str = "Où suis-je couvert?\nFrance and Europe.\nQuelles sont mes obligations?\nPay premiums on time.";

    #[test]
    fn test_extracts_span_up_to_next_anchor() {
        let table = load_builtin().unwrap();
        let extractor = FieldExtractor::new(&table);
        assert_eq!(extractor.extract(SCENARIO, "localization"), "\nFrance and Europe.\n");
    }

    #[test]
    fn test_last_anchor_runs_to_end_of_text() {
        let table = load_builtin().unwrap();
        let extractor = FieldExtractor::new(&table);
        assert_eq!(extractor.extract(SCENARIO, "obligations"), "\nPay premiums on time.");
    }

    #[test]
    fn test_unmatched_anchor_is_empty() {
        let table = load_builtin().unwrap();
        let extractor = FieldExtractor::new(&table);
        assert_eq!(extractor.extract(SCENARIO, "termination"), "");
        assert_eq!(extractor.extract(SCENARIO, "no_such_anchor"), "");
        assert_eq!(extractor.extract("", "localization"), "");
    }

    #[test]
    fn test_boundaries_before_the_anchor_are_skipped() {
        let table = load_builtin().unwrap();
        let extractor = FieldExtractor::new(&table);
        let text = "Les services et avantages\nAssistance\nOù suis-je couvert ?\nPartout";
        // services appears before localization: localization runs to the end.
        assert_eq!(extractor.extract(text, "localization"), "\nPartout");
        assert_eq!(extractor.extract(text, "services"), "\nAssistance\n");
    }

    #[test]
    fn test_nearest_boundary_wins_regardless_of_anchor() {
        let table = load_builtin().unwrap();
        let extractor = FieldExtractor::new(&table);
        let text = "Les garanties optionnelles\nVol\nComment puis-je résilier le contrat\nLettre\nLes services et avantages\nAide";
        assert_eq!(extractor.extract(text, "optionally_covered"), "\nVol\n");
        assert_eq!(extractor.extract(text, "termination"), "\nLettre\n");
    }

    #[test]
    fn test_only_anchor_in_table_takes_the_rest() {
        let table = parse_anchor_table_str(
            r#"{ "name": "t", "version": "1",
                 "anchors": [{ "name": "services", "group": "coverage", "phrase": "services" }] }"#,
        )
        .unwrap();
        let extractor = FieldExtractor::new(&table);
        assert_eq!(extractor.extract("a services b", "services"), " b");
    }

    #[test]
    fn test_captures_first_line_as_typology() {
        let table = load_builtin().unwrap();
        let extractor = FieldExtractor::new(&table);
        let text = "\n  Assurance Habitation \nCompagnie : AXA France IARD\n";
        assert_eq!(extractor.capture(text, "typology"), vec!["Assurance Habitation"]);
        assert_eq!(extractor.capture(text, "name"), vec!["AXA"]);
    }

    #[test]
    fn test_captures_product_name_and_every_siren() {
        let table = load_builtin().unwrap();
        let extractor = FieldExtractor::new(&table);
        let text = "Produit : Multirisque Habitation Confort\nRCS 722 057 460 et 722057460\n";
        assert_eq!(
            extractor.capture(text, "product"),
            vec!["Multirisque Habitation Confort"]
        );
        assert_eq!(
            extractor.capture(text, "siren"),
            vec!["722 057 460", "722057460"]
        );
    }

    #[test]
    fn test_page_fields_cover_every_field_anchor() {
        let table = load_builtin().unwrap();
        let extractor = FieldExtractor::new(&table);
        let fields = extractor.extract_page_fields(SCENARIO, 3);
        assert!(fields.iter().all(|f| f.page_number == 3));
        let sections = fields
            .iter()
            .filter(|f| table.get(&f.name).unwrap().kind == AnchorKind::Section)
            .count();
        assert_eq!(sections, 11);
        let localization = fields.iter().find(|f| f.name == "localization").unwrap();
        assert_eq!(localization.value, "\nFrance and Europe.\n");
        assert!(fields.iter().all(|f| f.name != "siren"));
    }
}
