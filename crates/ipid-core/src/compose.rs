use crate::model::{Applicability, Coverage, ExtractedField, Field, Insurer, Ipid, Product};
use crate::normalize::normalize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a text field combines values found on successive pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    /// Append each page's value to what is already there.
    Accumulate,
    /// Keep the first non-empty value; ignore later pages.
    StickyOnce,
    /// Replace the value whenever a page supplies a non-empty one.
    Overwrite,
}

impl Policy {
    pub fn default_for(field: Field) -> Policy {
        match field {
            Field::Typology | Field::InsurerName | Field::ProductName => Policy::StickyOnce,
            _ => Policy::Accumulate,
        }
    }
}

/// Per-field policy table. Fields without an override use
/// [`Policy::default_for`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyMap {
    overrides: BTreeMap<Field, Policy>,
}

impl PolicyMap {
    pub fn get(&self, field: Field) -> Policy {
        self.overrides
            .get(&field)
            .copied()
            .unwrap_or_else(|| Policy::default_for(field))
    }

    pub fn set(&mut self, field: Field, policy: Policy) {
        self.overrides.insert(field, policy);
    }

    pub fn with(mut self, field: Field, policy: Policy) -> Self {
        self.set(field, policy);
        self
    }
}

/// Folds page-level extractions into one document.
///
/// The composer owns the document while pages are fed in order. Values are
/// kept raw while pages are absorbed, so spans continued on the next page keep
/// their line breaks; `finish` normalizes every field once and ends mutation.
#[derive(Debug)]
pub struct DocumentComposer {
    doc: Ipid,
    policies: PolicyMap,
    pages_seen: usize,
}

impl DocumentComposer {
    pub fn new(policies: PolicyMap) -> Self {
        DocumentComposer {
            doc: Ipid::default(),
            policies,
            pages_seen: 0,
        }
    }

    /// Merge every field extracted from one page.
    ///
    /// Fields whose name is not a document field are ignored. SIREN entries
    /// are appended in the order given.
    pub fn absorb_page(&mut self, fields: &[ExtractedField]) {
        for extracted in fields {
            let Some(field) = Field::from_name(&extracted.name) else {
                continue;
            };
            self.absorb(field, &extracted.value);
        }
        self.pages_seen += 1;
    }

    fn absorb(&mut self, field: Field, value: &str) {
        if field.is_list() {
            if !value.trim().is_empty() {
                self.doc.insurer.siren.push(value.to_string());
            }
            return;
        }

        let policy = self.policies.get(field);
        let Some(slot) = self.doc.text_mut(field) else {
            return;
        };

        match policy {
            Policy::Accumulate => slot.push_str(value),
            Policy::StickyOnce => {
                if slot.trim().is_empty() {
                    *slot = value.to_string();
                }
            }
            Policy::Overwrite => {
                if !value.trim().is_empty() {
                    *slot = value.to_string();
                }
            }
        }
    }

    pub fn pages_seen(&self) -> usize {
        self.pages_seen
    }

    /// Current state of the document, before normalization.
    pub fn document(&self) -> &Ipid {
        &self.doc
    }

    /// Normalize every field and hand out the finished document.
    pub fn finish(self) -> Ipid {
        let Ipid {
            insurer,
            product,
            coverage,
            applicability,
        } = self.doc;

        Ipid {
            insurer: Insurer::new(
                normalize(&insurer.name),
                insurer
                    .siren
                    .iter()
                    .map(|s| normalize(s))
                    .filter(|s| !s.is_empty())
                    .collect(),
            ),
            product: Product::new(
                normalize(&product.typology),
                normalize(&product.product),
                normalize(&product.description),
            ),
            coverage: Coverage::new(
                normalize(&coverage.always_covered),
                normalize(&coverage.optionally_covered),
                normalize(&coverage.not_covered),
                normalize(&coverage.exclusions),
                normalize(&coverage.services),
            ),
            applicability: Applicability::new(
                normalize(&applicability.obligations),
                normalize(&applicability.localization),
                normalize(&applicability.payment_options),
                normalize(&applicability.start_date),
                normalize(&applicability.termination),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, value: &str, page_number: usize) -> ExtractedField {
        ExtractedField {
            name: name.to_string(),
            value: value.to_string(),
            page_number,
        }
    }

    #[test]
    fn test_sticky_typology_keeps_first_page() {
        let mut composer = DocumentComposer::new(PolicyMap::default());
        composer.absorb_page(&[field("typology", "Non-life insurance", 1)]);
        composer.absorb_page(&[field("typology", "Travel insurance", 2)]);
        assert_eq!(composer.document().product.typology, "Non-life insurance");
    }

    #[test]
    fn test_sticky_field_waits_for_first_non_empty_value() {
        let mut composer = DocumentComposer::new(PolicyMap::default());
        composer.absorb_page(&[field("name", "", 1)]);
        composer.absorb_page(&[field("name", " \n", 1)]);
        composer.absorb_page(&[field("name", "AXA", 2)]);
        composer.absorb_page(&[field("name", "MAIF", 3)]);
        assert_eq!(composer.finish().insurer.name, "AXA");
    }

    #[test]
    fn test_accumulating_field_concatenates_pages() {
        let mut composer = DocumentComposer::new(PolicyMap::default());
        composer.absorb_page(&[field("always_covered", "Incendie ", 1)]);
        let after_first = composer.document().coverage.always_covered.clone();
        composer.absorb_page(&[field("always_covered", "Dégâts des eaux", 2)]);
        assert_eq!(
            composer.document().coverage.always_covered,
            after_first + "Dégâts des eaux"
        );
    }

    #[test]
    fn test_overwrite_policy_replaces_with_non_empty_values() {
        let policies = PolicyMap::default().with(Field::Typology, Policy::Overwrite);
        let mut composer = DocumentComposer::new(policies);
        composer.absorb_page(&[field("typology", "A", 1)]);
        composer.absorb_page(&[field("typology", "B", 2)]);
        composer.absorb_page(&[field("typology", "", 3)]);
        assert_eq!(composer.finish().product.typology, "B");
    }

    #[test]
    fn test_policy_override_makes_description_sticky() {
        let policies = PolicyMap::default().with(Field::Description, Policy::StickyOnce);
        let mut composer = DocumentComposer::new(policies);
        composer.absorb_page(&[field("description", "Habitation", 1)]);
        composer.absorb_page(&[field("description", "Suite", 2)]);
        assert_eq!(composer.finish().product.description, "Habitation");
    }

    #[test]
    fn test_siren_list_keeps_order_and_duplicates() {
        let mut composer = DocumentComposer::new(PolicyMap::default());
        composer.absorb_page(&[field("siren", "775 699 309", 1), field("siren", "542 110 291", 1)]);
        composer.absorb_page(&[field("siren", "775 699 309", 2)]);
        let doc = composer.finish();
        assert_eq!(
            doc.insurer.siren,
            vec!["775 699 309", "542 110 291", "775 699 309"]
        );
    }

    #[test]
    fn test_unknown_names_are_ignored() {
        let mut composer = DocumentComposer::new(PolicyMap::default());
        composer.absorb_page(&[field("what_is_covered", "text", 1)]);
        assert_eq!(composer.pages_seen(), 1);
        assert!(composer.finish().is_empty());
    }

    #[test]
    fn test_continued_span_keeps_a_word_break() {
        let mut composer = DocumentComposer::new(PolicyMap::default());
        composer.absorb_page(&[field("localization", "\nEn France.\n", 1)]);
        composer.absorb_page(&[field("localization", "\nEn Europe.\n", 2)]);
        assert_eq!(
            composer.document().applicability.localization,
            "\nEn France.\n\nEn Europe.\n"
        );
        assert_eq!(
            composer.finish().applicability.localization,
            "En France. En Europe."
        );
    }

    #[test]
    fn test_finish_normalizes_every_field() {
        let mut composer = DocumentComposer::new(PolicyMap::default());
        composer.absorb_page(&[
            field("typology", "  Assurance   Habitation ", 1),
            field("siren", "722 057\n460", 1),
            field("siren", "  ", 1),
            field("exclusions", "\n! La guerre\n", 1),
        ]);
        let doc = composer.finish();
        assert_eq!(doc.product.typology, "Assurance Habitation");
        assert_eq!(doc.insurer.siren, vec!["722 057 460"]);
        assert_eq!(doc.coverage.exclusions, "- La guerre");
        assert_eq!(doc.applicability.termination, "");
    }
}
