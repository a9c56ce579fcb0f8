use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insurer {
    pub name: String,
    pub siren: Vec<String>,
}

impl Insurer {
    pub fn new(name: impl Into<String>, siren: Vec<String>) -> Self {
        Insurer {
            name: name.into(),
            siren,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub typology: String,
    pub product: String,
    pub description: String,
}

impl Product {
    pub fn new(
        typology: impl Into<String>,
        product: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Product {
            typology: typology.into(),
            product: product.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coverage {
    pub always_covered: String,
    pub optionally_covered: String,
    pub not_covered: String,
    pub exclusions: String,
    pub services: String,
}

impl Coverage {
    pub fn new(
        always_covered: impl Into<String>,
        optionally_covered: impl Into<String>,
        not_covered: impl Into<String>,
        exclusions: impl Into<String>,
        services: impl Into<String>,
    ) -> Self {
        Coverage {
            always_covered: always_covered.into(),
            optionally_covered: optionally_covered.into(),
            not_covered: not_covered.into(),
            exclusions: exclusions.into(),
            services: services.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applicability {
    pub obligations: String,
    pub localization: String,
    pub payment_options: String,
    pub start_date: String,
    pub termination: String,
}

impl Applicability {
    pub fn new(
        obligations: impl Into<String>,
        localization: impl Into<String>,
        payment_options: impl Into<String>,
        start_date: impl Into<String>,
        termination: impl Into<String>,
    ) -> Self {
        Applicability {
            obligations: obligations.into(),
            localization: localization.into(),
            payment_options: payment_options.into(),
            start_date: start_date.into(),
            termination: termination.into(),
        }
    }
}

/// Structured content of one IPID document.
///
/// Every text field defaults to the empty string. `insurer.siren` keeps every
/// identifier found, in page order, duplicates included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ipid {
    pub insurer: Insurer,
    pub product: Product,
    pub coverage: Coverage,
    pub applicability: Applicability,
}

impl Ipid {
    /// Read access to a text field. Returns `None` for the SIREN list.
    pub fn text(&self, field: Field) -> Option<&str> {
        let value = match field {
            Field::InsurerName => &self.insurer.name,
            Field::Siren => return None,
            Field::Typology => &self.product.typology,
            Field::ProductName => &self.product.product,
            Field::Description => &self.product.description,
            Field::AlwaysCovered => &self.coverage.always_covered,
            Field::OptionallyCovered => &self.coverage.optionally_covered,
            Field::NotCovered => &self.coverage.not_covered,
            Field::Exclusions => &self.coverage.exclusions,
            Field::Services => &self.coverage.services,
            Field::Obligations => &self.applicability.obligations,
            Field::Localization => &self.applicability.localization,
            Field::PaymentOptions => &self.applicability.payment_options,
            Field::StartDate => &self.applicability.start_date,
            Field::Termination => &self.applicability.termination,
        };
        Some(value.as_str())
    }

    pub(crate) fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        let value = match field {
            Field::InsurerName => &mut self.insurer.name,
            Field::Siren => return None,
            Field::Typology => &mut self.product.typology,
            Field::ProductName => &mut self.product.product,
            Field::Description => &mut self.product.description,
            Field::AlwaysCovered => &mut self.coverage.always_covered,
            Field::OptionallyCovered => &mut self.coverage.optionally_covered,
            Field::NotCovered => &mut self.coverage.not_covered,
            Field::Exclusions => &mut self.coverage.exclusions,
            Field::Services => &mut self.coverage.services,
            Field::Obligations => &mut self.applicability.obligations,
            Field::Localization => &mut self.applicability.localization,
            Field::PaymentOptions => &mut self.applicability.payment_options,
            Field::StartDate => &mut self.applicability.start_date,
            Field::Termination => &mut self.applicability.termination,
        };
        Some(value)
    }

    /// True when no field carries any content.
    pub fn is_empty(&self) -> bool {
        self == &Ipid::default()
    }
}

/// The four field groups of an IPID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    Insurer,
    Product,
    Coverage,
    Applicability,
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Group::Insurer => write!(f, "insurer"),
            Group::Product => write!(f, "product"),
            Group::Coverage => write!(f, "coverage"),
            Group::Applicability => write!(f, "applicability"),
        }
    }
}

/// A named slot of the structured document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    #[serde(rename = "name")]
    InsurerName,
    Siren,
    Typology,
    #[serde(rename = "product")]
    ProductName,
    Description,
    AlwaysCovered,
    OptionallyCovered,
    NotCovered,
    Exclusions,
    Services,
    Obligations,
    Localization,
    PaymentOptions,
    StartDate,
    Termination,
}

impl Field {
    pub const ALL: [Field; 15] = [
        Field::InsurerName,
        Field::Siren,
        Field::Typology,
        Field::ProductName,
        Field::Description,
        Field::AlwaysCovered,
        Field::OptionallyCovered,
        Field::NotCovered,
        Field::Exclusions,
        Field::Services,
        Field::Obligations,
        Field::Localization,
        Field::PaymentOptions,
        Field::StartDate,
        Field::Termination,
    ];

    /// Name used in anchor tables and in the JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::InsurerName => "name",
            Field::Siren => "siren",
            Field::Typology => "typology",
            Field::ProductName => "product",
            Field::Description => "description",
            Field::AlwaysCovered => "always_covered",
            Field::OptionallyCovered => "optionally_covered",
            Field::NotCovered => "not_covered",
            Field::Exclusions => "exclusions",
            Field::Services => "services",
            Field::Obligations => "obligations",
            Field::Localization => "localization",
            Field::PaymentOptions => "payment_options",
            Field::StartDate => "start_date",
            Field::Termination => "termination",
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.as_str() == name)
    }

    pub fn group(&self) -> Group {
        match self {
            Field::InsurerName | Field::Siren => Group::Insurer,
            Field::Typology | Field::ProductName | Field::Description => Group::Product,
            Field::AlwaysCovered
            | Field::OptionallyCovered
            | Field::NotCovered
            | Field::Exclusions
            | Field::Services => Group::Coverage,
            Field::Obligations
            | Field::Localization
            | Field::PaymentOptions
            | Field::StartDate
            | Field::Termination => Group::Applicability,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Field::Siren)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A span of page text attributed to one anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedField {
    pub name: String,
    pub value: String,
    /// 1-based page number the span was taken from.
    pub page_number: usize,
}
