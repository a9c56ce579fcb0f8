pub mod anchors;
pub mod compose;
pub mod error;
pub mod extraction;
pub mod geometry;
pub mod model;
pub mod normalize;
pub mod segment;

use anchors::AnchorTable;
use compose::DocumentComposer;
use error::IpidError;
use extraction::{PageContent, PdfExtractor};
use geometry::{reconstruct_words, words_to_text, ReconstructOptions};
use model::Ipid;
use segment::FieldExtractor;
use std::borrow::Cow;

/// Options controlling how page text is obtained before segmentation.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Rebuild page text from word geometry when the page carries any.
    pub use_geometry: bool,
    pub reconstruct: ReconstructOptions,
}

/// Main API entry point: extract an IPID from PDF bytes.
///
/// Extraction failures are fatal. Anything after that (missing anchors,
/// degenerate geometry) only leaves fields empty.
pub fn parse_pdf(
    pdf_bytes: &[u8],
    extractor: &dyn PdfExtractor,
    table: &AnchorTable,
    options: &ParseOptions,
) -> Result<Ipid, IpidError> {
    let pages = extractor.extract_pages(pdf_bytes)?;
    Ok(parse_pages(&pages, table, options))
}

/// Fold already-extracted pages, in order, into one document.
pub fn parse_pages(pages: &[PageContent], table: &AnchorTable, options: &ParseOptions) -> Ipid {
    let extractor = FieldExtractor::new(table);
    let mut composer = DocumentComposer::new(table.policies().clone());

    for page in pages {
        let text = page_text(page, options);
        let fields = extractor.extract_page_fields(&text, page.page_number);
        tracing::debug!(
            page = page.page_number,
            non_empty = fields.iter().filter(|f| !f.value.trim().is_empty()).count(),
            "page fields extracted"
        );
        composer.absorb_page(&fields);
    }

    let doc = composer.finish();
    if doc.is_empty() {
        tracing::warn!(
            pages = pages.len(),
            table = table.name(),
            "no field matched; document may not follow the IPID template"
        );
    }
    doc
}

fn page_text<'p>(page: &'p PageContent, options: &ParseOptions) -> Cow<'p, str> {
    if options.use_geometry && !page.words.is_empty() {
        let words = reconstruct_words(&page.words, page.bounds.as_ref(), &options.reconstruct);
        Cow::Owned(words_to_text(&words))
    } else {
        Cow::Borrowed(&page.text)
    }
}
