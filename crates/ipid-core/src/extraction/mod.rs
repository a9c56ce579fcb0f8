pub mod pdftotext;

use crate::error::IpidError;
use crate::geometry::Rect;

/// A positioned text fragment as reported by the extraction backend.
#[derive(Debug, Clone, PartialEq)]
pub struct WordToken {
    pub rect: Rect,
    pub text: String,
}

impl WordToken {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32, text: impl Into<String>) -> Self {
        WordToken {
            rect: Rect::new(x0, y0, x1, y1),
            text: text.into(),
        }
    }
}

/// Content extracted from a single page of a PDF.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    pub page_number: usize,
    /// Page text in best-effort reading order.
    pub text: String,
    /// Word geometry, empty when the backend does not provide it.
    pub words: Vec<WordToken>,
    /// Page bounds, used as the region of interest for reconstruction.
    pub bounds: Option<Rect>,
}

impl PageContent {
    pub fn from_text(page_number: usize, text: impl Into<String>) -> Self {
        PageContent {
            page_number,
            text: text.into(),
            ..Default::default()
        }
    }
}

/// Trait for PDF text extraction backends.
pub trait PdfExtractor: Send + Sync {
    /// Extract text content from PDF bytes, returning one PageContent per page.
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageContent>, IpidError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}
