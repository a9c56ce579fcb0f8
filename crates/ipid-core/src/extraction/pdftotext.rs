use crate::error::IpidError;
use crate::extraction::{PageContent, PdfExtractor, WordToken};
use crate::geometry::Rect;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::Write;
use std::path::Path;
use std::process::Command;

/// How far into the file a `%PDF-` header may appear.
const PDF_HEADER_WINDOW: usize = 1024;

/// PDF extraction backend using pdftotext (from poppler-utils).
///
/// Page text comes from plain `pdftotext` (reading order, no layout padding).
/// When geometry is enabled, word boxes come from `pdftotext -bbox`.
pub struct PdftotextExtractor {
    with_geometry: bool,
}

impl PdftotextExtractor {
    pub fn new() -> Self {
        PdftotextExtractor {
            with_geometry: false,
        }
    }

    /// Also extract word bounding boxes for geometry-based reconstruction.
    pub fn with_geometry(mut self, enabled: bool) -> Self {
        self.with_geometry = enabled;
        self
    }

    /// Check if pdftotext is available on the system.
    pub fn is_available() -> bool {
        Command::new("pdftotext")
            .arg("-v")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }
}

impl Default for PdftotextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfExtractor for PdftotextExtractor {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageContent>, IpidError> {
        if !looks_like_pdf(pdf_bytes) {
            return Err(IpidError::NotAPdf);
        }

        // Write PDF bytes to a temp file
        let mut tmpfile =
            tempfile::NamedTempFile::new().map_err(|e| IpidError::Extraction(e.to_string()))?;
        tmpfile
            .write_all(pdf_bytes)
            .map_err(|e| IpidError::Extraction(e.to_string()))?;
        let tmp_path = tmpfile.path().to_path_buf();

        let text = run_pdftotext(&tmp_path, &[])?;
        let mut pages: Vec<PageContent> = split_pages(&text)
            .into_iter()
            .enumerate()
            .map(|(i, page_text)| PageContent::from_text(i + 1, page_text))
            .collect();

        if self.with_geometry {
            let xml = run_pdftotext(&tmp_path, &["-bbox"])?;
            let bbox_pages = parse_bbox_xml(&xml)?;
            if bbox_pages.len() != pages.len() {
                tracing::warn!(
                    text_pages = pages.len(),
                    bbox_pages = bbox_pages.len(),
                    "page count mismatch between text and bbox output"
                );
            }
            for (page, bbox_page) in pages.iter_mut().zip(bbox_pages) {
                page.bounds = bbox_page.bounds;
                page.words = bbox_page.words;
            }
        }

        tracing::debug!(pages = pages.len(), backend = self.backend_name(), "extracted pages");
        Ok(pages)
    }

    fn backend_name(&self) -> &str {
        "pdftotext"
    }
}

fn looks_like_pdf(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(PDF_HEADER_WINDOW)];
    window.windows(5).any(|w| w == b"%PDF-")
}

fn run_pdftotext(pdf_path: &Path, extra_args: &[&str]) -> Result<String, IpidError> {
    let output = Command::new("pdftotext")
        .args(extra_args)
        .arg("-enc")
        .arg("UTF-8")
        .arg(pdf_path)
        .arg("-") // output to stdout
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                IpidError::PdftotextNotFound
            } else {
                IpidError::Extraction(format!("pdftotext failed: {}", e))
            }
        })?;

    if !output.status.success() {
        let code = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        return Err(IpidError::PdftotextFailed { code, stderr });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Split pdftotext output into pages. Every page, including the last one, is
/// terminated by a form feed.
fn split_pages(text: &str) -> Vec<&str> {
    let mut pages: Vec<&str> = text.split('\x0c').collect();
    if pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
        pages.pop();
    }
    pages
}

#[derive(Debug, Default)]
struct BBoxPage {
    bounds: Option<Rect>,
    words: Vec<WordToken>,
}

fn parse_bbox_xml(xml: &str) -> Result<Vec<BBoxPage>, IpidError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut pages: Vec<BBoxPage> = Vec::new();
    let mut current_word: Option<(Rect, String)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"page" => pages.push(BBoxPage {
                    bounds: parse_page_bounds(&e),
                    words: Vec::new(),
                }),
                b"word" => current_word = parse_word_rect(&e).map(|r| (r, String::new())),
                _ => {}
            },
            Ok(Event::Empty(e)) if e.name().as_ref() == b"page" => pages.push(BBoxPage {
                bounds: parse_page_bounds(&e),
                words: Vec::new(),
            }),
            Ok(Event::Text(t)) => {
                if let Some((_, text)) = current_word.as_mut() {
                    let decoded = t
                        .unescape()
                        .map_err(|e| IpidError::Extraction(format!("bad bbox text: {e}")))?;
                    text.push_str(&decoded);
                }
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"word" => {
                if let (Some((rect, text)), Some(page)) = (current_word.take(), pages.last_mut()) {
                    let text = text.trim();
                    if !text.is_empty() {
                        page.words.push(WordToken {
                            rect,
                            text: text.to_string(),
                        });
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(IpidError::Extraction(format!(
                    "XML parse error in pdftotext -bbox output: {e}"
                )))
            }
            _ => {}
        }
    }

    Ok(pages)
}

fn attr_f32(tag: &BytesStart<'_>, name: &[u8]) -> Option<f32> {
    tag.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name)
        .and_then(|a| std::str::from_utf8(&a.value).ok()?.trim().parse().ok())
}

fn parse_page_bounds(tag: &BytesStart<'_>) -> Option<Rect> {
    Some(Rect::new(
        0.0,
        0.0,
        attr_f32(tag, b"width")?,
        attr_f32(tag, b"height")?,
    ))
}

fn parse_word_rect(tag: &BytesStart<'_>) -> Option<Rect> {
    Some(Rect::new(
        attr_f32(tag, b"xMin")?,
        attr_f32(tag, b"yMin")?,
        attr_f32(tag, b"xMax")?,
        attr_f32(tag, b"yMax")?,
    ))
}
