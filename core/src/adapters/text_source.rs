use crate::adapters::interface::{ExtractedText, TextSource};
use crate::error::CoreResult;
use std::path::Path;

pub const PAGE_BREAK: char = '\x0c';

/// Pages of a form-feed separated document. A trailing break does not open an empty page.
pub fn split_pages(text: &str) -> Vec<&str> {
    let trimmed = text.strip_suffix(PAGE_BREAK).unwrap_or(text);
    trimmed.split(PAGE_BREAK).collect()
}

/// Reads UTF-8 text where pages are separated by form feeds (the `pdftotext` layout).
#[derive(Debug, Clone)]
pub struct PlainTextSource {
    pub ocr_min_chars: usize,
}

impl PlainTextSource {
    pub fn new(ocr_min_chars: usize) -> Self {
        Self { ocr_min_chars }
    }

    pub fn from_text(&self, text: String) -> ExtractedText {
        let page_count = split_pages(&text).len().max(1) as u32;
        let needs_ocr = text.trim().chars().count() < self.ocr_min_chars;
        if needs_ocr {
            tracing::info!(
                chars = text.trim().chars().count(),
                threshold = self.ocr_min_chars,
                "extracted text below OCR threshold"
            );
        }
        ExtractedText {
            text,
            page_count,
            needs_ocr,
        }
    }
}

impl TextSource for PlainTextSource {
    fn extract(&self, path: &Path) -> CoreResult<ExtractedText> {
        let text = std::fs::read_to_string(path)?;
        Ok(self.from_text(text))
    }
}
