//! PDF text extraction.
//!
//! Input is raw bytes, output is the plain UTF-8 text plus the page count.
//! Extraction is CPU-bound and synchronous; async callers run it through
//! `tokio::task::spawn_blocking`.

use std::path::Path;

pub const MIME_PDF: &str = "application/pdf";

/// Text and page count of a parsed PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPdf {
    pub text: String,
    pub page_count: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("failed to read upload: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
}

/// Extracts text page by page; pages are joined with a newline.
pub fn extract_pdf(bytes: &[u8]) -> Result<ExtractedPdf, ExtractError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| ExtractError::Pdf(e.to_string()))?;
    Ok(ExtractedPdf {
        page_count: pages.len(),
        text: pages.join("\n"),
    })
}

/// Reads `path` and extracts it with [`extract_pdf`].
pub fn extract_pdf_file(path: &Path) -> Result<ExtractedPdf, ExtractError> {
    let bytes = std::fs::read(path)?;
    extract_pdf(&bytes)
}

/// Whether a declared content type names a PDF.
///
/// Parameters such as `; charset=binary` are ignored.
pub fn is_pdf_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|essence| essence.trim().eq_ignore_ascii_case(MIME_PDF))
        .unwrap_or(false)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Two-page PDF drawing "first page words" and "second page words".
    pub(crate) const TWO_PAGE_PDF: &[u8] = include_bytes!("../tests/fixtures/two_pages.pdf");

    #[test]
    fn extracts_text_and_page_count() {
        let extracted = extract_pdf(TWO_PAGE_PDF).unwrap();
        assert_eq!(extracted.page_count, 2);
        assert!(extracted.text.contains("first page words"), "{:?}", extracted.text);
        assert!(extracted.text.contains("second page words"), "{:?}", extracted.text);
    }

    #[test]
    fn invalid_pdf_returns_error() {
        let err = extract_pdf(b"not a pdf").unwrap_err();
        assert!(matches!(err, ExtractError::Pdf(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract_pdf_file(&dir.path().join("absent.pdf")).unwrap_err();
        assert!(matches!(err, ExtractError::Io(_)));
    }

    #[test]
    fn content_type_check() {
        assert!(is_pdf_content_type("application/pdf"));
        assert!(is_pdf_content_type("Application/PDF; charset=binary"));
        assert!(!is_pdf_content_type("text/plain"));
        assert!(!is_pdf_content_type("application/pdfx"));
        assert!(!is_pdf_content_type(""));
    }
}
