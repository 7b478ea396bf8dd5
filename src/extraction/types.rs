use super::ExtractionError;

/// Per-page plain-text access to a PDF (allows mocking for tests).
pub trait PdfTextSource: Send + Sync {
    /// Text of every page, index 0 = page 1. All-or-nothing: a parse
    /// failure anywhere aborts the whole read.
    fn page_texts(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractionError>;

    fn page_count(&self, pdf_bytes: &[u8]) -> Result<usize, ExtractionError>;
}

/// Raster preview rendering of a single PDF page.
pub trait PagePreviewSource: Send + Sync {
    /// Render the given 1-based page to PNG bytes. The caller is
    /// responsible for range-checking `page_number` against the page count.
    fn render_page(
        &self,
        pdf_bytes: &[u8],
        page_number: usize,
        dpi: u32,
    ) -> Result<Vec<u8>, ExtractionError>;
}

// ── Mocks for testing ─────────────────────────────────────

/// Mock text source serving a fixed list of page texts, or failing on
/// demand to exercise the all-or-nothing error path.
pub struct MockTextSource {
    pages: Vec<String>,
    fail: bool,
}

impl MockTextSource {
    pub fn new<S: Into<String>>(pages: Vec<S>) -> Self {
        Self {
            pages: pages.into_iter().map(Into::into).collect(),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self { pages: vec![], fail: true }
    }
}

impl PdfTextSource for MockTextSource {
    fn page_texts(&self, _pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
        if self.fail {
            return Err(ExtractionError::PdfParsing("mock parse failure".into()));
        }
        Ok(self.pages.clone())
    }

    fn page_count(&self, _pdf_bytes: &[u8]) -> Result<usize, ExtractionError> {
        if self.fail {
            return Err(ExtractionError::PdfParsing("mock parse failure".into()));
        }
        Ok(self.pages.len())
    }
}
