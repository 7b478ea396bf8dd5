//! Claim text extraction: per-page text via pdf-extract, assembled into a
//! page-labeled context string for the agent.

use std::collections::BTreeSet;

use super::types::PdfTextSource;
use super::ExtractionError;

/// PDF text extractor for digital PDFs with embedded text layers.
pub struct PdfTextExtractor;

impl PdfTextSource for PdfTextExtractor {
    fn page_texts(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
        pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
            .map_err(|e| ExtractionError::PdfParsing(e.to_string()))
    }

    fn page_count(&self, pdf_bytes: &[u8]) -> Result<usize, ExtractionError> {
        // lopdf reads only the page tree, much cheaper than a full text pass.
        let doc = lopdf::Document::load_mem(pdf_bytes)
            .map_err(|e| ExtractionError::PdfParsing(e.to_string()))?;
        Ok(doc.get_pages().len())
    }
}

/// Build the agent context string from the selected pages.
///
/// Pages outside `[1, page_count]` are silently dropped; pages whose text
/// is empty or whitespace-only contribute no block. Blocks are emitted in
/// ascending page order (the selection is already a `BTreeSet`) as
/// `--- Page {n} ---` followed by the page text, blank-line separated, with
/// trailing whitespace trimmed. A parse error aborts the whole call — no
/// partial output.
pub fn extract_page_text(
    source: &dyn PdfTextSource,
    pdf_bytes: &[u8],
    pages: &BTreeSet<usize>,
) -> Result<String, ExtractionError> {
    let page_texts = source.page_texts(pdf_bytes)?;

    let mut out = String::new();
    for &n in pages {
        if n == 0 || n > page_texts.len() {
            continue;
        }
        let text = &page_texts[n - 1];
        if text.trim().is_empty() {
            continue;
        }
        out.push_str(&format!("--- Page {n} ---\n{text}\n\n"));
    }

    let trimmed = out.trim_end();
    tracing::debug!(
        selected = pages.len(),
        available = page_texts.len(),
        text_len = trimmed.len(),
        "claim text extracted"
    );
    Ok(trimmed.to_string())
}
