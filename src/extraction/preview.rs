//! Page preview rendering via Google PDFium.
//!
//! `PdfiumPreviewRenderer` is stateless (`Send + Sync`). Each render loads a
//! fresh `Pdfium` instance because the upstream type is `!Send`; the OS
//! caches the underlying `dlopen`, so repeat loads are near-free. A failed
//! render is a per-page warning to the caller, never a session failure.

use std::io::Cursor;

use image::ImageOutputFormat;
use pdfium_render::prelude::*;
use tracing::debug;

use super::types::PagePreviewSource;
use super::ExtractionError;

/// Maximum pixel dimension for a rendered preview. Guards against OOM on
/// pathological page geometry.
const MAX_DIMENSION_PX: u32 = 4096;

/// PDF points per inch.
const POINTS_PER_INCH: f32 = 72.0;

/// Renders claim pages to PNG for the browser preview panel.
pub struct PdfiumPreviewRenderer;

/// Load the PDFium dynamic library: explicit `PDFIUM_DYNAMIC_LIB_PATH`
/// first, then alongside the executable, then the system search path.
fn load_pdfium() -> Result<Pdfium, ExtractionError> {
    if let Ok(path) = std::env::var("PDFIUM_DYNAMIC_LIB_PATH") {
        let bindings = Pdfium::bind_to_library(&path).map_err(|e| {
            ExtractionError::PdfRendering {
                page: 0,
                reason: format!("failed to load PDFium from {path}: {e}"),
            }
        })?;
        return Ok(Pdfium::new(bindings));
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(exe_dir) = exe.parent() {
            let lib_path =
                Pdfium::pdfium_platform_library_name_at_path(exe_dir.to_string_lossy().as_ref());
            if let Ok(bindings) = Pdfium::bind_to_library(&lib_path) {
                return Ok(Pdfium::new(bindings));
            }
        }
    }

    let bindings = Pdfium::bind_to_system_library().map_err(|e| {
        ExtractionError::PdfRendering {
            page: 0,
            reason: format!(
                "PDFium library not found; set PDFIUM_DYNAMIC_LIB_PATH or install PDFium: {e}"
            ),
        }
    })?;
    Ok(Pdfium::new(bindings))
}

/// Pixel dimensions for rendering at `dpi`, clamped to `[1, MAX_DIMENSION_PX]`
/// with the aspect ratio preserved when capping.
fn compute_render_dimensions(width_points: f32, height_points: f32, dpi: u32) -> (u32, u32) {
    let scale = dpi as f32 / POINTS_PER_INCH;
    let raw_w = (width_points * scale).max(1.0);
    let raw_h = (height_points * scale).max(1.0);

    let max_dim = raw_w.max(raw_h);
    if max_dim > MAX_DIMENSION_PX as f32 {
        let ratio = MAX_DIMENSION_PX as f32 / max_dim;
        let w = ((raw_w * ratio) as u32).clamp(1, MAX_DIMENSION_PX);
        let h = ((raw_h * ratio) as u32).clamp(1, MAX_DIMENSION_PX);
        (w, h)
    } else {
        (raw_w as u32, raw_h as u32)
    }
}

impl PagePreviewSource for PdfiumPreviewRenderer {
    fn render_page(
        &self,
        pdf_bytes: &[u8],
        page_number: usize,
        dpi: u32,
    ) -> Result<Vec<u8>, ExtractionError> {
        let pdfium = load_pdfium()?;
        let document = pdfium.load_pdf_from_byte_slice(pdf_bytes, None).map_err(|e| {
            ExtractionError::PdfRendering {
                page: page_number,
                reason: format!("failed to load PDF: {e}"),
            }
        })?;

        let pages = document.pages();

        // Page numbers are 1-based throughout the app.
        let page_index = page_number
            .checked_sub(1)
            .and_then(|i| u16::try_from(i).ok())
            .ok_or_else(|| ExtractionError::PdfRendering {
                page: page_number,
                reason: "page number must be a positive page index".into(),
            })?;

        let page = pages.get(page_index).map_err(|_| ExtractionError::PdfRendering {
            page: page_number,
            reason: format!("page {page_number} out of range ({} pages)", pages.len()),
        })?;

        let (target_w, target_h) =
            compute_render_dimensions(page.width().value, page.height().value, dpi);

        let render_config = PdfRenderConfig::new()
            .set_target_width(target_w as i32)
            .set_maximum_height(target_h as i32);

        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            ExtractionError::PdfRendering {
                page: page_number,
                reason: format!("rendering failed: {e}"),
            }
        })?;

        let mut cursor = Cursor::new(Vec::new());
        bitmap
            .as_image()
            .write_to(&mut cursor, ImageOutputFormat::Png)
            .map_err(|e| ExtractionError::ImageProcessing(format!("PNG encoding failed: {e}")))?;

        let png_bytes = cursor.into_inner();
        debug!(
            page = page_number,
            width = target_w,
            height = target_h,
            png_size = png_bytes.len(),
            "rendered claim page preview"
        );
        Ok(png_bytes)
    }
}

// ── Mock for testing ──────────────────────────────────────

/// Mock preview renderer returning a minimal PNG for pages within range.
///
/// Lets API and controller tests exercise the preview path without the
/// PDFium binary.
pub struct MockPreviewRenderer {
    page_count: usize,
}

impl MockPreviewRenderer {
    pub fn new(page_count: usize) -> Self {
        Self { page_count }
    }
}

impl PagePreviewSource for MockPreviewRenderer {
    fn render_page(
        &self,
        _pdf_bytes: &[u8],
        page_number: usize,
        _dpi: u32,
    ) -> Result<Vec<u8>, ExtractionError> {
        if page_number == 0 || page_number > self.page_count {
            return Err(ExtractionError::PdfRendering {
                page: page_number,
                reason: format!("page {page_number} out of range (mock has {} pages)", self.page_count),
            });
        }
        Ok(minimal_png())
    }
}

/// Minimal valid 1x1 white-pixel PNG.
fn minimal_png() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // PNG signature
        0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, // IHDR chunk
        0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, // 1x1
        0x08, 0x02, 0x00, 0x00, 0x00, 0x90, 0x77, 0x53, // 8-bit RGB
        0xDE, // IHDR CRC
        0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, 0x54, // IDAT chunk
        0x08, 0xD7, 0x63, 0xF8, 0xCF, 0xC0, 0x00, 0x00, // compressed
        0x00, 0x02, 0x00, 0x01, 0xE2, 0x21, 0xBC, 0x33, // IDAT CRC
        0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, // IEND chunk
        0xAE, 0x42, 0x60, 0x82, // IEND CRC
    ]
}
