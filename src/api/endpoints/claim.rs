//! Claim endpoints: upload, page selection, preview, download, snapshot.

use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::config::PREVIEW_DPI;
use crate::controller::{SessionSnapshot, UploadOutcome};

/// `POST /api/claim/upload` — multipart upload, field name `file`.
///
/// A differently-named file resets the session's analysis state; the
/// response says whether that happened so the front end can re-render.
pub async fn upload(
    State(ctx): State<ApiContext>,
    mut multipart: Multipart,
) -> Result<Json<UploadOutcome>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed upload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("claim.pdf").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Upload read failed: {e}")))?;
        if bytes.is_empty() {
            return Err(ApiError::BadRequest("Uploaded file is empty".into()));
        }

        let mut controller = ctx.controller.lock().await;
        let outcome = controller.upload(&file_name, bytes.to_vec())?;
        return Ok(Json(outcome));
    }

    Err(ApiError::BadRequest("Missing 'file' field in upload".into()))
}

/// `GET /api/claim` — full session snapshot for rendering.
pub async fn snapshot(State(ctx): State<ApiContext>) -> Json<SessionSnapshot> {
    let controller = ctx.controller.lock().await;
    Json(controller.snapshot())
}

#[derive(Deserialize)]
pub struct SelectPagesRequest {
    pub pages: Vec<usize>,
}

#[derive(serde::Serialize)]
pub struct SelectPagesResponse {
    pub selected_pages: Vec<usize>,
}

/// `POST /api/claim/pages` — overwrite the page selection.
pub async fn select_pages(
    State(ctx): State<ApiContext>,
    Json(req): Json<SelectPagesRequest>,
) -> Result<Json<SelectPagesResponse>, ApiError> {
    let mut controller = ctx.controller.lock().await;
    let selected_pages = controller.select_pages(&req.pages)?;
    Ok(Json(SelectPagesResponse { selected_pages }))
}

/// `GET /api/claim/preview/{page}` — render one page to PNG.
///
/// A render failure only loses this page's preview; the page range is
/// validated here since the renderer expects a valid 1-based page.
pub async fn preview(
    State(ctx): State<ApiContext>,
    Path(page): Path<usize>,
) -> Result<impl IntoResponse, ApiError> {
    let (bytes, page_count) = {
        let controller = ctx.controller.lock().await;
        let doc = controller.state().document.as_ref().ok_or(ApiError::NoClaim)?;
        (Arc::clone(&doc.bytes), doc.page_count)
    };

    if page == 0 || page > page_count {
        return Err(ApiError::BadRequest(format!(
            "Page {page} out of range (claim has {page_count} pages)"
        )));
    }

    // Rendering is CPU-bound; keep it off the async workers.
    let renderer = Arc::clone(&ctx.preview);
    let png = tokio::task::spawn_blocking(move || renderer.render_page(&bytes, page, PREVIEW_DPI))
        .await
        .map_err(|e| ApiError::Internal(format!("preview task failed: {e}")))?
        .map_err(|e| ApiError::PreviewFailed { page, reason: e.to_string() })?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}

/// `GET /api/claim/download` — byte-identical copy of the uploaded PDF.
pub async fn download(State(ctx): State<ApiContext>) -> Result<impl IntoResponse, ApiError> {
    let (bytes, file_name) = {
        let controller = ctx.controller.lock().await;
        let doc = controller.state().document.as_ref().ok_or(ApiError::NoClaim)?;
        (Arc::clone(&doc.bytes), doc.file_name.clone())
    };

    let disposition = format!("attachment; filename=\"{}\"", file_name.replace('"', ""));
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes.as_ref().clone(),
    ))
}
