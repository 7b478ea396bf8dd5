//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::session::SessionError;

/// Structured error response body for the browser front end.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("No claim uploaded")]
    NoClaim,
    #[error("No pages selected")]
    NoPages,
    #[error("No analysis has been run yet")]
    NoAnalysis,
    #[error("Claim PDF could not be read: {0}")]
    UnreadableClaim(String),
    #[error("Preview failed for page {page}")]
    PreviewFailed { page: usize, reason: String },
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::NoClaim => (
                StatusCode::BAD_REQUEST,
                "NO_CLAIM",
                "Upload a claim PDF first.".to_string(),
            ),
            ApiError::NoPages => (
                StatusCode::BAD_REQUEST,
                "NO_PAGES",
                "Select at least one page.".to_string(),
            ),
            ApiError::NoAnalysis => (
                StatusCode::CONFLICT,
                "NO_ANALYSIS",
                "Run the analysis before asking follow-up questions.".to_string(),
            ),
            ApiError::UnreadableClaim(detail) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNREADABLE_CLAIM",
                format!("Could not read the uploaded PDF: {detail}"),
            ),
            ApiError::PreviewFailed { page, reason } => {
                tracing::warn!(page, reason, "preview rendering failed");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "PREVIEW_FAILED",
                    format!("Preview unavailable for page {page}"),
                )
            }
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone())
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NoClaim => ApiError::NoClaim,
            SessionError::NoPages => ApiError::NoPages,
            SessionError::NoAnalysis => ApiError::NoAnalysis,
            SessionError::UnreadableClaim(detail) => ApiError::UnreadableClaim(detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn no_claim_returns_400() {
        let response = ApiError::NoClaim.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "NO_CLAIM");
    }

    #[tokio::test]
    async fn no_pages_returns_400() {
        let response = ApiError::NoPages.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "NO_PAGES");
    }

    #[tokio::test]
    async fn no_analysis_returns_409() {
        let response = ApiError::NoAnalysis.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn unreadable_claim_returns_422() {
        let response = ApiError::UnreadableClaim("bad xref".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "UNREADABLE_CLAIM");
    }

    #[tokio::test]
    async fn preview_failure_returns_422_without_reason_detail() {
        let response = ApiError::PreviewFailed {
            page: 2,
            reason: "pdfium missing".into(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "PREVIEW_FAILED");
        // Internal reason stays in logs, not in the response
        assert!(!json["error"]["message"].as_str().unwrap().contains("pdfium"));
    }

    #[tokio::test]
    async fn internal_hides_details() {
        let response = ApiError::Internal("lock poisoned".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["message"], "An internal error occurred");
    }

    #[tokio::test]
    async fn session_errors_map_to_api_codes() {
        let api_err: ApiError = SessionError::NoClaim.into();
        assert_eq!(api_err.into_response().status(), StatusCode::BAD_REQUEST);
        let api_err: ApiError = SessionError::NoAnalysis.into();
        assert_eq!(api_err.into_response().status(), StatusCode::CONFLICT);
    }
}
