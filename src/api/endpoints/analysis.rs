//! Analysis endpoints: the FWA run, follow-up actions, and session reset.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::controller::{AnalyzeOutcome, FollowUpKind, FollowUpOutcome};

/// `POST /api/analysis/run` — extract text from the selected pages and send
/// it to the agent with the fixed FWA prompt.
pub async fn run(State(ctx): State<ApiContext>) -> Result<Json<AnalyzeOutcome>, ApiError> {
    let mut controller = ctx.controller.lock().await;
    let outcome = controller.analyze().await?;
    Ok(Json(outcome))
}

#[derive(Deserialize)]
pub struct FollowUpRequest {
    pub kind: FollowUpKind,
}

/// `POST /api/analysis/followup` — one of the fixed follow-up actions,
/// reusing the stored extracted text as context.
pub async fn follow_up(
    State(ctx): State<ApiContext>,
    Json(req): Json<FollowUpRequest>,
) -> Result<Json<FollowUpOutcome>, ApiError> {
    let mut controller = ctx.controller.lock().await;
    let outcome = controller.follow_up(req.kind).await?;
    Ok(Json(outcome))
}

#[derive(Serialize)]
pub struct ResetResponse {
    pub status: &'static str,
}

/// `POST /api/session/reset` — clear all session state.
pub async fn reset(State(ctx): State<ApiContext>) -> Json<ResetResponse> {
    let mut controller = ctx.controller.lock().await;
    controller.reset();
    Json(ResetResponse { status: "reset" })
}
