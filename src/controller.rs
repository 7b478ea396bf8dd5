//! Session controller: the transition functions behind every user action.
//!
//! The UI layer (browser + API handlers) only renders snapshots and invokes
//! transitions; all state mutation happens here, one action at a time. Each
//! transition either completes fully or fails a precondition with no state
//! change.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::agent::AgentInvoker;
use crate::extraction::{extract_page_text, PdfTextSource};
use crate::prompts;
use crate::score::parse_risk_score;
use crate::session::{ClaimDocument, ConversationTurn, SessionError, SessionState};

/// Follow-up actions available once an analysis has run. Each maps to a
/// fixed task prompt; the stored extracted text is reused as context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUpKind {
    ExplainRejection,
    RiskScore,
    SuggestCorrections,
    FullReport,
    ClaimMetadata,
}

impl FollowUpKind {
    pub fn prompt(self) -> &'static str {
        match self {
            Self::ExplainRejection => prompts::EXPLAIN_REJECTION,
            Self::RiskScore => prompts::RISK_SCORE,
            Self::SuggestCorrections => prompts::SUGGEST_CORRECTIONS,
            Self::FullReport => prompts::FULL_REPORT,
            Self::ClaimMetadata => prompts::CLAIM_METADATA,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadOutcome {
    pub file_name: String,
    pub page_count: usize,
    pub selected_pages: Vec<usize>,
    /// True when a previously loaded claim (and its analysis state) was
    /// discarded because the file identity changed.
    pub replaced: bool,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeOutcome {
    pub extracted_text: String,
    pub response: Option<String>,
    /// Non-fatal extraction problem, surfaced to the user.
    pub warning: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FollowUpOutcome {
    pub response: String,
    /// Present only for the risk-score follow-up, when a score was found.
    pub risk_score: Option<u8>,
}

/// Read-only view of the session for rendering.
#[derive(Debug, Serialize)]
pub struct SessionSnapshot {
    pub file_name: Option<String>,
    pub page_count: usize,
    pub selected_pages: Vec<usize>,
    pub extracted_text: String,
    pub history: Vec<ConversationTurn>,
    pub latest_response: Option<String>,
}

pub struct SessionController {
    state: SessionState,
    text_source: Arc<dyn PdfTextSource>,
    agent: Arc<dyn AgentInvoker>,
}

impl SessionController {
    pub fn new(text_source: Arc<dyn PdfTextSource>, agent: Arc<dyn AgentInvoker>) -> Self {
        Self {
            state: SessionState::default(),
            text_source,
            agent,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Adopt an uploaded claim PDF.
    ///
    /// An unreadable PDF is rejected with no state change. A file name that
    /// differs from the current claim resets extracted text, selection,
    /// history, and the latest response; the selection then defaults to all
    /// pages. Re-uploading the same name refreshes the bytes and keeps the
    /// rest of the session intact.
    pub fn upload(&mut self, file_name: &str, bytes: Vec<u8>) -> Result<UploadOutcome, SessionError> {
        let page_count = self
            .text_source
            .page_count(&bytes)
            .map_err(|e| SessionError::UnreadableClaim(e.to_string()))?;

        let had_prior = self.state.document.is_some();
        let identity_changed = self
            .state
            .document
            .as_ref()
            .map_or(true, |doc| doc.file_name != file_name);

        if identity_changed {
            self.state.clear_analysis();
            self.state.selected_pages = (1..=page_count).collect();
            tracing::info!(file_name, page_count, replaced = had_prior, "claim loaded");
        }

        self.state.document = Some(ClaimDocument {
            file_name: file_name.to_string(),
            bytes: Arc::new(bytes),
            page_count,
        });

        Ok(UploadOutcome {
            file_name: file_name.to_string(),
            page_count,
            selected_pages: self.state.selected_pages.iter().copied().collect(),
            replaced: identity_changed && had_prior,
        })
    }

    /// Overwrite the page selection. Values are normalized to an ascending
    /// deduplicated set; range validation happens downstream in extraction
    /// and preview.
    pub fn select_pages(&mut self, pages: &[usize]) -> Result<Vec<usize>, SessionError> {
        if self.state.document.is_none() {
            return Err(SessionError::NoClaim);
        }
        self.state.selected_pages = pages.iter().copied().collect();
        Ok(self.state.selected_pages.iter().copied().collect())
    }

    /// Run the FWA analysis over the selected pages.
    ///
    /// Extraction failure is non-fatal: the session keeps an empty extracted
    /// text and the agent is not called. A successful extraction with text
    /// triggers one agent call; each run appends its own assistant turn.
    pub async fn analyze(&mut self) -> Result<AnalyzeOutcome, SessionError> {
        let doc = self.state.document.as_ref().ok_or(SessionError::NoClaim)?;
        if self.state.selected_pages.is_empty() {
            return Err(SessionError::NoPages);
        }

        let bytes = Arc::clone(&doc.bytes);
        let (text, warning) =
            match extract_page_text(self.text_source.as_ref(), &bytes, &self.state.selected_pages) {
                Ok(text) => (text, None),
                Err(e) => {
                    tracing::warn!(error = %e, "claim text extraction failed");
                    (String::new(), Some(format!("Error reading PDF: {e}")))
                }
            };

        self.state.extracted_text = text.clone();

        if text.is_empty() {
            let warning = warning
                .or_else(|| Some("No text could be extracted from the selected pages.".to_string()));
            return Ok(AnalyzeOutcome {
                extracted_text: text,
                response: None,
                warning,
            });
        }

        let reply = self.agent.ask(&text, prompts::ANALYZE_CLAIM).await;
        self.state.latest_response = Some(reply.clone());
        self.state.history.push(ConversationTurn::assistant(reply.clone()));

        Ok(AnalyzeOutcome {
            extracted_text: text,
            response: Some(reply),
            warning: None,
        })
    }

    /// Ask a follow-up question against the stored extracted text.
    ///
    /// Requires at least one completed analysis. The risk-score follow-up
    /// additionally derives a 0-100 score from the reply.
    pub async fn follow_up(&mut self, kind: FollowUpKind) -> Result<FollowUpOutcome, SessionError> {
        if self.state.latest_response.is_none() {
            return Err(SessionError::NoAnalysis);
        }

        let reply = self.agent.ask(&self.state.extracted_text, kind.prompt()).await;
        self.state.history.push(ConversationTurn::assistant(reply.clone()));

        let risk_score = match kind {
            FollowUpKind::RiskScore => parse_risk_score(&reply),
            _ => None,
        };

        Ok(FollowUpOutcome { response: reply, risk_score })
    }

    /// Clear all session fields and drop the loaded claim.
    pub fn reset(&mut self) {
        self.state.clear();
        tracing::info!("session reset");
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            file_name: self.state.document.as_ref().map(|d| d.file_name.clone()),
            page_count: self.state.document.as_ref().map_or(0, |d| d.page_count),
            selected_pages: self.state.selected_pages.iter().copied().collect(),
            extracted_text: self.state.extracted_text.clone(),
            history: self.state.history.clone(),
            latest_response: self.state.latest_response.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{FailingInvoker, ScriptedInvoker, NO_ANSWER_SENTINEL};
    use crate::extraction::MockTextSource;

    fn controller_with(
        pages: Vec<&str>,
        agent: Arc<dyn AgentInvoker>,
    ) -> SessionController {
        SessionController::new(Arc::new(MockTextSource::new(pages)), agent)
    }

    #[test]
    fn upload_adopts_claim_and_selects_all_pages() {
        let mut ctrl = controller_with(vec!["a", "b", "c"], Arc::new(ScriptedInvoker::new("ok")));
        let outcome = ctrl.upload("claim.pdf", b"%PDF".to_vec()).unwrap();
        assert_eq!(outcome.page_count, 3);
        assert_eq!(outcome.selected_pages, vec![1, 2, 3]);
        assert!(!outcome.replaced);
    }

    #[test]
    fn upload_unreadable_pdf_leaves_state_unchanged() {
        let mut ctrl = SessionController::new(
            Arc::new(MockTextSource::failing()),
            Arc::new(ScriptedInvoker::new("ok")),
        );
        let err = ctrl.upload("claim.pdf", b"junk".to_vec()).unwrap_err();
        assert!(matches!(err, SessionError::UnreadableClaim(_)));
        assert!(ctrl.state().document.is_none());
    }

    #[tokio::test]
    async fn new_identity_upload_resets_analysis_state() {
        let agent = Arc::new(ScriptedInvoker::new("finding"));
        let mut ctrl = controller_with(vec!["text"], agent);
        ctrl.upload("first.pdf", b"%PDF".to_vec()).unwrap();
        ctrl.analyze().await.unwrap();
        assert!(!ctrl.state().history.is_empty());
        assert!(ctrl.state().latest_response.is_some());

        let outcome = ctrl.upload("second.pdf", b"%PDF".to_vec()).unwrap();
        assert!(outcome.replaced);
        assert!(ctrl.state().extracted_text.is_empty());
        assert!(ctrl.state().history.is_empty());
        assert!(ctrl.state().latest_response.is_none());
    }

    #[tokio::test]
    async fn same_identity_upload_keeps_session() {
        let agent = Arc::new(ScriptedInvoker::new("finding"));
        let mut ctrl = controller_with(vec!["text"], agent);
        ctrl.upload("claim.pdf", b"%PDF".to_vec()).unwrap();
        ctrl.analyze().await.unwrap();

        let outcome = ctrl.upload("claim.pdf", b"%PDF v2".to_vec()).unwrap();
        assert!(!outcome.replaced);
        assert_eq!(ctrl.state().history.len(), 1);
        assert!(ctrl.state().latest_response.is_some());
    }

    #[test]
    fn select_pages_requires_claim() {
        let mut ctrl = controller_with(vec!["a"], Arc::new(ScriptedInvoker::new("ok")));
        assert!(matches!(ctrl.select_pages(&[1]), Err(SessionError::NoClaim)));
    }

    #[test]
    fn select_pages_normalizes_order_and_duplicates() {
        let mut ctrl = controller_with(vec!["a", "b", "c"], Arc::new(ScriptedInvoker::new("ok")));
        ctrl.upload("claim.pdf", b"%PDF".to_vec()).unwrap();
        let pages = ctrl.select_pages(&[3, 1, 3, 2]).unwrap();
        assert_eq!(pages, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn analyze_requires_claim_then_pages() {
        let mut ctrl = controller_with(vec!["a"], Arc::new(ScriptedInvoker::new("ok")));
        assert!(matches!(ctrl.analyze().await, Err(SessionError::NoClaim)));

        ctrl.upload("claim.pdf", b"%PDF".to_vec()).unwrap();
        ctrl.select_pages(&[]).unwrap();
        assert!(matches!(ctrl.analyze().await, Err(SessionError::NoPages)));
        assert!(ctrl.state().history.is_empty());
    }

    #[tokio::test]
    async fn analyze_extracts_calls_agent_and_records_turn() {
        let agent = Arc::new(ScriptedInvoker::new("Detailed FWA report."));
        let mut ctrl = controller_with(vec!["Hello", "", "World"], agent.clone());
        ctrl.upload("claim.pdf", b"%PDF".to_vec()).unwrap();
        ctrl.select_pages(&[1, 3]).unwrap();

        let outcome = ctrl.analyze().await.unwrap();
        assert_eq!(outcome.extracted_text, "--- Page 1 ---\nHello\n\n--- Page 3 ---\nWorld");
        assert_eq!(outcome.response.as_deref(), Some("Detailed FWA report."));
        assert_eq!(agent.calls(), 1);
        assert_eq!(ctrl.state().history.len(), 1);
        assert_eq!(ctrl.state().latest_response.as_deref(), Some("Detailed FWA report."));
    }

    #[tokio::test]
    async fn analyze_twice_appends_two_turns() {
        let agent = Arc::new(ScriptedInvoker::new("report"));
        let mut ctrl = controller_with(vec!["text"], agent.clone());
        ctrl.upload("claim.pdf", b"%PDF".to_vec()).unwrap();

        ctrl.analyze().await.unwrap();
        ctrl.analyze().await.unwrap();
        assert_eq!(ctrl.state().history.len(), 2);
        assert_eq!(agent.calls(), 2);
    }

    #[tokio::test]
    async fn analyze_with_no_extractable_text_skips_agent() {
        let agent = Arc::new(ScriptedInvoker::new("should not be called"));
        let mut ctrl = controller_with(vec!["", ""], agent.clone());
        ctrl.upload("claim.pdf", b"%PDF".to_vec()).unwrap();

        let outcome = ctrl.analyze().await.unwrap();
        assert!(outcome.extracted_text.is_empty());
        assert!(outcome.response.is_none());
        assert!(outcome.warning.is_some());
        assert_eq!(agent.calls(), 0);
        assert!(ctrl.state().history.is_empty());
    }

    #[tokio::test]
    async fn agent_failure_surfaces_as_sentinel_reply() {
        let mut ctrl = controller_with(vec!["text"], Arc::new(FailingInvoker));
        ctrl.upload("claim.pdf", b"%PDF".to_vec()).unwrap();

        let outcome = ctrl.analyze().await.unwrap();
        assert_eq!(outcome.response.as_deref(), Some(NO_ANSWER_SENTINEL));
        assert_eq!(ctrl.state().history.len(), 1);
    }

    #[tokio::test]
    async fn follow_up_requires_prior_analysis() {
        let mut ctrl = controller_with(vec!["text"], Arc::new(ScriptedInvoker::new("ok")));
        ctrl.upload("claim.pdf", b"%PDF".to_vec()).unwrap();
        let err = ctrl.follow_up(FollowUpKind::ExplainRejection).await.unwrap_err();
        assert!(matches!(err, SessionError::NoAnalysis));
    }

    #[tokio::test]
    async fn risk_score_follow_up_parses_score() {
        let agent = Arc::new(ScriptedInvoker::new("Risk score: 85. High billing anomaly."));
        let mut ctrl = controller_with(vec!["text"], agent.clone());
        ctrl.upload("claim.pdf", b"%PDF".to_vec()).unwrap();
        ctrl.analyze().await.unwrap();

        let outcome = ctrl.follow_up(FollowUpKind::RiskScore).await.unwrap();
        assert_eq!(outcome.risk_score, Some(85));
        assert_eq!(ctrl.state().history.len(), 2);
    }

    #[tokio::test]
    async fn non_risk_follow_up_has_no_score() {
        let agent = Arc::new(ScriptedInvoker::new("Fix code 99213 on line 4."));
        let mut ctrl = controller_with(vec!["text"], agent);
        ctrl.upload("claim.pdf", b"%PDF".to_vec()).unwrap();
        ctrl.analyze().await.unwrap();

        let outcome = ctrl.follow_up(FollowUpKind::SuggestCorrections).await.unwrap();
        assert_eq!(outcome.risk_score, None);
    }

    #[tokio::test]
    async fn follow_up_does_not_overwrite_latest_analysis() {
        let agent = Arc::new(ScriptedInvoker::new("same reply"));
        let mut ctrl = controller_with(vec!["text"], agent);
        ctrl.upload("claim.pdf", b"%PDF".to_vec()).unwrap();
        ctrl.analyze().await.unwrap();
        let latest_before = ctrl.state().latest_response.clone();

        ctrl.follow_up(FollowUpKind::ClaimMetadata).await.unwrap();
        assert_eq!(ctrl.state().latest_response, latest_before);
    }

    #[tokio::test]
    async fn reset_clears_everything() {
        let mut ctrl = controller_with(vec!["text"], Arc::new(ScriptedInvoker::new("ok")));
        ctrl.upload("claim.pdf", b"%PDF".to_vec()).unwrap();
        ctrl.analyze().await.unwrap();

        ctrl.reset();
        let snap = ctrl.snapshot();
        assert!(snap.file_name.is_none());
        assert_eq!(snap.page_count, 0);
        assert!(snap.selected_pages.is_empty());
        assert!(snap.extracted_text.is_empty());
        assert!(snap.history.is_empty());
        assert!(snap.latest_response.is_none());
    }

    #[test]
    fn follow_up_kind_deserializes_snake_case() {
        let kind: FollowUpKind = serde_json::from_str("\"risk_score\"").unwrap();
        assert_eq!(kind, FollowUpKind::RiskScore);
        let kind: FollowUpKind = serde_json::from_str("\"full_report\"").unwrap();
        assert_eq!(kind, FollowUpKind::FullReport);
    }

    #[test]
    fn each_follow_up_kind_has_distinct_prompt() {
        let prompts = [
            FollowUpKind::ExplainRejection.prompt(),
            FollowUpKind::RiskScore.prompt(),
            FollowUpKind::SuggestCorrections.prompt(),
            FollowUpKind::FullReport.prompt(),
            FollowUpKind::ClaimMetadata.prompt(),
        ];
        for (i, a) in prompts.iter().enumerate() {
            for b in prompts.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
