//! Remote Bedrock agent client.
//!
//! `AgentInvoker` is the seam: the raw `invoke` keeps failures visible as a
//! `Result` (so tests can tell a real reply from a fallback), while the
//! provided `ask` method implements the user-facing contract — it always
//! returns a string, substituting [`NO_ANSWER_SENTINEL`] on any failure or
//! empty reply. Callers have no distinct error channel; the sentinel is a
//! valid (if unhelpful) answer.

use async_trait::async_trait;
use aws_sdk_bedrockagentruntime::types::ResponseStream;
use uuid::Uuid;

use crate::config::Settings;

/// Fixed fallback reply for any remote failure.
pub const NO_ANSWER_SENTINEL: &str = "I DO NOT HAVE ANSWER AT PRESENT";

/// Failures talking to the remote agent. Internal only: `ask` folds these
/// into the sentinel before anything reaches a caller.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("agent invocation failed: {0}")]
    Invocation(String),
    #[error("completion stream failed: {0}")]
    Stream(String),
}

fn compose_prompt(task_prompt: &str, context: &str) -> String {
    format!("{task_prompt}\n\nHere is the context:\n{context}")
}

/// Abstraction over the remote conversational agent.
#[async_trait]
pub trait AgentInvoker: Send + Sync {
    /// One fire-once call to the agent. No retry, no backoff; timeouts are
    /// whatever the transport defaults to.
    async fn invoke(&self, session_id: &str, input_text: &str) -> Result<String, AgentError>;

    /// Submit a task prompt plus context text and return the reply.
    ///
    /// A fresh session id is generated per call — there is no conversational
    /// continuity with the remote agent across calls. Failures and empty
    /// replies become the sentinel; this method never errors.
    async fn ask(&self, context: &str, task_prompt: &str) -> String {
        let session_id = Uuid::new_v4().to_string();
        let input = compose_prompt(task_prompt, context);
        match self.invoke(&session_id, &input).await {
            Ok(reply) if !reply.is_empty() => reply,
            Ok(_) => {
                tracing::warn!(session_id, "agent returned an empty completion");
                NO_ANSWER_SENTINEL.to_string()
            }
            Err(e) => {
                tracing::error!(session_id, error = %e, "agent invocation failed");
                NO_ANSWER_SENTINEL.to_string()
            }
        }
    }
}

/// `AgentInvoker` backed by the AWS Bedrock agent runtime.
pub struct BedrockAgentClient {
    client: aws_sdk_bedrockagentruntime::Client,
    agent_id: String,
    agent_alias_id: String,
}

impl BedrockAgentClient {
    /// Build a client from startup settings, with explicit credentials.
    pub async fn new(settings: &Settings) -> Self {
        let credentials = aws_credential_types::Credentials::new(
            settings.aws_access_key_id.clone(),
            settings.aws_secret_access_key.clone(),
            None,
            None,
            "medisight-settings",
        );
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(settings.aws_region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        Self {
            client: aws_sdk_bedrockagentruntime::Client::new(&sdk_config),
            agent_id: settings.agent_id.clone(),
            agent_alias_id: settings.agent_alias_id.clone(),
        }
    }
}

#[async_trait]
impl AgentInvoker for BedrockAgentClient {
    async fn invoke(&self, session_id: &str, input_text: &str) -> Result<String, AgentError> {
        let response = self
            .client
            .invoke_agent()
            .agent_id(&self.agent_id)
            .agent_alias_id(&self.agent_alias_id)
            .session_id(session_id)
            .input_text(input_text)
            .send()
            .await
            .map_err(|e| AgentError::Invocation(e.into_service_error().to_string()))?;

        // Chunks arrive in order; concatenate them into one reply.
        let mut completion = String::new();
        let mut stream = response.completion;
        while let Some(event) = stream
            .recv()
            .await
            .map_err(|e| AgentError::Stream(e.to_string()))?
        {
            if let ResponseStream::Chunk(part) = event {
                if let Some(blob) = part.bytes() {
                    completion.push_str(&String::from_utf8_lossy(blob.as_ref()));
                }
            }
        }

        tracing::debug!(session_id, reply_len = completion.len(), "agent reply assembled");
        Ok(completion)
    }
}

// ── Mocks for testing ─────────────────────────────────────

/// Mock invoker returning a fixed reply and counting calls.
///
/// Used by controller and server tests that need an `AgentInvoker` without
/// network access.
pub struct ScriptedInvoker {
    reply: String,
    calls: std::sync::atomic::AtomicUsize,
}

impl ScriptedInvoker {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[async_trait]
impl AgentInvoker for ScriptedInvoker {
    async fn invoke(&self, _session_id: &str, _input_text: &str) -> Result<String, AgentError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

/// Mock invoker that always fails, for exercising the sentinel path.
pub struct FailingInvoker;

#[async_trait]
impl AgentInvoker for FailingInvoker {
    async fn invoke(&self, _session_id: &str, _input_text: &str) -> Result<String, AgentError> {
        Err(AgentError::Invocation("connection refused".into()))
    }
}
