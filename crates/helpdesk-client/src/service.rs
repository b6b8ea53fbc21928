//! Support backend trait: the remote operations the dashboard consumes.
//!
//! Implementations can call a hosted backend or be mocked for testing.

use async_trait::async_trait;
use helpdesk_core::models::{ConversationStatus, Mailbox, ToolList};
use helpdesk_core::settings::PendingUpdates;

use crate::error::BackendError;

/// Identifies the conversation an operation applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversationRef {
    pub mailbox_slug: String,
    pub conversation_slug: String,
}

impl ConversationRef {
    pub fn new(mailbox_slug: impl Into<String>, conversation_slug: impl Into<String>) -> Self {
        Self {
            mailbox_slug: mailbox_slug.into(),
            conversation_slug: conversation_slug.into(),
        }
    }
}

/// Tool invocation request.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecuteToolParams {
    pub conversation: ConversationRef,
    pub slug: String,
    pub name: String,
    pub parameters: std::collections::BTreeMap<String, serde_json::Value>,
}

/// The support backend interface.
///
/// Every call is async; none are cancellable once issued.
#[async_trait]
pub trait SupportBackend: Send + Sync {
    /// Move a conversation to a new status.
    async fn update_conversation_status(
        &self,
        conversation: ConversationRef,
        status: ConversationStatus,
    ) -> Result<(), BackendError>;

    /// Ask for a fresh AI-generated reply draft.
    async fn refresh_draft(&self, conversation: ConversationRef) -> Result<(), BackendError>;

    /// List all tools and the ones suggested for this conversation.
    async fn list_tools(&self, conversation: ConversationRef) -> Result<ToolList, BackendError>;

    /// Fetch mailbox configuration.
    async fn get_mailbox(&self, mailbox_slug: &str) -> Result<Mailbox, BackendError>;

    /// Run a tool with fixed parameters.
    async fn execute_tool(&self, params: ExecuteToolParams) -> Result<(), BackendError>;

    /// Persist a batched settings diff. Failures must carry a
    /// human-readable message.
    async fn persist_settings(
        &self,
        mailbox_slug: &str,
        updates: PendingUpdates,
    ) -> Result<(), BackendError>;

    /// End the current session, landing on `redirect_url`.
    async fn terminate_session(&self, redirect_url: &str) -> Result<(), BackendError>;
}
