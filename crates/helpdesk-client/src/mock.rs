//! Mock support backend for unit testing and the demo binary.
//!
//! Keeps mailboxes, conversations and tool listings in memory, records every
//! call, and returns pre-configured one-shot errors.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use helpdesk_core::models::{Conversation, ConversationStatus, Mailbox, ToolList};
use helpdesk_core::settings::PendingUpdates;

use crate::error::BackendError;
use crate::service::{ConversationRef, ExecuteToolParams, SupportBackend};

/// A recorded call to the mock backend.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    UpdateStatus(ConversationRef, ConversationStatus),
    RefreshDraft(ConversationRef),
    ListTools(ConversationRef),
    GetMailbox(String),
    ExecuteTool(ExecuteToolParams),
    PersistSettings(String, PendingUpdates),
    TerminateSession(String),
}

/// Mock implementation of `SupportBackend` for testing.
pub struct MockSupportBackend {
    mailboxes: Mutex<HashMap<String, Mailbox>>,
    conversations: Mutex<HashMap<String, Conversation>>,
    tools: Mutex<ToolList>,
    calls: Mutex<Vec<MockCall>>,
    status_error: Mutex<Option<BackendError>>,
    draft_error: Mutex<Option<BackendError>>,
    tool_error: Mutex<Option<BackendError>>,
    persist_error: Mutex<Option<BackendError>>,
    session_error: Mutex<Option<BackendError>>,
}

impl Default for MockSupportBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl MockSupportBackend {
    pub fn new() -> Self {
        Self {
            mailboxes: Mutex::new(HashMap::new()),
            conversations: Mutex::new(HashMap::new()),
            tools: Mutex::new(ToolList::default()),
            calls: Mutex::new(Vec::new()),
            status_error: Mutex::new(None),
            draft_error: Mutex::new(None),
            tool_error: Mutex::new(None),
            persist_error: Mutex::new(None),
            session_error: Mutex::new(None),
        }
    }

    /// Pre-populate a mailbox.
    pub fn with_mailbox(self, mailbox: Mailbox) -> Self {
        lock(&self.mailboxes).insert(mailbox.slug.clone(), mailbox);
        self
    }

    /// Pre-populate a conversation.
    pub fn with_conversation(self, conversation: Conversation) -> Self {
        lock(&self.conversations).insert(conversation.slug.clone(), conversation);
        self
    }

    /// Tool listing returned for every conversation.
    pub fn with_tools(self, tools: ToolList) -> Self {
        *lock(&self.tools) = tools;
        self
    }

    /// Configure the next status update to fail.
    pub fn with_status_error(self, err: BackendError) -> Self {
        *lock(&self.status_error) = Some(err);
        self
    }

    /// Configure the next draft refresh to fail.
    pub fn with_draft_error(self, err: BackendError) -> Self {
        *lock(&self.draft_error) = Some(err);
        self
    }

    /// Configure the next tool execution to fail.
    pub fn with_tool_error(self, err: BackendError) -> Self {
        *lock(&self.tool_error) = Some(err);
        self
    }

    /// Configure the next settings save to fail.
    pub fn with_persist_error(self, err: BackendError) -> Self {
        *lock(&self.persist_error) = Some(err);
        self
    }

    /// Configure the next sign-out to fail.
    pub fn with_session_error(self, err: BackendError) -> Self {
        *lock(&self.session_error) = Some(err);
        self
    }

    /// Return all recorded calls.
    pub fn calls(&self) -> Vec<MockCall> {
        lock(&self.calls).clone()
    }

    /// Return the number of recorded calls.
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Settings payloads passed to `persist_settings`, in call order.
    pub fn persisted(&self) -> Vec<PendingUpdates> {
        lock(&self.calls)
            .iter()
            .filter_map(|call| match call {
                MockCall::PersistSettings(_, updates) => Some(updates.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn conversation(&self, slug: &str) -> Option<Conversation> {
        lock(&self.conversations).get(slug).cloned()
    }

    pub fn mailbox(&self, slug: &str) -> Option<Mailbox> {
        lock(&self.mailboxes).get(slug).cloned()
    }

    fn record(&self, call: MockCall) {
        lock(&self.calls).push(call);
    }

    fn take_error(slot: &Mutex<Option<BackendError>>) -> Option<BackendError> {
        lock(slot).take()
    }

    fn ensure_conversation(&self, conversation: &ConversationRef) -> Result<(), BackendError> {
        if conversation.conversation_slug.trim().is_empty() {
            return Err(BackendError::InvalidArgument {
                message: "conversation slug is required".into(),
            });
        }
        if lock(&self.conversations).contains_key(&conversation.conversation_slug) {
            Ok(())
        } else {
            Err(BackendError::NotFound {
                entity: "conversation",
                slug: conversation.conversation_slug.clone(),
            })
        }
    }
}

fn apply_to_mailbox(mailbox: &mut Mailbox, updates: &PendingUpdates) {
    if let Some(slack) = &updates.slack {
        mailbox.slack_alert_channel = slack.alert_channel.clone();
    }
    if let Some(github) = &updates.github {
        if let Some(owner) = &github.repo_owner {
            mailbox.github_repo_owner = Some(owner.clone());
        }
        if let Some(name) = &github.repo_name {
            mailbox.github_repo_name = Some(name.clone());
        }
    }
    if let Some(widget) = &updates.widget {
        mailbox.widget_display_mode = widget.display_mode;
        mailbox.widget_display_min_value = widget.display_min_value;
        if let Some(auto_respond) = widget.auto_respond_email_to_chat {
            mailbox.auto_respond_email_to_chat = auto_respond;
        }
        if widget.widget_host.is_some() {
            mailbox.widget_host = widget.widget_host.clone();
        }
    }
    if let Some(customer) = &updates.customer {
        mailbox.vip_threshold = customer.vip_threshold;
        mailbox.vip_channel_id = customer.vip_channel_id.clone();
        mailbox.vip_expected_response_hours = customer.vip_expected_response_hours;
    }
    if let Some(auto_close) = &updates.auto_close {
        if let Some(enabled) = auto_close.enabled {
            mailbox.auto_close_enabled = enabled;
        }
        if let Some(days) = auto_close.days_of_inactivity {
            mailbox.auto_close_days_of_inactivity = days;
        }
    }
}

#[async_trait]
impl SupportBackend for MockSupportBackend {
    async fn update_conversation_status(
        &self,
        conversation: ConversationRef,
        status: ConversationStatus,
    ) -> Result<(), BackendError> {
        self.record(MockCall::UpdateStatus(conversation.clone(), status));

        if let Some(err) = Self::take_error(&self.status_error) {
            return Err(err);
        }
        self.ensure_conversation(&conversation)?;

        if let Some(existing) = lock(&self.conversations).get_mut(&conversation.conversation_slug) {
            existing.status = status;
        }
        Ok(())
    }

    async fn refresh_draft(&self, conversation: ConversationRef) -> Result<(), BackendError> {
        self.record(MockCall::RefreshDraft(conversation.clone()));

        if let Some(err) = Self::take_error(&self.draft_error) {
            return Err(err);
        }
        self.ensure_conversation(&conversation)
    }

    async fn list_tools(&self, conversation: ConversationRef) -> Result<ToolList, BackendError> {
        self.record(MockCall::ListTools(conversation));
        Ok(lock(&self.tools).clone())
    }

    async fn get_mailbox(&self, mailbox_slug: &str) -> Result<Mailbox, BackendError> {
        self.record(MockCall::GetMailbox(mailbox_slug.to_owned()));

        lock(&self.mailboxes)
            .get(mailbox_slug)
            .cloned()
            .ok_or_else(|| BackendError::NotFound {
                entity: "mailbox",
                slug: mailbox_slug.to_owned(),
            })
    }

    async fn execute_tool(&self, params: ExecuteToolParams) -> Result<(), BackendError> {
        self.record(MockCall::ExecuteTool(params.clone()));

        if let Some(err) = Self::take_error(&self.tool_error) {
            return Err(err);
        }
        let known = lock(&self.tools).all.iter().any(|tool| tool.slug == params.slug);
        if known {
            Ok(())
        } else {
            Err(BackendError::NotFound {
                entity: "tool",
                slug: params.slug,
            })
        }
    }

    async fn persist_settings(
        &self,
        mailbox_slug: &str,
        updates: PendingUpdates,
    ) -> Result<(), BackendError> {
        self.record(MockCall::PersistSettings(
            mailbox_slug.to_owned(),
            updates.clone(),
        ));

        if let Some(err) = Self::take_error(&self.persist_error) {
            return Err(err);
        }

        let mut mailboxes = lock(&self.mailboxes);
        let mailbox = mailboxes
            .get_mut(mailbox_slug)
            .ok_or_else(|| BackendError::NotFound {
                entity: "mailbox",
                slug: mailbox_slug.to_owned(),
            })?;
        apply_to_mailbox(mailbox, &updates);
        Ok(())
    }

    async fn terminate_session(&self, redirect_url: &str) -> Result<(), BackendError> {
        self.record(MockCall::TerminateSession(redirect_url.to_owned()));

        match Self::take_error(&self.session_error) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
