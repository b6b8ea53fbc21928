//! Instrumented backend wrapper.
//!
//! Wraps any [`SupportBackend`], bounds each read and quick action with the
//! configured request timeout, and emits one [`BackendEvent`] per operation.
//! Settings saves and draft requests are never timed out: once sent they run
//! to completion or failure.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use helpdesk_core::models::{ConversationStatus, Mailbox, ToolList};
use helpdesk_core::settings::PendingUpdates;

use crate::error::BackendError;
use crate::event::{BackendEvent, BackendEventKind, BackendEventOutcome, BackendEventSink};
use crate::service::{ConversationRef, ExecuteToolParams, SupportBackend};

pub struct RecordedBackend {
    inner: Arc<dyn SupportBackend>,
    event_sink: Arc<dyn BackendEventSink>,
    request_timeout: Duration,
}

impl RecordedBackend {
    pub fn new(
        inner: Arc<dyn SupportBackend>,
        event_sink: Arc<dyn BackendEventSink>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            inner,
            event_sink,
            request_timeout,
        }
    }

    async fn run<T, F>(
        &self,
        kind: BackendEventKind,
        target: Option<String>,
        detail: String,
        call: F,
    ) -> Result<T, BackendError>
    where
        F: Future<Output = Result<T, BackendError>> + Send,
    {
        let result = match tokio::time::timeout(self.request_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(BackendError::TransportUnavailable {
                message: format!("{kind} timed out after {}ms", self.request_timeout.as_millis()),
            }),
        };
        self.record(kind, target, detail, &result);
        result
    }

    async fn run_to_completion<T, F>(
        &self,
        kind: BackendEventKind,
        target: Option<String>,
        detail: String,
        call: F,
    ) -> Result<T, BackendError>
    where
        F: Future<Output = Result<T, BackendError>> + Send,
    {
        let result = call.await;
        self.record(kind, target, detail, &result);
        result
    }

    fn record<T>(
        &self,
        kind: BackendEventKind,
        target: Option<String>,
        detail: String,
        result: &Result<T, BackendError>,
    ) {
        let outcome = match result {
            Ok(_) => BackendEventOutcome::Success,
            Err(err) => BackendEventOutcome::Error(err.to_string()),
        };
        self.event_sink
            .record(BackendEvent::new(target, kind, outcome, detail));
    }
}

fn conversation_target(conversation: &ConversationRef) -> Option<String> {
    Some(format!(
        "{}/{}",
        conversation.mailbox_slug, conversation.conversation_slug
    ))
}

#[async_trait]
impl SupportBackend for RecordedBackend {
    async fn update_conversation_status(
        &self,
        conversation: ConversationRef,
        status: ConversationStatus,
    ) -> Result<(), BackendError> {
        let target = conversation_target(&conversation);
        self.run(
            BackendEventKind::UpdateStatus,
            target,
            format!("status={status}"),
            self.inner.update_conversation_status(conversation, status),
        )
        .await
    }

    async fn refresh_draft(&self, conversation: ConversationRef) -> Result<(), BackendError> {
        let target = conversation_target(&conversation);
        self.run_to_completion(
            BackendEventKind::RefreshDraft,
            target,
            String::new(),
            self.inner.refresh_draft(conversation),
        )
        .await
    }

    async fn list_tools(&self, conversation: ConversationRef) -> Result<ToolList, BackendError> {
        let target = conversation_target(&conversation);
        self.run(
            BackendEventKind::ListTools,
            target,
            String::new(),
            self.inner.list_tools(conversation),
        )
        .await
    }

    async fn get_mailbox(&self, mailbox_slug: &str) -> Result<Mailbox, BackendError> {
        self.run(
            BackendEventKind::GetMailbox,
            Some(mailbox_slug.to_owned()),
            String::new(),
            self.inner.get_mailbox(mailbox_slug),
        )
        .await
    }

    async fn execute_tool(&self, params: ExecuteToolParams) -> Result<(), BackendError> {
        let target = conversation_target(&params.conversation);
        let detail = format!("tool={}", params.slug);
        self.run(
            BackendEventKind::ExecuteTool,
            target,
            detail,
            self.inner.execute_tool(params),
        )
        .await
    }

    async fn persist_settings(
        &self,
        mailbox_slug: &str,
        updates: PendingUpdates,
    ) -> Result<(), BackendError> {
        let detail = updates
            .changed_fields()
            .iter()
            .map(|field| field.label())
            .collect::<Vec<_>>()
            .join(",");
        self.run_to_completion(
            BackendEventKind::PersistSettings,
            Some(mailbox_slug.to_owned()),
            format!("fields={detail}"),
            self.inner.persist_settings(mailbox_slug, updates),
        )
        .await
    }

    async fn terminate_session(&self, redirect_url: &str) -> Result<(), BackendError> {
        self.run(
            BackendEventKind::TerminateSession,
            None,
            format!("redirect={redirect_url}"),
            self.inner.terminate_session(redirect_url),
        )
        .await
    }
}
