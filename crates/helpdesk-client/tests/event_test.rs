#![allow(clippy::expect_used, clippy::unwrap_used)]

//! Tests for the backend event recording system.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use helpdesk_client::event::{
    BackendEvent, BackendEventKind, BackendEventOutcome, BackendEventSink, InMemoryEventSink,
    NullEventSink, TracingEventSink,
};
use helpdesk_client::mock::MockSupportBackend;
use helpdesk_client::recorded::RecordedBackend;
use helpdesk_client::{BackendError, ConversationRef, ExecuteToolParams, SupportBackend};
use helpdesk_core::models::{Conversation, ConversationStatus, Mailbox, ToolList};
use helpdesk_core::settings::{PanelChange, PendingUpdates, SlackUpdates};

#[test]
fn in_memory_sink_records_events() {
    let sink = InMemoryEventSink::new();
    assert_eq!(sink.count(), 0);

    sink.record(BackendEvent::new(
        Some("gumroad".into()),
        BackendEventKind::GetMailbox,
        BackendEventOutcome::Success,
        "",
    ));

    assert_eq!(sink.count(), 1);
    let events = sink.events();
    assert_eq!(events[0].target, Some("gumroad".into()));
    assert_eq!(events[0].kind, BackendEventKind::GetMailbox);
}

#[test]
fn null_and_tracing_sinks_accept_events() {
    for sink in [
        Box::new(NullEventSink) as Box<dyn BackendEventSink>,
        Box::new(TracingEventSink) as Box<dyn BackendEventSink>,
    ] {
        sink.record(BackendEvent::new(
            None,
            BackendEventKind::TerminateSession,
            BackendEventOutcome::Error("expired".into()),
            "redirect=/",
        ));
    }
}

#[test]
fn event_kind_display_is_snake_case() {
    assert_eq!(BackendEventKind::PersistSettings.to_string(), "persist_settings");
    assert_eq!(BackendEventKind::RefreshDraft.to_string(), "refresh_draft");
    assert_eq!(
        BackendEventOutcome::Error("boom".into()).to_string(),
        "error: boom"
    );
}

fn recorded(mock: MockSupportBackend, sink: Arc<InMemoryEventSink>) -> RecordedBackend {
    RecordedBackend::new(Arc::new(mock), sink, Duration::from_secs(5))
}

#[tokio::test]
async fn recorded_backend_emits_one_event_per_call() {
    let sink = Arc::new(InMemoryEventSink::new());
    let mock = MockSupportBackend::new()
        .with_mailbox(Mailbox::new("gumroad", "Gumroad"))
        .with_conversation(Conversation::new("c1", ConversationStatus::Open));
    let backend = recorded(mock, Arc::clone(&sink));

    backend.get_mailbox("gumroad").await.unwrap();
    backend
        .update_conversation_status(ConversationRef::new("gumroad", "c1"), ConversationStatus::Closed)
        .await
        .unwrap();
    let mut updates = PendingUpdates::default();
    updates.apply(PanelChange::Slack(SlackUpdates {
        alert_channel: Some("#support".into()),
    }));
    backend.persist_settings("gumroad", updates).await.unwrap();

    let events = sink.events();
    assert_eq!(events.len(), 3);
    assert_eq!(events[1].kind, BackendEventKind::UpdateStatus);
    assert_eq!(events[1].target.as_deref(), Some("gumroad/c1"));
    assert_eq!(events[1].detail, "status=closed");
    assert_eq!(events[2].detail, "fields=slack");
    assert!(events.iter().all(|e| e.outcome == BackendEventOutcome::Success));
}

#[tokio::test]
async fn recorded_backend_records_failures() {
    let sink = Arc::new(InMemoryEventSink::new());
    let mock = MockSupportBackend::new()
        .with_conversation(Conversation::new("c1", ConversationStatus::Open))
        .with_draft_error(BackendError::rejected("model overloaded"));
    let backend = recorded(mock, Arc::clone(&sink));

    let err = backend
        .refresh_draft(ConversationRef::new("gumroad", "c1"))
        .await
        .unwrap_err();
    assert_eq!(err, BackendError::rejected("model overloaded"));
    assert_eq!(
        sink.events()[0].outcome,
        BackendEventOutcome::Error("model overloaded".into())
    );
}

struct StalledBackend;

#[async_trait]
impl SupportBackend for StalledBackend {
    async fn update_conversation_status(
        &self,
        _conversation: ConversationRef,
        _status: ConversationStatus,
    ) -> Result<(), BackendError> {
        Ok(())
    }

    async fn refresh_draft(&self, _conversation: ConversationRef) -> Result<(), BackendError> {
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok(())
    }

    async fn list_tools(&self, _conversation: ConversationRef) -> Result<ToolList, BackendError> {
        Ok(ToolList::default())
    }

    async fn get_mailbox(&self, _mailbox_slug: &str) -> Result<Mailbox, BackendError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Err(BackendError::Internal)
    }

    async fn execute_tool(&self, _params: ExecuteToolParams) -> Result<(), BackendError> {
        Ok(())
    }

    async fn persist_settings(
        &self,
        _mailbox_slug: &str,
        _updates: PendingUpdates,
    ) -> Result<(), BackendError> {
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok(())
    }

    async fn terminate_session(&self, _redirect_url: &str) -> Result<(), BackendError> {
        Ok(())
    }
}

#[tokio::test]
async fn recorded_backend_times_out_slow_calls() {
    let sink = Arc::new(InMemoryEventSink::new());
    let backend = RecordedBackend::new(
        Arc::new(StalledBackend),
        sink.clone(),
        Duration::from_millis(20),
    );
    let err = backend.get_mailbox("gumroad").await.unwrap_err();
    assert!(matches!(err, BackendError::TransportUnavailable { .. }));
    assert!(err.to_string().contains("get_mailbox timed out"));
    assert_eq!(sink.count(), 1);
}

#[tokio::test]
async fn saves_and_drafts_outlive_the_request_timeout() {
    let sink = Arc::new(InMemoryEventSink::new());
    let backend = RecordedBackend::new(
        Arc::new(StalledBackend),
        sink.clone(),
        Duration::from_millis(20),
    );

    backend
        .persist_settings("gumroad", PendingUpdates::default())
        .await
        .unwrap();
    backend
        .refresh_draft(ConversationRef::new("gumroad", "c1"))
        .await
        .unwrap();

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].kind, BackendEventKind::PersistSettings);
    assert_eq!(events[1].kind, BackendEventKind::RefreshDraft);
    assert!(events.iter().all(|e| e.outcome == BackendEventOutcome::Success));
}
