//! Backend call recording for audit and debugging.
//!
//! Each backend operation emits an event that can be kept for later
//! inspection or forwarded to `tracing`.

use chrono::{DateTime, Utc};

/// The kind of backend operation that generated an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendEventKind {
    UpdateStatus,
    RefreshDraft,
    ListTools,
    GetMailbox,
    ExecuteTool,
    PersistSettings,
    TerminateSession,
}

impl std::fmt::Display for BackendEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::UpdateStatus => "update_status",
            Self::RefreshDraft => "refresh_draft",
            Self::ListTools => "list_tools",
            Self::GetMailbox => "get_mailbox",
            Self::ExecuteTool => "execute_tool",
            Self::PersistSettings => "persist_settings",
            Self::TerminateSession => "terminate_session",
        };
        f.write_str(s)
    }
}

/// Outcome of a backend operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEventOutcome {
    Success,
    Error(String),
}

impl std::fmt::Display for BackendEventOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Error(msg) => write!(f, "error: {msg}"),
        }
    }
}

/// An event emitted for each backend operation.
#[derive(Debug, Clone)]
pub struct BackendEvent {
    pub timestamp: DateTime<Utc>,
    pub target: Option<String>,
    pub kind: BackendEventKind,
    pub outcome: BackendEventOutcome,
    pub detail: String,
}

impl BackendEvent {
    pub fn new(
        target: Option<String>,
        kind: BackendEventKind,
        outcome: BackendEventOutcome,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            target,
            kind,
            outcome,
            detail: detail.into(),
        }
    }
}

/// Receiver of backend events.
pub trait BackendEventSink: Send + Sync {
    fn record(&self, event: BackendEvent);
}

/// In-memory event sink for testing.
#[derive(Default)]
pub struct InMemoryEventSink {
    events: std::sync::Mutex<Vec<BackendEvent>>,
}

impl InMemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<BackendEvent> {
        match self.events.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn count(&self) -> usize {
        match self.events.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

impl BackendEventSink for InMemoryEventSink {
    fn record(&self, event: BackendEvent) {
        match self.events.lock() {
            Ok(mut guard) => guard.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

/// Forwards events to `tracing`: successes at debug, failures at warn.
pub struct TracingEventSink;

impl BackendEventSink for TracingEventSink {
    fn record(&self, event: BackendEvent) {
        let target = event.target.as_deref().unwrap_or("-");
        match &event.outcome {
            BackendEventOutcome::Success => tracing::debug!(
                kind = %event.kind,
                target,
                detail = %event.detail,
                "backend call succeeded"
            ),
            BackendEventOutcome::Error(message) => tracing::warn!(
                kind = %event.kind,
                target,
                detail = %event.detail,
                error = %message,
                "backend call failed"
            ),
        }
    }
}

/// No-op event sink that discards all events.
pub struct NullEventSink;

impl BackendEventSink for NullEventSink {
    fn record(&self, _event: BackendEvent) {}
}
