//! helpdesk-client: support backend abstraction for the mailbox dashboard.
//!
//! Provides a transport-agnostic `SupportBackend` trait plus:
//! - `RecordedBackend`: timeout-bounded wrapper that emits one event per call
//! - `MockSupportBackend`: in-memory backend for tests and the demo binary
//!
//! Events flow through the `BackendEventSink` trait.

pub mod error;
pub mod event;
pub mod mock;
pub mod recorded;
pub mod service;

pub use error::BackendError;
pub use service::{ConversationRef, ExecuteToolParams, SupportBackend};

/// Stable crate label used for bootstrap smoke tests.
pub fn crate_label() -> &'static str {
    "helpdesk-client"
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn crate_label_is_stable() {
        assert_eq!(crate_label(), "helpdesk-client");
    }
}
