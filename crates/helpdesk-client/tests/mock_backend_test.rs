#![allow(clippy::expect_used, clippy::unwrap_used)]

//! Contract tests for the support backend using the mock implementation.

use helpdesk_client::mock::{MockCall, MockSupportBackend};
use helpdesk_client::{BackendError, ConversationRef, ExecuteToolParams, SupportBackend};
use helpdesk_core::models::{
    Conversation, ConversationStatus, Mailbox, SuggestedEntry, Tool, ToolList,
};
use helpdesk_core::settings::{
    AutoCloseUpdates, GitHubUpdates, PanelChange, PendingUpdates,
};
use serde_json::json;

fn seeded() -> MockSupportBackend {
    let refund = Tool::new("refund", "Refund purchase", "Refund the last purchase")
        .with_parameter("amount", json!(25));
    MockSupportBackend::new()
        .with_mailbox(Mailbox::new("gumroad", "Gumroad"))
        .with_conversation(Conversation::new("c1", ConversationStatus::Open))
        .with_tools(ToolList {
            all: vec![refund.clone()],
            suggested: vec![SuggestedEntry::Tool { tool: refund }],
        })
}

fn conv() -> ConversationRef {
    ConversationRef::new("gumroad", "c1")
}

// ── Status ──

#[tokio::test]
async fn update_status_mutates_conversation() {
    let backend = seeded();
    backend
        .update_conversation_status(conv(), ConversationStatus::Spam)
        .await
        .unwrap();
    assert_eq!(
        backend.conversation("c1").unwrap().status,
        ConversationStatus::Spam
    );
}

#[tokio::test]
async fn update_status_unknown_conversation_is_not_found() {
    let backend = seeded();
    let err = backend
        .update_conversation_status(
            ConversationRef::new("gumroad", "missing"),
            ConversationStatus::Closed,
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        BackendError::NotFound {
            entity: "conversation",
            slug: "missing".into()
        }
    );
}

// ── Draft ──

#[tokio::test]
async fn draft_error_is_one_shot() {
    let backend = seeded().with_draft_error(BackendError::Internal);
    assert!(backend.refresh_draft(conv()).await.is_err());
    assert!(backend.refresh_draft(conv()).await.is_ok());
    assert_eq!(backend.call_count(), 2);
}

#[tokio::test]
async fn draft_requires_conversation_slug() {
    let backend = seeded();
    let err = backend
        .refresh_draft(ConversationRef::new("gumroad", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::InvalidArgument { .. }));
}

// ── Tools ──

#[tokio::test]
async fn tools_list_and_execute() {
    let backend = seeded();
    let tools = backend.list_tools(conv()).await.unwrap();
    assert_eq!(tools.suggested_tools().count(), 1);

    let tool = tools.all[0].clone();
    let params = ExecuteToolParams {
        conversation: conv(),
        slug: tool.slug.clone(),
        name: tool.name.clone(),
        parameters: tool.parameters.clone(),
    };
    backend.execute_tool(params.clone()).await.unwrap();
    assert!(backend.calls().contains(&MockCall::ExecuteTool(params)));
}

#[tokio::test]
async fn execute_unknown_tool_is_not_found() {
    let backend = seeded();
    let err = backend
        .execute_tool(ExecuteToolParams {
            conversation: conv(),
            slug: "nope".into(),
            name: "Nope".into(),
            parameters: Default::default(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::NotFound { entity: "tool", .. }));
}

// ── Settings ──

#[tokio::test]
async fn persist_applies_updates_to_mailbox() {
    let backend = seeded();
    let mut updates = PendingUpdates::default();
    updates.apply(PanelChange::GitHub(GitHubUpdates {
        repo_owner: Some("antiwork".into()),
        repo_name: Some("helper".into()),
    }));
    updates.apply(PanelChange::AutoClose(AutoCloseUpdates {
        enabled: Some(true),
        days_of_inactivity: Some(30),
    }));
    backend.persist_settings("gumroad", updates.clone()).await.unwrap();

    let mailbox = backend.mailbox("gumroad").unwrap();
    assert_eq!(mailbox.github_repo_owner.as_deref(), Some("antiwork"));
    assert_eq!(mailbox.github_repo_name.as_deref(), Some("helper"));
    assert!(mailbox.auto_close_enabled);
    assert_eq!(mailbox.auto_close_days_of_inactivity, 30);
    assert_eq!(backend.persisted(), vec![updates]);
}

#[tokio::test]
async fn persist_error_leaves_mailbox_unchanged() {
    let backend = seeded().with_persist_error(BackendError::rejected("Invalid Slack channel"));
    let mut updates = PendingUpdates::default();
    updates.apply(PanelChange::AutoClose(AutoCloseUpdates {
        enabled: Some(true),
        days_of_inactivity: None,
    }));
    let err = backend.persist_settings("gumroad", updates).await.unwrap_err();
    assert_eq!(err.message().as_deref(), Some("Invalid Slack channel"));
    assert!(!backend.mailbox("gumroad").unwrap().auto_close_enabled);
}

// ── Session ──

#[tokio::test]
async fn terminate_session_records_redirect() {
    let backend = seeded().with_session_error(BackendError::Unauthorized);
    assert!(backend.terminate_session("/").await.is_err());
    backend.terminate_session("/desktop/signed-out").await.unwrap();
    assert_eq!(
        backend.calls(),
        vec![
            MockCall::TerminateSession("/".into()),
            MockCall::TerminateSession("/desktop/signed-out".into()),
        ]
    );
}
