//! Mailbox, conversation and tool snapshots as served by the support backend.
//!
//! These are read-only views: the dashboard never owns authoritative copies,
//! it only renders from whatever the backend last returned.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a support conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    Open,
    Closed,
    Spam,
}

impl ConversationStatus {
    pub const ALL: [Self; 3] = [Self::Open, Self::Closed, Self::Spam];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Spam => "spam",
        }
    }
}

impl fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConversationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "spam" => Ok(Self::Spam),
            other => Err(format!("unknown conversation status {other:?}")),
        }
    }
}

/// The ticket currently shown in the inbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub slug: String,
    pub status: ConversationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_issue_number: Option<u64>,
}

impl Conversation {
    #[must_use]
    pub fn new(slug: impl Into<String>, status: ConversationStatus) -> Self {
        Self {
            slug: slug.into(),
            status,
            github_issue_number: None,
        }
    }

    #[must_use]
    pub fn with_github_issue(mut self, number: u64) -> Self {
        self.github_issue_number = Some(number);
        self
    }

    /// A slug is resolved once the backend has assigned a non-empty one.
    #[must_use]
    pub fn resolved_slug(&self) -> Option<&str> {
        let slug = self.slug.trim();
        if slug.is_empty() {
            None
        } else {
            Some(slug)
        }
    }
}

/// How the in-app chat widget decides whether to show itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetDisplayMode {
    #[default]
    Off,
    Always,
    RevenueBased,
}

impl WidgetDisplayMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Always => "always",
            Self::RevenueBased => "revenue_based",
        }
    }
}

impl FromStr for WidgetDisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "off" => Ok(Self::Off),
            "always" => Ok(Self::Always),
            "revenue_based" | "revenue-based" => Ok(Self::RevenueBased),
            other => Err(format!("unknown widget display mode {other:?}")),
        }
    }
}

/// Mailbox configuration snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Mailbox {
    pub slug: String,
    pub name: String,
    pub github_connected: bool,
    pub github_repo_owner: Option<String>,
    pub github_repo_name: Option<String>,
    pub slack_connected: bool,
    pub slack_alert_channel: Option<String>,
    pub widget_display_mode: WidgetDisplayMode,
    pub widget_display_min_value: Option<u32>,
    pub auto_respond_email_to_chat: bool,
    pub widget_host: Option<String>,
    pub vip_threshold: Option<u32>,
    pub vip_channel_id: Option<String>,
    pub vip_expected_response_hours: Option<u32>,
    pub auto_close_enabled: bool,
    pub auto_close_days_of_inactivity: u32,
    pub metadata_endpoint: Option<String>,
}

impl Mailbox {
    #[must_use]
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            auto_close_days_of_inactivity: 14,
            ..Self::default()
        }
    }

    /// GitHub actions are offered only once the integration is connected and
    /// a target repository is fully configured.
    #[must_use]
    pub fn github_ready(&self) -> bool {
        self.github_connected
            && non_blank(self.github_repo_owner.as_deref())
            && non_blank(self.github_repo_name.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

/// Externally defined callable action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, serde_json::Value>,
}

impl Tool {
    #[must_use]
    pub fn new(slug: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            description: description.into(),
            parameters: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    /// JSON rendering of the parameter map with sorted keys.
    #[must_use]
    pub fn parameters_json(&self) -> String {
        serde_json::to_string(&self.parameters).unwrap_or_else(|_| "{}".to_owned())
    }

    /// Menu identity: the same tool suggested with different parameters
    /// yields distinct entries.
    #[must_use]
    pub fn menu_id(&self) -> String {
        format!("tool-{}-{}", self.slug, self.parameters_json())
    }
}

/// One contextual suggestion. Only `tool` suggestions are invocable from the
/// command bar; unknown kinds are preserved but skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SuggestedEntry {
    Tool { tool: Tool },
    #[serde(other)]
    Other,
}

/// Result of the tool listing query.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ToolList {
    #[serde(default)]
    pub all: Vec<Tool>,
    #[serde(default)]
    pub suggested: Vec<SuggestedEntry>,
}

impl ToolList {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    pub fn suggested_tools(&self) -> impl Iterator<Item = &Tool> {
        self.suggested.iter().filter_map(|entry| match entry {
            SuggestedEntry::Tool { tool } => Some(tool),
            SuggestedEntry::Other => None,
        })
    }
}
