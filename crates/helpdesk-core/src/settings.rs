//! Settings payloads and the pending-updates reducer.
//!
//! Each settings panel owns one optional slot of [`PendingUpdates`]. A slot is
//! present only while its panel has an uncommitted change. Reports replace the
//! slot wholesale, except GitHub, whose reports shallow-merge field by field.

use serde::{Deserialize, Serialize};

use crate::models::WidgetDisplayMode;

/// Slack alert routing change.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlackUpdates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_channel: Option<String>,
}

/// GitHub repository selection change.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitHubUpdates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_name: Option<String>,
}

impl GitHubUpdates {
    /// Shallow merge: every field set on `other` wins, unset fields keep the
    /// current value.
    pub fn merge(&mut self, other: GitHubUpdates) {
        if other.repo_owner.is_some() {
            self.repo_owner = other.repo_owner;
        }
        if other.repo_name.is_some() {
            self.repo_name = other.repo_name;
        }
    }
}

/// In-app chat widget change. The display mode is always sent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetUpdates {
    pub display_mode: WidgetDisplayMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_min_value: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_respond_email_to_chat: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget_host: Option<String>,
}

/// VIP customer policy change.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerUpdates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vip_threshold: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vip_channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vip_expected_response_hours: Option<u32>,
}

/// Inactive-ticket auto-close change.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoCloseUpdates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_of_inactivity: Option<u32>,
}

/// Uncommitted settings diff awaiting one batched save.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingUpdates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slack: Option<SlackUpdates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<GitHubUpdates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget: Option<WidgetUpdates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerUpdates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_close: Option<AutoCloseUpdates>,
}

/// Top-level slot of [`PendingUpdates`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingsField {
    Slack,
    GitHub,
    Widget,
    Customer,
    AutoClose,
}

impl SettingsField {
    pub const ALL: [Self; 5] = [
        Self::Slack,
        Self::GitHub,
        Self::Widget,
        Self::Customer,
        Self::AutoClose,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Slack => "slack",
            Self::GitHub => "github",
            Self::Widget => "widget",
            Self::Customer => "customer",
            Self::AutoClose => "autoClose",
        }
    }
}

/// A change reported by one settings panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelChange {
    Slack(SlackUpdates),
    GitHub(GitHubUpdates),
    Widget(WidgetUpdates),
    Customer(CustomerUpdates),
    AutoClose(AutoCloseUpdates),
}

impl PanelChange {
    #[must_use]
    pub fn field(&self) -> SettingsField {
        match self {
            Self::Slack(_) => SettingsField::Slack,
            Self::GitHub(_) => SettingsField::GitHub,
            Self::Widget(_) => SettingsField::Widget,
            Self::Customer(_) => SettingsField::Customer,
            Self::AutoClose(_) => SettingsField::AutoClose,
        }
    }
}

impl PendingUpdates {
    /// Folds one panel report into the pending diff.
    pub fn apply(&mut self, change: PanelChange) {
        match change {
            PanelChange::Slack(value) => self.slack = Some(value),
            PanelChange::Widget(value) => self.widget = Some(value),
            PanelChange::Customer(value) => self.customer = Some(value),
            PanelChange::AutoClose(value) => self.auto_close = Some(value),
            PanelChange::GitHub(value) => match self.github.as_mut() {
                Some(existing) => existing.merge(value),
                None => self.github = Some(value),
            },
        }
    }

    /// True iff any slot is present, even if the payload itself is empty.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        SettingsField::ALL.iter().any(|field| self.contains(*field))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.has_changes()
    }

    #[must_use]
    pub fn contains(&self, field: SettingsField) -> bool {
        match field {
            SettingsField::Slack => self.slack.is_some(),
            SettingsField::GitHub => self.github.is_some(),
            SettingsField::Widget => self.widget.is_some(),
            SettingsField::Customer => self.customer.is_some(),
            SettingsField::AutoClose => self.auto_close.is_some(),
        }
    }

    /// Slots currently carrying a change, in declaration order.
    #[must_use]
    pub fn changed_fields(&self) -> Vec<SettingsField> {
        SettingsField::ALL
            .into_iter()
            .filter(|field| self.contains(*field))
            .collect()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Reducer form of [`PendingUpdates::apply`].
#[must_use]
pub fn apply_panel_change(mut state: PendingUpdates, change: PanelChange) -> PendingUpdates {
    state.apply(change);
    state
}
