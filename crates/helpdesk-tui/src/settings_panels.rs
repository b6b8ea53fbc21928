//! Individual settings panels.
//!
//! Each panel keeps its own draft, seeded from the mailbox snapshot, and
//! turns every edit into a [`PanelChange`] for the settings view. Panels
//! report their whole payload on each edit, except GitHub, which reports
//! only the field that changed.

use std::fmt;
use std::str::FromStr;

use helpdesk_core::models::{Mailbox, WidgetDisplayMode};
use helpdesk_core::settings::{
    AutoCloseUpdates, CustomerUpdates, GitHubUpdates, PanelChange, SlackUpdates, WidgetUpdates,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelId {
    Customer,
    ChatWidget,
    Slack,
    AutoClose,
    GitHub,
}

impl PanelId {
    pub const ALL: [Self; 5] = [
        Self::Customer,
        Self::ChatWidget,
        Self::Slack,
        Self::AutoClose,
        Self::GitHub,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::ChatWidget => "widget",
            Self::Slack => "slack",
            Self::AutoClose => "auto-close",
            Self::GitHub => "github",
        }
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PanelId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "customer" | "customers" => Ok(Self::Customer),
            "widget" | "chat" => Ok(Self::ChatWidget),
            "slack" => Ok(Self::Slack),
            "auto-close" | "autoclose" | "auto_close" => Ok(Self::AutoClose),
            "github" => Ok(Self::GitHub),
            other => Err(format!("unknown settings panel {other:?}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerPanel {
    pub vip_threshold: Option<u32>,
    pub vip_channel_id: Option<String>,
    pub vip_expected_response_hours: Option<u32>,
}

impl CustomerPanel {
    #[must_use]
    pub fn from_mailbox(mailbox: &Mailbox) -> Self {
        Self {
            vip_threshold: mailbox.vip_threshold,
            vip_channel_id: mailbox.vip_channel_id.clone(),
            vip_expected_response_hours: mailbox.vip_expected_response_hours,
        }
    }

    pub fn set_vip_threshold(&mut self, value: Option<u32>) -> PanelChange {
        self.vip_threshold = value;
        self.change()
    }

    pub fn set_vip_channel(&mut self, value: Option<String>) -> PanelChange {
        self.vip_channel_id = value;
        self.change()
    }

    pub fn set_expected_response_hours(&mut self, value: Option<u32>) -> PanelChange {
        self.vip_expected_response_hours = value;
        self.change()
    }

    fn change(&self) -> PanelChange {
        PanelChange::Customer(CustomerUpdates {
            vip_threshold: self.vip_threshold,
            vip_channel_id: self.vip_channel_id.clone(),
            vip_expected_response_hours: self.vip_expected_response_hours,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatWidgetPanel {
    pub display_mode: WidgetDisplayMode,
    pub display_min_value: Option<u32>,
    pub auto_respond_email_to_chat: bool,
    pub widget_host: Option<String>,
}

impl ChatWidgetPanel {
    #[must_use]
    pub fn from_mailbox(mailbox: &Mailbox) -> Self {
        Self {
            display_mode: mailbox.widget_display_mode,
            display_min_value: mailbox.widget_display_min_value,
            auto_respond_email_to_chat: mailbox.auto_respond_email_to_chat,
            widget_host: mailbox.widget_host.clone(),
        }
    }

    pub fn set_display_mode(&mut self, mode: WidgetDisplayMode) -> PanelChange {
        self.display_mode = mode;
        self.change()
    }

    pub fn set_display_min_value(&mut self, value: Option<u32>) -> PanelChange {
        self.display_min_value = value;
        self.change()
    }

    pub fn set_auto_respond(&mut self, enabled: bool) -> PanelChange {
        self.auto_respond_email_to_chat = enabled;
        self.change()
    }

    pub fn set_widget_host(&mut self, host: Option<String>) -> PanelChange {
        self.widget_host = host;
        self.change()
    }

    /// The minimum value only applies to revenue-based display.
    fn change(&self) -> PanelChange {
        let display_min_value = match self.display_mode {
            WidgetDisplayMode::RevenueBased => self.display_min_value,
            WidgetDisplayMode::Off | WidgetDisplayMode::Always => None,
        };
        PanelChange::Widget(WidgetUpdates {
            display_mode: self.display_mode,
            display_min_value,
            auto_respond_email_to_chat: Some(self.auto_respond_email_to_chat),
            widget_host: self.widget_host.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlackPanel {
    pub connected: bool,
    pub alert_channel: Option<String>,
}

impl SlackPanel {
    #[must_use]
    pub fn from_mailbox(mailbox: &Mailbox) -> Self {
        Self {
            connected: mailbox.slack_connected,
            alert_channel: mailbox.slack_alert_channel.clone(),
        }
    }

    pub fn set_alert_channel(&mut self, channel: Option<String>) -> PanelChange {
        self.alert_channel = channel;
        PanelChange::Slack(SlackUpdates {
            alert_channel: self.alert_channel.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoClosePanel {
    pub enabled: bool,
    pub days_of_inactivity: u32,
}

impl AutoClosePanel {
    #[must_use]
    pub fn from_mailbox(mailbox: &Mailbox) -> Self {
        Self {
            enabled: mailbox.auto_close_enabled,
            days_of_inactivity: mailbox.auto_close_days_of_inactivity,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) -> PanelChange {
        self.enabled = enabled;
        self.change()
    }

    pub fn set_days_of_inactivity(&mut self, days: u32) -> Result<PanelChange, String> {
        if days == 0 {
            return Err("days of inactivity must be at least 1".into());
        }
        self.days_of_inactivity = days;
        Ok(self.change())
    }

    fn change(&self) -> PanelChange {
        PanelChange::AutoClose(AutoCloseUpdates {
            enabled: Some(self.enabled),
            days_of_inactivity: Some(self.days_of_inactivity),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubPanel {
    pub connected: bool,
    pub repo_owner: Option<String>,
    pub repo_name: Option<String>,
}

impl GitHubPanel {
    #[must_use]
    pub fn from_mailbox(mailbox: &Mailbox) -> Self {
        Self {
            connected: mailbox.github_connected,
            repo_owner: mailbox.github_repo_owner.clone(),
            repo_name: mailbox.github_repo_name.clone(),
        }
    }

    pub fn set_repo_owner(&mut self, owner: String) -> PanelChange {
        self.repo_owner = Some(owner.clone());
        PanelChange::GitHub(GitHubUpdates {
            repo_owner: Some(owner),
            repo_name: None,
        })
    }

    pub fn set_repo_name(&mut self, name: String) -> PanelChange {
        self.repo_name = Some(name.clone());
        PanelChange::GitHub(GitHubUpdates {
            repo_owner: None,
            repo_name: Some(name),
        })
    }
}

/// Every editable panel of the settings page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsPanels {
    pub customer: CustomerPanel,
    pub widget: ChatWidgetPanel,
    pub slack: SlackPanel,
    pub auto_close: AutoClosePanel,
    pub github: GitHubPanel,
}

impl SettingsPanels {
    #[must_use]
    pub fn from_mailbox(mailbox: &Mailbox) -> Self {
        Self {
            customer: CustomerPanel::from_mailbox(mailbox),
            widget: ChatWidgetPanel::from_mailbox(mailbox),
            slack: SlackPanel::from_mailbox(mailbox),
            auto_close: AutoClosePanel::from_mailbox(mailbox),
            github: GitHubPanel::from_mailbox(mailbox),
        }
    }

    /// Applies a textual edit such as `customer vip_threshold=500` to the
    /// matching panel. A blank value clears optional fields.
    pub fn edit(&mut self, panel: PanelId, field: &str, value: &str) -> Result<PanelChange, String> {
        let value = value.trim();
        match (panel, field.trim()) {
            (PanelId::Customer, "vip_threshold") => {
                Ok(self.customer.set_vip_threshold(parse_optional_u32(value)?))
            }
            (PanelId::Customer, "vip_channel_id") => {
                Ok(self.customer.set_vip_channel(optional_text(value)))
            }
            (PanelId::Customer, "vip_expected_response_hours") => Ok(self
                .customer
                .set_expected_response_hours(parse_optional_u32(value)?)),
            (PanelId::ChatWidget, "display_mode") => {
                Ok(self.widget.set_display_mode(value.parse()?))
            }
            (PanelId::ChatWidget, "display_min_value") => {
                Ok(self.widget.set_display_min_value(parse_optional_u32(value)?))
            }
            (PanelId::ChatWidget, "auto_respond_email_to_chat") => {
                Ok(self.widget.set_auto_respond(parse_bool(value)?))
            }
            (PanelId::ChatWidget, "widget_host") => {
                Ok(self.widget.set_widget_host(optional_text(value)))
            }
            (PanelId::Slack, "alert_channel") => {
                Ok(self.slack.set_alert_channel(optional_text(value)))
            }
            (PanelId::AutoClose, "enabled") => Ok(self.auto_close.set_enabled(parse_bool(value)?)),
            (PanelId::AutoClose, "days_of_inactivity") => {
                let days = value
                    .parse::<u32>()
                    .map_err(|_| format!("expected a number of days, got {value:?}"))?;
                self.auto_close.set_days_of_inactivity(days)
            }
            (PanelId::GitHub, "repo_owner") => {
                Ok(self.github.set_repo_owner(required_text(value)?))
            }
            (PanelId::GitHub, "repo_name") => Ok(self.github.set_repo_name(required_text(value)?)),
            (panel, other) => Err(format!("unknown field {other:?} for panel {panel}")),
        }
    }
}

fn parse_optional_u32(value: &str) -> Result<Option<u32>, String> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<u32>()
        .map(Some)
        .map_err(|_| format!("expected a whole number, got {value:?}"))
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(format!("expected true or false, got {other:?}")),
    }
}

fn optional_text(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_owned())
    }
}

fn required_text(value: &str) -> Result<String, String> {
    optional_text(value).ok_or_else(|| "value must not be empty".to_owned())
}
