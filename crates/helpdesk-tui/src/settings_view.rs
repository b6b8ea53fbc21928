//! Mailbox settings page.
//!
//! Collects panel changes into one [`PendingUpdates`] record and saves it as
//! a single unit. At most one save is in flight: the save control is
//! disabled while `updating` is set, so a second commit is refused instead
//! of queued.

use std::sync::Arc;

use helpdesk_client::{BackendError, SupportBackend};
use helpdesk_core::config::HostPlatform;
use helpdesk_core::models::Mailbox;
use helpdesk_core::settings::{AutoCloseUpdates, PanelChange, PendingUpdates};

use crate::keymap::truncate;
use crate::notify::{Notifier, Toast};
use crate::settings_panels::{PanelId, SettingsPanels};

pub const SAVE_LABEL: &str = "Update settings";
pub const SAVED_TITLE: &str = "Settings updated!";
pub const SAVE_FAILED_FALLBACK: &str = "Something went wrong";
pub const SIGN_OUT_FAILED_TITLE: &str = "Failed to sign out";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionId {
    Knowledge,
    Customers,
    InAppChat,
    Integrations,
    Billing,
}

impl SectionId {
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Self::Knowledge => "knowledge",
            Self::Customers => "customers",
            Self::InAppChat => "in-app-chat",
            Self::Integrations => "integrations",
            Self::Billing => "billing",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Knowledge => "Knowledge",
            Self::Customers => "Customers",
            Self::InAppChat => "In-App Chat",
            Self::Integrations => "Integrations",
            Self::Billing => "Billing",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsSection {
    pub id: SectionId,
    /// Blocks rendered inside the section, in order.
    pub blocks: Vec<&'static str>,
}

/// Result of one commit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Nothing pending, or a save already in flight.
    Skipped,
    Saved,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveButton {
    pub label: &'static str,
    pub disabled: bool,
}

pub struct SettingsView {
    backend: Arc<dyn SupportBackend>,
    notifier: Arc<dyn Notifier>,
    mailbox: Mailbox,
    platform: HostPlatform,
    show_billing: bool,
    panels: SettingsPanels,
    pending: PendingUpdates,
    updating: bool,
}

impl SettingsView {
    /// Billing visibility is fixed here and never re-evaluated.
    pub fn new(
        backend: Arc<dyn SupportBackend>,
        notifier: Arc<dyn Notifier>,
        mailbox: Mailbox,
        platform: HostPlatform,
    ) -> Self {
        let panels = SettingsPanels::from_mailbox(&mailbox);
        Self {
            backend,
            notifier,
            mailbox,
            platform,
            show_billing: !platform.is_native_shell(),
            panels,
            pending: PendingUpdates::default(),
            updating: false,
        }
    }

    #[must_use]
    pub fn mailbox(&self) -> &Mailbox {
        &self.mailbox
    }

    #[must_use]
    pub fn panels(&self) -> &SettingsPanels {
        &self.panels
    }

    #[must_use]
    pub fn sections(&self) -> Vec<SettingsSection> {
        let mut sections = vec![
            SettingsSection {
                id: SectionId::Knowledge,
                blocks: vec!["Knowledge bank"],
            },
            SettingsSection {
                id: SectionId::Customers,
                blocks: vec!["VIP customers"],
            },
            SettingsSection {
                id: SectionId::InAppChat,
                blocks: vec!["Chat widget"],
            },
            SettingsSection {
                id: SectionId::Integrations,
                blocks: vec![
                    "Tools",
                    "Metadata endpoint",
                    "Slack",
                    "Auto-close",
                    "GitHub",
                    "Connect support email",
                ],
            },
        ];
        if self.show_billing {
            sections.push(SettingsSection {
                id: SectionId::Billing,
                blocks: vec!["Subscription"],
            });
        }
        sections
    }

    /// Records a panel report.
    pub fn apply(&mut self, change: PanelChange) {
        tracing::debug!(field = change.field().label(), "settings change");
        self.pending.apply(change);
    }

    #[must_use]
    pub fn pending(&self) -> &PendingUpdates {
        &self.pending
    }

    #[must_use]
    pub fn has_pending_updates(&self) -> bool {
        self.pending.has_changes()
    }

    #[must_use]
    pub fn is_updating(&self) -> bool {
        self.updating
    }

    #[must_use]
    pub fn can_commit(&self) -> bool {
        !self.updating && self.has_pending_updates()
    }

    #[must_use]
    pub fn save_button(&self) -> SaveButton {
        SaveButton {
            label: SAVE_LABEL,
            disabled: !self.can_commit(),
        }
    }

    /// Enters the in-flight state and hands out the record to persist.
    /// Returns `None` when the save control is disabled.
    pub fn begin_commit(&mut self) -> Option<PendingUpdates> {
        if !self.can_commit() {
            return None;
        }
        self.updating = true;
        Some(self.pending.clone())
    }

    /// Leaves the in-flight state. Success clears the whole record,
    /// including changes reported while the save was running; failure
    /// keeps it untouched for a retry.
    pub fn finish_commit(&mut self, result: Result<(), BackendError>) -> CommitOutcome {
        self.updating = false;
        match result {
            Ok(()) => {
                self.pending.clear();
                self.notifier.show(Toast::success(SAVED_TITLE));
                CommitOutcome::Saved
            }
            Err(err) => {
                let title = err
                    .message()
                    .unwrap_or_else(|| SAVE_FAILED_FALLBACK.to_owned());
                tracing::warn!(mailbox = %self.mailbox.slug, error = %err, "settings save failed");
                self.notifier.show(Toast::destructive(title.clone()));
                CommitOutcome::Failed(title)
            }
        }
    }

    pub async fn commit(&mut self) -> CommitOutcome {
        let Some(updates) = self.begin_commit() else {
            return CommitOutcome::Skipped;
        };
        let fields: Vec<&str> = updates
            .changed_fields()
            .into_iter()
            .map(|field| field.label())
            .collect();
        tracing::info!(mailbox = %self.mailbox.slug, fields = ?fields, "saving settings");
        let result = self
            .backend
            .persist_settings(&self.mailbox.slug, updates)
            .await;
        self.finish_commit(result)
    }

    /// Auto-close saves as soon as it changes instead of waiting for the
    /// shared save control.
    pub async fn apply_and_commit(&mut self, change: AutoCloseUpdates) -> CommitOutcome {
        self.apply(PanelChange::AutoClose(change));
        self.commit().await
    }

    /// Routes a textual panel edit. Auto-close edits are saved immediately
    /// and return the outcome of that save.
    pub async fn edit(
        &mut self,
        panel: PanelId,
        field: &str,
        value: &str,
    ) -> Result<Option<CommitOutcome>, String> {
        match self.panels.edit(panel, field, value)? {
            PanelChange::AutoClose(change) => Ok(Some(self.apply_and_commit(change).await)),
            change => {
                self.apply(change);
                Ok(None)
            }
        }
    }

    /// Ends the session. Failures only surface as a notification.
    pub async fn sign_out(&self) -> Result<(), BackendError> {
        let redirect = self.platform.sign_out_redirect();
        let result = self.backend.terminate_session(redirect).await;
        if let Err(err) = &result {
            tracing::warn!(error = %err, "sign out failed");
            self.notifier.show(Toast::destructive(SIGN_OUT_FAILED_TITLE));
        }
        result
    }

    #[must_use]
    pub fn render_lines(&self, width: usize) -> Vec<String> {
        let button = self.save_button();
        let state = if button.disabled { "disabled" } else { "enabled" };
        let mut lines = vec![truncate(
            &format!("Settings  [{}] ({state})", button.label),
            width,
        )];
        for section in self.sections() {
            lines.push(truncate(section.id.label(), width));
            for block in section.blocks {
                lines.push(truncate(&format!("  {block}"), width));
            }
        }
        let changed = self.pending.changed_fields();
        if !changed.is_empty() {
            let labels: Vec<&str> = changed.iter().map(|field| field.label()).collect();
            lines.push(truncate(&format!("Pending: {}", labels.join(", ")), width));
        }
        lines
    }
}
