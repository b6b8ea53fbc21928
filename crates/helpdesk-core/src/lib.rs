//! helpdesk-core: domain types, settings payloads, and configuration for the
//! support mailbox dashboard.
//!
//! Nothing in here talks to the backend. The models are snapshots the
//! backend hands out, and [`settings::PendingUpdates`] is the diff the
//! dashboard hands back.

pub mod config;
pub mod models;
pub mod settings;

/// Crate identity label.
pub fn crate_label() -> &'static str {
    "helpdesk-core"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_label_is_stable() {
        assert_eq!(crate_label(), "helpdesk-core");
    }

    #[test]
    fn modules_are_accessible() {
        let _ = models::ConversationStatus::Open;
        let _ = models::WidgetDisplayMode::Off;
        let _ = settings::PendingUpdates::default();
        let _ = settings::SettingsField::GitHub;
        let _ = config::Config::default();
        let _ = config::HostPlatform::Browser;
    }
}
