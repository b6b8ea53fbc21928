//! helpdesk-tui: headless view-models for the support mailbox dashboard.
//!
//! Includes:
//! - `command_menu` / `command_bar`: ticket quick actions, shortcuts and
//!   their background side effects
//! - `settings_view` / `settings_panels`: batched mailbox settings with a
//!   single commit
//! - `keymap`, `input`, `notify`, `query_cache`: shared plumbing
//!
//! Rendering is plain text lines so any frontend can draw them.

pub mod command_bar;
pub mod command_menu;
pub mod input;
pub mod keymap;
pub mod logging;
pub mod notify;
pub mod query_cache;
pub mod settings_panels;
pub mod settings_view;

/// Stable crate label used for bootstrap smoke tests.
pub fn crate_label() -> &'static str {
    "helpdesk-tui"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_label_is_stable() {
        assert_eq!(crate_label(), "helpdesk-tui");
    }
}
