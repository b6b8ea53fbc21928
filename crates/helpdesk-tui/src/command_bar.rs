//! Ticket command bar controller.
//!
//! Owns the cached queries the menu depends on, memoizes the built menu,
//! dispatches item activation and keyboard shortcuts, and runs backend side
//! effects in the background. Side effects are never cancelled; their
//! outcomes are folded back in by [`CommandBar::settle`].

use std::sync::Arc;

use helpdesk_client::{BackendError, ConversationRef, ExecuteToolParams, SupportBackend};
use helpdesk_core::models::{Conversation, ConversationStatus, Mailbox, Tool, ToolList};
use tokio::task::JoinSet;

use crate::command_menu::{
    filter_groups, render_lines, CommandAction, CommandGroup, MenuCache, MenuContext, Page,
    Preview,
};
use crate::input::{Key, KeyEvent};
use crate::keymap::{
    bind, KeyChord, KeyCommand, KeyScope, KeyToken, Keymap, ShortcutOutcome, SubscriptionId,
};
use crate::notify::{Notifier, Toast};
use crate::query_cache::CachedQuery;

pub const DRAFT_STARTED_TITLE: &str = "Generating draft...";
pub const DRAFT_FAILED_TITLE: &str = "Error generating draft";
pub const TOOL_FAILED_TITLE: &str = "Error executing tool";

/// State changes the command bar asks of whatever hosts it.
pub trait CommandBarHost {
    fn set_open(&mut self, open: bool);
    fn set_page(&mut self, page: Page);
    fn set_selected_item(&mut self, id: Option<String>);
    fn toggle_cc(&mut self);
}

/// Host-side command bar state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandBarState {
    pub open: bool,
    pub page: Page,
    pub selected_item: Option<String>,
    pub cc_visible: bool,
    pub query: String,
}

impl CommandBarState {
    /// Item shortcuts only apply on the main page before anything is typed;
    /// the global scope is suspended while a query is being typed.
    #[must_use]
    pub fn active_scopes(&self) -> Vec<KeyScope> {
        if !self.open {
            return vec![KeyScope::Global];
        }
        if !self.query.is_empty() {
            return vec![KeyScope::MenuNavigation];
        }
        if self.page == Page::Main {
            vec![KeyScope::CommandBar, KeyScope::MenuNavigation, KeyScope::Global]
        } else {
            vec![KeyScope::MenuNavigation, KeyScope::Global]
        }
    }
}

impl CommandBarHost for CommandBarState {
    fn set_open(&mut self, open: bool) {
        self.open = open;
        if !open {
            self.page = Page::Main;
            self.selected_item = None;
            self.query.clear();
        }
    }

    fn set_page(&mut self, page: Page) {
        self.page = page;
        self.query.clear();
    }

    fn set_selected_item(&mut self, id: Option<String>) {
        self.selected_item = id;
    }

    fn toggle_cc(&mut self) {
        self.cc_visible = !self.cc_visible;
    }
}

/// Result of one background side effect.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    StatusUpdated {
        slug: String,
        status: ConversationStatus,
    },
    StatusFailed {
        slug: String,
        error: BackendError,
    },
    DraftRequested,
    DraftFailed(BackendError),
    ToolExecuted(String),
    ToolFailed {
        slug: String,
        error: BackendError,
    },
}

pub struct CommandBar {
    backend: Arc<dyn SupportBackend>,
    notifier: Arc<dyn Notifier>,
    mailbox_slug: String,
    conversation: Option<Conversation>,
    mailbox: CachedQuery<Mailbox>,
    tools: CachedQuery<ToolList>,
    menu: MenuCache,
    tasks: JoinSet<TaskOutcome>,
    subscriptions: Vec<SubscriptionId>,
}

impl CommandBar {
    pub fn new(
        backend: Arc<dyn SupportBackend>,
        notifier: Arc<dyn Notifier>,
        mailbox_slug: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            notifier,
            mailbox_slug: mailbox_slug.into(),
            conversation: None,
            mailbox: CachedQuery::new(),
            tools: CachedQuery::new(),
            menu: MenuCache::new(),
            tasks: JoinSet::new(),
            subscriptions: Vec::new(),
        }
    }

    pub fn set_conversation(&mut self, conversation: Option<Conversation>) {
        self.conversation = conversation;
    }

    #[must_use]
    pub fn conversation(&self) -> Option<&Conversation> {
        self.conversation.as_ref()
    }

    #[must_use]
    pub fn mailbox(&self) -> Option<&Mailbox> {
        self.mailbox.value()
    }

    #[must_use]
    pub fn tools(&self) -> Option<&ToolList> {
        self.tools.value()
    }

    /// Issues the mailbox and tool queries that are not cached yet.
    pub async fn load(&mut self) {
        let backend = Arc::clone(&self.backend);
        let mailbox_slug = self.mailbox_slug.clone();
        self.mailbox
            .load(&mailbox_slug, || {
                let backend = Arc::clone(&backend);
                let slug = mailbox_slug.clone();
                async move { backend.get_mailbox(&slug).await }
            })
            .await;

        let conversation_slug = self
            .conversation
            .as_ref()
            .and_then(Conversation::resolved_slug)
            .unwrap_or_default()
            .to_owned();
        let conversation = ConversationRef::new(mailbox_slug, conversation_slug.clone());
        self.tools
            .load(&conversation_slug, move || async move {
                backend.list_tools(conversation).await
            })
            .await;
    }

    /// The current menu; rebuilt only when one of its inputs changed.
    pub fn groups(&mut self) -> &[CommandGroup] {
        let ctx = MenuContext {
            conversation: self.conversation.as_ref(),
            github_ready: self.mailbox.value().is_some_and(Mailbox::github_ready),
            tools: self.tools.value(),
        };
        self.menu.get(&ctx)
    }

    /// Number of times the menu has been rebuilt.
    #[must_use]
    pub fn menu_builds(&self) -> u64 {
        self.menu.builds()
    }

    /// Visible items matching the host's query.
    pub fn filtered(&mut self, query: &str) -> Vec<CommandGroup> {
        filter_groups(self.groups(), query)
    }

    pub fn preview(&mut self, id: &str) -> Option<Preview> {
        self.groups()
            .iter()
            .flat_map(|group| group.items.iter())
            .find(|item| item.id == id && !item.hidden)
            .map(|item| item.preview.clone())
    }

    pub fn render_lines(&mut self, state: &CommandBarState, width: usize, max_rows: usize) -> Vec<String> {
        let filtered = self.filtered(&state.query);
        render_lines(&filtered, state.selected_item.as_deref(), width, max_rows)
    }

    /// Activates a visible item. Returns false when no visible item has `id`.
    pub fn select(&mut self, id: &str, host: &mut dyn CommandBarHost) -> bool {
        let action = self
            .groups()
            .iter()
            .flat_map(|group| group.items.iter())
            .find(|item| item.id == id && !item.hidden)
            .map(|item| item.action.clone());
        let Some(action) = action else {
            tracing::debug!(id, "ignoring selection of unavailable item");
            return false;
        };

        match action {
            CommandAction::SetStatus(status) => {
                self.spawn_status_update(status);
                host.set_open(false);
            }
            CommandAction::OpenPage(page) => {
                host.set_page(page);
                host.set_selected_item(None);
            }
            CommandAction::GenerateDraft => {
                if let Some(conversation) = self.conversation_ref() {
                    if self.spawn_draft(conversation) {
                        self.notifier.show(Toast::success(DRAFT_STARTED_TITLE));
                    }
                }
                host.set_open(false);
            }
            CommandAction::ToggleCc => {
                host.toggle_cc();
                host.set_open(false);
            }
            CommandAction::RunTool(tool) => {
                self.spawn_tool(tool);
                host.set_open(false);
            }
        }
        true
    }

    fn conversation_ref(&self) -> Option<ConversationRef> {
        let slug = self.conversation.as_ref()?.resolved_slug()?;
        Some(ConversationRef::new(self.mailbox_slug.clone(), slug))
    }

    /// Returns false when no runtime is available and the task was dropped.
    fn spawn<F>(&mut self, task: F) -> bool
    where
        F: std::future::Future<Output = TaskOutcome> + Send + 'static,
    {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                self.tasks.spawn_on(task, &handle);
                true
            }
            Err(err) => {
                tracing::error!(error = %err, "no async runtime for command bar task");
                false
            }
        }
    }

    fn spawn_status_update(&mut self, status: ConversationStatus) {
        let Some(conversation) = self.conversation_ref() else {
            tracing::debug!(%status, "no conversation to update");
            return;
        };
        let backend = Arc::clone(&self.backend);
        self.spawn(async move {
            let slug = conversation.conversation_slug.clone();
            match backend.update_conversation_status(conversation, status).await {
                Ok(()) => TaskOutcome::StatusUpdated { slug, status },
                Err(error) => {
                    tracing::warn!(slug = %slug, %status, error = %error, "status update failed");
                    TaskOutcome::StatusFailed { slug, error }
                }
            }
        });
    }

    fn spawn_draft(&mut self, conversation: ConversationRef) -> bool {
        let backend = Arc::clone(&self.backend);
        let notifier = Arc::clone(&self.notifier);
        self.spawn(async move {
            match backend.refresh_draft(conversation).await {
                Ok(()) => TaskOutcome::DraftRequested,
                Err(error) => {
                    notifier.show(Toast::destructive(DRAFT_FAILED_TITLE));
                    TaskOutcome::DraftFailed(error)
                }
            }
        })
    }

    fn spawn_tool(&mut self, tool: Tool) {
        let Some(conversation) = self.conversation_ref() else {
            tracing::debug!(tool = %tool.slug, "no conversation to run tool against");
            return;
        };
        let backend = Arc::clone(&self.backend);
        let notifier = Arc::clone(&self.notifier);
        self.spawn(async move {
            let params = ExecuteToolParams {
                conversation,
                slug: tool.slug.clone(),
                name: tool.name.clone(),
                parameters: tool.parameters,
            };
            match backend.execute_tool(params).await {
                Ok(()) => {
                    notifier.show(Toast::success(format!("{} executed", tool.name)));
                    TaskOutcome::ToolExecuted(tool.slug)
                }
                Err(error) => {
                    let title = error
                        .message()
                        .unwrap_or_else(|| TOOL_FAILED_TITLE.to_owned());
                    notifier.show(Toast::destructive(title));
                    TaskOutcome::ToolFailed {
                        slug: tool.slug,
                        error,
                    }
                }
            }
        });
    }

    /// Background side effects still running.
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Waits for every background side effect and applies confirmed status
    /// changes to the loaded conversation.
    pub async fn settle(&mut self) -> Vec<TaskOutcome> {
        let mut outcomes = Vec::new();
        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(outcome) => {
                    if let TaskOutcome::StatusUpdated { slug, status } = &outcome {
                        if let Some(conversation) = self
                            .conversation
                            .as_mut()
                            .filter(|conversation| conversation.slug == *slug)
                        {
                            conversation.status = *status;
                        }
                    }
                    outcomes.push(outcome);
                }
                Err(err) => tracing::error!(error = %err, "command bar task aborted"),
            }
        }
        outcomes
    }

    /// Registers the command bar's shortcuts. Calling it twice is a no-op.
    pub fn mount(&mut self, keymap: &mut Keymap) {
        if !self.subscriptions.is_empty() {
            return;
        }
        let mut open_notes = bind(
            KeyScope::Global,
            KeyChord::plain(KeyToken::Char('n')),
            KeyCommand::OpenNotes,
            "open notes",
        );
        // Also serves the add-note item's `N`, so the default is blocked
        // whether or not the menu is open.
        open_notes.prevent_default = true;

        let mut bindings = vec![open_notes];
        for (key, id, description) in [
            ('c', "close", "close ticket"),
            ('z', "reopen", "reopen ticket"),
            ('a', "assign", "assign ticket"),
            ('s', "spam", "mark as spam"),
            ('g', "github-issue", "github issue"),
        ] {
            bindings.push(bind(
                KeyScope::CommandBar,
                KeyChord::plain(KeyToken::Char(key)),
                KeyCommand::SelectItem(id),
                description,
            ));
        }
        for (token, command, description) in [
            (KeyToken::Escape, KeyCommand::CloseMenu, "close"),
            (KeyToken::Down, KeyCommand::MoveSelectionNext, "next item"),
            (KeyToken::Up, KeyCommand::MoveSelectionPrev, "previous item"),
            (KeyToken::Enter, KeyCommand::ExecuteSelection, "run item"),
        ] {
            bindings.push(bind(
                KeyScope::MenuNavigation,
                KeyChord::plain(token),
                command,
                description,
            ));
        }
        self.subscriptions = bindings
            .into_iter()
            .map(|binding| keymap.subscribe(binding))
            .collect();
    }

    pub fn unmount(&mut self, keymap: &mut Keymap) {
        for id in self.subscriptions.drain(..) {
            keymap.unsubscribe(id);
        }
    }

    /// Routes one key event. Unbound characters typed into an open menu edit
    /// the query.
    pub fn handle_key(
        &mut self,
        keymap: &Keymap,
        event: KeyEvent,
        state: &mut CommandBarState,
    ) -> ShortcutOutcome {
        let outcome = keymap.dispatch(&state.active_scopes(), event);
        let Some(command) = outcome.command else {
            if state.open && !event.modifiers.ctrl && !event.modifiers.alt {
                match event.key {
                    Key::Char(ch) => state.query.push(ch),
                    Key::Backspace => {
                        state.query.pop();
                    }
                    _ => return outcome,
                }
                state.selected_item = None;
            }
            return outcome;
        };

        match command {
            KeyCommand::OpenNotes => {
                state.set_open(true);
                state.set_page(Page::Notes);
                state.set_selected_item(None);
            }
            KeyCommand::SelectItem(id) => {
                if !self.select(id, state) {
                    return ShortcutOutcome::default();
                }
            }
            KeyCommand::CloseMenu => {
                if state.page == Page::Main {
                    state.set_open(false);
                } else {
                    state.set_page(Page::Main);
                    state.set_selected_item(None);
                }
            }
            KeyCommand::MoveSelectionNext => self.move_selection(state, 1),
            KeyCommand::MoveSelectionPrev => self.move_selection(state, -1),
            KeyCommand::ExecuteSelection => {
                if let Some(id) = state.selected_item.clone() {
                    self.select(&id, state);
                }
            }
        }
        outcome
    }

    fn move_selection(&mut self, state: &mut CommandBarState, step: isize) {
        if state.page != Page::Main {
            return;
        }
        let ids: Vec<String> = self
            .filtered(&state.query)
            .into_iter()
            .flat_map(|group| group.items.into_iter().map(|item| item.id))
            .collect();
        if ids.is_empty() {
            state.selected_item = None;
            return;
        }
        let len = ids.len() as isize;
        let current = state
            .selected_item
            .as_ref()
            .and_then(|selected| ids.iter().position(|id| id == selected));
        let next = match current {
            Some(index) => (index as isize + step).rem_euclid(len),
            None if step < 0 => len - 1,
            None => 0,
        };
        state.selected_item = ids.get(next as usize).cloned();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn scopes_follow_menu_state() {
        let mut state = CommandBarState::default();
        assert_eq!(state.active_scopes(), vec![KeyScope::Global]);

        state.set_open(true);
        assert_eq!(
            state.active_scopes(),
            vec![KeyScope::CommandBar, KeyScope::MenuNavigation, KeyScope::Global]
        );

        state.query.push('x');
        assert_eq!(state.active_scopes(), vec![KeyScope::MenuNavigation]);

        state.set_page(Page::Notes);
        assert_eq!(
            state.active_scopes(),
            vec![KeyScope::MenuNavigation, KeyScope::Global]
        );
    }

    #[test]
    fn closing_resets_page_and_selection() {
        let mut state = CommandBarState::default();
        state.set_open(true);
        state.set_page(Page::Tools);
        state.set_selected_item(Some("all-tools".into()));
        state.set_open(false);
        assert_eq!(state, CommandBarState::default());
    }

    #[test]
    fn toggle_cc_flips_visibility() {
        let mut state = CommandBarState::default();
        state.toggle_cc();
        assert!(state.cc_visible);
        state.toggle_cc();
        assert!(!state.cc_visible);
    }
}
