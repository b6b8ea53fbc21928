//! Command bar menu construction.
//!
//! Includes:
//! - typed item actions and pages
//! - per-item visibility derived from conversation status and GitHub state
//! - the dynamic tools group
//! - a memoized builder keyed on the inputs that affect output
//! - label filtering for the search box

use helpdesk_core::models::{Conversation, ConversationStatus, Tool, ToolList};

use crate::keymap::truncate;

/// Pages the command bar can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Page {
    #[default]
    Main,
    PreviousReplies,
    Assignees,
    Notes,
    Tools,
    GitHubIssue,
}

impl Page {
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::PreviousReplies => "previous-replies",
            Self::Assignees => "assignees",
            Self::Notes => "notes",
            Self::Tools => "tools",
            Self::GitHubIssue => "github-issue",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Icon {
    ArrowUturnLeft,
    ArrowUturnUp,
    User,
    ShieldExclamation,
    PencilSquare,
    GitHub,
    Sparkles,
    ChatBubbleLeft,
    Envelope,
    Play,
    ListBullet,
}

/// What selecting an item does.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandAction {
    SetStatus(ConversationStatus),
    OpenPage(Page),
    GenerateDraft,
    ToggleCc,
    RunTool(Tool),
}

/// Descriptive panel shown next to the highlighted item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Preview {
    pub title: String,
    pub body: Vec<String>,
    /// `name: json value` rows for tool previews.
    pub parameters: Vec<(String, String)>,
}

impl Preview {
    fn text(title: &str, body: &str) -> Self {
        Self {
            title: title.to_owned(),
            body: vec![body.to_owned()],
            parameters: Vec::new(),
        }
    }

    #[must_use]
    pub fn render_lines(&self, width: usize) -> Vec<String> {
        let mut lines = vec![truncate(&self.title, width)];
        lines.extend(self.body.iter().map(|line| truncate(line, width)));
        if !self.parameters.is_empty() {
            lines.push(truncate("Parameters", width));
            for (name, value) in &self.parameters {
                lines.push(truncate(&format!("  {name}: {value}"), width));
            }
        }
        lines
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandItem {
    pub id: String,
    pub label: String,
    pub icon: Icon,
    pub action: CommandAction,
    pub shortcut: Option<char>,
    pub preview: Preview,
    pub hidden: bool,
}

impl CommandItem {
    fn new(id: &str, label: &str, icon: Icon, action: CommandAction, preview: Preview) -> Self {
        Self {
            id: id.to_owned(),
            label: label.to_owned(),
            icon,
            action,
            shortcut: None,
            preview,
            hidden: false,
        }
    }

    fn shortcut(mut self, key: char) -> Self {
        self.shortcut = Some(key);
        self
    }

    fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandGroup {
    pub heading: String,
    pub items: Vec<CommandItem>,
}

/// Inputs the menu is derived from.
#[derive(Debug, Clone, Copy, Default)]
pub struct MenuContext<'a> {
    pub conversation: Option<&'a Conversation>,
    pub github_ready: bool,
    pub tools: Option<&'a ToolList>,
}

/// Builds the grouped, ordered menu. Pure: no side effects.
#[must_use]
pub fn build_menu(ctx: &MenuContext<'_>) -> Vec<CommandGroup> {
    let status = ctx.conversation.map(|c| c.status);
    let issue_number = ctx.conversation.and_then(|c| c.github_issue_number);

    let mut groups = vec![
        CommandGroup {
            heading: "Actions".to_owned(),
            items: vec![
                CommandItem::new(
                    "close",
                    "Close ticket",
                    Icon::ArrowUturnLeft,
                    CommandAction::SetStatus(ConversationStatus::Closed),
                    Preview::text(
                        "Close Ticket",
                        "Mark this conversation as resolved and move it to the closed state.",
                    ),
                )
                .shortcut('C')
                .hidden(matches!(
                    status,
                    Some(ConversationStatus::Closed | ConversationStatus::Spam)
                )),
                CommandItem::new(
                    "reopen",
                    "Reopen ticket",
                    Icon::ArrowUturnUp,
                    CommandAction::SetStatus(ConversationStatus::Open),
                    Preview::text(
                        "Reopen Ticket",
                        "Set this conversation back to the open state.",
                    ),
                )
                .shortcut('Z')
                .hidden(status == Some(ConversationStatus::Open)),
                CommandItem::new(
                    "assign",
                    "Assign ticket",
                    Icon::User,
                    CommandAction::OpenPage(Page::Assignees),
                    Preview::text(
                        "Assign Ticket",
                        "Transfer ownership of this conversation to another team member.",
                    ),
                )
                .shortcut('A'),
                CommandItem::new(
                    "spam",
                    "Mark as spam",
                    Icon::ShieldExclamation,
                    CommandAction::SetStatus(ConversationStatus::Spam),
                    Preview::text(
                        "Mark as Spam",
                        "Mark this conversation as spam and move it to the spam folder.",
                    ),
                )
                .shortcut('S')
                .hidden(status == Some(ConversationStatus::Spam)),
                CommandItem::new(
                    "add-note",
                    "Add internal note",
                    Icon::PencilSquare,
                    CommandAction::OpenPage(Page::Notes),
                    Preview::text(
                        "Add Internal Note",
                        "Add a private note to this conversation that is only visible to your team.",
                    ),
                )
                .shortcut('N'),
                github_item(issue_number).hidden(!ctx.github_ready),
            ],
        },
        CommandGroup {
            heading: "Compose".to_owned(),
            items: vec![
                CommandItem::new(
                    "generate-draft",
                    "Generate draft",
                    Icon::Sparkles,
                    CommandAction::GenerateDraft,
                    Preview::text(
                        "Generate AI Draft",
                        "Use AI to generate a response based on the conversation context and your previous replies.",
                    ),
                ),
                CommandItem::new(
                    "previous-replies",
                    "Use previous replies",
                    Icon::ChatBubbleLeft,
                    CommandAction::OpenPage(Page::PreviousReplies),
                    Preview::text(
                        "Previous Replies",
                        "Browse and reuse responses from your previous conversations to maintain consistency.",
                    ),
                ),
                CommandItem::new(
                    "toggle-cc-bcc",
                    "Add CC or BCC",
                    Icon::Envelope,
                    CommandAction::ToggleCc,
                    Preview::text(
                        "Add CC or BCC",
                        "Show CC and BCC fields to add recipients to the email reply.",
                    ),
                ),
            ],
        },
    ];

    if let Some(tools) = ctx.tools.filter(|tools| !tools.is_empty()) {
        groups.push(tools_group(tools));
    }
    groups
}

fn github_item(issue_number: Option<u64>) -> CommandItem {
    let label = if issue_number.is_some() {
        "Manage GitHub Issue"
    } else {
        "Link GitHub Issue"
    };
    let body = match issue_number {
        Some(number) => vec![
            format!("This conversation is linked to GitHub issue #{number}."),
            "You can view the issue details, close or reopen it.".to_owned(),
        ],
        None => vec![
            "Create a new GitHub issue or link an existing one to this conversation.".to_owned(),
        ],
    };
    CommandItem::new(
        "github-issue",
        label,
        Icon::GitHub,
        CommandAction::OpenPage(Page::GitHubIssue),
        Preview {
            title: "GitHub Issue".to_owned(),
            body,
            parameters: Vec::new(),
        },
    )
    .shortcut('G')
}

fn tools_group(tools: &ToolList) -> CommandGroup {
    let mut items: Vec<CommandItem> = tools
        .suggested_tools()
        .map(|tool| {
            let preview = Preview {
                title: tool.name.clone(),
                body: vec![tool.description.clone()],
                parameters: tool
                    .parameters
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_string()))
                    .collect(),
            };
            CommandItem {
                id: tool.menu_id(),
                label: tool.name.clone(),
                icon: Icon::Play,
                action: CommandAction::RunTool(tool.clone()),
                shortcut: None,
                preview,
                hidden: false,
            }
        })
        .collect();
    items.push(CommandItem::new(
        "all-tools",
        "All tools",
        Icon::ListBullet,
        CommandAction::OpenPage(Page::Tools),
        Preview::text(
            "All Tools",
            "Browse and call any available tool with any parameters.",
        ),
    ));
    CommandGroup {
        heading: "Tools".to_owned(),
        items,
    }
}

/// Items actually offered to the user, in display order.
pub fn visible_items(groups: &[CommandGroup]) -> impl Iterator<Item = &CommandItem> {
    groups
        .iter()
        .flat_map(|group| group.items.iter())
        .filter(|item| !item.hidden)
}

/// Visible items whose label matches `query`, grouped, preserving order.
/// Groups left empty are dropped.
#[must_use]
pub fn filter_groups(groups: &[CommandGroup], query: &str) -> Vec<CommandGroup> {
    let query = query.trim();
    groups
        .iter()
        .filter_map(|group| {
            let items: Vec<CommandItem> = group
                .items
                .iter()
                .filter(|item| !item.hidden && label_matches(query, &item.label))
                .cloned()
                .collect();
            if items.is_empty() {
                None
            } else {
                Some(CommandGroup {
                    heading: group.heading.clone(),
                    items,
                })
            }
        })
        .collect()
}

/// Case-insensitive subsequence match.
fn label_matches(query: &str, label: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let label = label.to_lowercase();
    let mut chars = label.chars();
    query
        .to_lowercase()
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .all(|q| chars.any(|ch| ch == q))
}

/// The subset of inputs that can change the built menu.
#[derive(Debug, Clone, PartialEq)]
struct MenuKey {
    conversation: Option<Conversation>,
    github_ready: bool,
    tools: Option<ToolList>,
}

impl MenuKey {
    fn from_context(ctx: &MenuContext<'_>) -> Self {
        Self {
            conversation: ctx.conversation.cloned(),
            github_ready: ctx.github_ready,
            tools: ctx.tools.cloned(),
        }
    }

    fn matches(&self, ctx: &MenuContext<'_>) -> bool {
        self.conversation.as_ref() == ctx.conversation
            && self.github_ready == ctx.github_ready
            && self.tools.as_ref() == ctx.tools
    }
}

/// Memoized [`build_menu`].
#[derive(Debug, Clone, Default)]
pub struct MenuCache {
    key: Option<MenuKey>,
    groups: Vec<CommandGroup>,
    builds: u64,
}

impl MenuCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached menu, rebuilding only when an input changed.
    pub fn get(&mut self, ctx: &MenuContext<'_>) -> &[CommandGroup] {
        let fresh = self.key.as_ref().is_some_and(|key| key.matches(ctx));
        if !fresh {
            self.groups = build_menu(ctx);
            self.key = Some(MenuKey::from_context(ctx));
            self.builds = self.builds.saturating_add(1);
        }
        &self.groups
    }

    /// Number of rebuilds so far.
    #[must_use]
    pub fn builds(&self) -> u64 {
        self.builds
    }

    pub fn invalidate(&mut self) {
        self.key = None;
    }
}

/// Renders grouped items with a selection marker on `selected`.
#[must_use]
pub fn render_lines(
    groups: &[CommandGroup],
    selected: Option<&str>,
    width: usize,
    max_rows: usize,
) -> Vec<String> {
    let mut lines = Vec::new();
    if max_rows == 0 {
        return lines;
    }
    if groups.iter().all(|group| group.items.iter().all(|item| item.hidden)) {
        lines.push(truncate("  no matching actions", width));
        return lines;
    }
    for group in groups {
        let visible: Vec<&CommandItem> = group.items.iter().filter(|item| !item.hidden).collect();
        if visible.is_empty() {
            continue;
        }
        if lines.len() >= max_rows {
            break;
        }
        lines.push(truncate(&group.heading, width));
        for item in visible {
            if lines.len() >= max_rows {
                break;
            }
            let marker = if selected == Some(item.id.as_str()) {
                ">"
            } else {
                " "
            };
            let shortcut = item.shortcut.map(String::from).unwrap_or_default();
            let row = format!("{marker} {:<28} {shortcut}", item.label);
            lines.push(truncate(row.trim_end(), width));
        }
    }
    lines
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use helpdesk_core::models::SuggestedEntry;
    use serde_json::json;

    fn visible_ids(groups: &[CommandGroup]) -> Vec<&str> {
        visible_items(groups).map(|item| item.id.as_str()).collect()
    }

    fn ctx_for(conversation: &Conversation) -> MenuContext<'_> {
        MenuContext {
            conversation: Some(conversation),
            github_ready: false,
            tools: None,
        }
    }

    #[test]
    fn open_ticket_without_github_snapshot() {
        let conversation = Conversation::new("c1", ConversationStatus::Open);
        let groups = build_menu(&ctx_for(&conversation));
        let headings: Vec<&str> = groups.iter().map(|g| g.heading.as_str()).collect();
        assert_eq!(headings, vec!["Actions", "Compose"]);
        assert_eq!(
            visible_ids(&groups),
            vec![
                "close",
                "assign",
                "spam",
                "add-note",
                "generate-draft",
                "previous-replies",
                "toggle-cc-bcc",
            ]
        );
    }

    #[test]
    fn status_visibility_table() {
        let cases = [
            (ConversationStatus::Open, [false, true, false]),
            (ConversationStatus::Closed, [true, false, false]),
            (ConversationStatus::Spam, [true, false, true]),
        ];
        for (status, [close_hidden, reopen_hidden, spam_hidden]) in cases {
            let conversation = Conversation::new("c1", status);
            let groups = build_menu(&ctx_for(&conversation));
            let hidden = |id: &str| {
                groups[0]
                    .items
                    .iter()
                    .find(|item| item.id == id)
                    .map(|item| item.hidden)
                    .unwrap()
            };
            assert_eq!(hidden("close"), close_hidden, "close for {status}");
            assert_eq!(hidden("reopen"), reopen_hidden, "reopen for {status}");
            assert_eq!(hidden("spam"), spam_hidden, "spam for {status}");
            assert!(!hidden("assign"));
            assert!(!hidden("add-note"));
        }
    }

    #[test]
    fn missing_conversation_shows_every_status_action() {
        let groups = build_menu(&MenuContext::default());
        let ids = visible_ids(&groups);
        assert!(ids.contains(&"close"));
        assert!(ids.contains(&"reopen"));
        assert!(ids.contains(&"spam"));
        assert!(!ids.contains(&"github-issue"));
    }

    #[test]
    fn github_item_follows_readiness_and_issue_link() {
        let unlinked = Conversation::new("c1", ConversationStatus::Open);
        let linked = unlinked.clone().with_github_issue(42);

        let mut ctx = ctx_for(&unlinked);
        ctx.github_ready = true;
        let groups = build_menu(&ctx);
        let item = visible_items(&groups).find(|i| i.id == "github-issue").unwrap();
        assert_eq!(item.label, "Link GitHub Issue");
        assert_eq!(item.shortcut, Some('G'));

        let mut ctx = ctx_for(&linked);
        ctx.github_ready = true;
        let groups = build_menu(&ctx);
        let item = visible_items(&groups).find(|i| i.id == "github-issue").unwrap();
        assert_eq!(item.label, "Manage GitHub Issue");
        assert!(item.preview.body[0].contains("#42"));

        ctx.github_ready = false;
        let groups = build_menu(&ctx);
        assert!(visible_items(&groups).all(|i| i.id != "github-issue"));
    }

    fn tool_list() -> ToolList {
        let lookup = Tool::new("lookup", "Look up order", "Find the order")
            .with_parameter("email", json!("a@b.c"));
        let refund_small = Tool::new("refund", "Refund", "Refund a purchase")
            .with_parameter("amount", json!(5));
        let refund_large = Tool::new("refund", "Refund", "Refund a purchase")
            .with_parameter("amount", json!(50));
        ToolList {
            all: vec![lookup.clone(), refund_small.clone()],
            suggested: vec![
                SuggestedEntry::Tool { tool: refund_small },
                SuggestedEntry::Other,
                SuggestedEntry::Tool { tool: refund_large },
            ],
        }
    }

    #[test]
    fn tools_group_lists_suggestions_before_all_tools() {
        let conversation = Conversation::new("c1", ConversationStatus::Open);
        let tools = tool_list();
        let mut ctx = ctx_for(&conversation);
        ctx.tools = Some(&tools);
        let groups = build_menu(&ctx);
        assert_eq!(groups.len(), 3);
        let tools_group = &groups[2];
        assert_eq!(tools_group.heading, "Tools");
        let ids: Vec<&str> = tools_group.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "tool-refund-{\"amount\":5}",
                "tool-refund-{\"amount\":50}",
                "all-tools",
            ]
        );
        assert_eq!(
            tools_group.items[0].preview.parameters,
            vec![("amount".to_owned(), "5".to_owned())]
        );
        assert_eq!(
            tools_group.items[2].action,
            CommandAction::OpenPage(Page::Tools)
        );
    }

    #[test]
    fn empty_tool_list_omits_group() {
        let conversation = Conversation::new("c1", ConversationStatus::Open);
        let tools = ToolList::default();
        let mut ctx = ctx_for(&conversation);
        ctx.tools = Some(&tools);
        assert_eq!(build_menu(&ctx).len(), 2);
    }

    #[test]
    fn tools_without_suggestions_still_offer_all_tools() {
        let conversation = Conversation::new("c1", ConversationStatus::Open);
        let mut tools = tool_list();
        tools.suggested.clear();
        let mut ctx = ctx_for(&conversation);
        ctx.tools = Some(&tools);
        let groups = build_menu(&ctx);
        let ids: Vec<&str> = groups[2].items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["all-tools"]);
    }

    #[test]
    fn visible_ids_are_unique_for_every_status() {
        let tools = tool_list();
        for status in ConversationStatus::ALL {
            let conversation = Conversation::new("c1", status).with_github_issue(7);
            let ctx = MenuContext {
                conversation: Some(&conversation),
                github_ready: true,
                tools: Some(&tools),
            };
            let groups = build_menu(&ctx);
            let mut ids = visible_ids(&groups);
            let total = ids.len();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), total, "duplicate ids for {status}");
        }
    }

    #[test]
    fn cache_rebuilds_only_on_input_change() {
        let open = Conversation::new("c1", ConversationStatus::Open);
        let closed = Conversation::new("c1", ConversationStatus::Closed);
        let mut cache = MenuCache::new();

        cache.get(&ctx_for(&open));
        cache.get(&ctx_for(&open));
        assert_eq!(cache.builds(), 1);

        let ids: Vec<String> = visible_items(cache.get(&ctx_for(&closed)))
            .map(|item| item.id.clone())
            .collect();
        assert_eq!(cache.builds(), 2);
        assert!(ids.contains(&"reopen".to_owned()));

        let mut ctx = ctx_for(&closed);
        ctx.github_ready = true;
        cache.get(&ctx);
        assert_eq!(cache.builds(), 3);

        cache.invalidate();
        cache.get(&ctx);
        assert_eq!(cache.builds(), 4);
    }

    #[test]
    fn filter_matches_label_subsequence() {
        let conversation = Conversation::new("c1", ConversationStatus::Open);
        let groups = build_menu(&ctx_for(&conversation));
        let filtered = filter_groups(&groups, "note");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].items[0].id, "add-note");

        let filtered = filter_groups(&groups, "gdr");
        assert_eq!(filtered[0].heading, "Compose");
        assert_eq!(filtered[0].items[0].id, "generate-draft");

        // hidden items never match
        assert!(filter_groups(&groups, "reopen").is_empty());
        assert_eq!(filter_groups(&groups, "").len(), 2);
    }

    #[test]
    fn render_lines_marks_selection() {
        let conversation = Conversation::new("c1", ConversationStatus::Closed);
        let groups = build_menu(&ctx_for(&conversation));
        let lines = render_lines(&groups, Some("reopen"), 80, 20);
        assert_eq!(lines[0], "Actions");
        assert!(lines[1].starts_with("> Reopen ticket"));
        assert!(lines[1].ends_with('Z'));
        assert!(lines.iter().any(|line| line == "Compose"));
        assert!(!lines.iter().any(|line| line.contains("Close ticket")));
        assert_eq!(render_lines(&groups, None, 80, 2).len(), 2);
    }
}
