use std::sync::Arc;

use helpdesk_client::event::TracingEventSink;
use helpdesk_client::mock::MockSupportBackend;
use helpdesk_client::recorded::RecordedBackend;
use helpdesk_client::SupportBackend;
use helpdesk_core::config::{Config, HostPlatform};
use helpdesk_core::models::{Conversation, ConversationStatus, Mailbox, SuggestedEntry, Tool, ToolList};
use helpdesk_tui::command_bar::{CommandBar, CommandBarHost, CommandBarState};
use helpdesk_tui::input::parse_key;
use helpdesk_tui::keymap::Keymap;
use helpdesk_tui::logging::init_tracing;
use helpdesk_tui::notify::ToastQueue;
use helpdesk_tui::settings_panels::PanelId;
use helpdesk_tui::settings_view::{CommitOutcome, SettingsView};
use tokio::io::{AsyncBufReadExt, BufReader};

const DEMO_MAILBOX: &str = "gumroad";
const DEMO_CONVERSATION: &str = "c-1001";

const HELP: &str = "commands: menu | select <id> | preview <id> | key <key> | \
set <panel> <field>=<value> | save | settings | signout | keys | quit";

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let config = match Config::load_default() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("helpdesk-tui: {err}");
            return 2;
        }
    };
    if let Err(err) = init_tracing(&config.logging) {
        eprintln!("helpdesk-tui: cannot open log file: {err}");
        return 2;
    }
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("helpdesk-tui: cannot start runtime: {err}");
            return 1;
        }
    };
    match runtime.block_on(session(config)) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("helpdesk-tui: {err}");
            1
        }
    }
}

fn demo_backend(mailbox_slug: &str) -> MockSupportBackend {
    let mut mailbox = Mailbox::new(mailbox_slug, "Gumroad");
    mailbox.github_connected = true;
    mailbox.github_repo_owner = Some("antiwork".into());
    mailbox.github_repo_name = Some("helper".into());
    mailbox.slack_connected = true;

    let refund = Tool::new("refund", "Refund purchase", "Refund the customer's latest purchase")
        .with_parameter("amount", serde_json::json!(25));
    let lookup = Tool::new("lookup", "Look up order", "Find an order by email");
    MockSupportBackend::new()
        .with_mailbox(mailbox)
        .with_conversation(Conversation::new(DEMO_CONVERSATION, ConversationStatus::Open))
        .with_tools(ToolList {
            all: vec![refund.clone(), lookup],
            suggested: vec![SuggestedEntry::Tool { tool: refund }],
        })
}

async fn session(config: Config) -> std::io::Result<()> {
    let mailbox_slug = if config.backend.mailbox_slug.is_empty() {
        DEMO_MAILBOX.to_owned()
    } else {
        config.backend.mailbox_slug.clone()
    };
    let mock = Arc::new(demo_backend(&mailbox_slug));
    let backend: Arc<dyn SupportBackend> = Arc::new(RecordedBackend::new(
        mock.clone(),
        Arc::new(TracingEventSink),
        config.request_timeout(),
    ));
    let toasts = Arc::new(ToastQueue::new(config.tui.toast_limit));
    let width = config.tui.menu_width;
    let max_rows = config.tui.max_rows;

    let mut keymap = Keymap::new();
    let mut state = CommandBarState::default();
    let mut bar = CommandBar::new(backend.clone(), toasts.clone(), mailbox_slug.clone());
    bar.set_conversation(mock.conversation(DEMO_CONVERSATION));
    bar.mount(&mut keymap);
    bar.load().await;

    let mailbox = mock
        .mailbox(&mailbox_slug)
        .unwrap_or_else(|| Mailbox::new(mailbox_slug.clone(), mailbox_slug.clone()));
    let mut settings = SettingsView::new(
        backend,
        toasts.clone(),
        mailbox,
        HostPlatform::from_config(&config.platform),
    );

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        match command {
            "" => continue,
            "quit" | "exit" => break,
            "help" => println!("{HELP}"),
            "menu" => {
                state.set_open(true);
                print_lines(&bar.render_lines(&state, width, max_rows));
            }
            "select" => {
                if !bar.select(rest, &mut state) {
                    println!("no visible item {rest:?}");
                }
                bar.settle().await;
                print_state(&state);
            }
            "preview" => match bar.preview(rest) {
                Some(preview) => print_lines(&preview.render_lines(width)),
                None => println!("no visible item {rest:?}"),
            },
            "key" => match parse_key(rest) {
                Ok(event) => {
                    let outcome = bar.handle_key(&keymap, event, &mut state);
                    bar.settle().await;
                    println!(
                        "handled={} prevent_default={}",
                        outcome.handled(),
                        outcome.prevent_default
                    );
                    print_state(&state);
                    if state.open {
                        print_lines(&bar.render_lines(&state, width, max_rows));
                    }
                }
                Err(err) => println!("{err}"),
            },
            "set" => match parse_edit(rest) {
                Ok((panel, field, value)) => match settings.edit(panel, field, value).await {
                    Ok(Some(outcome)) => print_outcome(&outcome),
                    Ok(None) => print_lines(&settings.render_lines(width)),
                    Err(err) => println!("{err}"),
                },
                Err(err) => println!("{err}"),
            },
            "save" => print_outcome(&settings.commit().await),
            "settings" => print_lines(&settings.render_lines(width)),
            "signout" => {
                if settings.sign_out().await.is_ok() {
                    println!("signed out");
                    break;
                }
            }
            "keys" => print_lines(&keymap.conflict_diagnostics_lines(width, max_rows)),
            other => println!("unknown command {other:?}; {HELP}"),
        }
        print_lines(&toasts.render_lines(width, max_rows));
        toasts.drain();
    }
    bar.unmount(&mut keymap);
    Ok(())
}

fn parse_edit(raw: &str) -> Result<(PanelId, &str, &str), String> {
    let (panel, assignment) = raw
        .split_once(' ')
        .ok_or_else(|| "usage: set <panel> <field>=<value>".to_owned())?;
    let (field, value) = assignment
        .split_once('=')
        .ok_or_else(|| "usage: set <panel> <field>=<value>".to_owned())?;
    Ok((panel.parse()?, field.trim(), value))
}

fn print_state(state: &CommandBarState) {
    println!(
        "open={} page={} selected={} cc={}",
        state.open,
        state.page.slug(),
        state.selected_item.as_deref().unwrap_or("-"),
        state.cc_visible
    );
}

fn print_outcome(outcome: &CommitOutcome) {
    match outcome {
        CommitOutcome::Skipped => println!("nothing to save"),
        CommitOutcome::Saved => println!("saved"),
        CommitOutcome::Failed(message) => println!("save failed: {message}"),
    }
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}
