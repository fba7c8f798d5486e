use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;
use gpui::{actions, App, Application, KeyBinding, Menu, MenuItem};

use blueprint_studio::config::{self, Config, APP_NAME};
use blueprint_studio::diagnostics::{Diagnostics, FileDiagnostics};
use blueprint_studio::error::ResultExt;
use blueprint_studio::logging;
use blueprint_studio::menu_bar::{MenuCommand, MenuEntry, MenuTemplate, PlatformRole};
use blueprint_studio::shell::{shell_inbox, Shell, ShellEvent};
use blueprint_studio::stdin_commands::start_stdin_listener;
use blueprint_studio::surface::GpuiBackend;

actions!(studio, [NewProject, OpenProject, OpenDevTools, About, Quit]);

/// Stdin lines queued ahead of the shell; the reader thread blocks past this
const STDIN_CAPACITY: usize = 100;

#[derive(Debug, Parser)]
#[command(name = "blueprint-studio", version, about = "Visual layout designer shell")]
struct Cli {
    /// Config file (defaults to ~/.blueprint-studio/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the diagnostics log location
    #[arg(long)]
    diagnostics: Option<PathBuf>,

    /// Accept JSONL commands on stdin
    #[arg(long)]
    stdin: bool,
}

fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    };
    let _logging_guard = logging::init(&config.log_dir());

    let diagnostics_path = cli
        .diagnostics
        .clone()
        .unwrap_or_else(|| config.diagnostics_path());
    let (diagnostics, _diagnostics_guard) = match FileDiagnostics::open(&diagnostics_path) {
        Ok((sink, guard)) => (Diagnostics::new(Rc::new(sink)), Some(guard)),
        Err(e) => {
            tracing::warn!(
                error = %e,
                path = %diagnostics_path.display(),
                "Diagnostics file unavailable, recording to the log only"
            );
            (Diagnostics::tracing_only(), None)
        }
    };

    let (inbox_tx, inbox_rx) = shell_inbox();

    let stdin_rx = if cli.stdin {
        let (stdin_tx, stdin_rx) = async_channel::bounded::<ShellEvent>(STDIN_CAPACITY);
        start_stdin_listener(stdin_tx);
        Some(stdin_rx)
    } else {
        None
    };

    let app = Application::new();
    let reopen_inbox = inbox_tx.clone();
    app.on_reopen(move |_cx| {
        reopen_inbox.try_send(ShellEvent::Activate).warn_on_err();
    });

    app.run(move |cx: &mut App| {
        tracing::info!(event_type = "app_lifecycle", action = "ready", "gpui application starting");

        install_menus(&config, &inbox_tx, cx);

        let backend = GpuiBackend::new(inbox_tx.clone(), config.bridge_allow_list());
        let shell = Rc::new(RefCell::new(Shell::new(backend, diagnostics, &config)));
        shell.borrow_mut().start(cx);

        if let Some(stdin_rx) = stdin_rx {
            let inbox = inbox_tx.clone();
            cx.foreground_executor()
                .spawn(async move {
                    while let Ok(event) = stdin_rx.recv().await {
                        if inbox.send(event).await.is_err() {
                            break;
                        }
                    }
                })
                .detach();
        }

        let follow_up = inbox_tx.clone();
        cx.spawn(async move |cx: &mut gpui::AsyncApp| {
            while let Ok(event) = inbox_rx.recv().await {
                let pending = match cx.update(|cx| shell.borrow_mut().handle(event, cx)) {
                    Ok(pending) => pending,
                    Err(_) => break,
                };
                if let Some(pending) = pending {
                    let follow_up = follow_up.clone();
                    cx.foreground_executor()
                        .spawn(async move {
                            if let Some(next) = pending.await {
                                follow_up.send(next).await.log_err();
                            }
                        })
                        .detach();
                }
            }
            tracing::info!("Shell inbox closed");
        })
        .detach();
    });
}

/// Translate the menu template into gpui menus, actions and key bindings
fn install_menus(config: &Config, inbox: &async_channel::Sender<ShellEvent>, cx: &mut App) {
    let template = MenuTemplate::standard(APP_NAME, config.dev_tools_accelerator());

    let menus = template
        .menus
        .iter()
        .map(|section| Menu {
            name: section.name.clone().into(),
            items: section
                .items
                .iter()
                .map(|entry| match entry {
                    MenuEntry::Separator => MenuItem::separator(),
                    MenuEntry::Role {
                        label,
                        role: PlatformRole::About,
                    } => MenuItem::action(label.clone(), About),
                    MenuEntry::Role {
                        label,
                        role: PlatformRole::Quit,
                    } => MenuItem::action(label.clone(), Quit),
                    MenuEntry::Action { label, command, .. } => match command {
                        MenuCommand::NewProject => MenuItem::action(label.clone(), NewProject),
                        MenuCommand::OpenProject => MenuItem::action(label.clone(), OpenProject),
                        MenuCommand::OpenDevTools => MenuItem::action(label.clone(), OpenDevTools),
                    },
                })
                .collect(),
        })
        .collect();
    cx.set_menus(menus);

    let bindings: Vec<KeyBinding> = template
        .accelerators()
        .into_iter()
        .map(|(command, keystroke)| match command {
            MenuCommand::NewProject => KeyBinding::new(keystroke, NewProject, None),
            MenuCommand::OpenProject => KeyBinding::new(keystroke, OpenProject, None),
            MenuCommand::OpenDevTools => KeyBinding::new(keystroke, OpenDevTools, None),
        })
        .collect();
    cx.bind_keys(bindings);

    let tx = inbox.clone();
    cx.on_action(move |_: &NewProject, _cx| {
        tx.try_send(ShellEvent::Menu(MenuCommand::NewProject)).warn_on_err();
    });
    let tx = inbox.clone();
    cx.on_action(move |_: &OpenProject, _cx| {
        tx.try_send(ShellEvent::Menu(MenuCommand::OpenProject)).warn_on_err();
    });
    let tx = inbox.clone();
    cx.on_action(move |_: &OpenDevTools, _cx| {
        tx.try_send(ShellEvent::Menu(MenuCommand::OpenDevTools)).warn_on_err();
    });
    cx.on_action(|_: &About, _cx| {
        tracing::info!(version = env!("CARGO_PKG_VERSION"), "About {}", APP_NAME);
    });
    cx.on_action(|_: &Quit, cx| {
        tracing::info!(event_type = "app_lifecycle", action = "quit", "Quit requested");
        cx.quit();
    });
}
