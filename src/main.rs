use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ghedit::app::Workspace;
use ghedit::kernel::services::adapters::{
    get_preferences_path, load_settings, GithubConfig, GithubStore, HttpPreviewService,
    InMemoryStore, JsonFilePreferences, MemoryPreferences, PlainBuffer, RuntimeServices,
};
use ghedit::kernel::services::ports::{
    PreferenceStore, PreviewService, RemoteStore, Settings, TextBufferWidget, WorkspaceId,
};
use ghedit::kernel::{Action, NotificationLevel, SessionConfig};
use ghedit::models::LoadState;

mod logging;

/// Browse and edit a GitHub repository from the terminal
#[derive(Parser, Debug, Default)]
#[command(name = "ghedit")]
#[command(about = "Browse and edit a GitHub repository through the contents API", long_about = None)]
#[command(version)]
struct Args {
    /// Repository owner (user or organisation)
    #[arg(long)]
    owner: Option<String>,

    /// Repository name
    #[arg(long)]
    repo: Option<String>,

    /// Branch to read from and commit to (default: the repository default branch)
    #[arg(long)]
    branch: Option<String>,

    /// API base URL, e.g. for GitHub Enterprise
    #[arg(long, value_name = "URL")]
    api_base: Option<String>,

    /// Path to a settings file (default: settings.json in the app data directory)
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,

    /// Use a built-in in-memory repository instead of GitHub
    #[arg(long)]
    demo: bool,
}

const WAIT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq)]
enum ReplCommand {
    Tree,
    Toggle(String),
    Collapse,
    Open(String),
    Tabs,
    Show,
    EditFrom(PathBuf),
    Set(String),
    Save,
    ForceSave,
    Reload,
    Close(Option<String>),
    Next,
    Prev,
    Preview,
    Theme,
    Notes,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Option<ReplCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let need = |what: &str| -> Result<String, String> {
        if rest.is_empty() {
            Err(format!("usage: {word} <{what}>"))
        } else {
            Ok(rest.to_string())
        }
    };

    let cmd = match word {
        "tree" | "ls" => ReplCommand::Tree,
        "toggle" | "t" => ReplCommand::Toggle(need("path")?),
        "collapse" => ReplCommand::Collapse,
        "open" | "o" => ReplCommand::Open(need("path")?),
        "tabs" => ReplCommand::Tabs,
        "show" | "cat" => ReplCommand::Show,
        "edit" => ReplCommand::EditFrom(PathBuf::from(need("local-file")?)),
        "set" => ReplCommand::Set(rest.replace("\\n", "\n")),
        "save" | "w" => ReplCommand::Save,
        "force-save" => ReplCommand::ForceSave,
        "reload" => ReplCommand::Reload,
        "close" => ReplCommand::Close((!rest.is_empty()).then(|| rest.to_string())),
        "next" => ReplCommand::Next,
        "prev" => ReplCommand::Prev,
        "preview" => ReplCommand::Preview,
        "theme" => ReplCommand::Theme,
        "notes" => ReplCommand::Notes,
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" | "q" => ReplCommand::Quit,
        other => return Err(format!("unknown command: {other} (try `help`)")),
    };
    Ok(Some(cmd))
}

fn apply_overrides(settings: &mut Settings, args: &Args) {
    if let Some(owner) = &args.owner {
        settings.remote.owner = owner.clone();
    }
    if let Some(repo) = &args.repo {
        settings.remote.repo = repo.clone();
    }
    if let Some(branch) = &args.branch {
        settings.remote.branch = Some(branch.clone());
    }
    if let Some(api_base) = &args.api_base {
        settings.remote.api_base = api_base.clone();
    }
    if args.demo {
        if settings.remote.owner.is_empty() {
            settings.remote.owner = "demo".to_string();
        }
        if settings.remote.repo.is_empty() {
            settings.remote.repo = "site".to_string();
        }
    }
}

fn build_services(settings: &Settings, demo: bool) -> RuntimeServices {
    let store: Arc<dyn RemoteStore> = if demo {
        Arc::new(InMemoryStore::demo())
    } else {
        Arc::new(GithubStore::new(GithubConfig::from_settings(
            &settings.remote,
            &settings.session.commit_message,
        )))
    };

    let preview = settings.preview.endpoint.as_deref().map(|endpoint| {
        Arc::new(HttpPreviewService::new(
            endpoint,
            &settings.preview.target,
            Duration::from_secs(settings.remote.timeout_secs.max(1)),
        )) as Arc<dyn PreviewService>
    });

    let preferences: Arc<dyn PreferenceStore> = match get_preferences_path() {
        Some(path) if !demo => Arc::new(JsonFilePreferences::open(path)),
        _ => Arc::new(MemoryPreferences::new()),
    };

    RuntimeServices {
        store,
        preview,
        preferences,
    }
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    let _logging = logging::init();

    let mut settings = match load_settings(args.settings.as_deref()) {
        Ok(settings) => settings,
        Err(e) if args.settings.is_some() => {
            return Err(io::Error::other(e.to_string()));
        }
        Err(e) => {
            tracing::warn!(error = %e, "using default settings");
            eprintln!("warning: {e}; using defaults");
            Settings::default()
        }
    };
    apply_overrides(&mut settings, &args);

    if settings.remote.owner.is_empty() || settings.remote.repo.is_empty() {
        return Err(io::Error::other(
            "no repository configured: pass --owner and --repo, or --demo",
        ));
    }

    let workspace_id = WorkspaceId::new(&settings.remote.owner, &settings.remote.repo);
    let services = build_services(&settings, args.demo);
    let mut workspace = Workspace::open(
        workspace_id,
        SessionConfig::from(&settings.session),
        services,
        settings.runtime.worker_threads,
        PlainBuffer::new(),
    )?;

    println!("ghedit: {} (type `help`)", workspace.state().workspace);
    let mut seen_notes = 0u64;
    settle(&mut workspace, &mut seen_notes);
    print_tree(&workspace);

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("{}> ", prompt(&workspace));
        io::stdout().flush()?;
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let cmd = match parse_command(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(msg) => {
                println!("{msg}");
                continue;
            }
        };
        if !run_command(&mut workspace, cmd) {
            break;
        }
        settle(&mut workspace, &mut seen_notes);
    }

    tracing::info!("exiting");
    Ok(())
}

/// Returns `false` when the session should end.
fn run_command(workspace: &mut Workspace<PlainBuffer>, cmd: ReplCommand) -> bool {
    let active = workspace.state().session.active_path().map(str::to_string);
    let with_active = |f: fn(String) -> Action| match active.clone() {
        Some(path) => Some(f(path)),
        None => {
            println!("no active tab");
            None
        }
    };

    let action = match cmd {
        ReplCommand::Tree => {
            print_tree(workspace);
            None
        }
        ReplCommand::Toggle(path) => Some(Action::ExplorerToggle { path }),
        ReplCommand::Collapse => Some(Action::ExplorerCollapseAll),
        ReplCommand::Open(path) => Some(Action::OpenFile { path }),
        ReplCommand::Tabs => {
            print_tabs(workspace);
            None
        }
        ReplCommand::Show => {
            print!("{}", workspace.widget().as_str());
            if !workspace.widget().as_str().ends_with('\n') {
                println!();
            }
            None
        }
        ReplCommand::EditFrom(file) => {
            match std::fs::read_to_string(&file) {
                Ok(text) => set_buffer(workspace, &text),
                Err(e) => println!("cannot read {}: {e}", file.display()),
            }
            None
        }
        ReplCommand::Set(text) => {
            set_buffer(workspace, &text);
            None
        }
        ReplCommand::Save => with_active(|path| Action::Save { path }),
        ReplCommand::ForceSave => with_active(|path| Action::ForceSave { path }),
        ReplCommand::Reload => with_active(|path| Action::ReloadTab { path }),
        ReplCommand::Close(Some(path)) => Some(Action::CloseTab { path }),
        ReplCommand::Close(None) => with_active(|path| Action::CloseTab { path }),
        ReplCommand::Next => Some(Action::NextTab),
        ReplCommand::Prev => Some(Action::PrevTab),
        ReplCommand::Preview => Some(Action::RequestPreview),
        ReplCommand::Theme => Some(Action::ToggleTheme),
        ReplCommand::Notes => {
            for note in workspace.state().notifications.iter() {
                println!("{}", format_note(note.level, &note.message));
            }
            Some(Action::DismissNotifications)
        }
        ReplCommand::Help => {
            print_help();
            None
        }
        ReplCommand::Quit => return false,
    };

    if let Some(action) = action {
        workspace.dispatch(action);
    }
    true
}

fn set_buffer(workspace: &mut Workspace<PlainBuffer>, text: &str) {
    if workspace.state().session.active_path().is_none() {
        println!("no active tab");
        return;
    }
    workspace.widget_mut().set_content(text);
    workspace.buffer_edited();
}

fn settle(workspace: &mut Workspace<PlainBuffer>, seen_notes: &mut u64) {
    if !workspace.wait_idle(WAIT) {
        println!("still waiting on the remote; results will appear later");
    }
    for note in workspace.state().notifications.iter() {
        if note.id > *seen_notes {
            println!("{}", format_note(note.level, &note.message));
            *seen_notes = note.id;
        }
    }
}

fn format_note(level: NotificationLevel, message: &str) -> String {
    let tag = match level {
        NotificationLevel::Info => "info",
        NotificationLevel::Warning => "warn",
        NotificationLevel::Error => "error",
    };
    format!("[{tag}] {message}")
}

fn prompt(workspace: &Workspace<PlainBuffer>) -> String {
    match workspace.state().session.active_tab() {
        Some(tab) => tab.display_title(),
        None => String::new(),
    }
}

fn print_tree(workspace: &Workspace<PlainBuffer>) {
    let explorer = &workspace.state().explorer;
    if explorer.rows().is_empty() {
        println!("(empty)");
    }
    for row in explorer.rows() {
        let marker = match (row.is_dir, row.load_state, row.is_expanded) {
            (false, _, _) => " ",
            (true, LoadState::Loading, _) => "…",
            (true, _, true) => "-",
            (true, _, false) => "+",
        };
        println!("{}{marker} {}", "  ".repeat(usize::from(row.depth)), row.name);
    }
}

fn print_tabs(workspace: &Workspace<PlainBuffer>) {
    let session = &workspace.state().session;
    if session.tabs().is_empty() {
        println!("(no tabs)");
    }
    for tab in session.tabs() {
        let active = if session.active_path() == Some(tab.path()) {
            "*"
        } else {
            " "
        };
        let conflict = if tab.has_conflict() { " [conflict]" } else { "" };
        println!("{active} {}{conflict}  ({})", tab.display_title(), tab.path());
    }
}

fn print_help() {
    println!(
        "tree | toggle <dir> | collapse | open <file> | tabs | show | edit <local-file> | set <text>\n\
         save | force-save | reload | close [path] | next | prev\n\
         preview | theme | notes | help | quit"
    );
}

#[cfg(test)]
#[path = "../tests/unit/cli.rs"]
mod tests;
