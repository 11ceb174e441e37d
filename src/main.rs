//! Rolelens - security role assignments for Dataverse and Dynamics 365
//!
//! Resolves which security roles a user holds, and which users hold a role,
//! whether assigned directly or inherited through team membership.

mod api;
mod auth;
mod config;
mod error;
mod export;
mod models;
mod origin;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::{DataverseClient, RoleLookup};
use crate::auth::{Anonymous, AzureAuthenticator, SessionCredentials};
use crate::config::Config;
use crate::export::ExportFormat;
use crate::origin::{resolve_origin, EnvironmentOrigin};
use crate::ui::{App, InputMode, KeyBindings, Navigation, Tab};

/// Rolelens - Dataverse security role explorer
#[derive(Parser, Debug)]
#[command(name = "rolelens")]
#[command(about = "A terminal UI for resolving Dataverse security role assignments")]
#[command(version)]
struct Args {
    /// Dataverse environment URL (e.g., https://yourorg.crm.dynamics.com)
    #[arg(short, long, env = "DATAVERSE_URL")]
    env: Option<String>,

    /// Use vim-style keybindings (j/k navigation)
    #[arg(long, default_value = "false")]
    vim: bool,

    /// Host suffix an environment must end with
    #[arg(long)]
    trusted_suffix: Option<String>,

    /// Web API version (e.g., v9.1)
    #[arg(long)]
    api_version: Option<String>,

    /// Send requests without an Authorization header (e.g., behind an authenticating proxy)
    #[arg(long, default_value = "false")]
    anonymous: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (for debugging, set RUST_LOG=debug)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(suffix) = args.trusted_suffix {
        config.trusted_domain_suffix = suffix;
    }
    if let Some(version) = args.api_version {
        config.api_version = version;
    }

    let environment = args
        .env
        .or_else(|| config.current_env.clone())
        .context("No environment given. Pass --env or set DATAVERSE_URL")?;

    // Fail fast on a foreign host before touching credentials
    let origin = resolve_origin(&environment, &config.trusted_domain_suffix)?;

    let credentials: Arc<dyn SessionCredentials> = if args.anonymous {
        Arc::new(Anonymous)
    } else {
        let authenticator = AzureAuthenticator::new()?;
        eprintln!("Connecting to {}...", origin);
        authenticator
            .authorization(&origin.to_string())
            .await
            .context("Failed to authenticate. Make sure you're logged in with 'az login'")?;
        eprintln!("Connected successfully!");
        Arc::new(authenticator)
    };

    config.add_environment(environment.clone());
    if let Err(e) = config.save() {
        tracing::warn!("Failed to save configuration: {:#}", e);
    }

    let client = Arc::new(DataverseClient::new(credentials, config.api_version.clone())?);
    let lookup = Arc::new(RoleLookup::new(
        client,
        Arc::new(EnvironmentOrigin::new(environment.clone())),
        config.trusted_domain_suffix.clone(),
    ));

    let key_bindings = KeyBindings::from_vim_flag(args.vim);

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app and run
    let mut app = App::new(
        lookup,
        origin.to_string(),
        key_bindings,
        Duration::from_secs(config.message_timeout_secs),
    );
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {:?}", e);
    }

    Ok(())
}

/// Main event loop
fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // The role picker is filled as soon as the UI is up
    app.load_roles();

    loop {
        app.drain_events();
        app.clear_expired_message(Instant::now());

        // Render
        terminal.draw(|f| ui::components::render(f, app))?;

        // Handle events with timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                match app.input_mode {
                    InputMode::Normal => handle_normal_mode(app, key.code),
                    InputMode::Editing => handle_editing_mode(app, key.code),
                }

                if app.should_quit {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Handle input in normal mode
fn handle_normal_mode(app: &mut App, key: KeyCode) {
    // Global shortcuts
    match key {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('/') | KeyCode::Char('i') => {
            app.start_editing();
            return;
        }
        KeyCode::Char('1') => {
            app.select_tab(Tab::UserRoles);
            return;
        }
        KeyCode::Char('2') => {
            app.select_tab(Tab::RoleUsers);
            return;
        }
        KeyCode::Char('3') => {
            app.select_tab(Tab::UserSearch);
            return;
        }
        KeyCode::Char('r') => {
            app.load_roles();
            return;
        }
        KeyCode::Char('e') => {
            app.export_current(ExportFormat::Csv);
            return;
        }
        KeyCode::Char('E') => {
            app.export_current(ExportFormat::Json);
            return;
        }
        _ => {}
    }

    if let Some(navigation) = app.key_bindings.navigation(key) {
        match navigation {
            Navigation::Up => app.navigate_up(),
            Navigation::Down => app.navigate_down(),
            Navigation::PrevTab => app.prev_tab(),
            Navigation::NextTab => app.next_tab(),
        }
        return;
    }

    if key == KeyCode::Enter {
        if app.tab == Tab::UserSearch && !app.search_results.is_empty() {
            app.open_selected_search_result();
        } else {
            app.submit();
        }
    }
}

/// Handle input while typing into a field
fn handle_editing_mode(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            app.submit();
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            app.input_pop();
        }
        KeyCode::Char(c) => {
            app.input_push(c);
        }
        _ => {}
    }
}
