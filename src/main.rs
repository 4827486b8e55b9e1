mod app;
mod auth;
mod backend;
mod config;
mod events;
mod logging;
mod models;
mod presenter;
mod ui;
mod video;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::Backend, prelude::*};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use app::{App, Screen};
use auth::NonEmptyCredentials;
use backend::PromptBackend;
use events::AppEvent;
use video::TextToVideoClient;

/// Long-lived collaborators the event loop hands work to.
struct Services {
    backend: Arc<dyn PromptBackend>,
    video: Option<TextToVideoClient>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load_config()?;
    let _log_guard = config::get_log_path()
        .ok()
        .and_then(|path| logging::init(&path, &config.log_level));

    let services = Services {
        backend: backend::build_backend(&config.backend)?,
        video: TextToVideoClient::from_config(&config.video)?,
    };

    let mut app = App::new(config.presenter_config());
    if !services.backend.is_available().await {
        tracing::warn!(url = %config.backend.base_url, "prompt backend unreachable");
        app.status_message = Some(format!("Backend unreachable at {}", config.backend.base_url));
    }

    let mut snapshots = app.presenter.subscribe();
    tokio::spawn(async move {
        while snapshots.changed().await.is_ok() {
            let snapshot = snapshots.borrow_and_update().clone();
            tracing::trace!(
                phase = %snapshot.phase,
                revealed = snapshot.revealed_text.len(),
                error = ?snapshot.error_message,
                "presentation changed"
            );
        }
    });

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create channel for async events
    let (tx, mut rx) = mpsc::unbounded_channel::<AppEvent>();

    // Run app
    let res = run_app(&mut terminal, &mut app, &services, &tx, &mut rx);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "event loop failed");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

/// Keys that behave the same on every screen. Returns true when consumed.
fn handle_global_keys(app: &mut App, key: KeyCode, modifiers: KeyModifiers) -> bool {
    match key {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            if app.exit_pending {
                app.quit();
            } else {
                app.exit_pending = true;
            }
            true
        }
        KeyCode::Char('q') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.quit();
            true
        }
        KeyCode::Char('h') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.toggle_help();
            true
        }
        KeyCode::Esc if app.show_help => {
            app.show_help = false;
            true
        }
        KeyCode::Esc if app.exit_pending => {
            app.exit_pending = false;
            true
        }
        _ if app.exit_pending => {
            // Any other key cancels pending exit and is processed normally
            app.exit_pending = false;
            false
        }
        _ => app.show_help,
    }
}

fn handle_login_keys(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
    match key {
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
            app.login.toggle_focus();
        }
        KeyCode::Enter => {
            app.sign_in(&NonEmptyCredentials);
        }
        KeyCode::Backspace => app.login.pop_char(),
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
            app.login.push_char(c);
        }
        _ => {}
    }
}

fn handle_guidance_keys(
    app: &mut App,
    key: KeyCode,
    modifiers: KeyModifiers,
    services: &Services,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
) {
    match key {
        KeyCode::Char('v') if modifiers.contains(KeyModifiers::CONTROL) => {
            request_video(app, services.video.as_ref(), event_tx);
        }
        KeyCode::Esc => app.cancel_response(),
        KeyCode::Enter => app.submit_prompt(Arc::clone(&services.backend)),
        KeyCode::Backspace => {
            app.input_buffer.pop();
        }
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
            app.input_buffer.push(c);
        }
        _ => {}
    }
}

fn request_video(
    app: &mut App,
    client: Option<&TextToVideoClient>,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
) {
    let Some(client) = client else {
        app.status_message = Some("Set video.api_key in config.toml to enable videos".to_string());
        return;
    };
    if app.video_pending {
        return;
    }
    let Some(text) = app.finished_response().map(str::to_string) else {
        app.status_message = Some("Wait for the answer to finish first".to_string());
        return;
    };

    app.video_pending = true;
    app.status_message = None;

    let client = client.clone();
    let tx = event_tx.clone();
    tokio::spawn(async move {
        let event = match client.create_video(&text).await {
            Ok(url) => AppEvent::VideoReady(url),
            Err(e) => AppEvent::VideoFailed(format!("{e:#}")),
        };
        let _ = tx.send(event);
    });
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    services: &Services,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
    event_rx: &mut mpsc::UnboundedReceiver<AppEvent>,
) -> Result<()> {
    loop {
        // Apply backend results and reveal ticks before drawing
        app.presenter.pump();
        while let Ok(app_event) = event_rx.try_recv() {
            app.handle_event(app_event);
        }

        terminal.draw(|f| ui::render(f, app))?;

        if event::poll(Duration::from_millis(16))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press
                    && !handle_global_keys(app, key.code, key.modifiers)
                {
                    match app.screen {
                        Screen::Login => handle_login_keys(app, key.code, key.modifiers),
                        Screen::Guidance => {
                            handle_guidance_keys(app, key.code, key.modifiers, services, event_tx);
                        }
                    }
                }
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
