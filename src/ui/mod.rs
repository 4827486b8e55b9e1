pub mod widgets;

use crate::app::{App, Screen};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

pub fn render(frame: &mut Frame, app: &App) {
    match app.screen {
        Screen::Login => render_login_screen(frame, app),
        Screen::Guidance => render_guidance_screen(frame, app),
    }

    if app.show_help {
        widgets::render_help_window(frame, app.screen, frame.area());
    }
}

fn render_login_screen(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Top padding
            Constraint::Length(3), // Title
            Constraint::Length(3), // Username
            Constraint::Length(3), // Password
            Constraint::Length(1), // Sign-in hint
            Constraint::Min(0),    // Bottom padding
            Constraint::Length(1), // Bottom keymap bar
        ])
        .split(frame.area());

    widgets::render_login_title(frame, chunks[1]);
    widgets::render_login_fields(frame, &app.login, chunks[2], chunks[3]);
    widgets::render_sign_in_hint(frame, &app.login, chunks[4]);
    widgets::render_bottom_bar(frame, app, chunks[6]);
}

fn render_guidance_screen(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(0),    // Response
            Constraint::Length(1), // Status line
            Constraint::Length(3), // Prompt input
            Constraint::Length(1), // Bottom keymap bar
        ])
        .split(frame.area());

    widgets::render_guidance_title(frame, chunks[0]);
    widgets::render_response(frame, app, chunks[1]);
    widgets::render_status_bar(frame, app, chunks[2]);
    widgets::render_input_field(frame, app, chunks[3]);
    widgets::render_bottom_bar(frame, app, chunks[4]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presenter::PresenterConfig;
    use ratatui::{backend::TestBackend, Terminal};

    fn rendered(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_render_login_screen() {
        let mut app = App::new(PresenterConfig::default());
        app.login.username = "parent".to_string();
        app.login.password = "secret".to_string();

        let screen = rendered(&app);
        assert!(screen.contains("Login"));
        assert!(screen.contains("parent"));
        assert!(!screen.contains("secret"));
        assert!(screen.contains("••••••"));
    }

    #[test]
    fn test_render_guidance_screen_when_idle() {
        let mut app = App::new(PresenterConfig::default());
        app.screen = Screen::Guidance;

        let screen = rendered(&app);
        assert!(screen.contains("Guidance AI"));
        assert!(screen.contains("Ask me anything..."));
    }

    #[test]
    fn test_render_help_overlay() {
        let mut app = App::new(PresenterConfig::default());
        app.screen = Screen::Guidance;
        app.show_help = true;

        let screen = rendered(&app);
        assert!(screen.contains("Keyboard Shortcuts"));
    }
}
