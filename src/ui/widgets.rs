use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Screen};
use crate::auth::{LoginField, LoginForm};
use crate::presenter::Phase;

const ACCENT: Color = Color::LightYellow;
const CURSOR: &str = "▌";

pub fn render_login_title(frame: &mut Frame, area: Rect) {
    let title = Paragraph::new(Span::styled(
        "Login",
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center);

    frame.render_widget(title, area);
}

pub fn render_login_fields(
    frame: &mut Frame,
    form: &LoginForm,
    username_area: Rect,
    password_area: Rect,
) {
    let masked = form.masked_password();
    let fields = [
        (LoginField::Username, " Username ", form.username.as_str(), username_area),
        (LoginField::Password, " Password ", masked.as_str(), password_area),
    ];

    for (field, label, value, area) in fields {
        let focused = form.focus == field;
        let border = if focused { ACCENT } else { Color::DarkGray };
        let text = if focused {
            format!("{value}{CURSOR}")
        } else {
            value.to_string()
        };

        let input = Paragraph::new(text).block(
            Block::default()
                .borders(Borders::ALL)
                .title(label)
                .border_style(Style::default().fg(border)),
        );

        frame.render_widget(input, centered_width(area, 40));
    }
}

pub fn render_sign_in_hint(frame: &mut Frame, form: &LoginForm, area: Rect) {
    let (text, style) = if form.rejected {
        (
            "Sign in refused",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )
    } else if form.is_valid() {
        ("Press Enter to sign in", Style::default().fg(Color::Green))
    } else {
        (
            "Enter a username and password",
            Style::default().fg(Color::DarkGray),
        )
    };

    let hint = Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(style);

    frame.render_widget(hint, area);
}

pub fn render_guidance_title(frame: &mut Frame, area: Rect) {
    let title = Paragraph::new(Span::styled(
        "Guidance AI",
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::BOTTOM).border_style(Style::default().fg(ACCENT)));

    frame.render_widget(title, area);
}

pub fn render_response(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = Vec::new();

    if let Some(prompt) = &app.last_prompt {
        lines.push(Line::from(Span::styled(
            format!("> {prompt}"),
            Style::default().fg(Color::Cyan),
        )));
        lines.push(Line::from(""));
    }

    match app.presenter.phase() {
        Phase::Idle => {
            if app.last_prompt.is_none() {
                lines.push(Line::from(Span::styled(
                    "Ask a question below to get started",
                    Style::default().fg(Color::DarkGray),
                )));
            }
        }
        Phase::Waiting => {
            lines.push(Line::from(Span::styled(
                "Thinking...",
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }
        Phase::Revealing | Phase::Done => {
            let live = app.presenter.is_active();
            let mut text_lines: Vec<Line> = app
                .presenter
                .revealed_text()
                .split('\n')
                .map(|line| Line::from(line.to_string()))
                .collect();
            if live {
                if let Some(last) = text_lines.last_mut() {
                    last.push_span(Span::styled(CURSOR, Style::default().fg(ACCENT)));
                }
            }
            lines.extend(text_lines);
        }
        Phase::Failed => {
            let message = app.presenter.error_message().unwrap_or_default();
            lines.push(Line::from(Span::styled(
                format!("Error: {message}"),
                Style::default().fg(Color::Red),
            )));
        }
    }

    let response = Paragraph::new(lines).wrap(Wrap { trim: false });

    // Keep the newest text in view as it grows; count rows with the same
    // word wrapping the paragraph renders with.
    let scroll = response
        .line_count(area.width)
        .saturating_sub(area.height as usize);
    let response = response.scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0));

    frame.render_widget(response, area);
}

pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (phase_text, color) = match app.presenter.phase() {
        Phase::Idle => ("Ready", Color::DarkGray),
        Phase::Waiting => ("[Waiting...]", Color::Yellow),
        Phase::Revealing if app.presenter.is_active() => ("[Typing...]", Color::Yellow),
        Phase::Revealing => ("[Stopped]", Color::DarkGray),
        Phase::Done => ("Done", Color::Green),
        Phase::Failed => ("Failed", Color::Red),
    };

    let mut spans = Vec::new();
    if let Some(message) = &app.status_message {
        spans.push(Span::styled(message.clone(), Style::default().fg(Color::Cyan)));
        spans.push(Span::raw("  "));
    } else if app.video_pending {
        spans.push(Span::styled(
            "[Rendering video...]  ",
            Style::default().fg(Color::Magenta),
        ));
    }
    spans.push(Span::styled(
        phase_text,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ));

    let status = Paragraph::new(Line::from(spans)).alignment(Alignment::Right);

    frame.render_widget(status, area);
}

pub fn render_input_field(frame: &mut Frame, app: &App, area: Rect) {
    let (input_text, input_style) = if app.input_buffer.is_empty() {
        ("Ask me anything...", Style::default().fg(Color::Gray))
    } else {
        (
            app.input_buffer.as_str(),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )
    };

    let input = Paragraph::new(input_text)
        .style(input_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(ACCENT)),
        );

    frame.render_widget(input, area);
}

pub fn render_bottom_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (text, style) = if app.exit_pending {
        (
            "Press Ctrl+C again to exit, Esc to cancel",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )
    } else {
        let keys = match app.screen {
            Screen::Login => "Tab: Switch Field | Enter: Sign In | Ctrl+H: Help | Ctrl+C: Quit",
            Screen::Guidance => {
                "Enter: Ask | Esc: Stop | Ctrl+V: Video | Ctrl+H: Help | Ctrl+C: Quit"
            }
        };
        (keys, Style::default().fg(Color::DarkGray))
    };

    let bar = Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(style);

    frame.render_widget(bar, area);
}

pub fn render_help_window(frame: &mut Frame, screen: Screen, area: Rect) {
    let mut help_text = vec![
        Line::from(Span::styled(
            "Guidance - Keyboard Shortcuts",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("General:", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("  Ctrl+H        - Show/hide this help"),
        Line::from("  Ctrl+C        - Quit (press twice)"),
        Line::from("  Ctrl+Q        - Quit immediately"),
        Line::from(""),
    ];

    match screen {
        Screen::Login => help_text.extend([
            Line::from(Span::styled("Login:", Style::default().add_modifier(Modifier::BOLD))),
            Line::from("  Tab           - Switch field"),
            Line::from("  Enter         - Sign in"),
        ]),
        Screen::Guidance => help_text.extend([
            Line::from(Span::styled("Guidance:", Style::default().add_modifier(Modifier::BOLD))),
            Line::from("  Enter         - Ask the question"),
            Line::from("  Esc           - Stop the current answer"),
            Line::from("  Ctrl+V        - Turn the answer into a video"),
        ]),
    }

    help_text.extend([
        Line::from(""),
        Line::from(Span::styled(
            "Press Ctrl+H or Esc to close",
            Style::default().fg(Color::DarkGray),
        )),
    ]);

    let help_paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help ")
                .border_style(Style::default().fg(ACCENT)),
        )
        .wrap(Wrap { trim: false });

    let popup_width = 52;
    let popup_height = 16;
    let x = (area.width.saturating_sub(popup_width)) / 2;
    let y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect {
        x: area.x + x,
        y: area.y + y,
        width: popup_width.min(area.width),
        height: popup_height.min(area.height),
    };

    frame.render_widget(Clear, popup_area);
    frame.render_widget(help_paragraph, popup_area);
}

fn centered_width(area: Rect, width: u16) -> Rect {
    let width = width.min(area.width);
    Rect {
        x: area.x + (area.width - width) / 2,
        width,
        ..area
    }
}
