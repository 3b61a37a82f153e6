//! Pure view functions.
//!
//! Everything here takes `&AppState` and draws to a frame; no mutation,
//! no effects.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::common::truncate_with_ellipsis;
use crate::state::{AppState, Screen};
use crate::{auth, home, setup};

pub fn render(app: &AppState, frame: &mut Frame) {
    let [body, footer] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(frame.area());

    match app.screen {
        Screen::Setup => setup::render_setup(app, frame, body),
        Screen::Auth => auth::render_auth(app, frame, body),
        Screen::Home => home::render_home(app, frame, body),
    }

    render_footer(app, frame, footer);
}

fn render_footer(app: &AppState, frame: &mut Frame, area: ratatui::layout::Rect) {
    let dim = Style::default().fg(Color::DarkGray);
    let width = area.width as usize;

    let mut spans = vec![
        Span::styled(" sanctum ", Style::default().fg(Color::Magenta)),
        Span::styled("· ", dim),
        Span::styled(
            truncate_with_ellipsis(&app.endpoint.url, width / 2),
            dim,
        ),
    ];
    if app.local_mode {
        spans.push(Span::styled(" · ", dim));
        spans.push(Span::styled("local mode", Style::default().fg(Color::Yellow)));
    }
    if let Some(user) = &app.user {
        spans.push(Span::styled(" · ", dim));
        spans.push(Span::styled(
            format!("{} ({})", user.username, user.access_level),
            dim,
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
