//! Auth feature view.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use sanctum_core::validation::{AuthMode, FormField};

use super::state::{field_label, is_secret};
use crate::common::render_utils::{
    InputHint, calculate_panel_area, render_hints, render_panel_container, spinner,
};
use crate::common::{mask, truncate_with_ellipsis};
use crate::state::AppState;

const PANEL_WIDTH: u16 = 64;
const LABEL_WIDTH: usize = 12;

pub fn render_auth(app: &AppState, frame: &mut Frame, area: Rect) {
    let auth = &app.auth;
    let height = match auth.mode {
        AuthMode::Login => 15,
        AuthMode::Signup => 19,
    };
    let panel = calculate_panel_area(area, PANEL_WIDTH, height);
    let title = match auth.mode {
        AuthMode::Login => "SANCTUM · Identify",
        AuthMode::Signup => "SANCTUM · Inscribe",
    };
    let inner = render_panel_container(frame, panel, title, Color::Magenta);

    let mut lines = vec![
        Line::from(Span::styled(
            match auth.mode {
                AuthMode::Login => "Present your credentials to enter the archive.",
                AuthMode::Signup => "Inscribe a new identity in the archive.",
            },
            Style::default().fg(Color::White),
        )),
        Line::from(""),
    ];

    let value_width = (inner.width as usize).saturating_sub(LABEL_WIDTH + 3);
    for field in auth.fields() {
        lines.push(field_line(app, *field, value_width));
        if let Some(message) = auth.error_for(*field) {
            lines.push(Line::from(Span::styled(
                format!("{:width$}   {message}", "", width = LABEL_WIDTH),
                Style::default().fg(Color::Red),
            )));
        }
    }

    lines.push(Line::from(""));
    if auth.restoring {
        lines.push(busy_line(app, "Recalling a previous session..."));
    } else if super::is_busy(app) {
        lines.push(busy_line(app, "Transmitting..."));
    }
    if let Some(error) = &auth.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    }
    if let Some(notice) = &auth.notice {
        lines.push(Line::from(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Green),
        )));
    }

    let body = Rect::new(inner.x, inner.y, inner.width, inner.height.saturating_sub(1));
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), body);

    let toggle_action = match auth.mode {
        AuthMode::Login => "new identity",
        AuthMode::Signup => "sign in",
    };
    render_hints(
        frame,
        inner,
        &[
            InputHint::new("Tab", "next"),
            InputHint::new("Enter", "submit"),
            InputHint::new("Ctrl+T", toggle_action),
            InputHint::new("Ctrl+C", "quit"),
        ],
        Color::Magenta,
    );
}

fn field_line(app: &AppState, field: FormField, value_width: usize) -> Line<'static> {
    let focused = app.auth.focus == field;
    let raw = app.auth.value(field);
    let shown = if is_secret(field) {
        mask(raw)
    } else {
        raw.to_string()
    };
    // Keep the tail visible while typing.
    let shown = if shown.chars().count() > value_width {
        let skip = shown.chars().count() - value_width.saturating_sub(1);
        format!("…{}", shown.chars().skip(skip).collect::<String>())
    } else {
        shown
    };

    let marker = if focused { "› " } else { "  " };
    let label_style = if focused {
        Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };

    let mut spans = vec![
        Span::styled(marker, Style::default().fg(Color::Magenta)),
        Span::styled(
            format!(
                "{:width$} ",
                truncate_with_ellipsis(field_label(field), LABEL_WIDTH),
                width = LABEL_WIDTH
            ),
            label_style,
        ),
        Span::styled(shown, Style::default().fg(Color::White)),
    ];
    if focused && !super::is_busy(app) {
        spans.push(Span::styled("█", Style::default().fg(Color::Magenta)));
    }
    Line::from(spans)
}

fn busy_line(app: &AppState, text: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{} ", spinner(app.spinner_frame)),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(text.to_string(), Style::default().fg(Color::Yellow)),
    ])
}
