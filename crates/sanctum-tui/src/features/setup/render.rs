use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use sanctum_core::setup::{STEPS, SetupPhase};

use crate::common::render_utils::{
    InputHint, calculate_panel_area, render_hints, render_panel_container, spinner,
};
use crate::common::truncate_with_ellipsis;
use crate::state::AppState;

const PANEL_WIDTH: u16 = 68;
const PANEL_HEIGHT: u16 = 18;

pub fn render_setup(app: &AppState, frame: &mut Frame, area: Rect) {
    let panel = calculate_panel_area(area, PANEL_WIDTH, PANEL_HEIGHT);
    let inner = render_panel_container(frame, panel, "SANCTUM · Uplink", Color::Cyan);
    let width = inner.width as usize;

    let mut lines = vec![
        Line::from(Span::styled(
            "Establish a link with the archive before entering.",
            Style::default().fg(Color::White),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Endpoint  ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                truncate_with_ellipsis(&app.endpoint.url, width.saturating_sub(10)),
                Style::default().fg(Color::Cyan),
            ),
        ]),
    ];
    if app.endpoint.is_placeholder() {
        lines.push(Line::from(Span::styled(
            "No endpoint configured; set SANCTUM_URL or [backend] url.",
            Style::default().fg(Color::Yellow),
        )));
    }
    lines.push(Line::from(""));

    match app.setup.phase() {
        SetupPhase::Idle { error } => {
            lines.push(Line::from("Press Enter to open the uplink."));
            if let Some(error) = error {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    error.clone(),
                    Style::default().fg(Color::Red),
                )));
            }
        }
        SetupPhase::Connecting => {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{} ", spinner(app.spinner_frame)),
                    Style::default().fg(Color::Yellow),
                ),
                Span::raw("Probing the sanctum..."),
            ]));
        }
        SetupPhase::Step(current) => {
            lines.extend(step_lines(app, Some(*current)));
            if let Some(caption) = active_caption(app) {
                lines.push(Line::from(""));
                lines.push(caption);
            }
        }
        SetupPhase::Connected => {
            lines.extend(step_lines(app, None));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Link established.",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )));
        }
    }

    let body = Rect::new(inner.x, inner.y, inner.width, inner.height.saturating_sub(1));
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), body);

    render_hints(
        frame,
        inner,
        &[
            InputHint::new("Enter", "connect"),
            InputHint::new("Esc", "skip"),
            InputHint::new("q", "quit"),
        ],
        Color::Cyan,
    );
}

fn active_caption(app: &AppState) -> Option<Line<'static>> {
    let label = app.setup.current_step()?;
    Some(Line::from(vec![
        Span::styled("Now  ", Style::default().fg(Color::DarkGray)),
        Span::styled(label.to_string(), Style::default().fg(Color::Yellow)),
    ]))
}

/// `current` is the running step; `None` means all are done.
fn step_lines(app: &AppState, current: Option<usize>) -> Vec<Line<'static>> {
    STEPS
        .iter()
        .enumerate()
        .map(|(index, label)| {
            let done = current.is_none_or(|current| index < current);
            let (marker, style) = if done {
                ("✓".to_string(), Style::default().fg(Color::Green))
            } else if current == Some(index) {
                (
                    spinner(app.spinner_frame).to_string(),
                    Style::default().fg(Color::Yellow),
                )
            } else {
                ("·".to_string(), Style::default().fg(Color::DarkGray))
            };
            Line::from(vec![
                Span::styled(format!(" {marker} "), style),
                Span::styled((*label).to_string(), style),
            ])
        })
        .collect()
}
