use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs};
use sanctum_core::models::{CraftedItem, EntityRecord, Prediction, SystemEvent};

use super::state::{HomeTab, Status};
use crate::common::render_utils::{InputHint, render_hints, spinner};
use crate::common::{TaskKind, sanitize_for_display, truncate_with_ellipsis};
use crate::state::AppState;

const ACCENT: Color = Color::Cyan;

pub fn render_home(app: &AppState, frame: &mut Frame, area: Rect) {
    let [header, tabs, body, status, hints] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area);

    render_profile(app, frame, header);
    render_tabs(app, frame, tabs);
    render_rows(app, frame, body);
    render_status(app, frame, status);

    let mut keys = vec![
        InputHint::new("←/→", "tab"),
        InputHint::new("↑/↓", "select"),
        InputHint::new("r", "refresh"),
    ];
    if app.home.tab == HomeTab::Crafted {
        keys.push(InputHint::new("d", "dissolve"));
    }
    keys.push(InputHint::new("o", "sign out"));
    keys.push(InputHint::new("q", "quit"));
    render_hints(frame, hints, &keys, ACCENT);
}

fn render_profile(app: &AppState, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .title(" SANCTUM ");

    let line = match (&app.home.profile, &app.user) {
        (Some(profile), _) => {
            let mut spans = vec![
                Span::styled(
                    sanitize_for_display(&profile.username),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::styled(
                    format!("[{}]", profile.access_level),
                    Style::default().fg(Color::Magenta),
                ),
                Span::raw(format!("  energy {:.1}", profile.energy)),
            ];
            if let Some(title) = &profile.title {
                spans.push(Span::styled(
                    format!("  « {} »", sanitize_for_display(title)),
                    Style::default().fg(Color::Yellow),
                ));
            }
            Line::from(spans)
        }
        (None, Some(user)) => {
            let mut spans = vec![
                Span::styled(
                    sanitize_for_display(&user.username),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!("  {}", user.email)),
            ];
            match &app.home.profile_error {
                Some(err) => spans.push(Span::styled(
                    format!("  profile unavailable: {err}"),
                    Style::default().fg(Color::Red),
                )),
                None => spans.push(Span::styled(
                    format!("  {}", spinner(app.spinner_frame)),
                    Style::default().fg(Color::Yellow),
                )),
            }
            Line::from(spans)
        }
        (None, None) => Line::from(""),
    };
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_tabs(app: &AppState, frame: &mut Frame, area: Rect) {
    let titles = HomeTab::ALL
        .iter()
        .enumerate()
        .map(|(i, tab)| Line::from(format!("{} {}", i + 1, tab.title())));
    let tabs = Tabs::new(titles)
        .select(app.home.tab.index())
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
        .divider("│");
    frame.render_widget(tabs, area);
}

fn render_rows(app: &AppState, frame: &mut Frame, area: Rect) {
    let tab = app.home.tab;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let width = area.width.saturating_sub(4) as usize;

    let loading = app.tasks.state(TaskKind::TabLoad(tab)).is_running();
    if app.home.row_count(tab) == 0 {
        let message = if let Some(err) = app.home.error(tab) {
            Line::from(Span::styled(err.to_string(), Style::default().fg(Color::Red)))
        } else if loading || !app.home.is_loaded(tab) {
            Line::from(format!("{} Consulting the archive...", spinner(app.spinner_frame)))
        } else {
            Line::from(Span::styled(
                "Nothing recorded here yet.",
                Style::default().fg(Color::DarkGray),
            ))
        };
        frame.render_widget(Paragraph::new(message).block(block), area);
        return;
    }

    let items: Vec<ListItem> = match tab {
        HomeTab::Entities => app
            .home
            .entities
            .rows
            .iter()
            .map(|row| entity_item(row, width))
            .collect(),
        HomeTab::Crafted => app
            .home
            .crafted
            .rows
            .iter()
            .map(|row| crafted_item(row, width))
            .collect(),
        HomeTab::Predictions => app
            .home
            .predictions
            .rows
            .iter()
            .map(|row| prediction_item(row, width))
            .collect(),
        HomeTab::Events => app
            .home
            .events
            .rows
            .iter()
            .map(|row| event_item(row, width))
            .collect(),
    };

    let mut block = block;
    if let Some(err) = app.home.error(tab) {
        block = block.title(Span::styled(
            format!(" {} ", truncate_with_ellipsis(err, width)),
            Style::default().fg(Color::Red),
        ));
    } else if loading {
        block = block.title(format!(" {} ", spinner(app.spinner_frame)));
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("› ");
    let mut state = ListState::default().with_selected(Some(app.home.selected(tab)));
    frame.render_stateful_widget(list, area, &mut state);
}

fn row(columns: &[(String, Style)], width: usize) -> ListItem<'static> {
    let mut remaining = width;
    let mut spans = Vec::new();
    for (text, style) in columns {
        if remaining == 0 {
            break;
        }
        let text = truncate_with_ellipsis(&sanitize_for_display(text), remaining);
        remaining = remaining.saturating_sub(text.chars().count() + 2);
        spans.push(Span::styled(text, *style));
        spans.push(Span::raw("  "));
    }
    ListItem::new(Line::from(spans))
}

fn entity_item(entity: &EntityRecord, width: usize) -> ListItem<'static> {
    row(
        &[
            (
                entity.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            (
                entity.status.as_str().to_string(),
                Style::default().fg(Color::Green),
            ),
            (entity.chamber.clone(), Style::default().fg(ACCENT)),
            (
                format!("{} → {}", entity.original_form, entity.current_form),
                Style::default(),
            ),
            (
                format!("stab {:.2}", entity.stability),
                Style::default().fg(Color::DarkGray),
            ),
        ],
        width,
    )
}

fn crafted_item(item: &CraftedItem, width: usize) -> ListItem<'static> {
    row(
        &[
            (
                item.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            (
                format!("pow {:.1}", item.power),
                Style::default().fg(Color::Yellow),
            ),
            (
                format!("stab {:.2}", item.stability),
                Style::default().fg(Color::DarkGray),
            ),
            (item.components.join(", "), Style::default()),
        ],
        width,
    )
}

fn prediction_item(prediction: &Prediction, width: usize) -> ListItem<'static> {
    row(
        &[
            (
                prediction.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            (
                prediction.category.as_str().to_string(),
                Style::default().fg(Color::Magenta),
            ),
            (
                format!("p {:.2}", prediction.probability),
                Style::default().fg(Color::Yellow),
            ),
            (
                prediction.status.as_str().to_string(),
                Style::default().fg(Color::Green),
            ),
            (prediction.timeframe.clone(), Style::default()),
        ],
        width,
    )
}

fn event_item(event: &SystemEvent, width: usize) -> ListItem<'static> {
    row(
        &[
            (
                event.created_at.format("%Y-%m-%d %H:%M").to_string(),
                Style::default().fg(Color::DarkGray),
            ),
            (
                event.event_type.as_str().to_string(),
                Style::default().fg(ACCENT),
            ),
            (
                event.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            (
                event.description.clone().unwrap_or_default(),
                Style::default(),
            ),
        ],
        width,
    )
}

fn render_status(app: &AppState, frame: &mut Frame, area: Rect) {
    let Some(status) = &app.home.status else {
        return;
    };
    let color = match status {
        Status::Info(_) => Color::Green,
        Status::Prompt(_) => Color::Yellow,
        Status::Error(_) => Color::Red,
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            status.text().to_string(),
            Style::default().fg(color),
        ))),
        area,
    );
}
