//! Template and board list

use super::super::state::{DashboardState, ListStatus};
use super::super::utils::truncate;
use crate::consts::cli_consts::METRIC_PILL_LIMIT;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, List, ListItem, ListState, Paragraph, Wrap};

pub fn render_board_list(f: &mut Frame, area: Rect, state: &DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Fill(1)])
        .split(area);

    let view = &state.list.catalog.view;
    let cursor = if state.list.searching { "_" } else { "" };
    let search_line = Line::from(vec![
        Span::styled("View: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            view.selected_option.to_string(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("   Search: ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{}{}", view.search_term, cursor)),
    ]);
    f.render_widget(Paragraph::new(search_line), chunks[0]);

    let block = Block::default()
        .title("DASHBOARDS")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan));

    let message = match &state.list.status {
        ListStatus::Loading => Some(("Loading dashboards...".to_string(), Color::Gray)),
        ListStatus::Failed(e) => Some((
            format!("Error loading data: {}\nPress r to retry.", e),
            Color::LightRed,
        )),
        ListStatus::Loaded => None,
    };
    if let Some((text, color)) = message {
        let paragraph = Paragraph::new(text)
            .style(Style::default().fg(color))
            .wrap(Wrap { trim: true })
            .block(block);
        f.render_widget(paragraph, chunks[1]);
        return;
    }

    let listed = state.listed();
    if listed.is_empty() {
        let paragraph = Paragraph::new(state.list.catalog.empty_message())
            .style(Style::default().fg(Color::Gray))
            .block(block);
        f.render_widget(paragraph, chunks[1]);
        return;
    }

    let name_width = (chunks[1].width as usize / 3).max(12);
    let items: Vec<ListItem> = listed
        .iter()
        .map(|listed| {
            let star = if listed.is_favorite { "★ " } else { "☆ " };
            let item = &listed.item;
            ListItem::new(Line::from(vec![
                Span::styled(star, Style::default().fg(Color::Yellow)),
                Span::styled(
                    format!(
                        "{:<width$}",
                        truncate(item.display_name(), name_width),
                        width = name_width
                    ),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(" {:<9}", item.kind_label()),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    item.metric_pills(METRIC_PILL_LIMIT).join(" · "),
                    Style::default().fg(Color::LightBlue),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");
    let mut list_state = ListState::default().with_selected(Some(state.list.selected));
    f.render_stateful_widget(list, chunks[1], &mut list_state);
}
