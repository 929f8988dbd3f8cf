//! Dashboard header component
//!
//! Renders the title and the active filters

use super::super::state::{DashboardState, View};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

pub fn render_header(f: &mut Frame, area: Rect, state: &DashboardState) {
    let header_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(2)])
        .split(area);

    let version = env!("CARGO_PKG_VERSION");
    let location = match &state.view {
        View::List => "BOARDS".to_string(),
        View::Detail(detail) => detail.item.display_name().to_uppercase(),
        View::Drill(drill, _) => drill.payload.title().to_uppercase(),
    };
    let title = Paragraph::new(format!("INSIGHTS v{} | {}", version, location))
        .alignment(Alignment::Center)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_type(BorderType::Thick),
        );
    f.render_widget(title, header_chunks[0]);

    let filters = &state.filters;
    let mut context = format!(
        "{} | {} | {} | {} team(s)",
        state.environment,
        filters.range.label(),
        filters.granularity,
        filters.teams.len()
    );
    if !state.session.user_name.is_empty() {
        context = format!("{} | {}", state.session.user_name, context);
    }
    let context = Paragraph::new(context)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray))
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    f.render_widget(context, header_chunks[1]);
}
