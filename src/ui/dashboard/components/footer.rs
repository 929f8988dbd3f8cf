//! Dashboard footer component
//!
//! Renders the key hints for the current view

use super::super::state::{DashboardState, View};
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

pub fn key_hints(state: &DashboardState) -> &'static str {
    match &state.view {
        View::List if state.list.searching => "[Enter/Esc] Done | Type to search",
        View::List => {
            "[Q] Quit | [J/K] Move | [/] Search | [Tab] View | [F] Favorite | [Enter] Open | [R] Reload"
        }
        View::Detail(_) => "[Esc] Back | [J/K] Metric | [Enter/D] Team drill-down | [R] Refresh",
        View::Drill(..) => "[Esc] Back | [R] Retry | [Q] Quit",
    }
}

pub fn render_footer(f: &mut Frame, area: Rect, state: &DashboardState) {
    let footer = Paragraph::new(key_hints(state))
        .alignment(Alignment::Center)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_type(BorderType::Thick),
        );
    f.render_widget(footer, area);
}
