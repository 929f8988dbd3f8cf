//! Dashboard main renderer

use super::components::{board_list, detail, drilldown, footer, header, logs};
use super::state::{DashboardState, View};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Color, Style};
use ratatui::widgets::Block;

pub fn render_dashboard(f: &mut Frame, state: &DashboardState) {
    if state.with_background_color {
        f.render_widget(
            Block::default().style(Style::default().bg(Color::Rgb(16, 20, 24))),
            f.area(),
        );
    }

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Fill(1),
            Constraint::Percentage(25),
            Constraint::Length(2),
        ])
        .margin(1)
        .split(f.area());

    header::render_header(f, main_chunks[0], state);
    match &state.view {
        View::List => board_list::render_board_list(f, main_chunks[1], state),
        View::Detail(screen) => detail::render_detail(f, main_chunks[1], screen),
        View::Drill(screen, _) => drilldown::render_drilldown(f, main_chunks[1], screen),
    }
    logs::render_logs_panel(f, main_chunks[2], state);
    footer::render_footer(f, main_chunks[3], state);
}
