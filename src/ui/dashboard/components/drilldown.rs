//! Team drill-down: per-team bars above a date/team table.

use super::super::state::{DrillScreen, DrillState};
use super::detail::render_bars;
use crate::drilldown::format_value;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Row, Table, Wrap};

pub fn render_drilldown(f: &mut Frame, area: Rect, drill: &DrillScreen) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Percentage(50),
            Constraint::Fill(1),
        ])
        .split(area);

    f.render_widget(
        Paragraph::new(drill.payload.subtitle()).style(Style::default().fg(Color::Gray)),
        chunks[0],
    );

    let chart_block = Block::default()
        .title(drill.payload.title())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan));

    let (rows, chart) = match &drill.state {
        DrillState::Loading => {
            f.render_widget(
                Paragraph::new("Loading team metrics...").block(chart_block),
                chunks[1],
            );
            return;
        }
        DrillState::Failed(e) => {
            f.render_widget(
                Paragraph::new(format!("Error loading metric details: {}\nPress r to retry.", e))
                    .style(Style::default().fg(Color::LightRed))
                    .wrap(Wrap { trim: true })
                    .block(chart_block),
                chunks[1],
            );
            return;
        }
        DrillState::Ready { rows, chart } => (rows, chart),
    };

    if chart.is_empty() {
        f.render_widget(
            Paragraph::new("No team data for this metric and range").block(chart_block),
            chunks[1],
        );
    } else {
        render_bars(f, chunks[1], chart, chart_block);
    }

    let table_rows: Vec<Row> = rows
        .iter()
        .map(|row| {
            Row::new(vec![
                row.date.clone(),
                row.team_name.clone(),
                format_value(row.total_metric_value),
                format_value(row.total_count),
            ])
        })
        .collect();
    let table = Table::new(
        table_rows,
        [
            Constraint::Percentage(25),
            Constraint::Percentage(35),
            Constraint::Percentage(20),
            Constraint::Percentage(20),
        ],
    )
    .header(
        Row::new(vec!["Date", "Team", "Total Value", "Count"]).style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
    )
    .block(
        Block::default()
            .title("TEAMS")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(table, chunks[2]);
}
