//! Board detail: metric list on the left, the selected metric's chart on the right.

use super::super::state::DetailScreen;
use crate::charts::{ChartData, ChartState};
use crate::drilldown::format_value;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Bar, BarChart, BarGroup, Block, BorderType, Borders, List, ListItem, ListState, Paragraph,
    Wrap,
};

const SERIES_COLORS: [Color; 6] = [
    Color::Cyan,
    Color::Yellow,
    Color::Green,
    Color::Magenta,
    Color::LightBlue,
    Color::LightRed,
];

pub fn render_detail(f: &mut Frame, area: Rect, detail: &DetailScreen) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(area);

    let metrics = detail.item.metrics();
    let items: Vec<ListItem> = metrics
        .iter()
        .zip(&detail.charts)
        .map(|(metric, chart)| {
            let marker = match chart {
                ChartState::Loading => "… ",
                ChartState::Failed(_) => "✗ ",
                ChartState::Empty => "○ ",
                ChartState::Ready(_) => "● ",
            };
            ListItem::new(format!("{}{}", marker, metric.metric_name))
        })
        .collect();

    let metric_block = Block::default()
        .title("METRICS")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan));

    if items.is_empty() {
        f.render_widget(
            Paragraph::new("This board has no metrics").block(metric_block),
            chunks[0],
        );
    } else {
        let list = List::new(items)
            .block(metric_block)
            .highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol("> ");
        let mut list_state = ListState::default().with_selected(Some(detail.selected));
        f.render_stateful_widget(list, chunks[0], &mut list_state);
    }

    let (Some(metric), Some(chart)) = (
        metrics.get(detail.selected),
        detail.charts.get(detail.selected),
    ) else {
        return;
    };
    render_chart(f, chunks[1], &metric.metric_name, chart);
}

fn render_chart(f: &mut Frame, area: Rect, title: &str, chart: &ChartState) {
    let block = Block::default()
        .title(title.to_uppercase())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan));

    if let Some(placeholder) = chart.placeholder(title) {
        let color = match chart {
            ChartState::Failed(_) => Color::LightRed,
            _ => Color::Gray,
        };
        f.render_widget(
            Paragraph::new(placeholder)
                .style(Style::default().fg(color))
                .wrap(Wrap { trim: true })
                .block(block),
            area,
        );
        return;
    }

    if let ChartState::Ready(data) = chart {
        render_bars(f, area, data, block);
    }
}

/// One bar group per category with a bar per series.
pub fn render_bars(f: &mut Frame, area: Rect, data: &ChartData, block: Block) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Fill(1)])
        .split(block.inner(area));
    f.render_widget(block, area);

    let legend: Vec<Span> = data
        .series
        .iter()
        .enumerate()
        .map(|(i, series)| {
            Span::styled(
                format!("■ {}  ", series.name),
                Style::default().fg(SERIES_COLORS[i % SERIES_COLORS.len()]),
            )
        })
        .collect();
    f.render_widget(Paragraph::new(Line::from(legend)), chunks[0]);

    let mut chart = BarChart::default()
        .bar_width(3)
        .bar_gap(0)
        .group_gap(2)
        .value_style(Style::default().add_modifier(Modifier::BOLD));
    for (index, category) in data.categories.iter().enumerate() {
        let bars: Vec<Bar> = data
            .series
            .iter()
            .enumerate()
            .map(|(i, series)| {
                let value = series.values.get(index).copied().unwrap_or(0.0);
                Bar::default()
                    .value(value.max(0.0).round() as u64)
                    .text_value(format_value(Some(value)))
                    .style(Style::default().fg(SERIES_COLORS[i % SERIES_COLORS.len()]))
            })
            .collect();
        chart = chart.data(
            BarGroup::default()
                .label(Line::from(category.clone()))
                .bars(&bars),
        );
    }
    f.render_widget(chart, chunks[1]);
}
