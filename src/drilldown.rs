//! Metric drill-down: per-team values behind one chart.

use crate::api::types::{GraphData, TeamMetricRequest};
use crate::filters::DateRange;

/// What the drill-down view is opened with. Built from the chart's filters
/// and held in memory only.
#[derive(Debug, Clone, PartialEq)]
pub struct DrillDownPayload {
    pub request: TeamMetricRequest,
}

impl DrillDownPayload {
    pub fn new(request: TeamMetricRequest) -> Self {
        Self { request }
    }

    /// "Team Metrics for cycle time" from metric type "cycle-time".
    pub fn title(&self) -> String {
        let metric = self.request.metric_type.replace('-', " ");
        let metric = if metric.trim().is_empty() {
            "Metric".to_string()
        } else {
            metric
        };
        format!("Team Metrics for {}", metric)
    }

    pub fn subtitle(&self) -> String {
        let range = DateRange {
            start: self.request.start_date,
            end: self.request.end_date,
        };
        format!(
            "{} | {} team(s) selected",
            range.label(),
            self.request.team_ids.len()
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrillDownRow {
    pub date: String,
    pub team_name: String,
    pub total_metric_value: Option<f64>,
    pub total_count: Option<f64>,
}

/// One row per (date, team) entry, dates in response order.
pub fn table_rows(graph: &GraphData) -> Vec<DrillDownRow> {
    graph
        .iter()
        .flat_map(|(date, teams)| {
            teams.iter().map(move |team| DrillDownRow {
                date: date.clone(),
                team_name: team.team_name.clone(),
                total_metric_value: team.total_metric_value,
                total_count: team.total_count,
            })
        })
        .collect()
}

pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v.fract() == 0.0 => format!("{}", v as i64),
        Some(v) => format!("{:.2}", v),
        None => "-".to_string(),
    }
}
