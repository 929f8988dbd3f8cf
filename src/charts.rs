//! Chart shaping
//!
//! Turns time-series responses into labelled categories plus numeric series
//! aligned by index. Missing values become 0; nothing is interpolated.

use crate::api::error::ApiError;
use crate::api::types::{CockpitPoint, GraphData, TimeMetric};

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

impl Series {
    fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartData {
    pub categories: Vec<String>,
    pub series: Vec<Series>,
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() || self.series.is_empty()
    }
}

#[cfg(test)]
impl ChartData {
    pub fn series_named(&self, name: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.name == name)
    }
}

/// Lifecycle of one chart. A failed fetch and an empty result are reported differently.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartState {
    Loading,
    Failed(String),
    Empty,
    Ready(ChartData),
}

impl ChartState {
    pub fn from_result(result: Result<ChartData, ApiError>) -> Self {
        match result {
            Ok(data) if data.is_empty() => ChartState::Empty,
            Ok(data) => ChartState::Ready(data),
            Err(e) => ChartState::Failed(e.to_pretty().unwrap_or_else(|| e.to_string())),
        }
    }

    /// Text shown in place of the chart, or `None` when there is data to draw.
    pub fn placeholder(&self, metric_name: &str) -> Option<String> {
        match self {
            ChartState::Loading => Some(format!("Loading {}...", metric_name)),
            ChartState::Failed(_) => Some(format!(
                "No Data to Show - {}. Changing filters might help",
                metric_name
            )),
            ChartState::Empty => Some(format!(
                "No data available for: {}. Try adjusting your filters or date range",
                metric_name
            )),
            ChartState::Ready(_) => None,
        }
    }
}

/// Metric graph: one category per point, three series.
pub fn cockpit_chart(points: &[CockpitPoint]) -> ChartData {
    let categories = points.iter().map(|p| p.formatted_date.clone()).collect();
    let column = |value: fn(&CockpitPoint) -> Option<f64>| -> Vec<f64> {
        points.iter().map(|p| value(p).unwrap_or(0.0)).collect()
    };
    ChartData {
        categories,
        series: vec![
            Series::new("Percentage", column(|p| p.percentage)),
            Series::new("Total Metric Count", column(|p| p.total_metric_count)),
            Series::new("Total Count", column(|p| p.total_count)),
        ],
    }
}

/// Team drill-down: dates in response order, one series per team in
/// first-seen order, 0 where a team has no entry for a date.
pub fn team_chart(graph: &GraphData) -> ChartData {
    let mut teams: Vec<(u64, String)> = Vec::new();
    for (_, entries) in graph.iter() {
        for entry in entries {
            if !teams.iter().any(|(id, _)| *id == entry.team_id) {
                teams.push((entry.team_id, entry.team_name.clone()));
            }
        }
    }

    let categories = graph.iter().map(|(date, _)| date.clone()).collect();
    let series = teams
        .into_iter()
        .map(|(team_id, name)| {
            let values = graph
                .iter()
                .map(|(_, entries)| {
                    entries
                        .iter()
                        .find(|e| e.team_id == team_id)
                        .and_then(|e| e.total_metric_value)
                        .unwrap_or(0.0)
                })
                .collect();
            Series::new(name, values)
        })
        .collect();

    ChartData { categories, series }
}

/// Process time series. Durations are plotted in hours.
pub fn process_chart(metrics: &[TimeMetric]) -> ChartData {
    let categories = metrics.iter().map(|m| m.period.clone()).collect();
    let hours = |value: fn(&TimeMetric) -> Option<f64>| -> Vec<f64> {
        metrics
            .iter()
            .map(|m| minutes_to_hours(value(m).unwrap_or(0.0)))
            .collect()
    };
    ChartData {
        categories,
        series: vec![
            Series::new("Coding Time", hours(|m| m.coding_time)),
            Series::new("Review Time", hours(|m| m.reviewed_time)),
            Series::new("Deploy Time", hours(|m| m.deploy_time)),
            Series::new("Cycle Time", hours(|m| m.cycle_time)),
            Series::new(
                "PR Count",
                metrics
                    .iter()
                    .map(|m| m.open_to_merged_count.unwrap_or(0.0))
                    .collect(),
            ),
        ],
    }
}

/// Minutes as decimal hours, rounded to two places.
pub fn minutes_to_hours(minutes: f64) -> f64 {
    (minutes / 60.0 * 100.0).round() / 100.0
}

/// Minutes as zero-padded `HH:MM`.
pub fn format_minutes_hhmm(minutes: f64) -> String {
    let total = minutes.max(0.0).round() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::TeamMetric;

    fn team(id: u64, name: &str, value: Option<f64>) -> TeamMetric {
        TeamMetric {
            team_id: id,
            team_name: name.to_string(),
            total_metric_value: value,
            ..TeamMetric::default()
        }
    }

    #[test]
    fn cockpit_series_align_with_dates() {
        let points = vec![
            CockpitPoint {
                formatted_date: "W1".to_string(),
                percentage: Some(40.0),
                total_metric_count: Some(4.0),
                total_count: Some(10.0),
                ..CockpitPoint::default()
            },
            CockpitPoint {
                formatted_date: "W2".to_string(),
                ..CockpitPoint::default()
            },
        ];
        let chart = cockpit_chart(&points);
        assert_eq!(chart.categories, vec!["W1", "W2"]);
        assert_eq!(chart.series.len(), 3);
        assert_eq!(chart.series_named("Percentage").unwrap().values, vec![40.0, 0.0]);
        assert_eq!(chart.series_named("Total Count").unwrap().values, vec![10.0, 0.0]);
    }

    #[test]
    /// A team missing on a date gets 0 there; teams keep first-seen order.
    fn team_chart_fills_absent_teams_with_zero() {
        let graph = GraphData(vec![
            ("May 12".to_string(), vec![team(7, "Web", Some(3.0))]),
            (
                "May 05".to_string(),
                vec![team(2, "Core", Some(5.0)), team(7, "Web", None)],
            ),
        ]);
        let chart = team_chart(&graph);
        assert_eq!(chart.categories, vec!["May 12", "May 05"]);
        let names: Vec<&str> = chart.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Web", "Core"]);
        assert_eq!(chart.series[0].values, vec![3.0, 0.0]);
        assert_eq!(chart.series[1].values, vec![0.0, 5.0]);
    }

    #[test]
    fn process_chart_converts_minutes() {
        let metrics = vec![TimeMetric {
            period: "2024-W20".to_string(),
            coding_time: Some(90.0),
            cycle_time: Some(100.0),
            open_to_merged_count: Some(6.0),
            ..TimeMetric::default()
        }];
        let chart = process_chart(&metrics);
        assert_eq!(chart.series_named("Coding Time").unwrap().values, vec![1.5]);
        assert_eq!(chart.series_named("Cycle Time").unwrap().values, vec![1.67]);
        assert_eq!(chart.series_named("Review Time").unwrap().values, vec![0.0]);
        assert_eq!(chart.series_named("PR Count").unwrap().values, vec![6.0]);
    }

    #[test]
    fn formats_minutes() {
        assert_eq!(format_minutes_hhmm(0.0), "00:00");
        assert_eq!(format_minutes_hhmm(125.0), "02:05");
        assert_eq!(format_minutes_hhmm(119.6), "02:00");
        assert_eq!(minutes_to_hours(45.0), 0.75);
    }

    #[test]
    fn state_separates_failure_from_empty() {
        assert_eq!(ChartState::from_result(Ok(ChartData::default())), ChartState::Empty);
        let failed = ChartState::from_result(Err(ApiError::NotLoggedIn));
        assert!(matches!(failed, ChartState::Failed(_)));
        assert_ne!(
            failed.placeholder("Cycle Time"),
            ChartState::Empty.placeholder("Cycle Time")
        );

        let ready = ChartState::from_result(Ok(cockpit_chart(&[CockpitPoint::default()])));
        assert_eq!(ready.placeholder("x"), None);
    }
}
