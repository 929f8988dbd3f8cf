//! Wire types exchanged with the analytics API.
//!
//! Field names follow the server's camelCase JSON. Numeric values that the
//! server may omit are `Option`s; the chart shapers treat a missing value as 0.

use crate::filters::Granularity;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decodes an explicit `null` the same way as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// AUTHENTICATION
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    pub initial_email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub org_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    pub organization: Organization,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: User,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub application_access: Option<bool>,
    #[serde(default)]
    pub is_new_user: Option<bool>,
}

// =============================================================================
// TEMPLATES AND BOARDS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metric_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metric_key: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metric_table_key: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metric_description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metric_category: String,
    #[serde(default)]
    pub media_link: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub yaxis_suffix: Option<String>,
}

/// An organization template as returned by `/dashboards/templates/org/{org}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRecord {
    pub id: u64,
    #[serde(default)]
    pub template_name: Option<String>,
    #[serde(default)]
    pub template_description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metrics_list: Vec<Metric>,
    #[serde(default)]
    pub dashboard_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A saved board as returned by `/dashboards/{org}/user/{user}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardRecord {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub organization_id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_id: u64,
    #[serde(default)]
    pub dashboard_name: Option<String>,
    #[serde(default)]
    pub dashboard_description: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub modified_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metrics: Vec<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metrics_list: Vec<Metric>,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
}

/// Some list endpoints answer with a bare array, others wrap it in `{ "data": [...] }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListEnvelope<T> {
    Bare(Vec<T>),
    Wrapped {
        #[serde(default = "Vec::new")]
        data: Vec<T>,
    },
}

impl<T> ListEnvelope<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            ListEnvelope::Bare(items) => items,
            ListEnvelope::Wrapped { data } => data,
        }
    }
}

// =============================================================================
// TEAMS, AUTHORS, BRANCHES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorsRequest {
    pub team_ids: Vec<u64>,
    pub start_date: i64,
    pub end_date: i64,
}

pub const GET_BRANCHES_QUERY: &str =
    "query GetBranches($repoIds: [Int!]!) {\n  getBranches(repoIds: $repoIds)\n}";

#[derive(Debug, Clone, Serialize)]
pub struct GraphQlRequest<V> {
    pub query: &'static str,
    pub variables: V,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchVariables {
    pub repo_ids: Vec<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BranchesResponse {
    #[serde(default)]
    pub data: Option<BranchesData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchesData {
    #[serde(default)]
    pub get_branches: Option<Vec<String>>,
}

// =============================================================================
// METRIC GRAPHS
// =============================================================================

/// Common filter body for the graph and team-metric endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphRequestParams {
    pub user_id: u64,
    pub org_id: u64,
    pub organization_id: u64,
    pub start_date: i64,
    pub end_date: i64,
    pub filter_type: Granularity,
    pub team_ids: Vec<u64>,
    pub project_ids: Vec<u64>,
    pub advanced_filters: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BenchmarkInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub high: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub low: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub medium: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub elite: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CockpitPoint {
    #[serde(default)]
    pub percentage: Option<f64>,
    #[serde(default)]
    pub week_no: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub formatted_date: String,
    #[serde(default)]
    pub total_metric_count: Option<f64>,
    #[serde(default)]
    pub total_count: Option<f64>,
}

/// Response of `/graph/{metricKey}` and `/overview/v2/team/metric-summary`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSummaryResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub benchmark_info: BenchmarkInfo,
    #[serde(rename = "CockpitGraphData", default, deserialize_with = "null_as_default")]
    pub cockpit_graph_data: Vec<CockpitPoint>,
    #[serde(rename = "benchMarkResult", default, deserialize_with = "null_as_default")]
    pub benchmark_result: String,
    /// The server sends either a number or a preformatted string.
    #[serde(default)]
    pub change_percentage: serde_json::Value,
    #[serde(default)]
    pub primary_value: Option<f64>,
}

/// Body of `/overview/v2/team/metric`. Also the payload carried into the
/// drill-down view when a chart point is picked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMetricRequest {
    pub start_date: i64,
    pub end_date: i64,
    pub metric_type: String,
    pub main_team_metric: bool,
    pub team_ids: Vec<u64>,
    pub organization_id: u64,
    pub author_ids: Vec<u64>,
    pub group_by: Granularity,
    pub project_ids: Vec<u64>,
    pub advanced_filters: serde_json::Map<String, serde_json::Value>,
    pub signal: serde_json::Map<String, serde_json::Value>,
}

impl TeamMetricRequest {
    pub fn new(metric_type: &str, params: &GraphRequestParams) -> Self {
        Self {
            start_date: params.start_date,
            end_date: params.end_date,
            metric_type: metric_type.to_string(),
            main_team_metric: true,
            team_ids: params.team_ids.clone(),
            organization_id: params.organization_id,
            author_ids: Vec::new(),
            group_by: params.filter_type,
            project_ids: params.project_ids.clone(),
            advanced_filters: params.advanced_filters.clone(),
            signal: serde_json::Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMetric {
    pub team_id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub team_name: String,
    #[serde(default)]
    pub average_metric_value: Option<f64>,
    #[serde(default)]
    pub total_count: Option<f64>,
    #[serde(default)]
    pub total_metric_value: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub start_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub end_date: String,
}

/// Per-date team values, in the order the server listed the dates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphData(pub Vec<(String, Vec<TeamMetric>)>);

impl GraphData {
    pub fn iter(&self) -> impl Iterator<Item = &(String, Vec<TeamMetric>)> {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for GraphData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedDates;

        impl<'de> Visitor<'de> for OrderedDates {
            type Value = GraphData;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map from date label to team metrics")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<GraphData, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((date, teams)) = map.next_entry::<String, Vec<TeamMetric>>()? {
                    entries.push((date, teams));
                }
                Ok(GraphData(entries))
            }
        }

        deserializer.deserialize_map(OrderedDates)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMetricsResponse {
    #[serde(default)]
    pub graph_data: Option<GraphData>,
}

// =============================================================================
// PROCESS METRICS
// =============================================================================

/// Body of `/metric/process`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessSeriesRequest {
    pub repo_ids: Vec<u64>,
    pub start_date: i64,
    pub end_date: i64,
    pub author_ids: Vec<u64>,
    pub team_ids: Vec<u64>,
    pub branch: Vec<String>,
    pub user_id: u64,
    pub organization_id: u64,
    pub period_type: Granularity,
    pub project_ids: Vec<u64>,
    pub advanced_filters: serde_json::Map<String, serde_json::Value>,
    pub show_merged_prs: bool,
}

/// One period of the process time series. Durations are in minutes.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeMetric {
    #[serde(default, deserialize_with = "null_as_default")]
    pub period: String,
    #[serde(default)]
    pub event_date: Option<String>,
    #[serde(default)]
    pub generated: Option<bool>,
    #[serde(default)]
    pub coding_time: Option<f64>,
    #[serde(default)]
    pub reviewed_time: Option<f64>,
    #[serde(default)]
    pub deploy_time: Option<f64>,
    #[serde(default)]
    pub cycle_time: Option<f64>,
    #[serde(default)]
    pub open_to_merged_count: Option<f64>,
    #[serde(default)]
    pub commented_prs_count: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ProcessSeriesResponse {
    Bare(Vec<TimeMetric>),
    Wrapped {
        #[serde(default = "Vec::new")]
        metrics: Vec<TimeMetric>,
    },
}

impl ProcessSeriesResponse {
    pub fn into_vec(self) -> Vec<TimeMetric> {
        match self {
            ProcessSeriesResponse::Bare(metrics) => metrics,
            ProcessSeriesResponse::Wrapped { metrics } => metrics,
        }
    }
}

/// Body of `/process/pullrequest`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessSummaryRequest {
    pub org_id: u64,
    pub start_date: i64,
    pub end_date: i64,
    pub author_ids: Vec<u64>,
    pub team_ids: Vec<u64>,
    pub repo_ids: Vec<u64>,
    pub branch: Vec<String>,
    pub period_type: Granularity,
    pub show_merged_prs: bool,
    pub advanced_filters: serde_json::Map<String, serde_json::Value>,
    pub project_ids: Vec<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PhaseRecord {
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub count: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessSummaryRecord {
    #[serde(default)]
    pub coding_time: Option<String>,
    #[serde(default)]
    pub pickup_time: Option<String>,
    #[serde(default)]
    pub cycle_time: Option<String>,
    #[serde(default)]
    pub pr_count: Option<u64>,
    #[serde(default)]
    pub prs_with_comments: Option<u64>,
    #[serde(default)]
    pub coding_phase: Option<PhaseRecord>,
    #[serde(default)]
    pub pickup_phase: Option<PhaseRecord>,
    #[serde(default)]
    pub review_phase: Option<PhaseRecord>,
    #[serde(default)]
    pub merge_phase: Option<PhaseRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phase {
    pub time: String,
    pub count: u64,
}

/// Pull-request process summary with every missing field filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSummary {
    pub coding_time: String,
    pub pickup_time: String,
    pub cycle_time: String,
    pub pr_count: u64,
    pub prs_with_comments: u64,
    pub coding_phase: Phase,
    pub pickup_phase: Phase,
    pub review_phase: Phase,
    pub merge_phase: Phase,
}

fn phase_or(record: Option<PhaseRecord>, default_time: &str) -> Phase {
    let record = record.unwrap_or_default();
    Phase {
        time: record.time.unwrap_or_else(|| default_time.to_string()),
        count: record.count.unwrap_or(0),
    }
}

impl From<ProcessSummaryRecord> for ProcessSummary {
    fn from(record: ProcessSummaryRecord) -> Self {
        Self {
            coding_time: record.coding_time.unwrap_or_else(|| "0h 0m".to_string()),
            pickup_time: record.pickup_time.unwrap_or_else(|| "0m".to_string()),
            cycle_time: record.cycle_time.unwrap_or_else(|| "0h 0m".to_string()),
            pr_count: record.pr_count.unwrap_or(0),
            prs_with_comments: record.prs_with_comments.unwrap_or(0),
            coding_phase: phase_or(record.coding_phase, "0h 0m"),
            pickup_phase: phase_or(record.pickup_phase, "0m"),
            review_phase: phase_or(record.review_phase, "0h 0m"),
            merge_phase: phase_or(record.merge_phase, "0h 0m"),
        }
    }
}

// =============================================================================
// PREFERENCES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkRequest {
    pub metric_type: String,
    pub team_ids: Vec<u64>,
}

/// Body of `/user/update-user-preferences`: a mirror of the local favorites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesUpdate {
    pub dashboard_favorites: std::collections::BTreeMap<u64, bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// A null in one record must not fail the whole list.
    fn explicit_nulls_decode_as_defaults() {
        let board: DashboardRecord = serde_json::from_str(
            r#"{"id": 5, "dashboardName": "Ops", "userName": null, "createdDate": null,
                "metrics": null, "metricsList": null, "type": "public"}"#,
        )
        .unwrap();
        assert_eq!(board.user_name, "");
        assert!(board.metrics.is_empty());
        assert!(board.metrics_list.is_empty());
        assert_eq!(board.kind, "public");

        let metric: Metric = serde_json::from_str(
            r#"{"id": 10, "metricName": "Cycle Time", "metricKey": "cycle-time",
                "metricDescription": null, "metricCategory": null}"#,
        )
        .unwrap();
        assert_eq!(metric.metric_description, "");
        assert_eq!(metric.metric_key, "cycle-time");

        let boards: ListEnvelope<DashboardRecord> = serde_json::from_str(
            r#"[{"id": 1, "userName": null}, {"id": 2, "modifiedDate": null, "type": null}]"#,
        )
        .unwrap();
        assert_eq!(boards.into_vec().len(), 2);
    }

    #[test]
    /// Graph data keeps the server's date order rather than sorting the keys.
    fn graph_data_preserves_date_order() {
        let json = r#"{
            "graphData": {
                "12 May": [{"teamId": 1, "teamName": "Core", "totalMetricValue": 4}],
                "05 May": [{"teamId": 2, "teamName": "Web"}]
            }
        }"#;
        let response: TeamMetricsResponse = serde_json::from_str(json).unwrap();
        let graph = response.graph_data.unwrap();
        let dates: Vec<&str> = graph.iter().map(|(d, _)| d.as_str()).collect();
        assert_eq!(dates, vec!["12 May", "05 May"]);
        assert_eq!(graph.0[1].1[0].total_metric_value, None);
    }

    #[test]
    fn list_envelope_accepts_both_shapes() {
        let bare: ListEnvelope<Team> = serde_json::from_str(r#"[{"id": 1, "name": "Core"}]"#).unwrap();
        let wrapped: ListEnvelope<Team> =
            serde_json::from_str(r#"{"data": [{"id": 1, "name": "Core"}]}"#).unwrap();
        assert_eq!(bare.into_vec(), wrapped.into_vec());
    }

    #[test]
    fn dashboard_record_reads_type_field() {
        let json = r#"{"id": 7, "dashboardName": "Ops", "type": "public", "metrics": [1, 2]}"#;
        let record: DashboardRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.kind, "public");
        assert_eq!(record.metrics, vec![1, 2]);
        assert!(record.metrics_list.is_empty());
    }

    #[test]
    /// Missing phases fall back to zero durations and counts.
    fn process_summary_fills_defaults() {
        let record: ProcessSummaryRecord =
            serde_json::from_str(r#"{"prCount": 12, "reviewPhase": {"time": "3h 10m"}}"#).unwrap();
        let summary = ProcessSummary::from(record);
        assert_eq!(summary.pr_count, 12);
        assert_eq!(summary.pickup_time, "0m");
        assert_eq!(summary.coding_phase.time, "0h 0m");
        assert_eq!(summary.review_phase.time, "3h 10m");
        assert_eq!(summary.review_phase.count, 0);
    }

    #[test]
    fn metric_summary_reads_cockpit_data() {
        let json = r#"{
            "benchmarkInfo": {"High": "a", "Low": "b", "Medium": "c", "Elite": "d"},
            "CockpitGraphData": [{"formattedDate": "W1", "percentage": 50.5, "weekNo": 1}],
            "benchMarkResult": "Elite",
            "changePercentage": "12%",
            "primaryValue": 3
        }"#;
        let response: MetricSummaryResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.benchmark_info.elite, "d");
        assert_eq!(response.cockpit_graph_data[0].percentage, Some(50.5));
        assert_eq!(response.cockpit_graph_data[0].total_count, None);
        assert_eq!(response.benchmark_result, "Elite");
    }
}
