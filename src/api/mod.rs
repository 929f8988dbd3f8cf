use crate::api::error::ApiError;
use crate::api::types::{
    Author, AuthorsRequest, BenchmarkRequest, DashboardRecord, GraphRequestParams, LoginPayload,
    LoginResponse, MetricSummaryResponse, PreferencesUpdate, ProcessSeriesRequest, ProcessSummary,
    ProcessSummaryRequest, Team, TeamMetricRequest, TeamMetricsResponse, TemplateRecord,
    TimeMetric,
};

pub(crate) mod client;
pub use client::ApiClient;
pub mod error;
pub mod types;

#[cfg(test)]
use mockall::{automock, predicate::*};

/// Every remote call the CLI makes. Implemented over HTTP by [`ApiClient`].
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait DashboardApi: Send + Sync {
    /// Exchanges credentials for a session.
    async fn login(&self, payload: &LoginPayload) -> Result<LoginResponse, ApiError>;

    /// Templates predefined for an organization.
    async fn org_templates(&self, org_id: u64) -> Result<Vec<TemplateRecord>, ApiError>;

    /// Boards saved by or shared with a user.
    async fn user_dashboards(
        &self,
        org_id: u64,
        user_id: u64,
    ) -> Result<Vec<DashboardRecord>, ApiError>;

    /// Time series for one metric of a board.
    async fn metric_graph(
        &self,
        metric_key: &str,
        params: &GraphRequestParams,
    ) -> Result<MetricSummaryResponse, ApiError>;

    /// Per-team values of one metric, grouped by date.
    async fn team_metrics(
        &self,
        request: &TeamMetricRequest,
    ) -> Result<TeamMetricsResponse, ApiError>;

    /// Summary and benchmark band for one metric.
    async fn metric_summary(
        &self,
        metric_type: &str,
        params: &GraphRequestParams,
    ) -> Result<MetricSummaryResponse, ApiError>;

    /// Raw benchmark data. The shape is not documented, so it is passed through.
    async fn benchmark(&self, request: &BenchmarkRequest) -> Result<serde_json::Value, ApiError>;

    /// Teams visible to a user, flattened from the hierarchy.
    async fn hierarchical_teams(&self, user_id: u64, org_id: u64) -> Result<Vec<Team>, ApiError>;

    /// Authors active in the given teams during a date range.
    async fn team_authors(
        &self,
        org_id: u64,
        request: &AuthorsRequest,
    ) -> Result<Vec<Author>, ApiError>;

    /// Branch names of the given repositories, via GraphQL.
    async fn branches(&self, repo_ids: &[u64]) -> Result<Vec<String>, ApiError>;

    /// Development process time series.
    async fn process_series(
        &self,
        request: &ProcessSeriesRequest,
    ) -> Result<Vec<TimeMetric>, ApiError>;

    /// Pull-request phase summary.
    async fn process_summary(
        &self,
        request: &ProcessSummaryRequest,
    ) -> Result<ProcessSummary, ApiError>;

    /// Mirrors the favorites to the user's server-side preferences.
    async fn update_preferences(&self, update: &PreferencesUpdate) -> Result<(), ApiError>;
}
