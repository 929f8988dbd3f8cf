//! Insights API Client
//!
//! An HTTP client for the analytics API. Every authenticated request carries
//! the bearer token plus the user, organization and timezone headers.

use crate::api::DashboardApi;
use crate::api::error::ApiError;
use crate::api::types::{
    Author, AuthorsRequest, BenchmarkRequest, BranchVariables, BranchesResponse, DashboardRecord,
    GET_BRANCHES_QUERY, GraphQlRequest, GraphRequestParams, ListEnvelope, LoginPayload,
    LoginResponse, MetricSummaryResponse, PreferencesUpdate, ProcessSeriesRequest,
    ProcessSeriesResponse, ProcessSummary, ProcessSummaryRecord, ProcessSummaryRequest, Team,
    TeamMetricRequest, TeamMetricsResponse, TemplateRecord, TimeMetric,
};
use crate::config::Config;
use crate::consts::cli_consts::http;
use crate::environment::Environment;
use log::{debug, error};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Client, ClientBuilder, Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

// User-Agent string with CLI version
const CLIENT_USER_AGENT: &str = concat!("insights-cli/", env!("CARGO_PKG_VERSION"));

/// Body of the metric-summary endpoint: the graph filters plus the metric.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MetricTypedParams<'a> {
    #[serde(flatten)]
    params: &'a GraphRequestParams,
    metric_type: &'a str,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    environment: Environment,
    session: Option<Config>,
    timezone: String,
}

impl ApiClient {
    pub fn new(environment: Environment) -> Result<Self, ApiError> {
        let client = ClientBuilder::new()
            .connect_timeout(http::connect_timeout())
            .timeout(http::request_timeout())
            .build()?;
        let timezone = iana_time_zone::get_timezone().unwrap_or_else(|_| String::from("UTC"));
        Ok(Self {
            client,
            environment,
            session: None,
            timezone,
        })
    }

    /// Attaches a saved session; its tokens and ids go out with every request.
    pub fn with_session(mut self, session: Config) -> Self {
        self.session = Some(session);
        self
    }

    fn build_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.environment.api_url().trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    fn header_pairs(&self) -> Vec<(HeaderName, String)> {
        let mut pairs = vec![
            (ACCEPT, "*/*".to_string()),
            (USER_AGENT, CLIENT_USER_AGENT.to_string()),
            (HeaderName::from_static("x-timezone"), self.timezone.clone()),
        ];
        let Some(session) = &self.session else {
            return pairs;
        };
        if let Some(token) = &session.auth_token {
            pairs.push((AUTHORIZATION, format!("Bearer {}", token)));
        }
        if let Some(token) = session.effective_access_token() {
            pairs.push((HeaderName::from_static("x-access-token"), token.to_string()));
        }
        let user_id = session.user_id.to_string();
        pairs.push((HeaderName::from_static("userid"), user_id.clone()));
        pairs.push((HeaderName::from_static("x-user-id"), user_id));
        pairs.push((
            HeaderName::from_static("x-organization-id"),
            session.organization_id.to_string(),
        ));
        pairs
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in self.header_pairs() {
            match HeaderValue::from_str(&value) {
                Ok(value) => {
                    headers.insert(name, value);
                }
                Err(_) => debug!("Skipping header {} with a non-ASCII value", name),
            }
        }
        headers
    }

    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let url = self.build_url(endpoint);
        debug!("{} {}", method, url);
        self.client.request(method, url).headers(self.headers())
    }

    fn decode_response<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
        serde_json::from_slice(bytes).map_err(ApiError::Decode)
    }

    async fn handle_response_status(response: Response) -> Result<Response, ApiError> {
        if !response.status().is_success() {
            return Err(ApiError::from_response(response).await);
        }
        Ok(response)
    }

    async fn get_request<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let response = self.request(Method::GET, endpoint).send().await?;
        let response = Self::handle_response_status(response).await?;
        let response_bytes = response.bytes().await?;
        Self::decode_response(&response_bytes)
    }

    async fn json_request<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.request(method, endpoint).json(body).send().await?;
        let response = Self::handle_response_status(response).await?;
        let response_bytes = response.bytes().await?;
        Self::decode_response(&response_bytes)
    }

    async fn json_request_no_response<B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        let response = self.request(method, endpoint).json(body).send().await?;
        Self::handle_response_status(response).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl DashboardApi for ApiClient {
    async fn login(&self, payload: &LoginPayload) -> Result<LoginResponse, ApiError> {
        self.json_request(Method::POST, "auth/login/native", payload)
            .await
    }

    async fn org_templates(&self, org_id: u64) -> Result<Vec<TemplateRecord>, ApiError> {
        let endpoint = format!("dashboards/templates/org/{}", org_id);
        let templates: ListEnvelope<TemplateRecord> = self.get_request(&endpoint).await?;
        Ok(templates.into_vec())
    }

    async fn user_dashboards(
        &self,
        org_id: u64,
        user_id: u64,
    ) -> Result<Vec<DashboardRecord>, ApiError> {
        let endpoint = format!("dashboards/{}/user/{}", org_id, user_id);
        let dashboards: ListEnvelope<DashboardRecord> = self.get_request(&endpoint).await?;
        Ok(dashboards.into_vec())
    }

    async fn metric_graph(
        &self,
        metric_key: &str,
        params: &GraphRequestParams,
    ) -> Result<MetricSummaryResponse, ApiError> {
        let endpoint = format!("graph/{}", urlencoding::encode(metric_key));
        self.json_request(Method::POST, &endpoint, params).await
    }

    async fn team_metrics(
        &self,
        request: &TeamMetricRequest,
    ) -> Result<TeamMetricsResponse, ApiError> {
        self.json_request(Method::POST, "overview/v2/team/metric", request)
            .await
    }

    async fn metric_summary(
        &self,
        metric_type: &str,
        params: &GraphRequestParams,
    ) -> Result<MetricSummaryResponse, ApiError> {
        let body = MetricTypedParams {
            params,
            metric_type,
        };
        self.json_request(Method::POST, "overview/v2/team/metric-summary", &body)
            .await
    }

    async fn benchmark(&self, request: &BenchmarkRequest) -> Result<serde_json::Value, ApiError> {
        self.json_request(Method::POST, "benchmark/data", request)
            .await
    }

    async fn hierarchical_teams(&self, user_id: u64, org_id: u64) -> Result<Vec<Team>, ApiError> {
        let endpoint = format!("team/user/{}/hierarchical?orgId={}", user_id, org_id);
        let teams: Option<ListEnvelope<Team>> = self.get_request(&endpoint).await?;
        Ok(teams.map(ListEnvelope::into_vec).unwrap_or_default())
    }

    async fn team_authors(
        &self,
        org_id: u64,
        request: &AuthorsRequest,
    ) -> Result<Vec<Author>, ApiError> {
        let endpoint = format!("team/authors?orgId={}", org_id);
        let authors: Option<ListEnvelope<Author>> =
            self.json_request(Method::POST, &endpoint, request).await?;
        Ok(authors.map(ListEnvelope::into_vec).unwrap_or_default())
    }

    async fn branches(&self, repo_ids: &[u64]) -> Result<Vec<String>, ApiError> {
        let request = GraphQlRequest {
            query: GET_BRANCHES_QUERY,
            variables: BranchVariables {
                repo_ids: repo_ids.to_vec(),
            },
        };
        let response: BranchesResponse =
            self.json_request(Method::POST, "graphql", &request).await?;
        match response.data.and_then(|data| data.get_branches) {
            Some(branches) => Ok(branches),
            None => {
                error!("Invalid response format from getBranches");
                Ok(Vec::new())
            }
        }
    }

    async fn process_series(
        &self,
        request: &ProcessSeriesRequest,
    ) -> Result<Vec<TimeMetric>, ApiError> {
        let response: ProcessSeriesResponse = self
            .json_request(Method::POST, "metric/process", request)
            .await?;
        Ok(response.into_vec())
    }

    async fn process_summary(
        &self,
        request: &ProcessSummaryRequest,
    ) -> Result<ProcessSummary, ApiError> {
        let record: ProcessSummaryRecord = self
            .json_request(Method::POST, "process/pullrequest", request)
            .await?;
        Ok(ProcessSummary::from(record))
    }

    async fn update_preferences(&self, update: &PreferencesUpdate) -> Result<(), ApiError> {
        self.json_request_no_response(Method::PUT, "user/update-user-preferences", update)
            .await
    }
}

#[cfg(test)]
/// These are ignored by default since they require a live API and valid credentials.
mod live_api_tests {
    use crate::api::DashboardApi;
    use crate::config::{Config, get_config_path};
    use crate::environment::Environment;

    fn live_client() -> super::ApiClient {
        let config = Config::load_from_file(&get_config_path().unwrap())
            .expect("log in with the CLI before running live tests");
        super::ApiClient::new(Environment::Production)
            .unwrap()
            .with_session(config)
    }

    #[tokio::test]
    #[ignore] // This test requires a live API and a saved session.
    /// Should list the organization's templates.
    async fn test_org_templates() {
        let client = live_client();
        let org_id = client.session.as_ref().unwrap().organization_id;
        match client.org_templates(org_id).await {
            Ok(templates) => println!("Got {} templates", templates.len()),
            Err(e) => panic!("Failed to fetch templates: {}", e),
        }
    }

    #[tokio::test]
    #[ignore] // This test requires a live API and a saved session.
    /// Should list the teams visible to the user.
    async fn test_hierarchical_teams() {
        let client = live_client();
        let session = client.session.clone().unwrap();
        match client
            .hierarchical_teams(session.user_id, session.organization_id)
            .await
        {
            Ok(teams) => println!("Got {} teams", teams.len()),
            Err(e) => panic!("Failed to fetch teams: {}", e),
        }
    }
}
