//! Command handlers
//!
//! Each handler does its fetching through [`DashboardApi`], reads and writes
//! selection state through the preference store, and returns the text to
//! print. Nothing here writes to stdout.

use crate::api::DashboardApi;
use crate::api::error::ApiError;
use crate::api::types::{Author, BenchmarkRequest, Team};
use crate::catalog::{Catalog, DisplayItem, ListedItem, ViewOption, opened_item};
use crate::charts::{ChartData, ChartState, cockpit_chart, format_minutes_hhmm, process_chart};
use crate::config::Config;
use crate::consts::cli_consts::METRIC_PILL_LIMIT;
use crate::drilldown::{DrillDownPayload, format_value, table_rows};
use crate::favorites::sync_favorites;
use crate::filters::{DatePreset, FilterState, Granularity, select_all, toggle_selection};
use crate::store::{PreferenceStore, StoreError};
use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use std::fmt::Write as _;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("No template or board with id {0}")]
    UnknownItem(u64),

    #[error("{0}")]
    Invalid(String),
}

/// Everything a handler needs: the API, local state and the logged-in user.
pub struct Context<'a> {
    pub api: &'a dyn DashboardApi,
    pub store: Arc<dyn PreferenceStore>,
    pub session: Config,
    pub now: DateTime<Utc>,
}

impl Context<'_> {
    fn filters(&self) -> FilterState {
        FilterState::load(self.store.as_ref(), self.now)
    }
}

/// Changes requested by `filters set`.
#[derive(Debug, Clone, Default)]
pub struct FilterUpdate {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub granularity: Option<Granularity>,
    pub repo_ids: Option<Vec<u64>>,
}

// =============================================================================
// RENDERING
// =============================================================================

/// Left-aligned columns separated by two spaces.
fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let mut out = line(headers.to_vec());
    out.push('\n');
    out.push_str(&rule.join("  "));
    for row in rows {
        out.push('\n');
        out.push_str(&line(row.iter().map(String::as_str).collect()));
    }
    out
}

fn star(is_favorite: bool) -> &'static str {
    if is_favorite { "★" } else { "☆" }
}

fn render_listing(listed: &[ListedItem]) -> String {
    let rows: Vec<Vec<String>> = listed
        .iter()
        .map(|l| {
            vec![
                star(l.is_favorite).to_string(),
                l.item.id().to_string(),
                l.item.display_name().to_string(),
                l.item.kind_label().to_string(),
                l.item.metric_pills(METRIC_PILL_LIMIT).join(", "),
            ]
        })
        .collect();
    render_table(&["", "ID", "Name", "Kind", "Metrics"], &rows)
}

/// One row per category, one column per series.
fn render_chart(chart: &ChartData) -> String {
    let mut headers = vec!["Date"];
    headers.extend(chart.series.iter().map(|s| s.name.as_str()));
    let rows: Vec<Vec<String>> = chart
        .categories
        .iter()
        .enumerate()
        .map(|(i, category)| {
            let mut row = vec![category.clone()];
            row.extend(
                chart
                    .series
                    .iter()
                    .map(|s| format_value(s.values.get(i).copied())),
            );
            row
        })
        .collect();
    render_table(&headers, &rows)
}

fn render_chart_state(state: &ChartState, metric_name: &str) -> String {
    match (state, state.placeholder(metric_name)) {
        (ChartState::Ready(chart), _) => render_chart(chart),
        (_, Some(text)) => text,
        (_, None) => String::new(),
    }
}

fn render_filters(filters: &FilterState) -> String {
    let list = |ids: &[u64]| -> String {
        if ids.is_empty() {
            "(none)".to_string()
        } else {
            ids.iter().map(u64::to_string).collect::<Vec<_>>().join(", ")
        }
    };
    let branches = if filters.branches.is_empty() {
        "(none)".to_string()
    } else {
        filters.branches.join(", ")
    };
    format!(
        "Date range:   {}\nGranularity:  {}\nTeams:        {}\nAuthors:      {}\nRepositories: {}\nBranches:     {}",
        filters.range.label(),
        filters.granularity,
        list(&filters.teams),
        list(&filters.authors),
        list(&filters.repo_ids),
        branches
    )
}

fn render_people(rows: Vec<(bool, u64, String)>) -> String {
    let rows: Vec<Vec<String>> = rows
        .into_iter()
        .map(|(selected, id, name)| {
            vec![
                if selected { "x" } else { " " }.to_string(),
                id.to_string(),
                name,
            ]
        })
        .collect();
    render_table(&["", "ID", "Name"], &rows)
}

// =============================================================================
// CATALOG
// =============================================================================

/// Fetches templates and boards together. Either failure fails the whole list.
pub async fn load_catalog(ctx: &Context<'_>) -> Result<Catalog, CommandError> {
    let org_id = ctx.session.organization_id;
    let (templates, boards) = tokio::join!(
        ctx.api.org_templates(org_id),
        ctx.api.user_dashboards(org_id, ctx.session.user_id)
    );
    let mut catalog = Catalog::new(ctx.store.clone());
    catalog.set_templates(templates?);
    catalog.set_boards(boards?);
    Ok(catalog)
}

pub async fn boards(
    ctx: &Context<'_>,
    search: Option<String>,
    view: ViewOption,
) -> Result<String, CommandError> {
    let mut catalog = load_catalog(ctx).await?;
    catalog.view.search_term = search.unwrap_or_default();
    catalog.view.selected_option = view;

    let listed = catalog.listed();
    if listed.is_empty() {
        return Ok(catalog.empty_message().to_string());
    }
    Ok(render_listing(&listed))
}

pub async fn favorite(ctx: &Context<'_>, id: u64) -> Result<String, CommandError> {
    let mut catalog = load_catalog(ctx).await?;
    let item = catalog.find(id).ok_or(CommandError::UnknownItem(id))?;

    let listed = catalog.toggle_favorite(id)?;
    let is_favorite = catalog.favorites().is_favorite(id);
    let synced = sync_favorites(ctx.api, catalog.favorites()).await;

    let mut out = if is_favorite {
        format!("{} {} added to favorites", star(true), item.display_name())
    } else {
        format!("{} {} removed from favorites", star(false), item.display_name())
    };
    if !synced {
        out.push_str("\nFavorites saved locally; the server copy was not updated.");
    }
    out.push_str("\n\n");
    out.push_str(&render_listing(&listed));
    Ok(out)
}

/// The last opened copy of an item if there is one, else the fetched lists.
async fn resolve_item(ctx: &Context<'_>, id: u64) -> Result<DisplayItem, CommandError> {
    if let Some(item) = opened_item(ctx.store.as_ref(), id) {
        log::debug!("Using cached copy of item {}", id);
        return Ok(item);
    }
    let catalog = load_catalog(ctx).await?;
    catalog.open(id)?.ok_or(CommandError::UnknownItem(id))
}

pub async fn board(ctx: &Context<'_>, id: u64) -> Result<String, CommandError> {
    let item = resolve_item(ctx, id).await?;
    let filters = ctx.filters();
    let params = filters.graph_params(&ctx.session);

    let mut out = format!("{} ({})\n", item.display_name(), item.kind_label());
    if !item.description().is_empty() {
        let _ = writeln!(out, "{}", item.description());
    }
    let _ = writeln!(
        out,
        "{} | {} | {} team(s)",
        filters.range.label(),
        filters.granularity,
        filters.teams.len()
    );

    if item.metrics().is_empty() {
        out.push_str("\nThis board has no metrics.");
        return Ok(out);
    }

    for metric in item.metrics() {
        let result = ctx
            .api
            .metric_graph(&metric.metric_key, &params)
            .await
            .map(|response| cockpit_chart(&response.cockpit_graph_data));
        if let Err(e) = &result {
            log::log!(e.log_level().into(), "{}: {}", metric.metric_name, e);
        }
        let state = ChartState::from_result(result);
        let _ = write!(
            out,
            "\n■ {}\n{}\n",
            metric.metric_name,
            render_chart_state(&state, &metric.metric_name)
        );
    }
    Ok(out.trim_end().to_string())
}

// =============================================================================
// CHARTS
// =============================================================================

pub async fn chart(ctx: &Context<'_>, metric_key: &str) -> Result<String, CommandError> {
    let params = ctx.filters().graph_params(&ctx.session);
    let result = ctx
        .api
        .metric_graph(metric_key, &params)
        .await
        .map(|response| cockpit_chart(&response.cockpit_graph_data));
    if let Err(e) = &result {
        log::log!(e.log_level().into(), "{}: {}", metric_key, e);
    }
    Ok(render_chart_state(&ChartState::from_result(result), metric_key))
}

pub async fn summary(ctx: &Context<'_>, metric_type: &str) -> Result<String, CommandError> {
    let filters = ctx.filters();
    let params = filters.graph_params(&ctx.session);
    let response = ctx.api.metric_summary(metric_type, &params).await?;

    let change = match &response.change_percentage {
        serde_json::Value::Number(n) => format!("{}%", n),
        serde_json::Value::String(s) => s.clone(),
        _ => "-".to_string(),
    };
    let info = &response.benchmark_info;
    let mut out = format!(
        "Result:     {}\nChange:     {}\nBenchmarks: Elite {} | High {} | Medium {} | Low {}",
        if response.benchmark_result.is_empty() {
            "-"
        } else {
            response.benchmark_result.as_str()
        },
        change,
        info.elite,
        info.high,
        info.medium,
        info.low
    );
    if let Some(value) = response.primary_value {
        let _ = write!(out, "\nValue:      {}", format_value(Some(value)));
    }

    let chart = cockpit_chart(&response.cockpit_graph_data);
    if !chart.is_empty() {
        out.push_str("\n\n");
        out.push_str(&render_chart(&chart));
    }

    let request = BenchmarkRequest {
        metric_type: metric_type.to_string(),
        team_ids: filters.teams.clone(),
    };
    match ctx.api.benchmark(&request).await {
        Ok(serde_json::Value::Null) => {}
        Ok(data) => {
            let pretty = serde_json::to_string_pretty(&data).unwrap_or_default();
            let _ = write!(out, "\n\nBenchmark data:\n{}", pretty);
        }
        Err(e) => log::debug!("Benchmark data unavailable: {}", e),
    }
    Ok(out)
}

pub async fn drill(ctx: &Context<'_>, metric_type: &str) -> Result<String, CommandError> {
    let payload = DrillDownPayload::new(
        ctx.filters()
            .team_metric_request(metric_type, &ctx.session),
    );
    let response = ctx.api.team_metrics(&payload.request).await?;

    let mut out = format!("{}\n{}\n\n", payload.title(), payload.subtitle());
    let graph = response.graph_data.unwrap_or_default();
    let rows: Vec<Vec<String>> = table_rows(&graph)
        .into_iter()
        .map(|row| {
            vec![
                row.date,
                row.team_name,
                format_value(row.total_metric_value),
                format_value(row.total_count),
            ]
        })
        .collect();
    if rows.is_empty() {
        out.push_str("No chart data available");
        return Ok(out);
    }
    out.push_str(&render_table(
        &["Date", "Team", "Metric Value", "Total Count"],
        &rows,
    ));
    out.push_str("\n\n");
    out.push_str(&render_chart(&crate::charts::team_chart(&graph)));
    Ok(out)
}

pub async fn process(ctx: &Context<'_>) -> Result<String, CommandError> {
    let request = ctx.filters().process_series_request(&ctx.session);
    let metrics = ctx.api.process_series(&request).await?;
    let chart = process_chart(&metrics);
    if chart.is_empty() {
        return Ok("No process data for the selected filters".to_string());
    }

    let mut out = String::from("Development Process Metrics (hours)\n");
    out.push_str(&render_chart(&chart));

    let cycle: Vec<f64> = metrics.iter().filter_map(|m| m.cycle_time).collect();
    if !cycle.is_empty() {
        let average = cycle.iter().sum::<f64>() / cycle.len() as f64;
        let _ = write!(out, "\n\nAverage cycle time: {}", format_minutes_hhmm(average));
    }
    Ok(out)
}

pub async fn process_summary(ctx: &Context<'_>) -> Result<String, CommandError> {
    let request = ctx.filters().process_summary_request(&ctx.session);
    let summary = ctx.api.process_summary(&request).await?;

    let mut out = format!(
        "Coding time: {}\nPickup time: {}\nCycle time:  {}\nPRs:         {} ({} with comments)\n\n",
        summary.coding_time,
        summary.pickup_time,
        summary.cycle_time,
        summary.pr_count,
        summary.prs_with_comments
    );
    let rows: Vec<Vec<String>> = [
        ("Coding", &summary.coding_phase),
        ("Pickup", &summary.pickup_phase),
        ("Review", &summary.review_phase),
        ("Merge", &summary.merge_phase),
    ]
    .into_iter()
    .map(|(name, phase)| vec![name.to_string(), phase.time.clone(), phase.count.to_string()])
    .collect();
    out.push_str(&render_table(&["Phase", "Time", "Count"], &rows));
    Ok(out)
}

// =============================================================================
// TEAMS, AUTHORS, BRANCHES
// =============================================================================

async fn fetch_teams(ctx: &Context<'_>) -> Result<Vec<Team>, CommandError> {
    Ok(ctx
        .api
        .hierarchical_teams(ctx.session.user_id, ctx.session.organization_id)
        .await?)
}

/// `None` when no team is selected; authors are only listed per team.
async fn fetch_authors(
    ctx: &Context<'_>,
    filters: &FilterState,
) -> Result<Option<Vec<Author>>, CommandError> {
    let Some(request) = filters.authors_request() else {
        return Ok(None);
    };
    let authors = ctx
        .api
        .team_authors(ctx.session.organization_id, &request)
        .await?;
    Ok(Some(authors))
}

const SELECT_TEAM_FIRST: &str =
    "Select at least one team first: insights filters toggle-team <TEAM_ID>";
const SELECT_REPOS_FIRST: &str =
    "No repositories selected: insights filters set --repo-ids <ID,ID,...>";

pub async fn teams(ctx: &Context<'_>) -> Result<String, CommandError> {
    let filters = ctx.filters();
    let teams = fetch_teams(ctx).await?;
    if teams.is_empty() {
        return Ok("No teams found".to_string());
    }
    Ok(render_people(
        teams
            .into_iter()
            .map(|t| (filters.teams.contains(&t.id), t.id, t.name))
            .collect(),
    ))
}

pub async fn authors(ctx: &Context<'_>) -> Result<String, CommandError> {
    let filters = ctx.filters();
    let Some(authors) = fetch_authors(ctx, &filters).await? else {
        return Ok(SELECT_TEAM_FIRST.to_string());
    };
    if authors.is_empty() {
        return Ok("No authors found for the selected teams".to_string());
    }
    Ok(render_people(
        authors
            .into_iter()
            .map(|a| (filters.authors.contains(&a.id), a.id, a.name))
            .collect(),
    ))
}

pub async fn branches(ctx: &Context<'_>) -> Result<String, CommandError> {
    let filters = ctx.filters();
    if filters.repo_ids.is_empty() {
        return Ok(SELECT_REPOS_FIRST.to_string());
    }
    let branches = ctx.api.branches(&filters.repo_ids).await?;
    if branches.is_empty() {
        return Ok("No branches found".to_string());
    }
    let rows: Vec<Vec<String>> = branches
        .into_iter()
        .map(|b| {
            let mark = if filters.branches.contains(&b) { "x" } else { " " };
            vec![mark.to_string(), b]
        })
        .collect();
    Ok(render_table(&["", "Branch"], &rows))
}

// =============================================================================
// FILTERS
// =============================================================================

pub fn show_filters(ctx: &Context<'_>) -> String {
    render_filters(&ctx.filters())
}

fn start_of_day(date: NaiveDate) -> i64 {
    let local = date.and_time(NaiveTime::MIN);
    Local
        .from_local_datetime(&local)
        .earliest()
        .map(|d| d.timestamp())
        .unwrap_or_else(|| local.and_utc().timestamp())
}

fn end_of_day(date: NaiveDate) -> i64 {
    start_of_day(date) + 86_399
}

pub fn set_filters(ctx: &Context<'_>, update: FilterUpdate) -> Result<String, CommandError> {
    let mut filters = ctx.filters();
    if let Some(start) = update.start {
        filters.range.start = start_of_day(start);
    }
    if let Some(end) = update.end {
        filters.range.end = end_of_day(end);
    }
    if filters.range.start > filters.range.end {
        return Err(CommandError::Invalid(
            "The start date must not be after the end date".to_string(),
        ));
    }
    if let Some(granularity) = update.granularity {
        filters.granularity = granularity;
    }
    if let Some(repo_ids) = update.repo_ids {
        filters.repo_ids = repo_ids;
    }
    filters.save(ctx.store.as_ref())?;
    Ok(render_filters(&filters))
}

pub fn apply_preset(ctx: &Context<'_>, preset: DatePreset) -> Result<String, CommandError> {
    let mut filters = ctx.filters();
    filters.range = preset.range(ctx.now);
    filters.save(ctx.store.as_ref())?;
    Ok(format!("{}: {}", preset, filters.range.label()))
}

pub fn toggle_team(ctx: &Context<'_>, id: u64) -> Result<String, CommandError> {
    let mut filters = ctx.filters();
    let mut teams = filters.teams.clone();
    toggle_selection(&mut teams, id);
    filters.set_teams(teams);
    filters.save(ctx.store.as_ref())?;
    Ok(render_filters(&filters))
}

pub fn toggle_author(ctx: &Context<'_>, id: u64) -> Result<String, CommandError> {
    let mut filters = ctx.filters();
    if filters.teams.is_empty() {
        return Err(CommandError::Invalid(SELECT_TEAM_FIRST.to_string()));
    }
    toggle_selection(&mut filters.authors, id);
    filters.save(ctx.store.as_ref())?;
    Ok(render_filters(&filters))
}

pub fn toggle_branch(ctx: &Context<'_>, name: &str) -> Result<String, CommandError> {
    let mut filters = ctx.filters();
    toggle_selection(&mut filters.branches, name.to_string());
    filters.save(ctx.store.as_ref())?;
    Ok(render_filters(&filters))
}

pub async fn select_all_teams(ctx: &Context<'_>) -> Result<String, CommandError> {
    let mut filters = ctx.filters();
    let options: Vec<u64> = fetch_teams(ctx).await?.iter().map(|t| t.id).collect();
    let mut teams = filters.teams.clone();
    select_all(&mut teams, &options);
    filters.set_teams(teams);
    filters.save(ctx.store.as_ref())?;
    Ok(render_filters(&filters))
}

pub async fn select_all_authors(ctx: &Context<'_>) -> Result<String, CommandError> {
    let mut filters = ctx.filters();
    let Some(authors) = fetch_authors(ctx, &filters).await? else {
        return Err(CommandError::Invalid(SELECT_TEAM_FIRST.to_string()));
    };
    let options: Vec<u64> = authors.iter().map(|a| a.id).collect();
    select_all(&mut filters.authors, &options);
    filters.save(ctx.store.as_ref())?;
    Ok(render_filters(&filters))
}

pub async fn select_all_branches(ctx: &Context<'_>) -> Result<String, CommandError> {
    let mut filters = ctx.filters();
    if filters.repo_ids.is_empty() {
        return Err(CommandError::Invalid(SELECT_REPOS_FIRST.to_string()));
    }
    let options = ctx.api.branches(&filters.repo_ids).await?;
    select_all(&mut filters.branches, &options);
    filters.save(ctx.store.as_ref())?;
    Ok(render_filters(&filters))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockDashboardApi;
    use crate::api::types::{
        CockpitPoint, DashboardRecord, GraphData, MetricSummaryResponse, TeamMetric,
        TeamMetricsResponse, TemplateRecord,
    };
    use crate::catalog::remember_opened;
    use crate::favorites::FavoriteSet;
    use crate::store::MemoryStore;

    fn templates() -> Vec<TemplateRecord> {
        serde_json::from_str(
            r#"[{"id": 1, "templateName": "Sales",
                 "metricsList": [{"id": 10, "metricName": "Cycle Time", "metricKey": "cycle-time"}]}]"#,
        )
        .unwrap()
    }

    fn dashboards() -> Vec<DashboardRecord> {
        serde_json::from_str(r#"[{"id": 2, "dashboardName": "Ops", "type": "public"}]"#).unwrap()
    }

    fn api_with_lists() -> MockDashboardApi {
        let mut api = MockDashboardApi::new();
        api.expect_org_templates().returning(|_| Ok(templates()));
        api.expect_user_dashboards()
            .returning(|_, _| Ok(dashboards()));
        api
    }

    fn context(api: &MockDashboardApi, store: Arc<dyn PreferenceStore>) -> Context<'_> {
        Context {
            api,
            store,
            session: Config::new(4459, 1960),
            now: Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap(),
        }
    }

    fn memory() -> Arc<dyn PreferenceStore> {
        Arc::new(MemoryStore::new())
    }

    #[tokio::test]
    async fn boards_lists_favorites_first() {
        let api = api_with_lists();
        let store = memory();
        let favorites: FavoriteSet = [2].into_iter().collect();
        favorites.save(store.as_ref()).unwrap();

        let out = boards(&context(&api, store), None, ViewOption::AllBoards)
            .await
            .unwrap();
        let ops = out.find("Ops").unwrap();
        let sales = out.find("Sales").unwrap();
        assert!(ops < sales);
        assert!(out.contains("★"));
        assert!(out.contains("Cycle Time"));
    }

    #[tokio::test]
    async fn boards_reports_no_data_and_no_matches() {
        let mut api = MockDashboardApi::new();
        api.expect_org_templates().returning(|_| Ok(Vec::new()));
        api.expect_user_dashboards().returning(|_, _| Ok(Vec::new()));
        let out = boards(&context(&api, memory()), None, ViewOption::AllBoards)
            .await
            .unwrap();
        assert_eq!(out, "No data found");

        let api = api_with_lists();
        let out = boards(
            &context(&api, memory()),
            Some("zzz".to_string()),
            ViewOption::AllBoards,
        )
        .await
        .unwrap();
        assert_eq!(out, "No matching items found");
    }

    #[tokio::test]
    async fn list_failure_is_an_error() {
        let mut api = MockDashboardApi::new();
        api.expect_org_templates().returning(|_| {
            Err(ApiError::Http {
                status: 500,
                message: "boom".to_string(),
            })
        });
        api.expect_user_dashboards()
            .returning(|_, _| Ok(dashboards()));
        let result = boards(&context(&api, memory()), None, ViewOption::AllBoards).await;
        assert!(matches!(result, Err(CommandError::Api(_))));
    }

    #[tokio::test]
    /// The toggle sticks locally even when the server mirror fails.
    async fn favorite_persists_when_sync_fails() {
        let mut api = api_with_lists();
        api.expect_update_preferences().times(1).returning(|_| {
            Err(ApiError::Http {
                status: 502,
                message: String::new(),
            })
        });
        let store = memory();

        let out = favorite(&context(&api, store.clone()), 1).await.unwrap();
        assert!(out.starts_with("★ Sales added to favorites"));
        assert!(out.contains("server copy was not updated"));
        assert!(FavoriteSet::load(store.as_ref()).is_favorite(1));
    }

    #[tokio::test]
    async fn favorite_rejects_unknown_ids() {
        let api = api_with_lists();
        let result = favorite(&context(&api, memory()), 77).await;
        assert!(matches!(result, Err(CommandError::UnknownItem(77))));
    }

    #[tokio::test]
    /// A cached item needs no list fetch; each metric reports its own state.
    async fn board_uses_cached_item_and_reports_chart_states() {
        let store = memory();
        let mut catalog = Catalog::new(store.clone());
        catalog.set_templates(templates());
        remember_opened(store.as_ref(), &catalog.find(1).unwrap()).unwrap();

        let mut api = MockDashboardApi::new();
        api.expect_metric_graph()
            .withf(|key, params| key == "cycle-time" && params.organization_id == 1960)
            .returning(|_, _| Ok(MetricSummaryResponse::default()));

        let out = board(&context(&api, store), 1).await.unwrap();
        assert!(out.starts_with("Sales (template)"));
        assert!(out.contains("No data available for: Cycle Time"));
    }

    #[tokio::test]
    async fn board_marks_failed_charts() {
        let mut api = api_with_lists();
        api.expect_metric_graph()
            .returning(|_, _| Err(ApiError::NotLoggedIn));
        let store = memory();

        let out = board(&context(&api, store.clone()), 1).await.unwrap();
        assert!(out.contains("No Data to Show - Cycle Time"));
        assert!(opened_item(store.as_ref(), 1).is_some());
    }

    #[tokio::test]
    async fn chart_renders_series_table() {
        let mut api = MockDashboardApi::new();
        api.expect_metric_graph().returning(|_, _| {
            Ok(MetricSummaryResponse {
                cockpit_graph_data: vec![CockpitPoint {
                    formatted_date: "W20".to_string(),
                    percentage: Some(12.5),
                    ..CockpitPoint::default()
                }],
                ..MetricSummaryResponse::default()
            })
        });
        let out = chart(&context(&api, memory()), "cycle-time").await.unwrap();
        assert!(out.contains("Percentage"));
        assert!(out.contains("W20"));
        assert!(out.contains("12.50"));
    }

    #[tokio::test]
    async fn drill_shows_title_and_rows() {
        let mut api = MockDashboardApi::new();
        api.expect_team_metrics()
            .withf(|request| request.metric_type == "pr-count" && request.main_team_metric)
            .returning(|_| {
                Ok(TeamMetricsResponse {
                    graph_data: Some(GraphData(vec![(
                        "May 12".to_string(),
                        vec![TeamMetric {
                            team_id: 3,
                            team_name: "Core".to_string(),
                            total_metric_value: Some(8.0),
                            ..TeamMetric::default()
                        }],
                    )])),
                })
            });
        let out = drill(&context(&api, memory()), "pr-count").await.unwrap();
        assert!(out.starts_with("Team Metrics for pr count"));
        assert!(out.contains("May 12"));
        assert!(out.contains("Core"));
    }

    #[tokio::test]
    async fn authors_need_a_selected_team() {
        // No expectations: any API call would fail the test.
        let api = MockDashboardApi::new();
        let out = authors(&context(&api, memory())).await.unwrap();
        assert_eq!(out, SELECT_TEAM_FIRST);
    }

    #[tokio::test]
    async fn select_all_teams_toggles_all_and_none() {
        let mut api = MockDashboardApi::new();
        api.expect_hierarchical_teams().returning(|_, _| {
            Ok(vec![
                Team {
                    id: 1,
                    name: "Core".to_string(),
                },
                Team {
                    id: 2,
                    name: "Web".to_string(),
                },
            ])
        });
        let store = memory();
        let ctx = context(&api, store.clone());

        select_all_teams(&ctx).await.unwrap();
        assert_eq!(ctx.filters().teams, vec![1, 2]);
        select_all_teams(&ctx).await.unwrap();
        assert!(ctx.filters().teams.is_empty());
    }

    #[test]
    fn preset_and_toggles_persist() {
        let api = MockDashboardApi::new();
        let ctx = context(&api, memory());

        apply_preset(&ctx, DatePreset::Last30Days).unwrap();
        let range = ctx.filters().range;
        assert_eq!(range.end - range.start, 29 * 86_400);

        toggle_team(&ctx, 5).unwrap();
        toggle_author(&ctx, 9).unwrap();
        assert_eq!(ctx.filters().authors, vec![9]);
        // Clearing the last team clears the authors too.
        toggle_team(&ctx, 5).unwrap();
        assert!(ctx.filters().authors.is_empty());
        assert!(matches!(
            toggle_author(&ctx, 9),
            Err(CommandError::Invalid(_))
        ));
    }

    #[test]
    fn set_filters_rejects_inverted_range() {
        let api = MockDashboardApi::new();
        let ctx = context(&api, memory());
        let update = FilterUpdate {
            start: NaiveDate::from_ymd_opt(2024, 5, 10),
            end: NaiveDate::from_ymd_opt(2024, 5, 1),
            ..FilterUpdate::default()
        };
        assert!(matches!(
            set_filters(&ctx, update),
            Err(CommandError::Invalid(_))
        ));

        let update = FilterUpdate {
            granularity: Some(Granularity::Daily),
            repo_ids: Some(vec![7, 8]),
            ..FilterUpdate::default()
        };
        let out = set_filters(&ctx, update).unwrap();
        assert!(out.contains("Granularity:  daily"));
        assert_eq!(ctx.filters().repo_ids, vec![7, 8]);
    }

    #[test]
    fn table_columns_are_aligned() {
        let out = render_table(
            &["ID", "Name"],
            &[
                vec!["1".to_string(), "Sales".to_string()],
                vec!["200".to_string(), "Ops".to_string()],
            ],
        );
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "ID   Name");
        assert_eq!(lines[1], "---  -----");
        assert_eq!(lines[2], "1    Sales");
        assert_eq!(lines[3], "200  Ops");
    }
}
