//! Persisted filter selection
//!
//! Date range, granularity and the team, author and branch selections that
//! scope every chart request. Each value lives under its own preference key
//! and falls back to its default independently.

use crate::api::types::{
    AuthorsRequest, GraphRequestParams, ProcessSeriesRequest, ProcessSummaryRequest,
    TeamMetricRequest,
};
use crate::config::Config;
use crate::consts::cli_consts::{date_range, storage_keys};
use crate::store::{PreferenceStore, PreferenceStoreExt, StoreError};
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Bucket size for time series.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Granularity {
    Daily,
    #[default]
    Weekly,
    Monthly,
}

/// Inclusive range of unix timestamps, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: i64,
    pub end: i64,
}

impl DateRange {
    /// The default window ending at `now`.
    pub fn default_ending(now: DateTime<Utc>) -> Self {
        Self {
            start: (now - Duration::days(date_range::DEFAULT_WINDOW_DAYS)).timestamp(),
            end: now.timestamp(),
        }
    }

    /// `start - end` as local calendar dates.
    pub fn label(&self) -> String {
        format!("{} - {}", format_day(self.start), format_day(self.end))
    }
}

fn format_day(timestamp: i64) -> String {
    match Local.timestamp_opt(timestamp, 0).single() {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => timestamp.to_string(),
    }
}

/// Shortcut ranges offered next to the date picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum DatePreset {
    #[strum(to_string = "Today", serialize = "today")]
    Today,
    #[strum(to_string = "Yesterday", serialize = "yesterday")]
    Yesterday,
    #[strum(to_string = "Last 7 Days", serialize = "last-7-days", serialize = "7d")]
    Last7Days,
    #[strum(to_string = "Last 30 Days", serialize = "last-30-days", serialize = "30d")]
    Last30Days,
}

impl DatePreset {
    pub fn range(self, now: DateTime<Utc>) -> DateRange {
        let (start, end) = match self {
            DatePreset::Today => (now, now),
            DatePreset::Yesterday => (now - Duration::days(1), now - Duration::days(1)),
            DatePreset::Last7Days => (now - Duration::days(6), now),
            DatePreset::Last30Days => (now - Duration::days(29), now),
        };
        DateRange {
            start: start.timestamp(),
            end: end.timestamp(),
        }
    }
}

/// Adds `value` to the selection, or removes it if already present.
pub fn toggle_selection<T: PartialEq>(selected: &mut Vec<T>, value: T) {
    match selected.iter().position(|v| *v == value) {
        Some(index) => {
            selected.remove(index);
        }
        None => selected.push(value),
    }
}

/// Selects every option, or clears the selection when all are already selected.
pub fn select_all<T: PartialEq + Clone>(selected: &mut Vec<T>, options: &[T]) {
    let all_selected = !options.is_empty() && options.iter().all(|o| selected.contains(o));
    if all_selected {
        selected.clear();
    } else {
        *selected = options.to_vec();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub range: DateRange,
    pub granularity: Granularity,
    pub teams: Vec<u64>,
    pub authors: Vec<u64>,
    pub branches: Vec<String>,
    pub repo_ids: Vec<u64>,
}

impl FilterState {
    /// Defaults for a store with nothing saved.
    pub fn with_defaults(now: DateTime<Utc>) -> Self {
        Self {
            range: DateRange::default_ending(now),
            granularity: Granularity::default(),
            teams: Vec::new(),
            authors: Vec::new(),
            branches: Vec::new(),
            repo_ids: Vec::new(),
        }
    }

    pub fn load(store: &dyn PreferenceStore, now: DateTime<Utc>) -> Self {
        let defaults = Self::with_defaults(now).range;
        Self {
            range: DateRange {
                start: store
                    .get::<i64>(storage_keys::START_DATE)
                    .unwrap_or(defaults.start),
                end: store
                    .get::<i64>(storage_keys::END_DATE)
                    .unwrap_or(defaults.end),
            },
            granularity: store.get_or_default(storage_keys::FILTER_TYPE),
            teams: store.get_or_default(storage_keys::SELECTED_TEAMS),
            authors: store.get_or_default(storage_keys::SELECTED_AUTHORS),
            branches: store.get_or_default(storage_keys::SELECTED_BRANCHES),
            repo_ids: store.get_or_default(storage_keys::REPO_IDS),
        }
    }

    pub fn save(&self, store: &dyn PreferenceStore) -> Result<(), StoreError> {
        store.set(storage_keys::START_DATE, &self.range.start)?;
        store.set(storage_keys::END_DATE, &self.range.end)?;
        store.set(storage_keys::FILTER_TYPE, &self.granularity)?;
        store.set(storage_keys::SELECTED_TEAMS, &self.teams)?;
        store.set(storage_keys::SELECTED_AUTHORS, &self.authors)?;
        store.set(storage_keys::SELECTED_BRANCHES, &self.branches)?;
        store.set(storage_keys::REPO_IDS, &self.repo_ids)?;
        Ok(())
    }

    /// Drops authors when no team is selected; authors only exist per team.
    pub fn set_teams(&mut self, teams: Vec<u64>) {
        self.teams = teams;
        if self.teams.is_empty() {
            self.authors.clear();
        }
    }

    pub fn graph_params(&self, session: &Config) -> GraphRequestParams {
        GraphRequestParams {
            user_id: session.user_id,
            org_id: session.organization_id,
            organization_id: session.organization_id,
            start_date: self.range.start,
            end_date: self.range.end,
            filter_type: self.granularity,
            team_ids: self.teams.clone(),
            project_ids: Vec::new(),
            advanced_filters: serde_json::Map::new(),
        }
    }

    /// Drill-down request for one metric. Authors are not applied at team level.
    pub fn team_metric_request(&self, metric_type: &str, session: &Config) -> TeamMetricRequest {
        TeamMetricRequest::new(metric_type, &self.graph_params(session))
    }

    /// `None` until a team is selected.
    pub fn authors_request(&self) -> Option<AuthorsRequest> {
        if self.teams.is_empty() {
            return None;
        }
        Some(AuthorsRequest {
            team_ids: self.teams.clone(),
            start_date: self.range.start,
            end_date: self.range.end,
        })
    }

    /// Process series are always weekly and count merged pull requests.
    pub fn process_series_request(&self, session: &Config) -> ProcessSeriesRequest {
        ProcessSeriesRequest {
            repo_ids: self.repo_ids.clone(),
            start_date: self.range.start,
            end_date: self.range.end,
            author_ids: self.authors.clone(),
            team_ids: self.teams.clone(),
            branch: self.branches.clone(),
            user_id: session.user_id,
            organization_id: session.organization_id,
            period_type: Granularity::Weekly,
            project_ids: Vec::new(),
            advanced_filters: serde_json::Map::new(),
            show_merged_prs: true,
        }
    }

    pub fn process_summary_request(&self, session: &Config) -> ProcessSummaryRequest {
        ProcessSummaryRequest {
            org_id: session.organization_id,
            start_date: self.range.start,
            end_date: self.range.end,
            author_ids: self.authors.clone(),
            team_ids: self.teams.clone(),
            repo_ids: self.repo_ids.clone(),
            branch: self.branches.clone(),
            period_type: self.granularity,
            show_merged_prs: true,
            advanced_filters: serde_json::Map::new(),
            project_ids: Vec::new(),
        }
    }
}
