//! Dashboard state management
//!
//! Screen state for the board list, board detail and drill-down views, and
//! the key handling that moves between them. Side effects are returned as
//! [`Action`]s for the UI loop to start.

use crate::api::types::GraphData;
use crate::catalog::{Catalog, DisplayItem, ListedItem};
use crate::charts::{ChartData, ChartState, team_chart};
use crate::config::Config;
use crate::consts::cli_consts::MAX_ACTIVITY_LOGS;
use crate::drilldown::{DrillDownPayload, DrillDownRow, table_rows};
use crate::environment::Environment;
use crate::events::{Event, EventType};
use crate::filters::FilterState;
use crate::logging::LogLevel;
use crate::store::PreferenceStore;
use crate::ui::fetchers::{Action, UiMessage};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum ListStatus {
    Loading,
    Failed(String),
    Loaded,
}

pub struct ListScreen {
    pub catalog: Catalog,
    pub selected: usize,
    pub searching: bool,
    pub status: ListStatus,
    /// Generation of the list fetch whose results are accepted.
    pub generation: u64,
}

pub struct DetailScreen {
    pub item: DisplayItem,
    pub selected: usize,
    pub charts: Vec<ChartState>,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrillState {
    Loading,
    Failed(String),
    Ready {
        rows: Vec<DrillDownRow>,
        chart: ChartData,
    },
}

pub struct DrillScreen {
    pub payload: DrillDownPayload,
    pub state: DrillState,
    pub generation: u64,
}

pub enum View {
    List,
    Detail(DetailScreen),
    Drill(DrillScreen, DetailScreen),
}

pub struct DashboardState {
    pub environment: Environment,
    pub session: Config,
    pub filters: FilterState,
    pub list: ListScreen,
    pub view: View,
    /// Activity logs for display (last MAX_ACTIVITY_LOGS events)
    pub activity_logs: VecDeque<Event>,
    pub with_background_color: bool,
    generation: u64,
}

impl DashboardState {
    pub fn new(
        environment: Environment,
        session: Config,
        store: Arc<dyn PreferenceStore>,
        filters: FilterState,
        with_background_color: bool,
    ) -> Self {
        Self {
            environment,
            session,
            filters,
            list: ListScreen {
                catalog: Catalog::new(store),
                selected: 0,
                searching: false,
                status: ListStatus::Loading,
                generation: 0,
            },
            view: View::List,
            activity_logs: VecDeque::new(),
            with_background_color,
            generation: 0,
        }
    }

    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Starts (or restarts) the list fetch. Results of older fetches are ignored.
    pub fn reload_lists(&mut self) -> Action {
        let generation = self.next_generation();
        self.list.generation = generation;
        self.list.status = ListStatus::Loading;
        Action::FetchLists { generation }
    }

    pub fn add_event(&mut self, event: Event) {
        if self.activity_logs.len() >= MAX_ACTIVITY_LOGS {
            self.activity_logs.pop_front();
        }
        self.activity_logs.push_back(event);
    }

    pub fn listed(&self) -> Vec<ListedItem> {
        self.list.catalog.listed()
    }

    /// Applies a fetch result if it still belongs to what is on screen.
    pub fn apply(&mut self, message: UiMessage) {
        match message {
            UiMessage::Log(event) => self.add_event(event),
            UiMessage::Lists {
                generation,
                templates,
                boards,
            } => {
                if generation != self.list.generation {
                    return;
                }
                match (templates, boards) {
                    (Ok(templates), Ok(boards)) => {
                        self.list.catalog.set_templates(templates);
                        self.list.catalog.set_boards(boards);
                        self.list.status = ListStatus::Loaded;
                        self.clamp_list_selection();
                    }
                    (Err(e), _) | (_, Err(e)) => self.list.status = ListStatus::Failed(e),
                }
            }
            UiMessage::Chart {
                generation,
                index,
                state,
            } => {
                let detail = match &mut self.view {
                    View::Detail(detail) | View::Drill(_, detail) => detail,
                    View::List => return,
                };
                if detail.generation != generation {
                    return;
                }
                if let Some(slot) = detail.charts.get_mut(index) {
                    *slot = state;
                }
            }
            UiMessage::Drill { generation, result } => {
                let View::Drill(drill, _) = &mut self.view else {
                    return;
                };
                if drill.generation != generation {
                    return;
                }
                drill.state = match result {
                    Ok(graph) => drill_ready(&graph),
                    Err(e) => DrillState::Failed(e),
                };
            }
        }
    }

    fn clamp_list_selection(&mut self) {
        let len = self.listed().len();
        self.list.selected = self.list.selected.min(len.saturating_sub(1));
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        match self.view {
            View::List => self.handle_list_key(key),
            View::Detail(_) => self.handle_detail_key(key),
            View::Drill(..) => self.handle_drill_key(key),
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> Action {
        if self.list.searching {
            let chorded = key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
            match key.code {
                KeyCode::Char(_) if chorded => return Action::None,
                KeyCode::Char(c) => self.list.catalog.view.search_term.push(c),
                KeyCode::Backspace => {
                    self.list.catalog.view.search_term.pop();
                }
                KeyCode::Enter | KeyCode::Esc => self.list.searching = false,
                _ => {}
            }
            self.list.selected = 0;
            return Action::None;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Up | KeyCode::Char('k') => {
                self.list.selected = self.list.selected.saturating_sub(1);
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.list.selected += 1;
                self.clamp_list_selection();
                Action::None
            }
            KeyCode::Char('/') => {
                self.list.searching = true;
                Action::None
            }
            KeyCode::Tab => {
                let view = &mut self.list.catalog.view;
                view.selected_option = view.selected_option.next();
                self.list.selected = 0;
                Action::None
            }
            KeyCode::Char('r') => {
                self.add_event(Event::catalog_with_level(
                    "Reloading boards".to_string(),
                    EventType::Refresh,
                    LogLevel::Info,
                ));
                self.reload_lists()
            }
            KeyCode::Char('f') => self.toggle_selected_favorite(),
            KeyCode::Enter => self.open_selected(),
            _ => Action::None,
        }
    }

    fn selected_item(&self) -> Option<ListedItem> {
        self.listed().into_iter().nth(self.list.selected)
    }

    fn toggle_selected_favorite(&mut self) -> Action {
        let Some(selected) = self.selected_item() else {
            return Action::None;
        };
        let id = selected.item.id();
        match self.list.catalog.toggle_favorite(id) {
            Ok(listed) => {
                // Keep the cursor on the toggled item after reordering.
                if let Some(position) = listed.iter().position(|l| l.item.id() == id) {
                    self.list.selected = position;
                }
                Action::SyncFavorites(self.list.catalog.favorites().clone())
            }
            Err(e) => {
                self.add_event(Event::favorites_with_level(
                    format!("Could not save favorites: {}", e),
                    EventType::Error,
                    LogLevel::Error,
                ));
                Action::None
            }
        }
    }

    fn open_selected(&mut self) -> Action {
        let Some(selected) = self.selected_item() else {
            return Action::None;
        };
        let item = match self.list.catalog.open(selected.item.id()) {
            Ok(Some(item)) => item,
            Ok(None) => selected.item,
            Err(e) => {
                self.add_event(Event::catalog_with_level(
                    format!("Could not remember opened board: {}", e),
                    EventType::Error,
                    LogLevel::Debug,
                ));
                selected.item
            }
        };
        let generation = self.next_generation();
        let metrics = item.metrics().to_vec();
        self.view = View::Detail(DetailScreen {
            item,
            selected: 0,
            charts: vec![ChartState::Loading; metrics.len()],
            generation,
        });
        Action::FetchCharts {
            generation,
            metrics,
            params: self.filters.graph_params(&self.session),
        }
    }

    fn handle_detail_key(&mut self, key: KeyEvent) -> Action {
        let View::Detail(detail) = &mut self.view else {
            return Action::None;
        };
        let metric_count = detail.item.metrics().len();
        match key.code {
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Esc | KeyCode::Backspace => {
                self.view = View::List;
                Action::None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                detail.selected = detail.selected.saturating_sub(1);
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if detail.selected + 1 < metric_count {
                    detail.selected += 1;
                }
                Action::None
            }
            KeyCode::Char('r') => {
                self.generation += 1;
                let generation = self.generation;
                detail.generation = generation;
                detail.charts = vec![ChartState::Loading; metric_count];
                Action::FetchCharts {
                    generation,
                    metrics: detail.item.metrics().to_vec(),
                    params: self.filters.graph_params(&self.session),
                }
            }
            KeyCode::Enter | KeyCode::Char('d') => {
                let Some(metric) = detail.item.metrics().get(detail.selected) else {
                    return Action::None;
                };
                let request = self
                    .filters
                    .team_metric_request(&metric.metric_key, &self.session);
                self.generation += 1;
                let generation = self.generation;
                let View::Detail(detail) = std::mem::replace(&mut self.view, View::List) else {
                    return Action::None;
                };
                self.view = View::Drill(
                    DrillScreen {
                        payload: DrillDownPayload::new(request.clone()),
                        state: DrillState::Loading,
                        generation,
                    },
                    detail,
                );
                Action::FetchDrill {
                    generation,
                    request,
                }
            }
            _ => Action::None,
        }
    }

    fn handle_drill_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Esc | KeyCode::Backspace => {
                if let View::Drill(_, detail) = std::mem::replace(&mut self.view, View::List) {
                    self.view = View::Detail(detail);
                }
                Action::None
            }
            KeyCode::Char('r') => {
                let generation = self.next_generation();
                let View::Drill(drill, _) = &mut self.view else {
                    return Action::None;
                };
                drill.generation = generation;
                drill.state = DrillState::Loading;
                Action::FetchDrill {
                    generation,
                    request: drill.payload.request.clone(),
                }
            }
            _ => Action::None,
        }
    }
}

fn drill_ready(graph: &GraphData) -> DrillState {
    DrillState::Ready {
        rows: table_rows(graph),
        chart: team_chart(graph),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{DashboardRecord, TemplateRecord};
    use crate::favorites::FavoriteSet;
    use crate::store::MemoryStore;
    use chrono::{TimeZone, Utc};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn state(store: Arc<dyn PreferenceStore>) -> DashboardState {
        let now = Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap();
        DashboardState::new(
            Environment::Local,
            Config::new(1, 2),
            store,
            FilterState::with_defaults(now),
            false,
        )
    }

    fn lists(generation: u64) -> UiMessage {
        let templates: Vec<TemplateRecord> = serde_json::from_str(
            r#"[{"id": 1, "templateName": "Sales",
                 "metricsList": [{"id": 10, "metricName": "Cycle Time", "metricKey": "cycle-time"},
                                 {"id": 11, "metricName": "PR Count", "metricKey": "pr-count"}]}]"#,
        )
        .unwrap();
        let boards: Vec<DashboardRecord> =
            serde_json::from_str(r#"[{"id": 2, "dashboardName": "Ops", "type": "public"}]"#)
                .unwrap();
        UiMessage::Lists {
            generation,
            templates: Ok(templates),
            boards: Ok(boards),
        }
    }

    fn loaded_state(store: Arc<dyn PreferenceStore>) -> DashboardState {
        let mut state = state(store);
        let Action::FetchLists { generation } = state.reload_lists() else {
            panic!("expected a list fetch");
        };
        state.apply(lists(generation));
        state
    }

    #[test]
    /// Results from a superseded fetch never replace the current list.
    fn stale_list_results_are_discarded() {
        let mut state = state(Arc::new(MemoryStore::new()));
        let Action::FetchLists { generation: first } = state.reload_lists() else {
            panic!("expected a list fetch");
        };
        let Action::FetchLists { generation: second } = state.reload_lists() else {
            panic!("expected a list fetch");
        };

        state.apply(lists(first));
        assert_eq!(state.list.status, ListStatus::Loading);
        assert!(state.listed().is_empty());

        state.apply(lists(second));
        assert_eq!(state.list.status, ListStatus::Loaded);
        assert_eq!(state.listed().len(), 2);
    }

    #[test]
    fn list_error_allows_retry() {
        let mut state = state(Arc::new(MemoryStore::new()));
        let Action::FetchLists { generation } = state.reload_lists() else {
            panic!("expected a list fetch");
        };
        state.apply(UiMessage::Lists {
            generation,
            templates: Ok(Vec::new()),
            boards: Err("HTTP error with status 500".to_string()),
        });
        assert!(matches!(state.list.status, ListStatus::Failed(_)));

        let retry = state.handle_key(key(KeyCode::Char('r')));
        assert_eq!(
            retry,
            Action::FetchLists {
                generation: generation + 1
            }
        );
        assert_eq!(state.list.status, ListStatus::Loading);
        let last = state.activity_logs.back().unwrap();
        assert_eq!(last.event_type, EventType::Refresh);
        assert_eq!(last.msg, "Reloading boards");
    }

    #[test]
    fn search_ignores_control_and_alt_chords() {
        let mut state = loaded_state(Arc::new(MemoryStore::new()));
        state.handle_key(key(KeyCode::Char('/')));
        state.handle_key(key(KeyCode::Char('o')));
        state.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        state.handle_key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::ALT));
        state.handle_key(KeyEvent::new(KeyCode::Char('P'), KeyModifiers::SHIFT));

        assert!(state.list.searching);
        assert_eq!(state.list.catalog.view.search_term, "oP");
        assert_eq!(state.listed().len(), 1);
    }

    #[test]
    fn search_typing_filters_the_list() {
        let mut state = loaded_state(Arc::new(MemoryStore::new()));
        state.handle_key(key(KeyCode::Char('/')));
        for c in "OP".chars() {
            state.handle_key(key(KeyCode::Char(c)));
        }
        state.handle_key(key(KeyCode::Enter));

        assert!(!state.list.searching);
        let listed = state.listed();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].item.display_name(), "Ops");
        // 'q' quits again once search mode is left.
        assert_eq!(state.handle_key(key(KeyCode::Char('q'))), Action::Quit);
    }

    #[test]
    fn favorite_key_persists_and_requests_sync() {
        let store: Arc<dyn PreferenceStore> = Arc::new(MemoryStore::new());
        let mut state = loaded_state(store.clone());
        state.handle_key(key(KeyCode::Down));

        let action = state.handle_key(key(KeyCode::Char('f')));
        let expected: FavoriteSet = [2].into_iter().collect();
        assert_eq!(action, Action::SyncFavorites(expected.clone()));
        assert_eq!(FavoriteSet::load(store.as_ref()), expected);
        // Ops moved to the top and the cursor followed it.
        assert_eq!(state.list.selected, 0);
        assert_eq!(state.listed()[0].item.id(), 2);
    }

    #[test]
    fn opening_fetches_every_metric_and_ignores_stale_charts() {
        let mut state = loaded_state(Arc::new(MemoryStore::new()));
        let Action::FetchCharts {
            generation,
            metrics,
            ..
        } = state.handle_key(key(KeyCode::Enter))
        else {
            panic!("expected chart fetches");
        };
        assert_eq!(metrics.len(), 2);

        state.apply(UiMessage::Chart {
            generation: generation - 1,
            index: 0,
            state: ChartState::Empty,
        });
        state.apply(UiMessage::Chart {
            generation,
            index: 1,
            state: ChartState::Failed("boom".to_string()),
        });

        let View::Detail(detail) = &state.view else {
            panic!("expected the detail view");
        };
        assert_eq!(detail.charts[0], ChartState::Loading);
        assert!(matches!(detail.charts[1], ChartState::Failed(_)));
    }

    #[test]
    fn drill_down_and_back() {
        let mut state = loaded_state(Arc::new(MemoryStore::new()));
        state.handle_key(key(KeyCode::Enter));
        state.handle_key(key(KeyCode::Down));

        let Action::FetchDrill {
            generation,
            request,
        } = state.handle_key(key(KeyCode::Char('d')))
        else {
            panic!("expected a drill-down fetch");
        };
        assert_eq!(request.metric_type, "pr-count");

        state.apply(UiMessage::Drill {
            generation,
            result: Ok(GraphData(vec![("W1".to_string(), Vec::new())])),
        });
        let View::Drill(drill, _) = &state.view else {
            panic!("expected the drill-down view");
        };
        assert!(matches!(drill.state, DrillState::Ready { .. }));
        assert_eq!(drill.payload.title(), "Team Metrics for pr count");

        state.handle_key(key(KeyCode::Esc));
        let View::Detail(detail) = &state.view else {
            panic!("expected the detail view");
        };
        assert_eq!(detail.selected, 1);

        state.handle_key(key(KeyCode::Esc));
        assert!(matches!(state.view, View::List));
    }

    #[test]
    fn activity_log_is_bounded() {
        let mut state = state(Arc::new(MemoryStore::new()));
        for i in 0..(MAX_ACTIVITY_LOGS + 5) {
            state.add_event(Event::catalog_with_level(
                format!("event {}", i),
                EventType::Refresh,
                LogLevel::Info,
            ));
        }
        assert_eq!(state.activity_logs.len(), MAX_ACTIVITY_LOGS);
        assert_eq!(state.activity_logs[0].msg, "event 5");
    }
}
