//! Background fetches for the browser
//!
//! Each fetch runs on its own tokio task and reports back over the UI
//! channel, tagged with the generation it was issued for.

use crate::api::DashboardApi;
use crate::api::types::{
    DashboardRecord, GraphData, GraphRequestParams, Metric, TeamMetricRequest, TemplateRecord,
};
use crate::charts::{ChartState, cockpit_chart};
use crate::config::Config;
use crate::events::{Event, EventType};
use crate::favorites::{FavoriteSet, sync_favorites};
use crate::logging::LogLevel;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Results delivered to the UI loop.
#[derive(Debug)]
pub enum UiMessage {
    Lists {
        generation: u64,
        templates: Result<Vec<TemplateRecord>, String>,
        boards: Result<Vec<DashboardRecord>, String>,
    },
    Chart {
        generation: u64,
        index: usize,
        state: ChartState,
    },
    Drill {
        generation: u64,
        result: Result<GraphData, String>,
    },
    Log(Event),
}

/// What a key press asks the loop to start.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    None,
    Quit,
    FetchLists {
        generation: u64,
    },
    FetchCharts {
        generation: u64,
        metrics: Vec<Metric>,
        params: GraphRequestParams,
    },
    FetchDrill {
        generation: u64,
        request: TeamMetricRequest,
    },
    SyncFavorites(FavoriteSet),
}

#[derive(Clone)]
pub struct UiSender {
    sender: mpsc::Sender<UiMessage>,
}

impl UiSender {
    pub fn new(sender: mpsc::Sender<UiMessage>) -> Self {
        Self { sender }
    }

    pub async fn send(&self, message: UiMessage) {
        let _ = self.sender.send(message).await;
    }

    pub async fn send_event(&self, event: Event) {
        self.send(UiMessage::Log(event)).await;
    }
}

/// Shared by every fetch task.
#[derive(Clone)]
pub struct Fetchers {
    api: Arc<dyn DashboardApi>,
    session: Config,
    sender: UiSender,
}

impl Fetchers {
    pub fn new(api: Arc<dyn DashboardApi>, session: Config, sender: UiSender) -> Self {
        Self {
            api,
            session,
            sender,
        }
    }

    /// Starts the work an [`Action`] describes. `Quit` and `None` start nothing.
    pub fn dispatch(&self, action: Action) -> Option<JoinHandle<()>> {
        match action {
            Action::None | Action::Quit => None,
            Action::FetchLists { generation } => Some(self.spawn_lists(generation)),
            Action::FetchCharts {
                generation,
                metrics,
                params,
            } => Some(self.spawn_charts(generation, metrics, params)),
            Action::FetchDrill {
                generation,
                request,
            } => Some(self.spawn_drill(generation, request)),
            Action::SyncFavorites(favorites) => Some(self.spawn_favorite_sync(favorites)),
        }
    }

    fn spawn_lists(&self, generation: u64) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            let org_id = this.session.organization_id;
            let (templates, boards) = tokio::join!(
                this.api.org_templates(org_id),
                this.api.user_dashboards(org_id, this.session.user_id)
            );
            for error in [templates.as_ref().err(), boards.as_ref().err()]
                .into_iter()
                .flatten()
            {
                this.sender
                    .send_event(Event::catalog_with_level(
                        format!("Error loading data: {}", error),
                        EventType::Error,
                        error.log_level(),
                    ))
                    .await;
            }
            this.sender
                .send(UiMessage::Lists {
                    generation,
                    templates: templates.map_err(|e| e.to_string()),
                    boards: boards.map_err(|e| e.to_string()),
                })
                .await;
        })
    }

    /// One request per metric; charts arrive in whatever order the server answers.
    fn spawn_charts(
        &self,
        generation: u64,
        metrics: Vec<Metric>,
        params: GraphRequestParams,
    ) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            let mut handles = Vec::with_capacity(metrics.len());
            for (index, metric) in metrics.into_iter().enumerate() {
                let this = this.clone();
                let params = params.clone();
                handles.push(tokio::spawn(async move {
                    let result = this
                        .api
                        .metric_graph(&metric.metric_key, &params)
                        .await
                        .map(|response| cockpit_chart(&response.cockpit_graph_data));
                    if let Err(e) = &result {
                        this.sender
                            .send_event(Event::charts_with_level(
                                format!("{}: {}", metric.metric_name, e),
                                EventType::Error,
                                e.log_level(),
                            ))
                            .await;
                    }
                    this.sender
                        .send(UiMessage::Chart {
                            generation,
                            index,
                            state: ChartState::from_result(result),
                        })
                        .await;
                }));
            }
            for handle in handles {
                let _ = handle.await;
            }
        })
    }

    fn spawn_drill(&self, generation: u64, request: TeamMetricRequest) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            let result = match this.api.team_metrics(&request).await {
                Ok(response) => Ok(response.graph_data.unwrap_or_default()),
                Err(e) => {
                    this.sender
                        .send_event(Event::charts_with_level(
                            format!("Error loading metric details: {}", e),
                            EventType::Error,
                            e.log_level(),
                        ))
                        .await;
                    Err(e.to_string())
                }
            };
            this.sender
                .send(UiMessage::Drill { generation, result })
                .await;
        })
    }

    fn spawn_favorite_sync(&self, favorites: FavoriteSet) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            let event = if sync_favorites(this.api.as_ref(), &favorites).await {
                let msg = if favorites.is_empty() {
                    "Favorites cleared on server".to_string()
                } else {
                    format!("Favorites synced ({})", favorites.len())
                };
                Event::favorites_with_level(
                    msg,
                    EventType::Success,
                    LogLevel::Debug,
                )
            } else {
                Event::favorites_with_level(
                    "Favorites saved locally; server sync failed".to_string(),
                    EventType::Error,
                    LogLevel::Warn,
                )
            };
            this.sender.send_event(event).await;
        })
    }
}
