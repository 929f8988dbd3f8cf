//! Main application state and UI loop
//!
//! Contains the App struct and main UI event handling logic

use crate::consts::cli_consts::{FAVORITE_SYNC_GRACE_MS, SPLASH_DURATION_MS};
use crate::ui::dashboard::{DashboardState, render_dashboard};
use crate::ui::fetchers::{Action, Fetchers, UiMessage};
use crate::ui::splash::render_splash;
use crossterm::event::{self, Event, KeyCode};
use ratatui::{Frame, Terminal, backend::Backend};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// The different screens in the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Splash screen shown at the start of the application.
    Splash,
    /// Board list, detail and drill-down views.
    Dashboard,
}

/// Application state
pub struct App {
    /// The current screen being displayed in the application.
    current_screen: Screen,

    state: Box<DashboardState>,

    /// Receives fetch results and activity events from background tasks.
    message_receiver: mpsc::Receiver<UiMessage>,

    fetchers: Fetchers,

    /// Fetches still running; aborted when the browser closes.
    fetches: Vec<JoinHandle<()>>,

    /// Favorite writes still running; given a grace period on close.
    syncs: Vec<JoinHandle<()>>,
}

impl App {
    pub fn new(
        state: DashboardState,
        message_receiver: mpsc::Receiver<UiMessage>,
        fetchers: Fetchers,
    ) -> Self {
        Self {
            current_screen: Screen::Splash,
            state: Box::new(state),
            message_receiver,
            fetchers,
            fetches: Vec::new(),
            syncs: Vec::new(),
        }
    }

    fn dispatch(&mut self, action: Action) {
        self.fetches.retain(|task| !task.is_finished());
        self.syncs.retain(|task| !task.is_finished());
        let is_sync = matches!(action, Action::SyncFavorites(_));
        if let Some(task) = self.fetchers.dispatch(action) {
            if is_sync {
                self.syncs.push(task);
            } else {
                self.fetches.push(task);
            }
        }
    }

    fn enter_dashboard(&mut self) {
        self.current_screen = Screen::Dashboard;
        let action = self.state.reload_lists();
        self.dispatch(action);
    }

    /// Drops pending fetches and lets favorite writes finish within the grace period.
    async fn shutdown(&mut self) {
        for task in self.fetches.drain(..) {
            task.abort();
        }
        let syncs: Vec<_> = self.syncs.drain(..).collect();
        if syncs.is_empty() {
            return;
        }
        let grace = Duration::from_millis(FAVORITE_SYNC_GRACE_MS);
        let pending = async {
            for task in syncs {
                let _ = task.await;
            }
        };
        if tokio::time::timeout(grace, pending).await.is_err() {
            log::warn!(
                "Favorite sync still running after {} ms; closing anyway",
                FAVORITE_SYNC_GRACE_MS
            );
        }
    }
}

/// Runs the application UI in a loop, handling events and rendering the appropriate screen.
pub async fn run<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> std::io::Result<()> {
    let splash_start = Instant::now();
    let splash_duration = Duration::from_millis(SPLASH_DURATION_MS);

    loop {
        while let Ok(message) = app.message_receiver.try_recv() {
            app.state.apply(message);
        }

        terminal.draw(|f| render(f, &app))?;

        if app.current_screen == Screen::Splash && splash_start.elapsed() >= splash_duration {
            app.enter_dashboard();
            continue;
        }

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == event::KeyEventKind::Release {
                    continue;
                }

                match app.current_screen {
                    Screen::Splash => {
                        if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
                            app.shutdown().await;
                            return Ok(());
                        }
                        // Any other key skips the splash screen
                        app.enter_dashboard();
                    }
                    Screen::Dashboard => match app.state.handle_key(key) {
                        Action::Quit => {
                            app.shutdown().await;
                            return Ok(());
                        }
                        action => app.dispatch(action),
                    },
                }
            }
        }
    }
}

/// Renders the current screen based on the application state.
fn render(f: &mut Frame, app: &App) {
    match app.current_screen {
        Screen::Splash => render_splash(f),
        Screen::Dashboard => render_dashboard(f, &app.state),
    }
}
