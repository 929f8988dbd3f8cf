pub mod cli_consts {
    //! CLI Configuration Constants
    //!
    //! Constants shared across the command handlers and the terminal browser,
    //! organized by functional area.

    // =============================================================================
    // UI CONFIGURATION
    // =============================================================================

    /// The maximum number of events to keep in the activity log.
    pub const MAX_ACTIVITY_LOGS: usize = 100;

    /// Buffer size of the channel carrying fetch results to the UI loop.
    pub const EVENT_QUEUE_SIZE: usize = 100;

    /// Number of metric names shown next to a board before collapsing into "+N".
    pub const METRIC_PILL_LIMIT: usize = 3;

    /// How long the splash screen stays up before the board list appears.
    pub const SPLASH_DURATION_MS: u64 = 1_500;

    /// How long closing the browser waits for an in-flight favorites write.
    pub const FAVORITE_SYNC_GRACE_MS: u64 = 2_000;

    // =============================================================================
    // NETWORK CONFIGURATION
    // =============================================================================

    pub mod http {
        use std::time::Duration;

        /// Time allowed to establish a connection (seconds)
        pub const CONNECT_TIMEOUT_SECS: u64 = 10;

        /// Time allowed for a full request/response round trip (seconds).
        /// Team aggregations over long ranges are slow on the server side.
        pub const REQUEST_TIMEOUT_SECS: u64 = 30;

        pub const fn connect_timeout() -> Duration {
            Duration::from_secs(CONNECT_TIMEOUT_SECS)
        }

        pub const fn request_timeout() -> Duration {
            Duration::from_secs(REQUEST_TIMEOUT_SECS)
        }
    }

    // =============================================================================
    // PERSISTED STATE
    // =============================================================================

    /// Keys of the preference store. Each entry is read independently.
    pub mod storage_keys {
        pub const FAVORITES: &str = "dashboardFavorites";
        pub const START_DATE: &str = "startDate";
        pub const END_DATE: &str = "endDate";
        pub const SELECTED_TEAMS: &str = "selectedTeams";
        pub const SELECTED_AUTHORS: &str = "selectedAuthors";
        pub const SELECTED_BRANCHES: &str = "selectedRepos";
        pub const REPO_IDS: &str = "repoIds";
        pub const FILTER_TYPE: &str = "filterType";
        pub const OPENED_DASHBOARDS: &str = "dashboards";
    }

    pub mod paths {
        /// Directory under $HOME holding every file the CLI writes.
        pub const CONFIG_DIR: &str = ".insights";
        pub const CONFIG_FILE: &str = "config.json";
        pub const PREFERENCES_FILE: &str = "preferences.json";
    }

    pub mod date_range {
        /// Width of the date range used when none has been stored.
        pub const DEFAULT_WINDOW_DAYS: i64 = 7;
    }
}
