//! Session setup and initialization

use crate::api::ApiClient;
use crate::api::error::ApiError;
use crate::config::Config;
use crate::consts::cli_consts::EVENT_QUEUE_SIZE;
use crate::environment::Environment;
use crate::filters::FilterState;
use crate::store::PreferenceStore;
use crate::ui::dashboard::DashboardState;
use crate::ui::fetchers::{Fetchers, UiMessage, UiSender};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Everything the board browser needs before the terminal is taken over.
pub struct SessionData {
    /// Receives fetch results and activity events
    pub message_receiver: mpsc::Receiver<UiMessage>,
    pub fetchers: Fetchers,
    pub state: DashboardState,
}

/// Builds the API client, restores saved filters and wires the fetch channel.
pub fn setup_session(
    environment: Environment,
    session: Config,
    store: Arc<dyn PreferenceStore>,
    now: DateTime<Utc>,
    with_background: bool,
) -> Result<SessionData, ApiError> {
    let client = ApiClient::new(environment.clone())?.with_session(session.clone());
    let (sender, message_receiver) = mpsc::channel::<UiMessage>(EVENT_QUEUE_SIZE);
    let fetchers = Fetchers::new(Arc::new(client), session.clone(), UiSender::new(sender));

    let filters = FilterState::load(store.as_ref(), now);
    let state = DashboardState::new(environment, session, store, filters, with_background);

    Ok(SessionData {
        message_receiver,
        fetchers,
        state,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::Granularity;
    use crate::store::{MemoryStore, PreferenceStoreExt};
    use crate::consts::cli_consts::storage_keys;
    use chrono::TimeZone;

    #[tokio::test]
    async fn restores_saved_filters() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(storage_keys::FILTER_TYPE, &Granularity::Monthly)
            .unwrap();
        let now = Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap();

        let data =
            setup_session(Environment::Local, Config::new(1, 2), store, now, false).unwrap();

        assert_eq!(data.state.filters.granularity, Granularity::Monthly);
        assert_eq!(data.state.session.organization_id, 2);
    }
}
