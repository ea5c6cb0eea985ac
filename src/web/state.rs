use std::sync::Arc;

use crate::telemetry::{HistoryStore, PositionFetcher};

use super::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub history: Arc<HistoryStore>,
    pub fetcher: Arc<PositionFetcher>,
}
