use std::sync::Arc;

use crate::cache::BestWindowCache;
use crate::config::LimitsConfig;
use crate::storage::SnapshotStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SnapshotStore>,
    pub best: Arc<BestWindowCache>,
    pub limits: LimitsConfig,
}
