use crate::certnum::DailyCounter;
use crate::config::Config;
use crate::db::DbPool;
use crate::storage::ObjectStorage;
use std::sync::Arc;

/// Shared per-process dependencies, all constructed once in `main` and
/// passed in explicitly.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub counter: Arc<dyn DailyCounter>,
    pub storage: Arc<dyn ObjectStorage>,
    pub config: Arc<Config>,
}
