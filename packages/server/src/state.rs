use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::cache::ViewCache;
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub views: Arc<ViewCache>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Self {
        let views = Arc::new(ViewCache::new(config.cache.capacity));
        Self { db, config, views }
    }
}
