// Application state shared across all modules

use reqwest::Client;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::auth::provider::IdentityProvider;
use crate::common::config::AppConfig;
use crate::common::dev_mode::DevModeConfig;

/// Application state containing database pool, services, and configuration
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub http: Client,
    pub config: AppConfig,
    pub dev_mode: DevModeConfig,
    pub identity: Arc<IdentityProvider>,
}
