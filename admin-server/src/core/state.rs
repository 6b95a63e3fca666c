use std::path::Path;
use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::{DbService, seed};
use crate::utils::AppError;

/// Shared application state
///
/// Holds every dependency the handlers need. Passed explicitly into the
/// router (axum `State`), never kept as an ambient singleton; `Clone` is a
/// shallow copy (pool and services are reference-counted internally).
///
/// | Field | Type | Description |
/// |-------|------|-------------|
/// | config | Config | immutable configuration |
/// | pool | SqlitePool | SQLite connection pool |
/// | jwt_service | Arc<JwtService> | token issuance and validation |
#[derive(Debug, Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Config,
    /// SQLite connection pool
    pub pool: SqlitePool,
    /// JWT service (shared ownership)
    pub jwt_service: Arc<JwtService>,
}

impl ServerState {
    /// Create server state from already-initialized parts
    ///
    /// Prefer [`ServerState::initialize`].
    pub fn new(config: Config, pool: SqlitePool, jwt_service: Arc<JwtService>) -> Self {
        Self {
            config,
            pool,
            jwt_service,
        }
    }

    /// Initialize server state
    ///
    /// In order:
    /// 1. Ensure the database directory exists
    /// 2. Open the pool and apply migrations
    /// 3. Seed the authorization vocabulary, default roles and users
    /// 4. Build the JWT service from config
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        // 1. Ensure parent directory for the database file
        if let Some(parent) = Path::new(&config.database_path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::internal(format!("Failed to create database directory: {e}"))
            })?;
        }

        // 2. Open pool + run migrations
        let db_service = DbService::new(&config.database_path).await?;
        let pool = db_service.pool;

        // 3. Seed permissions, default roles, initial users
        seed::apply(&pool, config).await?;

        // 4. JWT service
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        Ok(Self::new(config.clone(), pool, jwt_service))
    }

    /// Access the JWT service
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// Close the connection pool (graceful shutdown)
    pub async fn shutdown(&self) {
        self.pool.close().await;
        tracing::info!("Database pool closed");
    }
}
