//! RBAC Admin Server
//!
//! REST-style admin panel backend: users, roles, and permissions managed
//! through CRUD endpoints backed by SQLite.
//!
//! # Module structure
//!
//! ```text
//! admin-server/src/
//! ├── core/          # Config, state, server, errors
//! ├── auth/          # JWT, permission resolver, middleware
//! ├── api/           # HTTP routes and handlers
//! ├── db/            # Connection pool, repositories, seed
//! └── utils/         # Errors, logging
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod utils;

// Re-export public types
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - structured events on auth failures and denials
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// Set up process environment: .env file and logging
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}
