//! Shared types for the RBAC admin service
//!
//! Data models and API DTOs used by both the server and API clients.

pub mod client;
pub mod models;

// Re-exports
pub use serde::{Deserialize, Serialize};
