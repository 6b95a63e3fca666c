//! Utility module - shared error types and logging
//!
//! # Contents
//!
//! - [`AppError`] - application error type
//! - [`AppResponse`] - API error envelope
//! - [`AppResult`] - handler result alias

pub mod error;
pub mod logger;
pub mod result;

pub use error::{AppError, AppResponse};
pub use result::AppResult;
