//! Core PharmaChain library (session, backend client, config).

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;

pub use error::{ApiError, ApiResult};
