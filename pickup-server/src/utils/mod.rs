//! Utility module - shared helpers and types
//!
//! # Contents
//!
//! - [`AppError`] / [`AppResponse`] - unified error and response types
//! - [`logger`] - tracing setup
//! - [`time`] / [`id`] - timestamps and resource IDs

pub mod error;
pub mod id;
pub mod logger;
pub mod result;
pub mod time;

pub use error::{AppError, AppResponse};
pub use id::snowflake_id;
pub use result::AppResult;
pub use time::now_millis;
