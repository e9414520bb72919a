//! Admin authentication
//!
//! Pluggable authenticator for admin-only routes, selected by configuration:
//! bearer-token match in deployed environments, disabled for tests and local
//! development. There is no hardcoded bypass in the production path.

use axum::http::HeaderMap;

use crate::core::Config;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Clone)]
pub enum AdminAuth {
    /// Exact match against `Authorization: Bearer <token>`
    Bearer { token: String },
    /// No gate (dev/test only)
    Disabled,
}

impl AdminAuth {
    pub fn from_config(config: &Config) -> Self {
        match &config.admin_token {
            Some(token) => Self::Bearer {
                token: token.clone(),
            },
            None => {
                if config.is_production() {
                    tracing::warn!("ADMIN_TOKEN is not set; admin routes are ungated");
                }
                Self::Disabled
            }
        }
    }

    /// Check the request's bearer token. Errors are typed: 401 when the header
    /// is absent or malformed, 403 when the token does not match.
    pub fn authorize(&self, headers: &HeaderMap) -> AppResult<()> {
        let expected = match self {
            Self::Disabled => return Ok(()),
            Self::Bearer { token } => token,
        };
        let presented = headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(AppError::Unauthorized)?;
        if presented != expected {
            return Err(AppError::forbidden("Invalid admin token"));
        }
        Ok(())
    }
}
