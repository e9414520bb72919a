//! Server configuration
//!
//! All settings are overridable through environment variables:
//!
//! | Variable | Default | Notes |
//! |----------|---------|-------|
//! | WORK_DIR | ./data | database and runtime files |
//! | HTTP_PORT | 3001 | HTTP API port |
//! | ENVIRONMENT | development | development \| staging \| production |
//! | CLIENT_URL | http://localhost:3000 | checkout redirect base |
//! | STRIPE_SECRET_KEY | sk_test_placeholder | placeholder key enables mock mode |
//! | STRIPE_WEBHOOK_SECRET | (empty) | shared secret for webhook signatures |
//! | ADMIN_TOKEN | (unset) | bearer token for admin routes; unset disables the gate |

use std::path::PathBuf;

/// Stripe key that switches the payment gateway into mock mode (no network I/O)
pub const PLACEHOLDER_STRIPE_KEY: &str = "sk_test_placeholder";

#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for the database file
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// Running environment: development | staging | production
    pub environment: String,
    /// Base URL of the customer-facing client (checkout redirects)
    pub client_url: String,
    /// Payment processor secret key
    pub stripe_secret_key: String,
    /// Shared secret for verifying webhook signatures
    pub stripe_webhook_secret: String,
    /// Bearer token required on admin routes; None disables the gate (dev/test only)
    pub admin_token: Option<String>,
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3001),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            client_url: std::env::var("CLIENT_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            stripe_secret_key: std::env::var("STRIPE_SECRET_KEY")
                .unwrap_or_else(|_| PLACEHOLDER_STRIPE_KEY.into()),
            stripe_webhook_secret: std::env::var("STRIPE_WEBHOOK_SECRET").unwrap_or_default(),
            admin_token: std::env::var("ADMIN_TOKEN").ok().filter(|t| !t.is_empty()),
        }
    }

    /// Path of the SQLite database file
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("pickup.db")
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
