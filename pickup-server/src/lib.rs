//! Pickup Server - order and payment backend for a single-location
//! food-pickup business
//!
//! # Architecture
//!
//! - **Order lifecycle** (`orders`): state machine from creation through
//!   payment confirmation to pickup, with server-side totals
//! - **Payments** (`payments`): processor intent/session creation and the
//!   signed webhook reconciler
//! - **Database** (`db`): embedded SQLite via sqlx, repositories per table
//! - **HTTP API** (`api`): axum routers and handlers per resource
//!
//! # Module structure
//!
//! ```text
//! pickup-server/src/
//! ├── core/          # config, state, server
//! ├── auth/          # admin route authenticator
//! ├── api/           # HTTP routes and handlers
//! ├── utils/         # errors, logging, ids, time
//! ├── db/            # database layer
//! ├── orders/        # order lifecycle manager
//! └── payments/      # gateway + webhook reconciler
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod orders;
pub mod payments;
pub mod utils;

// Re-export common types
pub use auth::AdminAuth;
pub use core::{Config, Server, ServerState};
pub use orders::OrderManager;
pub use payments::{StripeGateway, WebhookEvent};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_level};

/// Load .env and initialize logging
pub fn setup_environment() {
    dotenv::dotenv().ok();
    init_logger();
}

pub fn print_banner() {
    println!(
        r#"
    ____  _      __
   / __ \(_)____/ /____  ______
  / /_/ / / ___/ //_/ / / / __ \
 / ____/ / /__/ ,< / /_/ / /_/ /
/_/   /_/\___/_/|_|\__,_/ .___/
                       /_/
    "#
    );
}
