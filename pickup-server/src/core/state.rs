//! Shared server state
//!
//! [`ServerState`] holds shared references to every collaborator a handler
//! needs. Cloning is cheap (pool handles and small structs).

use sqlx::SqlitePool;

use crate::auth::AdminAuth;
use crate::core::Config;
use crate::db::DbService;
use crate::payments::StripeGateway;

#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Config,
    /// SQLite connection pool
    pub db: SqlitePool,
    /// Payment processor client
    pub gateway: StripeGateway,
    /// Admin route authenticator
    pub admin_auth: AdminAuth,
}

impl ServerState {
    pub fn new(config: Config, db: SqlitePool) -> Self {
        let gateway = StripeGateway::new(&config);
        let admin_auth = AdminAuth::from_config(&config);
        Self {
            config,
            db,
            gateway,
            admin_auth,
        }
    }

    /// Initialize server state: work directory, database, collaborators
    pub async fn initialize(config: &Config) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;

        let db_path = config.database_path();
        let db_service = DbService::new(&db_path.to_string_lossy()).await?;

        Ok(Self::new(config.clone(), db_service.pool))
    }

    pub fn get_db(&self) -> SqlitePool {
        self.db.clone()
    }
}
