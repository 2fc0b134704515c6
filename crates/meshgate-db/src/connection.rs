//! SurrealDB connection management.

use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::info;

use crate::error::DbError;
use crate::repository::{SurrealAccountStore, SurrealActivityStore};
use crate::schema::run_migrations;

/// Configuration for connecting to SurrealDB.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// WebSocket address (e.g., `127.0.0.1:8000`).
    pub url: String,
    pub namespace: String,
    pub database: String,
    /// Root credentials.
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "meshgate".into(),
            database: "management".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

/// Owns the connection shared by the account and activity stores.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Client>,
}

impl DbManager {
    /// Connect, authenticate as root, select namespace and database,
    /// and bring the schema up to date.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "Connecting to SurrealDB"
        );

        let db = Surreal::new::<Ws>(&config.url).await?;

        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        run_migrations(&db).await?;

        info!("Connected to SurrealDB, schema up to date");

        Ok(Self { db })
    }

    pub fn account_store(&self) -> SurrealAccountStore<Client> {
        SurrealAccountStore::new(self.db.clone())
    }

    /// Open the activity store, resuming its ID sequence from the
    /// highest persisted event.
    pub async fn activity_store(&self) -> Result<SurrealActivityStore<Client>, DbError> {
        SurrealActivityStore::open(self.db.clone()).await
    }
}
