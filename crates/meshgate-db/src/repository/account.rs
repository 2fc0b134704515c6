//! SurrealDB implementation of [`AccountStore`].

use meshgate_core::error::MeshResult;
use meshgate_core::lock::{AccountLockGuard, AccountLocks};
use meshgate_core::models::account::Account;
use meshgate_core::repository::AccountStore;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct AccountRow {
    data: String,
}

/// Stores each account aggregate as one JSON document and serializes
/// access to it through an in-process lock registry.
#[derive(Clone)]
pub struct SurrealAccountStore<C: Connection> {
    db: Surreal<C>,
    locks: AccountLocks,
}

impl<C: Connection> SurrealAccountStore<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self {
            db,
            locks: AccountLocks::new(),
        }
    }
}

impl<C: Connection> AccountStore for SurrealAccountStore<C> {
    async fn acquire_account_lock(&self, account_id: &str) -> AccountLockGuard {
        self.locks.acquire(account_id).await
    }

    async fn get_account(&self, account_id: &str) -> MeshResult<Account> {
        let mut result = self
            .db
            .query("SELECT data FROM type::record('account', $id)")
            .bind(("id", account_id.to_owned()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AccountRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "account".into(),
            id: account_id.to_owned(),
        })?;

        let account: Account = serde_json::from_str(&row.data).map_err(DbError::from)?;
        Ok(account)
    }

    async fn save_account(&self, account: &Account) -> MeshResult<()> {
        let data = serde_json::to_string(account).map_err(DbError::from)?;

        self.db
            .query(
                "UPSERT type::record('account', $id) SET \
                 data = $data, serial = $serial, updated_at = time::now()",
            )
            .bind(("id", account.id.clone()))
            .bind(("data", data))
            .bind(("serial", account.network.serial))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        debug!(
            account_id = %account.id,
            serial = account.network.serial,
            "Account saved"
        );
        Ok(())
    }
}
