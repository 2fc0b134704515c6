//! SurrealDB implementation of [`ActivityStore`].

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use meshgate_core::error::{MeshError, MeshResult};
use meshgate_core::models::activity::{Activity, ActivityEvent, EventMeta};
use meshgate_core::repository::{ActivityStore, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::DbError;

const INSERT_QUERY: &str = "\
CREATE activity_event SET \
 seq = $seq, activity = $activity, timestamp = $timestamp, \
 initiator_id = $initiator_id, target_id = $target_id, \
 account_id = $account_id, meta = $meta";

const SELECT_ASC_QUERY: &str = "\
SELECT seq, activity, timestamp, initiator_id, target_id, account_id, meta \
 FROM activity_event WHERE account_id = $account_id \
 ORDER BY timestamp ASC, seq ASC LIMIT $limit START $offset";

const SELECT_DESC_QUERY: &str = "\
SELECT seq, activity, timestamp, initiator_id, target_id, account_id, meta \
 FROM activity_event WHERE account_id = $account_id \
 ORDER BY timestamp DESC, seq DESC LIMIT $limit START $offset";

#[derive(Debug, SurrealValue)]
struct EventRow {
    seq: u64,
    activity: i64,
    timestamp: DateTime<Utc>,
    initiator_id: String,
    target_id: String,
    account_id: String,
    meta: String,
}

impl EventRow {
    fn try_into_event(self) -> Result<ActivityEvent, DbError> {
        let activity = Activity::from_code(self.activity)
            .ok_or_else(|| DbError::Corrupt(format!("unknown activity code: {}", self.activity)))?;
        Ok(ActivityEvent {
            id: self.seq,
            timestamp: self.timestamp,
            activity,
            initiator_id: self.initiator_id,
            target_id: self.target_id,
            account_id: self.account_id,
            meta: decode_meta(&self.meta)?,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct SeqRow {
    seq: u64,
}

/// An empty column means "no metadata", not an error.
fn decode_meta(raw: &str) -> Result<EventMeta, DbError> {
    if raw.is_empty() {
        return Ok(EventMeta::new());
    }
    Ok(serde_json::from_str(raw)?)
}

/// Append-only activity log backed by SurrealDB.
///
/// Event IDs come from an in-process sequence seeded from the highest
/// persisted ID, so they stay monotonic across restarts.
pub struct SurrealActivityStore<C: Connection> {
    db: RwLock<Option<Surreal<C>>>,
    last_seq: AtomicU64,
}

impl<C: Connection> SurrealActivityStore<C> {
    pub async fn open(db: Surreal<C>) -> Result<Self, DbError> {
        let mut result = db
            .query("SELECT seq FROM activity_event ORDER BY seq DESC LIMIT 1")
            .await?;
        let rows: Vec<SeqRow> = result.take(0)?;
        let last_seq = rows.first().map(|r| r.seq).unwrap_or(0);

        info!(last_seq, "Opened activity store");

        Ok(Self {
            db: RwLock::new(Some(db)),
            last_seq: AtomicU64::new(last_seq),
        })
    }

    async fn handle(&self) -> MeshResult<Surreal<C>> {
        self.db.read().await.clone().ok_or(MeshError::StoreClosed)
    }
}

impl<C: Connection> ActivityStore for SurrealActivityStore<C> {
    async fn save(&self, event: &ActivityEvent) -> MeshResult<ActivityEvent> {
        let db = self.handle().await?;
        let meta = serde_json::to_string(&event.meta).map_err(DbError::from)?;
        let seq = self.last_seq.fetch_add(1, Ordering::SeqCst) + 1;

        db.query(INSERT_QUERY)
            .bind(("seq", seq))
            .bind(("activity", event.activity.code()))
            .bind(("timestamp", event.timestamp))
            .bind(("initiator_id", event.initiator_id.clone()))
            .bind(("target_id", event.target_id.clone()))
            .bind(("account_id", event.account_id.clone()))
            .bind(("meta", meta))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        debug!(
            id = seq,
            account_id = %event.account_id,
            activity = event.activity.string_code(),
            "Activity event stored"
        );

        let mut stored = event.clone();
        stored.id = seq;
        Ok(stored)
    }

    async fn get(
        &self,
        account_id: &str,
        pagination: Pagination,
        descending: bool,
    ) -> MeshResult<Vec<ActivityEvent>> {
        let db = self.handle().await?;
        let query = if descending {
            SELECT_DESC_QUERY
        } else {
            SELECT_ASC_QUERY
        };

        let mut result = db
            .query(query)
            .bind(("account_id", account_id.to_owned()))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EventRow> = result.take(0).map_err(DbError::from)?;

        let events = rows
            .into_iter()
            .map(|row| row.try_into_event())
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(events)
    }

    async fn close(&self) -> MeshResult<()> {
        let db = self.db.write().await.take();
        match db {
            Some(_) => {
                info!("Activity store closed");
                Ok(())
            }
            None => Err(MeshError::StoreClosed),
        }
    }
}
