//! Offline write queue for field clients.
//!
//! Writes made while disconnected are queued per entity in an [`OfflineStore`]. Application
//! lifecycle code calls [`OfflineSyncer::sync`] once connectivity returns; each entity queue is
//! sent in one bulk call to `POST /api/{entity}/sync` and removed from the store only after the
//! server acknowledged it. A failed call leaves the queue as it was. Nothing retries on its own.

mod store;
mod transport;

pub use store::{FileOfflineStore, InMemoryOfflineStore};
pub use transport::HttpSyncTransport;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Entities that accept queued offline writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, strum::Display)]
#[serde(rename_all = "snake_case")]
pub enum SyncEntity {
    #[strum(serialize = "client")]
    Client,
    #[strum(serialize = "fiche_coupe")]
    FicheCoupe,
    #[strum(serialize = "fiche_production")]
    FicheProduction,
}

impl SyncEntity {
    pub const ALL: [SyncEntity; 3] = [
        SyncEntity::Client,
        SyncEntity::FicheCoupe,
        SyncEntity::FicheProduction,
    ];

    /// Path segment under `/api`.
    pub fn path(self) -> &'static str {
        match self {
            SyncEntity::Client => "client",
            SyncEntity::FicheCoupe => "fiche-coupe",
            SyncEntity::FicheProduction => "fiche-production",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SyncOp {
    Upsert,
    Delete,
}

/// One queued write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SyncOperation {
    /// Client-side queue id, echoed back in the result
    #[serde(default = "Uuid::new_v4")]
    pub op_id: Uuid,
    pub op: SyncOp,
    /// Server id of the record; absent for records created offline
    pub id: Option<i32>,
    /// Full record payload for upserts
    #[schema(value_type = Option<Object>)]
    pub data: Option<serde_json::Value>,
    #[serde(default = "Utc::now")]
    pub queued_at: DateTime<Utc>,
}

impl SyncOperation {
    pub fn upsert(id: Option<i32>, data: serde_json::Value) -> Self {
        Self {
            op_id: Uuid::new_v4(),
            op: SyncOp::Upsert,
            id,
            data: Some(data),
            queued_at: Utc::now(),
        }
    }

    pub fn delete(id: i32) -> Self {
        Self {
            op_id: Uuid::new_v4(),
            op: SyncOp::Delete,
            id: Some(id),
            data: None,
            queued_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    Applied,
    /// Delete of a record that no longer exists
    Ignored,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SyncOperationResult {
    pub op_id: Uuid,
    pub outcome: SyncOutcome,
    /// Server id after the operation
    pub id: Option<i32>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SyncReport {
    pub entity: SyncEntity,
    pub applied: usize,
    pub ignored: usize,
    pub failed: usize,
    pub results: Vec<SyncOperationResult>,
}

impl SyncReport {
    pub fn new(entity: SyncEntity, results: Vec<SyncOperationResult>) -> Self {
        let count = |outcome: SyncOutcome| results.iter().filter(|r| r.outcome == outcome).count();
        Self {
            entity,
            applied: count(SyncOutcome::Applied),
            ignored: count(SyncOutcome::Ignored),
            failed: count(SyncOutcome::Failed),
            results,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server rejected {entity} batch with status {status}")]
    Rejected { entity: SyncEntity, status: u16 },
    #[error("offline store error: {0}")]
    Store(String),
}

/// Local queue of pending writes.
#[async_trait]
pub trait OfflineStore: Send + Sync {
    async fn enqueue(&self, entity: SyncEntity, op: SyncOperation) -> Result<(), SyncError>;

    /// Pending operations of `entity`, oldest first.
    async fn pending(&self, entity: SyncEntity) -> Result<Vec<SyncOperation>, SyncError>;

    /// Drops acknowledged operations.
    async fn acknowledge(&self, entity: SyncEntity, op_ids: &[Uuid]) -> Result<(), SyncError>;
}

/// Sends one entity batch to the server.
#[async_trait]
pub trait SyncTransport: Send + Sync {
    async fn push(
        &self,
        entity: SyncEntity,
        ops: &[SyncOperation],
    ) -> Result<SyncReport, SyncError>;
}

pub struct OfflineSyncer {
    store: Arc<dyn OfflineStore>,
    transport: Arc<dyn SyncTransport>,
}

impl OfflineSyncer {
    pub fn new(store: Arc<dyn OfflineStore>, transport: Arc<dyn SyncTransport>) -> Self {
        Self { store, transport }
    }

    /// Pushes every non-empty queue. Stops at the first failed call and returns its error; queues
    /// already pushed stay acknowledged.
    #[instrument(skip(self))]
    pub async fn sync(&self) -> Result<Vec<SyncReport>, SyncError> {
        let mut reports = Vec::new();
        for entity in SyncEntity::ALL {
            let ops = self.store.pending(entity).await?;
            if ops.is_empty() {
                continue;
            }
            let report = match self.transport.push(entity, &ops).await {
                Ok(report) => report,
                Err(e) => {
                    warn!(%entity, pending = ops.len(), error = %e, "Offline sync failed");
                    return Err(e);
                }
            };

            // The server has seen the whole batch; failed operations are reported, not retried.
            let sent: Vec<Uuid> = ops.iter().map(|op| op.op_id).collect();
            self.store.acknowledge(entity, &sent).await?;
            info!(%entity, applied = report.applied, failed = report.failed, "Offline queue synced");
            reports.push(report);
        }
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingTransport {
        calls: Mutex<Vec<(SyncEntity, usize)>>,
        fail_on: Option<SyncEntity>,
    }

    #[async_trait]
    impl SyncTransport for RecordingTransport {
        async fn push(
            &self,
            entity: SyncEntity,
            ops: &[SyncOperation],
        ) -> Result<SyncReport, SyncError> {
            self.calls.lock().unwrap().push((entity, ops.len()));
            if self.fail_on == Some(entity) {
                return Err(SyncError::Rejected {
                    entity,
                    status: 503,
                });
            }
            let results = ops
                .iter()
                .map(|op| SyncOperationResult {
                    op_id: op.op_id,
                    outcome: SyncOutcome::Applied,
                    id: op.id,
                    error: None,
                })
                .collect();
            Ok(SyncReport::new(entity, results))
        }
    }

    #[tokio::test]
    async fn one_bulk_call_per_entity_and_queue_cleared() {
        let store = Arc::new(InMemoryOfflineStore::default());
        store
            .enqueue(SyncEntity::Client, SyncOperation::upsert(None, serde_json::json!({"name": "A"})))
            .await
            .unwrap();
        store
            .enqueue(SyncEntity::Client, SyncOperation::delete(4))
            .await
            .unwrap();
        store
            .enqueue(SyncEntity::FicheProduction, SyncOperation::delete(9))
            .await
            .unwrap();

        let transport = Arc::new(RecordingTransport::default());
        let syncer = OfflineSyncer::new(store.clone(), transport.clone());
        let reports = syncer.sync().await.unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(
            *transport.calls.lock().unwrap(),
            vec![(SyncEntity::Client, 2), (SyncEntity::FicheProduction, 1)]
        );
        assert!(store.pending(SyncEntity::Client).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_push_leaves_queue_untouched() {
        let store = Arc::new(InMemoryOfflineStore::default());
        store
            .enqueue(SyncEntity::FicheCoupe, SyncOperation::delete(1))
            .await
            .unwrap();
        let transport = Arc::new(RecordingTransport {
            fail_on: Some(SyncEntity::FicheCoupe),
            ..Default::default()
        });
        let syncer = OfflineSyncer::new(store.clone(), transport);

        assert!(syncer.sync().await.is_err());
        assert_eq!(store.pending(SyncEntity::FicheCoupe).await.unwrap().len(), 1);
    }

    #[test]
    fn report_counts_outcomes() {
        let result = |outcome| SyncOperationResult {
            op_id: Uuid::new_v4(),
            outcome,
            id: None,
            error: None,
        };
        let report = SyncReport::new(
            SyncEntity::Client,
            vec![
                result(SyncOutcome::Applied),
                result(SyncOutcome::Ignored),
                result(SyncOutcome::Failed),
                result(SyncOutcome::Applied),
            ],
        );
        assert_eq!((report.applied, report.ignored, report.failed), (2, 1, 1));
    }
}
