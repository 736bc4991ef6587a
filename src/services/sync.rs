//! Server side of offline sync: applies a queued batch in order.

use crate::{
    errors::ServiceError,
    events::{Event, EventSender},
    offline::{SyncEntity, SyncOp, SyncOperation, SyncOperationResult, SyncOutcome, SyncReport},
    services::{
        clients::{ClientInput, ClientService},
        production::{FicheCoupeInput, FicheProductionInput, ProductionService},
    },
};
use chrono::Utc;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{instrument, warn};

#[derive(Clone)]
pub struct SyncService {
    clients: Arc<ClientService>,
    production: Arc<ProductionService>,
    event_sender: EventSender,
}

fn payload<T: DeserializeOwned>(op: &SyncOperation) -> Result<T, ServiceError> {
    let data = op
        .data
        .clone()
        .ok_or_else(|| ServiceError::BadRequest("upsert without data".into()))?;
    serde_json::from_value(data).map_err(|e| ServiceError::BadRequest(e.to_string()))
}

impl SyncService {
    pub fn new(
        clients: Arc<ClientService>,
        production: Arc<ProductionService>,
        event_sender: EventSender,
    ) -> Self {
        Self {
            clients,
            production,
            event_sender,
        }
    }

    /// Upserts go by id (last write wins) and create a new record when the id is unknown.
    async fn apply(
        &self,
        entity: SyncEntity,
        op: &SyncOperation,
    ) -> Result<(SyncOutcome, Option<i32>), ServiceError> {
        match op.op {
            SyncOp::Upsert => {
                let id = match entity {
                    SyncEntity::Client => {
                        self.clients.upsert(op.id, payload::<ClientInput>(op)?).await?.id
                    }
                    SyncEntity::FicheCoupe => {
                        self.production
                            .upsert_coupe(op.id, payload::<FicheCoupeInput>(op)?)
                            .await?
                            .id
                    }
                    SyncEntity::FicheProduction => {
                        self.production
                            .upsert_production(op.id, payload::<FicheProductionInput>(op)?)
                            .await?
                            .id
                    }
                };
                Ok((SyncOutcome::Applied, Some(id)))
            }
            SyncOp::Delete => {
                let id = op
                    .id
                    .ok_or_else(|| ServiceError::BadRequest("delete without id".into()))?;
                let deleted = match entity {
                    SyncEntity::Client => self.clients.delete_if_exists(id).await?,
                    SyncEntity::FicheCoupe => self.production.delete_coupe_if_exists(id).await?,
                    SyncEntity::FicheProduction => {
                        self.production.delete_production_if_exists(id).await?
                    }
                };
                let outcome = if deleted {
                    SyncOutcome::Applied
                } else {
                    SyncOutcome::Ignored
                };
                Ok((outcome, None))
            }
        }
    }

    /// Applies `ops` in order. A failing operation is reported and does not stop the batch.
    #[instrument(skip(self, ops), fields(ops = ops.len()))]
    pub async fn apply_batch(
        &self,
        entity: SyncEntity,
        ops: Vec<SyncOperation>,
    ) -> Result<SyncReport, ServiceError> {
        let mut results = Vec::with_capacity(ops.len());
        for op in &ops {
            let result = match self.apply(entity, op).await {
                Ok((outcome, id)) => SyncOperationResult {
                    op_id: op.op_id,
                    outcome,
                    id: id.or(op.id),
                    error: None,
                },
                Err(e) => {
                    warn!(%entity, op_id = %op.op_id, error = %e, "Queued operation failed");
                    SyncOperationResult {
                        op_id: op.op_id,
                        outcome: SyncOutcome::Failed,
                        id: op.id,
                        error: Some(e.response_message()),
                    }
                }
            };
            results.push(result);
        }

        let report = SyncReport::new(entity, results);
        self.event_sender
            .send_or_log(Event::SyncBatchApplied {
                entity: entity.to_string(),
                applied: report.applied,
                failed: report.failed,
                received_at: Utc::now(),
            })
            .await;
        Ok(report)
    }
}
