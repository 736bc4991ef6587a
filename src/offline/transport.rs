use super::{SyncEntity, SyncError, SyncOperation, SyncReport, SyncTransport};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Body shape of every successful API response.
#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Posts batches to a running API with a bearer token.
#[derive(Clone)]
pub struct HttpSyncTransport {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpSyncTransport {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    pub fn endpoint(&self, entity: SyncEntity) -> String {
        format!("{}/api/{}/sync", self.base_url, entity.path())
    }
}

#[async_trait]
impl SyncTransport for HttpSyncTransport {
    #[instrument(skip(self, ops), fields(ops = ops.len()))]
    async fn push(
        &self,
        entity: SyncEntity,
        ops: &[SyncOperation],
    ) -> Result<SyncReport, SyncError> {
        let url = self.endpoint(entity);
        debug!(%url, "Pushing offline batch");
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(ops)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%entity, status = status.as_u16(), "Sync batch rejected");
            return Err(SyncError::Rejected {
                entity,
                status: status.as_u16(),
            });
        }
        let envelope: Envelope<SyncReport> = response.json().await?;
        Ok(envelope.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_uses_entity_path() {
        let transport = HttpSyncTransport::new("http://localhost:8080/", "token").unwrap();
        assert_eq!(
            transport.endpoint(SyncEntity::FicheCoupe),
            "http://localhost:8080/api/fiche-coupe/sync"
        );
    }
}
