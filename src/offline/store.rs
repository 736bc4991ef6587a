use super::{OfflineStore, SyncEntity, SyncError, SyncOperation};
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Process-local queue, lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryOfflineStore {
    queues: DashMap<SyncEntity, Vec<SyncOperation>>,
}

impl InMemoryOfflineStore {
    pub fn len(&self) -> usize {
        self.queues.iter().map(|q| q.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl OfflineStore for InMemoryOfflineStore {
    async fn enqueue(&self, entity: SyncEntity, op: SyncOperation) -> Result<(), SyncError> {
        self.queues.entry(entity).or_default().push(op);
        Ok(())
    }

    async fn pending(&self, entity: SyncEntity) -> Result<Vec<SyncOperation>, SyncError> {
        Ok(self
            .queues
            .get(&entity)
            .map(|q| q.value().clone())
            .unwrap_or_default())
    }

    async fn acknowledge(&self, entity: SyncEntity, op_ids: &[Uuid]) -> Result<(), SyncError> {
        let acked: HashSet<&Uuid> = op_ids.iter().collect();
        if let Some(mut queue) = self.queues.get_mut(&entity) {
            queue.retain(|op| !acked.contains(&op.op_id));
        }
        Ok(())
    }
}

/// Queue persisted as one JSON document, so writes made offline survive a restart.
///
/// Every mutation rewrites the whole file through a temporary sibling and a rename.
#[derive(Debug)]
pub struct FileOfflineStore {
    path: PathBuf,
    lock: Mutex<()>,
}

type Queues = HashMap<SyncEntity, Vec<SyncOperation>>;

impl FileOfflineStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn read(&self) -> Result<Queues, SyncError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(Queues::new()),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| SyncError::Store(format!("corrupt queue file: {e}"))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Queues::new()),
            Err(e) => Err(SyncError::Store(e.to_string())),
        }
    }

    async fn write(&self, queues: &Queues) -> Result<(), SyncError> {
        let bytes = serde_json::to_vec(queues).map_err(|e| SyncError::Store(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| SyncError::Store(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| SyncError::Store(e.to_string()))
    }
}

#[async_trait]
impl OfflineStore for FileOfflineStore {
    async fn enqueue(&self, entity: SyncEntity, op: SyncOperation) -> Result<(), SyncError> {
        let _guard = self.lock.lock().await;
        let mut queues = self.read().await?;
        queues.entry(entity).or_default().push(op);
        self.write(&queues).await
    }

    async fn pending(&self, entity: SyncEntity) -> Result<Vec<SyncOperation>, SyncError> {
        let _guard = self.lock.lock().await;
        Ok(self.read().await?.remove(&entity).unwrap_or_default())
    }

    async fn acknowledge(&self, entity: SyncEntity, op_ids: &[Uuid]) -> Result<(), SyncError> {
        let _guard = self.lock.lock().await;
        let mut queues = self.read().await?;
        let acked: HashSet<&Uuid> = op_ids.iter().collect();
        if let Some(queue) = queues.get_mut(&entity) {
            queue.retain(|op| !acked.contains(&op.op_id));
        }
        self.write(&queues).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn acknowledge_keeps_operations_queued_meanwhile() {
        let store = InMemoryOfflineStore::default();
        let first = SyncOperation::delete(1);
        store.enqueue(SyncEntity::Client, first.clone()).await.unwrap();
        let snapshot = store.pending(SyncEntity::Client).await.unwrap();

        store
            .enqueue(SyncEntity::Client, SyncOperation::delete(2))
            .await
            .unwrap();
        let ids: Vec<Uuid> = snapshot.iter().map(|op| op.op_id).collect();
        store.acknowledge(SyncEntity::Client, &ids).await.unwrap();

        let left = store.pending(SyncEntity::Client).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, Some(2));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn file_store_survives_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("queue.json");

        let store = FileOfflineStore::new(&path);
        let kept = SyncOperation::upsert(None, serde_json::json!({ "name": "Offline" }));
        let acked = SyncOperation::delete(3);
        store.enqueue(SyncEntity::Client, kept.clone()).await.unwrap();
        store.enqueue(SyncEntity::Client, acked.clone()).await.unwrap();
        store
            .enqueue(SyncEntity::FicheCoupe, SyncOperation::delete(8))
            .await
            .unwrap();
        store
            .acknowledge(SyncEntity::Client, &[acked.op_id])
            .await
            .unwrap();
        drop(store);

        let reopened = FileOfflineStore::new(&path);
        assert_eq!(reopened.pending(SyncEntity::Client).await.unwrap(), vec![kept]);
        assert_eq!(reopened.pending(SyncEntity::FicheCoupe).await.unwrap().len(), 1);
        assert!(reopened
            .pending(SyncEntity::FicheProduction)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_an_empty_queue() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileOfflineStore::new(dir.path().join("absent.json"));
        assert!(store.pending(SyncEntity::Client).await.unwrap().is_empty());
    }
}
