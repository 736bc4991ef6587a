use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::entities::DocumentStatus;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends without surfacing failures; a dropped receiver only loses the audit trail.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!(error = %e, "Failed to publish domain event");
        }
    }
}

/// Domain events emitted by the services after a successful write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    ClientCreated(i32),
    ClientUpdated(i32),
    ClientDeleted(i32),
    ClientModelSaved(i32),
    ClientModelDeleted(i32),

    InboundDocumentSaved {
        document_id: i32,
        kind: String,
        flagged_lines: usize,
    },
    OutboundDocumentSaved {
        document_id: i32,
        kind: String,
    },
    DocumentDeleted {
        document_id: i32,
        kind: String,
    },

    InvoiceSaved(i32),
    InvoiceDeleted(i32),
    InvoiceStatusChanged {
        invoice_id: i32,
        from: DocumentStatus,
        to: DocumentStatus,
    },
    /// Pending document read after its due date
    BecameUnpaid {
        kind: String,
        id: i32,
    },

    ProductionSheetSaved {
        kind: String,
        id: i32,
        produced: i64,
    },

    SyncBatchApplied {
        entity: String,
        applied: usize,
        failed: usize,
        received_at: DateTime<Utc>,
    },
}

/// Drains the event channel. Events are currently an audit log only.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::InboundDocumentSaved {
                document_id,
                kind,
                flagged_lines,
            } if *flagged_lines > 0 => {
                warn!(
                    document_id,
                    kind = %kind,
                    flagged_lines,
                    "Inbound document has lines with more found than received"
                );
            }
            Event::BecameUnpaid { kind, id } => {
                warn!(kind = %kind, id, "Document past due date marked unpaid");
            }
            Event::SyncBatchApplied {
                entity,
                applied,
                failed,
                ..
            } if *failed > 0 => {
                warn!(entity = %entity, applied, failed, "Offline sync batch partially failed");
            }
            _ => info!(?event, "Domain event"),
        }
    }

    warn!("Event processing loop has ended");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_to_receiver() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);
        sender.send(Event::ClientCreated(3)).await.unwrap();
        assert_eq!(rx.recv().await, Some(Event::ClientCreated(3)));
    }

    #[tokio::test]
    async fn send_fails_once_receiver_is_gone() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        assert!(sender.send(Event::InvoiceSaved(1)).await.is_err());
        sender.send_or_log(Event::InvoiceSaved(1)).await;
    }
}
