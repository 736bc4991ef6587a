//! Dashboard, planning and état reports.
//!
//! All three are thin wrappers over [`crate::reconciliation`]: this module only loads the
//! entity collections and maps them into reconciliation inputs.

use crate::{
    billing,
    db::DbPool,
    entities::{
        client, client_model, fiche_coupe, fiche_production, inbound_document, inbound_line,
        invoice, invoice_line, outbound_document, outbound_line, DocumentStatus,
    },
    errors::ServiceError,
    reconciliation::{
        self, InboundEntry, InboundReportRow, ModelOrders, OutboundEntry, OutboundReportRow,
        PlanningFilter, PlanningRow, ReconciliationSources, ReconciliationTotals, SheetActivity,
    },
    services::{clients::ExpiringClient, clients::ClientService, invoices::InvoiceService},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ActiveEnum, EntityTrait, PaginatorTrait};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;

/// Every client model with its owner's name and decoded orders.
pub async fn load_models(db: &DbPool) -> Result<Vec<ModelOrders>, ServiceError> {
    client_model::Entity::find()
        .find_also_related(client::Entity)
        .all(db)
        .await?
        .into_iter()
        .map(|(model, owner)| -> Result<ModelOrders, ServiceError> {
            Ok(ModelOrders {
                client_model_id: Some(model.id),
                client: owner.map(|c| c.name).unwrap_or_default(),
                orders: model.orders()?,
                model: model.name,
                commandes: model.commandes,
            })
        })
        .collect()
}

/// Loads every record the reconciliation needs.
#[instrument(skip(db))]
pub async fn load_sources(db: &DbPool) -> Result<ReconciliationSources, ServiceError> {
    let models = load_models(db).await?;

    let inbound = inbound_document::Entity::find()
        .find_with_related(inbound_line::Entity)
        .all(db)
        .await?
        .into_iter()
        .flat_map(|(doc, lines)| {
            lines.into_iter().map(move |line| InboundEntry {
                document_id: doc.id,
                kind: doc.kind.to_value(),
                reference: doc.reference.clone(),
                date: doc.date,
                client: doc.client.clone(),
                client_model_id: line.client_model_id,
                model: line.model,
                commande: line.commande,
                quantity_recu: line.quantity_recu,
                quantity_trouve: line.quantity_trouve,
            })
        })
        .collect();

    let outbound = outbound_document::Entity::find()
        .find_with_related(outbound_line::Entity)
        .all(db)
        .await?
        .into_iter()
        .flat_map(|(doc, lines)| {
            lines.into_iter().map(move |line| OutboundEntry {
                document_id: doc.id,
                kind: doc.kind.to_value(),
                reference: doc.reference.clone(),
                date: doc.date,
                client: doc.client.clone(),
                client_model_id: line.client_model_id,
                model: line.model,
                commande: line.commande,
                quantity_livree: line.quantity_livree,
                is_excluded: line.is_excluded,
            })
        })
        .collect();

    let cuts = fiche_coupe::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|sheet| SheetActivity {
            client: sheet.client,
            client_model_id: sheet.client_model_id,
            model: sheet.model,
            commande: sheet.commande,
            created_at: sheet.created_at,
        })
        .collect();

    let sewing = fiche_production::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|sheet| SheetActivity {
            client: sheet.client,
            client_model_id: sheet.client_model_id,
            model: sheet.model,
            commande: sheet.commande,
            created_at: sheet.created_at,
        })
        .collect();

    let sources = ReconciliationSources {
        models,
        inbound,
        outbound,
        cuts,
        sewing,
    };
    debug!(
        models = sources.models.len(),
        inbound = sources.inbound.len(),
        outbound = sources.outbound.len(),
        "Reconciliation sources loaded"
    );
    Ok(sources)
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InvoiceStatusSummary {
    pub status: DocumentStatus,
    pub count: u64,
    pub total_ttc: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardCounts {
    pub clients: u64,
    pub client_models: u64,
    pub open_orders: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Dashboard {
    pub counts: DashboardCounts,
    pub reconciliation: ReconciliationTotals,
    pub invoices: Vec<InvoiceStatusSummary>,
    pub expiring_clients: Vec<ExpiringClient>,
}

#[derive(Clone)]
pub struct ReportService {
    db_pool: Arc<DbPool>,
    clients: Arc<ClientService>,
    invoices: Arc<InvoiceService>,
}

impl ReportService {
    pub fn new(
        db_pool: Arc<DbPool>,
        clients: Arc<ClientService>,
        invoices: Arc<InvoiceService>,
    ) -> Self {
        Self {
            db_pool,
            clients,
            invoices,
        }
    }

    #[instrument(skip(self))]
    pub async fn planning(&self, filter: PlanningFilter) -> Result<Vec<PlanningRow>, ServiceError> {
        let sources = load_sources(&self.db_pool).await?;
        Ok(reconciliation::planning_rows(&sources, &filter))
    }

    #[instrument(skip(self))]
    pub async fn etat_import(&self) -> Result<Vec<InboundReportRow>, ServiceError> {
        let sources = load_sources(&self.db_pool).await?;
        Ok(reconciliation::inbound_report(&sources.inbound))
    }

    #[instrument(skip(self))]
    pub async fn etat_export(&self) -> Result<Vec<OutboundReportRow>, ServiceError> {
        let sources = load_sources(&self.db_pool).await?;
        Ok(reconciliation::outbound_report(&sources))
    }

    #[instrument(skip(self))]
    pub async fn dashboard(
        &self,
        today: NaiveDate,
        expiry_notice_days: i64,
    ) -> Result<Dashboard, ServiceError> {
        self.invoices.mark_overdue(today).await?;

        let db = &*self.db_pool;
        let sources = load_sources(db).await?;
        let rows = reconciliation::planning_rows(&sources, &PlanningFilter::default());
        let totals = reconciliation::totals(&rows);

        let mut by_status: HashMap<DocumentStatus, (u64, Decimal)> = HashMap::new();
        for (inv, lines) in invoice::Entity::find()
            .find_with_related(invoice_line::Entity)
            .all(db)
            .await?
        {
            let ttc = billing::compute_totals(&lines, inv.vat_active, inv.vat_rate).total_ttc;
            let entry = by_status.entry(inv.status).or_default();
            entry.0 += 1;
            entry.1 += ttc;
        }
        let invoices = [
            DocumentStatus::Draft,
            DocumentStatus::Pending,
            DocumentStatus::Paid,
            DocumentStatus::Cancelled,
            DocumentStatus::Unpaid,
        ]
        .into_iter()
        .map(|status| {
            let (count, total_ttc) = by_status.remove(&status).unwrap_or_default();
            InvoiceStatusSummary {
                status,
                count,
                total_ttc,
            }
        })
        .collect();

        Ok(Dashboard {
            counts: DashboardCounts {
                clients: client::Entity::find().count(db).await?,
                client_models: client_model::Entity::find().count(db).await?,
                open_orders: totals.open_orders,
            },
            reconciliation: totals,
            invoices,
            expiring_clients: self.clients.expiring(today, expiry_notice_days).await?,
        })
    }
}

