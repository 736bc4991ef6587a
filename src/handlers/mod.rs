pub mod calendar;
pub mod client_models;
pub mod clients;
pub mod common;
pub mod inbound;
pub mod invoices;
pub mod outbound;
pub mod production;
pub mod reports;
pub mod staff;

use crate::{
    config::AppConfig,
    db::DbPool,
    events::EventSender,
    services::{
        calendar::CalendarService, client_models::ClientModelService, clients::ClientService,
        inbound::InboundService, invoices::InvoiceService, outbound::OutboundService,
        production::ProductionService, reports::ReportService, staff::StaffService,
        sync::SyncService,
    },
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub clients: Arc<ClientService>,
    pub client_models: Arc<ClientModelService>,
    pub inbound: Arc<InboundService>,
    pub outbound: Arc<OutboundService>,
    pub invoices: Arc<InvoiceService>,
    pub production: Arc<ProductionService>,
    pub staff: Arc<StaffService>,
    pub calendar: Arc<CalendarService>,
    pub reports: Arc<ReportService>,
    pub sync: Arc<SyncService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender, config: &AppConfig) -> Self {
        let vat_rate = config.vat_rate();

        let clients = Arc::new(ClientService::new(db_pool.clone(), event_sender.clone()));
        let client_models = Arc::new(ClientModelService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let inbound = Arc::new(InboundService::new(db_pool.clone(), event_sender.clone()));
        let outbound = Arc::new(OutboundService::new(
            db_pool.clone(),
            event_sender.clone(),
            vat_rate,
        ));
        let invoices = Arc::new(InvoiceService::new(
            db_pool.clone(),
            event_sender.clone(),
            vat_rate,
        ));
        let production = Arc::new(ProductionService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let staff = Arc::new(StaffService::new(db_pool.clone()));
        let calendar = Arc::new(CalendarService::new(db_pool.clone()));
        let reports = Arc::new(ReportService::new(
            db_pool,
            clients.clone(),
            invoices.clone(),
        ));
        let sync = Arc::new(SyncService::new(
            clients.clone(),
            production.clone(),
            event_sender,
        ));

        Self {
            clients,
            client_models,
            inbound,
            outbound,
            invoices,
            production,
            staff,
            calendar,
            reports,
            sync,
        }
    }
}
