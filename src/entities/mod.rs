//! sea-orm entities for the back-office schema.

pub mod accessory;
pub mod calendar_event;
pub mod client;
pub mod client_model;
pub mod document_status;
pub mod employee;
pub mod fiche_coupe;
pub mod fiche_production;
pub mod inbound_document;
pub mod inbound_line;
pub mod invoice;
pub mod invoice_line;
pub mod outbound_document;
pub mod outbound_line;
pub mod production_time;
pub mod suivi_production;

pub use document_status::DocumentStatus;
