// Master data
pub mod client_models;
pub mod clients;

// Customs declarations and deliveries
pub mod inbound;
pub mod outbound;

// Billing
pub mod invoices;

// Workshop
pub mod calendar;
pub mod production;
pub mod staff;

// Reconciliation reports
pub mod reports;

// Offline clients
pub mod sync;
