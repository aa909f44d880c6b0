//! Ticket engine: lifecycle rules, SLA derivation and dashboard metrics

pub mod metrics;
pub mod service;
pub mod sla;

pub use metrics::MetricsReporter;
pub use service::{NewTicket, TicketDraft, TicketService};
