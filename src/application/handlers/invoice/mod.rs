//! Invoice payment handlers.

mod invoice_summary;
mod mark_invoice_paid;

pub use invoice_summary::InvoiceSummaryHandler;
pub use mark_invoice_paid::{InvoiceError, MarkInvoicePaidCommand, MarkInvoicePaidHandler};
