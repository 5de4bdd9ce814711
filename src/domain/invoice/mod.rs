//! Parent invoices and payment tracking.

mod aggregate;

pub use aggregate::{Invoice, InvoiceStatus, InvoiceSummary, PaymentMethod};
