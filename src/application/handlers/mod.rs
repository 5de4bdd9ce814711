//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod invoice;
pub mod report;
pub mod request;
pub mod session;

pub use invoice::{InvoiceError, InvoiceSummaryHandler, MarkInvoicePaidCommand, MarkInvoicePaidHandler};
pub use report::{GenerateReportHandler, GenerateReportQuery};
pub use request::{
    ApproveRequestCommand, ApproveRequestHandler, ApproveRequestResult, RejectRequestCommand,
    RejectRequestHandler, SubmitRequestCommand, SubmitRequestHandler,
};
pub use session::{CheckConflictsHandler, CreateSessionCommand, CreateSessionHandler};
