//! HTTP adapters - REST API implementations.
//!
//! Each domain module has its own handlers and routes; `router` nests them
//! under `/api` behind the auth middleware.

pub mod error;
pub mod invoice;
pub mod job;
pub mod middleware;
pub mod report;
pub mod request;
pub mod router;
pub mod session;

pub use error::ErrorResponse;
pub use invoice::InvoiceHandlers;
pub use job::JobHandlers;
pub use report::ReportHandlers;
pub use request::RequestHandlers;
pub use router::{api_router, health, with_http_layers, ApiHandlers};
pub use session::SessionHandlers;
