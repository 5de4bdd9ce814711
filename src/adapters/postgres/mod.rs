//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! Queries are checked at runtime (no offline query cache). Schema lives in
//! `migrations/` and is applied at startup with `sqlx::migrate!`.

mod crm_event_repository;
mod invoice_repository;
mod milestone_repository;
mod request_repository;
mod rows;
mod session_repository;
mod user_repository;

pub use crm_event_repository::PostgresCrmEventRepository;
pub use invoice_repository::PostgresInvoiceRepository;
pub use milestone_repository::PostgresMilestoneRepository;
pub use request_repository::PostgresRequestRepository;
pub use session_repository::PostgresSessionRepository;
pub use user_repository::{
    PostgresChildRepository, PostgresLocationRepository, PostgresUserRepository,
};
