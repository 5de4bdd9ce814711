//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Data access
//!
//! - `UserRepository`, `ChildRepository`, `LocationRepository` - people and places
//! - `SessionRepository` - sessions, overlap queries and reminder claims
//! - `RequestRepository` - reschedule/cancel requests
//! - `MilestoneRepository` - rules and awards
//! - `CrmEventRepository` - CRM activity log
//! - `InvoiceRepository` - invoices
//!
//! ## Side effects
//!
//! - `Mailer` - outbound email
//! - `SessionValidator` - bearer token validation

mod crm_event_repository;
mod invoice_repository;
mod mailer;
mod milestone_repository;
mod request_repository;
mod session_repository;
mod session_validator;
mod user_repository;

pub use crm_event_repository::CrmEventRepository;
pub use invoice_repository::InvoiceRepository;
pub use mailer::{MailError, Mailer};
pub use milestone_repository::MilestoneRepository;
pub use request_repository::RequestRepository;
pub use session_repository::SessionRepository;
pub use session_validator::SessionValidator;
pub use user_repository::{ChildRepository, LocationRepository, UserRepository};
