//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `auth` - JWT session validation
//! - `email` - Resend mailer plus logging and recording mailers
//! - `http` - axum REST surface
//! - `memory` - in-memory store implementing every repository port
//! - `postgres` - sqlx repositories

pub mod auth;
pub mod email;
pub mod http;
pub mod memory;
pub mod postgres;

pub use auth::{JwtSessionValidator, MockSessionValidator};
pub use email::{LoggingMailer, RecordingMailer, ResendConfig, ResendMailer};
pub use memory::InMemoryStore;
