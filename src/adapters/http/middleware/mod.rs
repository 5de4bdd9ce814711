//! HTTP middleware for axum.
//!
//! - `auth` - Bearer token middleware and role-checking extractors

pub mod auth;

pub use auth::{auth_middleware, AuthRejection, AuthState, RequireAdmin, RequireAuth};
