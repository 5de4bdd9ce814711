//! Authentication middleware and extractors for axum.
//!
//! - `auth_middleware` validates Bearer tokens and injects the caller into
//!   request extensions
//! - `RequireAuth` requires any authenticated caller
//! - `RequireAdmin` requires the admin role
//!
//! ```text
//! Request → auth_middleware → injects AuthenticatedUser into extensions
//!                                      ↓
//!                    Handler → RequireAuth / RequireAdmin read extensions
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::domain::foundation::{AuthError, AuthenticatedUser};
use crate::ports::SessionValidator;

use super::super::error::ErrorResponse;

/// Auth middleware state - wraps the session validator.
pub type AuthState = Arc<dyn SessionValidator>;

/// Authentication middleware that validates Bearer tokens.
///
/// A missing token passes through without a user so unauthenticated routes
/// keep working; extractors reject later. An invalid token is rejected here
/// with 401.
pub async fn auth_middleware(
    State(validator): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    match token {
        Some(token) => match validator.validate(token).await {
            Ok(user) => {
                tracing::debug!(user_id = %user.id, role = %user.role, "Authenticated request");
                request.extensions_mut().insert(user);
                next.run(request).await
            }
            Err(e) => {
                let message = match e {
                    AuthError::TokenExpired => "Token expired",
                    AuthError::InvalidToken => "Invalid token",
                    AuthError::InsufficientPermissions => "Authentication failed",
                };
                (
                    StatusCode::UNAUTHORIZED,
                    Json(ErrorResponse::new("AUTH_ERROR", message)),
                )
                    .into_response()
            }
        },
        None => next.run(request).await,
    }
}

/// Extractor that requires authentication.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthenticatedUser);

impl<S> axum::extract::FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            parts
                .extensions
                .get::<AuthenticatedUser>()
                .cloned()
                .map(RequireAuth)
                .ok_or(AuthRejection::Unauthenticated)
        })
    }
}

/// Extractor that requires an authenticated admin.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub AuthenticatedUser);

impl<S> axum::extract::FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let user = parts
                .extensions
                .get::<AuthenticatedUser>()
                .cloned()
                .ok_or(AuthRejection::Unauthenticated)?;
            if !user.is_admin() {
                tracing::warn!(user_id = %user.id, role = %user.role, "Admin route refused");
                return Err(AuthRejection::Forbidden);
            }
            Ok(RequireAdmin(user))
        })
    }
}

/// Rejection type for authentication failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRejection {
    /// No valid authentication token was provided.
    Unauthenticated,
    /// Authenticated, but the role does not allow the route.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AuthRejection::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", "Authentication required")
            }
            AuthRejection::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN", "Admin role required"),
        };

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;
    use crate::domain::people::UserRole;
    use axum::extract::FromRequestParts;

    fn user(role: UserRole) -> AuthenticatedUser {
        AuthenticatedUser::new(UserId::new(), "someone@grow.fit", role)
    }

    fn parts_with(user: Option<AuthenticatedUser>) -> axum::http::request::Parts {
        let mut request: axum::http::Request<()> =
            axum::http::Request::builder().uri("/test").body(()).unwrap();
        if let Some(user) = user {
            request.extensions_mut().insert(user);
        }
        request.into_parts().0
    }

    #[tokio::test]
    async fn require_auth_extracts_user_from_extensions() {
        let mut parts = parts_with(Some(user(UserRole::Parent)));

        let RequireAuth(extracted) = RequireAuth::from_request_parts(&mut parts, &()).await.unwrap();

        assert_eq!(extracted.email, "someone@grow.fit");
    }

    #[tokio::test]
    async fn require_auth_fails_without_user() {
        let mut parts = parts_with(None);

        let result = RequireAuth::from_request_parts(&mut parts, &()).await;

        assert!(matches!(result, Err(AuthRejection::Unauthenticated)));
    }

    #[tokio::test]
    async fn require_admin_accepts_admin() {
        let mut parts = parts_with(Some(user(UserRole::Admin)));

        assert!(RequireAdmin::from_request_parts(&mut parts, &()).await.is_ok());
    }

    #[tokio::test]
    async fn require_admin_refuses_coach() {
        let mut parts = parts_with(Some(user(UserRole::Coach)));

        let result = RequireAdmin::from_request_parts(&mut parts, &()).await;

        assert!(matches!(result, Err(AuthRejection::Forbidden)));
    }

    #[test]
    fn rejections_map_to_status_codes() {
        assert_eq!(
            AuthRejection::Unauthenticated.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthRejection::Forbidden.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn auth_state_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AuthState>();
        assert_send_sync::<RequireAdmin>();
    }
}
