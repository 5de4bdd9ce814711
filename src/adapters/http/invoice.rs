//! HTTP adapter for invoice endpoints.
//!
//! - `POST /api/invoices/:id/pay` - mark an invoice paid
//! - `GET /api/invoices/summary` - paid/unpaid totals

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use super::error::{bad_request, handle_invoice_error};
use super::middleware::RequireAdmin;
use crate::application::handlers::{
    InvoiceSummaryHandler, MarkInvoicePaidCommand, MarkInvoicePaidHandler,
};
use crate::domain::foundation::{InvoiceId, Timestamp};
use crate::domain::invoice::PaymentMethod;

#[derive(Debug, Clone, Deserialize)]
pub struct MarkPaidBody {
    pub method: PaymentMethod,
    /// Defaults to now.
    pub paid_date: Option<Timestamp>,
}

#[derive(Clone)]
pub struct InvoiceHandlers {
    mark_paid_handler: Arc<MarkInvoicePaidHandler>,
    summary_handler: Arc<InvoiceSummaryHandler>,
}

impl InvoiceHandlers {
    pub fn new(
        mark_paid_handler: Arc<MarkInvoicePaidHandler>,
        summary_handler: Arc<InvoiceSummaryHandler>,
    ) -> Self {
        Self {
            mark_paid_handler,
            summary_handler,
        }
    }
}

/// POST /api/invoices/:id/pay
pub async fn mark_paid(
    State(handlers): State<InvoiceHandlers>,
    RequireAdmin(_admin): RequireAdmin,
    Path(invoice_id): Path<String>,
    Json(body): Json<MarkPaidBody>,
) -> Response {
    let Ok(invoice_id) = invoice_id.parse::<InvoiceId>() else {
        return bad_request("Invalid invoice ID");
    };

    let cmd = MarkInvoicePaidCommand {
        invoice_id,
        method: body.method,
        paid_date: body.paid_date,
    };

    match handlers.mark_paid_handler.handle(cmd).await {
        Ok(invoice) => (StatusCode::OK, Json(invoice)).into_response(),
        Err(e) => handle_invoice_error(e),
    }
}

/// GET /api/invoices/summary
pub async fn summary(
    State(handlers): State<InvoiceHandlers>,
    RequireAdmin(_admin): RequireAdmin,
) -> Response {
    match handlers.summary_handler.handle().await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => handle_invoice_error(e),
    }
}

/// Creates the invoice router, mounted at `/api/invoices`.
pub fn invoice_routes(handlers: InvoiceHandlers) -> Router {
    Router::new()
        .route("/summary", get(summary))
        .route("/:id/pay", post(mark_paid))
        .with_state(handlers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_paid_body_defaults_date() {
        let body: MarkPaidBody = serde_json::from_str(r#"{"method": "bank"}"#).unwrap();
        assert_eq!(body.method, PaymentMethod::Bank);
        assert!(body.paid_date.is_none());
    }

    #[test]
    fn unknown_payment_method_is_rejected() {
        assert!(serde_json::from_str::<MarkPaidBody>(r#"{"method": "cheque"}"#).is_err());
    }
}
