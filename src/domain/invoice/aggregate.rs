use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{DomainError, InvoiceId, Timestamp, UserId, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Paid,
    #[default]
    Unpaid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Unpaid => "unpaid",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "paid" => Ok(InvoiceStatus::Paid),
            "unpaid" => Ok(InvoiceStatus::Unpaid),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown invoice status '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Bank,
    Other,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Bank => "bank",
            PaymentMethod::Other => "other",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentMethod::Cash),
            "bank" => Ok(PaymentMethod::Bank),
            "other" => Ok(PaymentMethod::Other),
            other => Err(ValidationError::invalid_format(
                "paid_method",
                format!("unknown payment method '{}'", other),
            )),
        }
    }
}

/// An invoice issued to a parent, in whole rupees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub parent_id: UserId,
    pub amount_lkr: i64,
    pub status: InvoiceStatus,
    pub paid_date: Option<Timestamp>,
    pub paid_method: Option<PaymentMethod>,
    pub created_at: Timestamp,
}

impl Invoice {
    /// # Errors
    ///
    /// - `OutOfRange` if the amount is not positive
    pub fn issue(parent_id: UserId, amount_lkr: i64, now: Timestamp) -> Result<Self, ValidationError> {
        if amount_lkr <= 0 {
            return Err(ValidationError::out_of_range("amount_lkr", 1, i64::MAX, amount_lkr));
        }
        Ok(Self {
            id: InvoiceId::new(),
            parent_id,
            amount_lkr,
            status: InvoiceStatus::Unpaid,
            paid_date: None,
            paid_method: None,
            created_at: now,
        })
    }

    pub fn is_paid(&self) -> bool {
        self.status == InvoiceStatus::Paid
    }

    /// Records payment. `paid_date` defaults to `now`.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the invoice is already paid
    pub fn mark_paid(
        &mut self,
        method: PaymentMethod,
        paid_date: Option<Timestamp>,
        now: Timestamp,
    ) -> Result<(), DomainError> {
        if self.is_paid() {
            return Err(DomainError::invalid_state(format!(
                "Invoice {} is already paid",
                self.id
            )));
        }
        self.status = InvoiceStatus::Paid;
        self.paid_method = Some(method);
        self.paid_date = Some(paid_date.unwrap_or(now));
        Ok(())
    }
}

/// Totals over a set of invoices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceSummary {
    pub total_paid: i64,
    pub total_unpaid: i64,
    pub total_invoices: u64,
}

impl InvoiceSummary {
    pub fn from_invoices<'a>(invoices: impl IntoIterator<Item = &'a Invoice>) -> Self {
        invoices
            .into_iter()
            .fold(InvoiceSummary::default(), |mut summary, invoice| {
                match invoice.status {
                    InvoiceStatus::Paid => summary.total_paid += invoice.amount_lkr,
                    InvoiceStatus::Unpaid => summary.total_unpaid += invoice.amount_lkr,
                }
                summary.total_invoices += 1;
                summary
            })
    }
}
