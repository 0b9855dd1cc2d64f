use super::payment_transaction::{PaymentTransaction, TransactionStatus};
use crate::core::Currency;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/payments/initiate`.
///
/// Fields are optional at the serde level so that validation can report every
/// missing or invalid field at once instead of failing on the first.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InitiatePaymentRequest {
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub callback_url: Option<String>,
    #[serde(default)]
    pub cancel_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitiatePaymentResponse {
    pub success: bool,
    pub reference: String,
    pub checkout_url: String,
    pub gateway_order_id: String,
}

/// Body of `POST /api/payments/verify`
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyPaymentRequest {
    pub reference: String,
    /// Advisory only; verification always uses the stored order id
    #[serde(default)]
    pub gateway_order_id: Option<String>,
}

/// Result of a successful verification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentStatusResponse {
    pub success: bool,
    pub reference: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub status: TransactionStatus,
}

impl From<&PaymentTransaction> for PaymentStatusResponse {
    fn from(tx: &PaymentTransaction) -> Self {
        Self {
            success: true,
            reference: tx.reference.clone(),
            amount: tx.amount,
            currency: tx.currency,
            status: tx.status,
        }
    }
}

/// Owner-facing view of a ledger row; never exposes the raw gateway payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionView {
    pub reference: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub description: String,
    pub gateway_order_id: String,
    pub status: TransactionStatus,
    pub verified: bool,
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
}

impl From<PaymentTransaction> for TransactionView {
    fn from(tx: PaymentTransaction) -> Self {
        Self {
            reference: tx.reference,
            amount: tx.amount,
            currency: tx.currency,
            description: tx.description,
            gateway_order_id: tx.gateway_order_id,
            status: tx.status,
            verified: tx.verified,
            payment_method: tx.payment_method,
            created_at: tx.created_at,
            verified_at: tx.verified_at,
        }
    }
}

/// Query parameters for listing an owner's payments
#[derive(Debug, Deserialize)]
pub struct ListPaymentsQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

fn default_limit() -> u32 {
    20
}

pub const MAX_LIST_LIMIT: u32 = 100;
