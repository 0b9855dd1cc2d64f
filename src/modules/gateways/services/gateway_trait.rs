use crate::core::{Currency, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// Outbound calls to the hosted-checkout payment gateway
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Exchange the configured key/secret for a short-lived bearer token
    async fn authenticate(&self) -> Result<AccessToken>;

    /// Register an order and obtain the hosted checkout URL.
    ///
    /// Never retried by the client; the caller decides.
    async fn create_order(&self, request: OrderRequest) -> Result<CreatedOrder>;

    /// Fetch the gateway's authoritative view of an order
    async fn get_transaction_status(&self, gateway_order_id: &str)
        -> Result<GatewayTransactionStatus>;

    /// Gateway name, used in logs
    fn name(&self) -> &str;
}

/// Bearer token returned by the gateway
#[derive(Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"[redacted]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Payer details forwarded to the checkout page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BillingInfo {
    pub email: String,
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Order creation request
#[derive(Debug, Clone)]
pub struct OrderRequest {
    /// Our transaction reference, sent as the merchant reference
    pub reference: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub description: String,
    pub billing: BillingInfo,
    pub callback_url: String,
    pub cancel_url: Option<String>,
}

/// Order created at the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedOrder {
    pub gateway_order_id: String,
    pub checkout_url: String,
}

/// Canonical shape of a transaction status response.
///
/// Every gateway field-name variant is resolved before this struct is built,
/// so consumers only ever see these fields.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayTransactionStatus {
    pub status_text: String,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub method: Option<String>,
    pub gateway_order_id: Option<String>,
    pub raw_payload: serde_json::Value,
}
