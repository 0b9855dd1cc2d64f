use super::gateway_trait::{
    AccessToken, CreatedOrder, GatewayTransactionStatus, OrderRequest, PaymentGateway,
};
use crate::config::GatewayConfig;
use crate::core::{AppError, Result};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, StatusCode};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::str::FromStr;
use std::time::Duration;

/// Per-call budgets for outbound gateway requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayTimeouts {
    pub auth: Duration,
    pub create_order: Duration,
    pub status: Duration,
}

impl Default for GatewayTimeouts {
    fn default() -> Self {
        Self {
            auth: Duration::from_secs(10),
            create_order: Duration::from_secs(15),
            status: Duration::from_secs(10),
        }
    }
}

/// Pesapal v3 hosted-checkout client
///
/// API Documentation: https://developer.pesapal.com/how-to-integrate/e-commerce/api-30-json/api-reference
///
/// Every operation acquires a fresh token; the client holds no state between
/// calls beyond its configuration.
pub struct PesapalClient {
    client: Client,
    consumer_key: Option<String>,
    consumer_secret: Option<String>,
    base_url: String,
    ipn_id: Option<String>,
    timeouts: GatewayTimeouts,
}

impl PesapalClient {
    /// Create a new client.
    ///
    /// The endpoint comes from the test-mode flag (or an explicit override) and
    /// is fixed for the lifetime of the client.
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        Self::with_timeouts(config, GatewayTimeouts::default())
    }

    pub fn with_timeouts(config: &GatewayConfig, timeouts: GatewayTimeouts) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(timeouts.auth)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            consumer_key: config.consumer_key.clone(),
            consumer_secret: config.consumer_secret.clone(),
            base_url: config.base_url().trim_end_matches('/').to_string(),
            ipn_id: config.ipn_id.clone(),
            timeouts,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn credentials(&self) -> Result<(&str, &str)> {
        fn present(value: &Option<String>) -> Option<&str> {
            value.as_deref().map(str::trim).filter(|v| !v.is_empty())
        }

        match (present(&self.consumer_key), present(&self.consumer_secret)) {
            (Some(key), Some(secret)) => Ok((key, secret)),
            _ => Err(AppError::configuration(
                "Gateway consumer key/secret are not configured",
            )),
        }
    }

    /// Send a request and return the parsed JSON body of a 2xx response
    async fn send_json(&self, operation: &str, request: RequestBuilder) -> Result<Value> {
        let response = request
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| transport_error(operation, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(operation, e))?;

        if !status.is_success() {
            tracing::warn!(
                operation,
                status = status.as_u16(),
                body = %truncate(&body),
                "Gateway returned non-success status"
            );
            return Err(rejected_status(operation, status));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(operation, body = %truncate(&body), "Malformed gateway response");
            AppError::rejected(format!("{} returned malformed JSON: {}", operation, e))
        })
    }
}

#[async_trait]
impl PaymentGateway for PesapalClient {
    async fn authenticate(&self) -> Result<AccessToken> {
        let (key, secret) = self.credentials()?;
        let url = format!("{}/api/Auth/RequestToken", self.base_url);

        let body = self
            .send_json(
                "token request",
                self.client
                    .post(&url)
                    .timeout(self.timeouts.auth)
                    .json(&json!({
                        "consumer_key": key,
                        "consumer_secret": secret,
                    })),
            )
            .await
            .map_err(|e| match e {
                AppError::GatewayRejected(msg) => AppError::GatewayAuthentication(msg),
                other => other,
            })?;

        if let Some(message) = error_message(&body) {
            tracing::warn!(error = %message, "Gateway refused token request");
            return Err(AppError::GatewayAuthentication(message));
        }

        let token = body
            .get("token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                AppError::GatewayAuthentication("token missing from response".to_string())
            })?;

        let expires_at = body
            .get("expiryDate")
            .and_then(Value::as_str)
            .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&chrono::Utc));

        Ok(AccessToken {
            token: token.to_string(),
            expires_at,
        })
    }

    async fn create_order(&self, request: OrderRequest) -> Result<CreatedOrder> {
        let token = self.authenticate().await?;
        let url = format!("{}/api/Transactions/SubmitOrderRequest", self.base_url);

        let amount = request.currency.round(request.amount).to_f64().ok_or_else(|| {
            AppError::validation(format!("Amount {} cannot be sent to gateway", request.amount))
        })?;

        let payload = json!({
            "id": request.reference,
            "currency": request.currency.code(),
            "amount": amount,
            "description": request.description,
            "callback_url": request.callback_url,
            "cancellation_url": request.cancel_url,
            "notification_id": self.ipn_id,
            "billing_address": {
                "email_address": request.billing.email,
                "phone_number": request.billing.phone,
                "first_name": request.billing.first_name,
                "last_name": request.billing.last_name,
            },
        });

        let body = self
            .send_json(
                "order creation",
                self.client
                    .post(&url)
                    .timeout(self.timeouts.create_order)
                    .bearer_auth(&token.token)
                    .json(&payload),
            )
            .await?;

        if let Some(message) = error_message(&body) {
            tracing::warn!(reference = %request.reference, error = %message, "Gateway refused order");
            return Err(AppError::rejected(format!("order creation refused: {}", message)));
        }

        let gateway_order_id = string_field(&body, &["order_tracking_id", "OrderTrackingId"])
            .ok_or_else(|| AppError::rejected("order creation response missing order_tracking_id"))?;
        let checkout_url = string_field(&body, &["redirect_url", "checkout_url"])
            .ok_or_else(|| AppError::rejected("order creation response missing redirect_url"))?;

        Ok(CreatedOrder {
            gateway_order_id,
            checkout_url,
        })
    }

    async fn get_transaction_status(
        &self,
        gateway_order_id: &str,
    ) -> Result<GatewayTransactionStatus> {
        let token = self.authenticate().await?;
        let url = format!("{}/api/Transactions/GetTransactionStatus", self.base_url);

        let body = self
            .send_json(
                "status query",
                self.client
                    .get(&url)
                    .timeout(self.timeouts.status)
                    .bearer_auth(&token.token)
                    .query(&[("orderTrackingId", gateway_order_id)]),
            )
            .await?;

        if let Some(message) = error_message(&body) {
            tracing::warn!(gateway_order_id, error = %message, "Gateway refused status query");
            return Err(AppError::rejected(format!("status query refused: {}", message)));
        }

        normalize_status(body)
    }

    fn name(&self) -> &str {
        "pesapal"
    }
}

/// Resolve the gateway's field-name variants into the canonical status shape
pub fn normalize_status(payload: Value) -> Result<GatewayTransactionStatus> {
    let status_text = string_field(
        &payload,
        &["payment_status_description", "payment_status", "status_description"],
    )
    .or_else(|| {
        // `status` doubles as an HTTP-like code ("200") in some responses
        string_field(&payload, &["status"]).filter(|s| s.parse::<i64>().is_err())
    })
    .ok_or_else(|| AppError::rejected("status response missing payment status"))?;

    Ok(GatewayTransactionStatus {
        status_text,
        amount: decimal_field(&payload, &["amount", "payment_amount"]),
        currency: string_field(&payload, &["currency", "currency_code"]),
        method: string_field(&payload, &["payment_method", "method"]),
        gateway_order_id: string_field(
            &payload,
            &["order_tracking_id", "OrderTrackingId", "orderTrackingId"],
        ),
        raw_payload: payload,
    })
}

/// First non-empty string (or number rendered as string) among `keys`
fn string_field(payload: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match payload.get(*key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn decimal_field(payload: &Value, keys: &[&str]) -> Option<Decimal> {
    keys.iter().find_map(|key| match payload.get(*key) {
        Some(Value::String(s)) => Decimal::from_str(s.trim()).ok(),
        Some(Value::Number(n)) => {
            let rendered = n.to_string();
            Decimal::from_str(&rendered)
                .or_else(|_| Decimal::from_scientific(&rendered))
                .ok()
        }
        _ => None,
    })
}

/// Pesapal reports refusals in an `error` object, sometimes with HTTP 200
fn error_message(body: &Value) -> Option<String> {
    let error = body.get("error")?;
    match error {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(_) => string_field(error, &["message", "code", "error_type"]),
        _ => None,
    }
}

fn transport_error(operation: &str, e: reqwest::Error) -> AppError {
    if e.is_timeout() {
        AppError::unreachable(format!("{} timed out", operation))
    } else if e.is_connect() {
        AppError::unreachable(format!("{} connection failed", operation))
    } else {
        AppError::unreachable(format!("{} failed: {}", operation, e.without_url()))
    }
}

fn rejected_status(operation: &str, status: StatusCode) -> AppError {
    AppError::rejected(format!("{} returned HTTP {}", operation, status.as_u16()))
}

fn truncate(body: &str) -> &str {
    match body.char_indices().nth(512) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
