use super::super::repositories::PaymentLedger;
use super::verification_engine::{VerificationDisposition, VerificationEngine, VerificationRequest};
use super::webhook_authenticator;
use crate::config::WebhookConfig;
use crate::core::AppError;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

const ORDER_ID_FIELDS: [&str; 4] = [
    "OrderTrackingId",
    "orderTrackingId",
    "order_tracking_id",
    "gateway_order_id",
];

const MERCHANT_REFERENCE_FIELDS: [&str; 3] =
    ["OrderMerchantReference", "merchant_reference", "reference"];

/// Diagnostic outcome of one notification, echoed in the 200 response body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookStatus {
    Completed,
    AlreadyProcessed,
    RejectedSignature,
    RejectedUnsigned,
    InvalidPayload,
    MissingOrderId,
    OrderNotFound,
    ReferenceMismatch,
    VerificationFailed,
    GatewayUnreachable,
    Error,
}

impl WebhookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookStatus::Completed => "completed",
            WebhookStatus::AlreadyProcessed => "already_processed",
            WebhookStatus::RejectedSignature => "rejected_signature",
            WebhookStatus::RejectedUnsigned => "rejected_unsigned",
            WebhookStatus::InvalidPayload => "invalid_payload",
            WebhookStatus::MissingOrderId => "missing_order_id",
            WebhookStatus::OrderNotFound => "order_not_found",
            WebhookStatus::ReferenceMismatch => "reference_mismatch",
            WebhookStatus::VerificationFailed => "verification_failed",
            WebhookStatus::GatewayUnreachable => "gateway_unreachable",
            WebhookStatus::Error => "error",
        }
    }
}

impl fmt::Display for WebhookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Asynchronous confirmation path.
///
/// Authenticates the notification, resolves the ledger row from the gateway
/// order id and hands it to the same `VerificationEngine` the client verify
/// endpoint uses. Every failure is folded into a `WebhookStatus`; nothing is
/// returned to the sender that would invite a retry.
pub struct WebhookProcessor {
    engine: Arc<VerificationEngine>,
    ledger: Arc<dyn PaymentLedger>,
    config: WebhookConfig,
}

impl WebhookProcessor {
    pub fn new(
        engine: Arc<VerificationEngine>,
        ledger: Arc<dyn PaymentLedger>,
        config: WebhookConfig,
    ) -> Self {
        Self {
            engine,
            ledger,
            config,
        }
    }

    pub async fn process(&self, signature: Option<&str>, raw_body: &[u8]) -> WebhookStatus {
        if let Some(rejection) = self.check_signature(signature, raw_body) {
            return rejection;
        }

        let payload = match serde_json::from_slice::<Value>(raw_body) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                warn!(bytes = raw_body.len(), "Webhook body is not a JSON object");
                return WebhookStatus::InvalidPayload;
            }
        };

        let Some(order_id) = first_string(&payload, &ORDER_ID_FIELDS) else {
            warn!("Webhook carries no order tracking id");
            return WebhookStatus::MissingOrderId;
        };

        let row = match self.ledger.find_by_gateway_order_id(&order_id).await {
            Ok(Some(row)) => row,
            Ok(None) => {
                warn!(gateway_order_id = %order_id, "Webhook for unknown gateway order");
                return WebhookStatus::OrderNotFound;
            }
            Err(e) => {
                error!(gateway_order_id = %order_id, error = %e, "Ledger lookup failed for webhook");
                return WebhookStatus::Error;
            }
        };

        if let Some(claimed) = first_string(&payload, &MERCHANT_REFERENCE_FIELDS) {
            if claimed != row.reference {
                warn!(
                    gateway_order_id = %order_id,
                    reference = %row.reference,
                    claimed_reference = %claimed,
                    "Webhook merchant reference does not match the ledger"
                );
                return WebhookStatus::ReferenceMismatch;
            }
        }

        let request = VerificationRequest::from_notification(row.reference.clone(), order_id);
        match self.engine.verify(&request).await {
            Ok(outcome) => {
                info!(
                    reference = %outcome.transaction.reference,
                    disposition = ?outcome.disposition,
                    "Webhook processed"
                );
                match outcome.disposition {
                    VerificationDisposition::Completed => WebhookStatus::Completed,
                    VerificationDisposition::AlreadyProcessed => WebhookStatus::AlreadyProcessed,
                }
            }
            Err(AppError::VerificationFailed(_)) => WebhookStatus::VerificationFailed,
            Err(e @ AppError::GatewayUnreachable(_)) => {
                warn!(
                    reference = %row.reference,
                    error = %e,
                    "Gateway unreachable while handling webhook; client verify will converge"
                );
                WebhookStatus::GatewayUnreachable
            }
            Err(e) => {
                error!(reference = %row.reference, error = %e, "Webhook verification errored");
                WebhookStatus::Error
            }
        }
    }

    fn check_signature(&self, signature: Option<&str>, raw_body: &[u8]) -> Option<WebhookStatus> {
        let secret = self
            .config
            .secret
            .as_deref()
            .filter(|s| !s.trim().is_empty());

        match secret {
            Some(secret) => {
                if webhook_authenticator::authenticate(signature, raw_body, Some(secret)) {
                    None
                } else {
                    warn!(
                        signed = signature.is_some(),
                        "Webhook signature verification failed"
                    );
                    Some(WebhookStatus::RejectedSignature)
                }
            }
            None if self.config.allow_unsigned => {
                warn!("Accepting unsigned webhook: no shared secret configured");
                None
            }
            None => {
                warn!("Rejecting webhook: no shared secret configured");
                Some(WebhookStatus::RejectedUnsigned)
            }
        }
    }
}

fn first_string(payload: &Map<String, Value>, fields: &[&str]) -> Option<String> {
    fields.iter().find_map(|field| match payload.get(*field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
