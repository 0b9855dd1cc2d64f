use super::super::models::{Completion, PaymentStatusResponse, PaymentTransaction};
use super::super::repositories::PaymentLedger;
use crate::core::{AppError, Result};
use crate::modules::gateways::{GatewayTransactionStatus, PaymentGateway};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Largest accepted gap between stored and reported amounts (0.01)
pub fn amount_tolerance() -> Decimal {
    Decimal::new(1, 2)
}

const COMPLETED_STATUS_TEXTS: [&str; 2] = ["completed", "success"];

/// One verification attempt
#[derive(Debug, Clone)]
pub struct VerificationRequest {
    pub reference: String,
    /// Caller's claim about the gateway order; checked, never used for lookup
    pub gateway_order_id_hint: Option<String>,
    /// Set on the synchronous path; the webhook path has no owner
    pub owner_id: Option<String>,
}

impl VerificationRequest {
    pub fn for_owner(
        reference: impl Into<String>,
        gateway_order_id_hint: Option<String>,
        owner_id: impl Into<String>,
    ) -> Self {
        Self {
            reference: reference.into(),
            gateway_order_id_hint,
            owner_id: Some(owner_id.into()),
        }
    }

    pub fn from_notification(reference: impl Into<String>, gateway_order_id: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            gateway_order_id_hint: Some(gateway_order_id.into()),
            owner_id: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationDisposition {
    /// This call performed the `pending -> completed` transition
    Completed,
    /// The row was already completed, by an earlier or concurrent call
    AlreadyProcessed,
}

#[derive(Debug, Clone)]
pub struct VerificationOutcome {
    pub transaction: PaymentTransaction,
    pub disposition: VerificationDisposition,
}

impl VerificationOutcome {
    pub fn response(&self) -> PaymentStatusResponse {
        PaymentStatusResponse::from(&self.transaction)
    }
}

/// The payment state machine.
///
/// Shared by the client verify endpoint and the webhook so both apply the same
/// checks. Holds no mutable state; concurrent calls for one reference are
/// serialized by the ledger's conditional write.
pub struct VerificationEngine {
    ledger: Arc<dyn PaymentLedger>,
    gateway: Arc<dyn PaymentGateway>,
}

impl VerificationEngine {
    pub fn new(ledger: Arc<dyn PaymentLedger>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { ledger, gateway }
    }

    /// Verify a payment against the gateway and complete it once.
    ///
    /// # Errors
    /// * `NotFound` - unknown reference, or another owner's row
    /// * `Validation` - the order id hint does not belong to this reference
    /// * `VerificationFailed` - gateway data disagrees with the row; row stays pending
    /// * `GatewayUnreachable` / `GatewayRejected` / `GatewayAuthentication` - status query failed
    pub async fn verify(&self, request: &VerificationRequest) -> Result<VerificationOutcome> {
        let row = match &request.owner_id {
            Some(owner) => {
                self.ledger
                    .find_by_reference_for_owner(&request.reference, owner)
                    .await?
            }
            None => self.ledger.find_by_reference(&request.reference).await?,
        }
        .ok_or_else(|| AppError::not_found(format!("Payment '{}' not found", request.reference)))?;

        if let Some(hint) = request
            .gateway_order_id_hint
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
        {
            if hint != row.gateway_order_id {
                tracing::warn!(
                    reference = %row.reference,
                    "Gateway order id does not belong to this payment"
                );
                return Err(AppError::validation(
                    "gateway_order_id does not match this payment",
                ));
            }
        }

        if row.is_settled() {
            tracing::debug!(reference = %row.reference, "Payment already verified");
            return Ok(VerificationOutcome {
                transaction: row,
                disposition: VerificationDisposition::AlreadyProcessed,
            });
        }

        let status = self
            .gateway
            .get_transaction_status(&row.gateway_order_id)
            .await
            .map_err(|e| {
                tracing::warn!(
                    reference = %row.reference,
                    gateway = self.gateway.name(),
                    error = %e,
                    "Transaction status query failed"
                );
                e
            })?;

        let mismatches = cross_validate(&row, &status);
        if !mismatches.is_empty() {
            tracing::warn!(
                reference = %row.reference,
                mismatches = ?mismatches,
                "Payment verification failed; row left pending"
            );
            return Err(AppError::VerificationFailed(mismatches));
        }

        let completion = Completion::now(status.method.clone(), status.raw_payload);

        let transitioned = self
            .ledger
            .mark_completed(&row.reference, &completion)
            .await?;

        let stored = self
            .ledger
            .find_by_reference(&row.reference)
            .await?
            .ok_or_else(|| AppError::internal("Payment disappeared during verification"))?;

        if !stored.is_settled() {
            return Err(AppError::internal(format!(
                "Payment '{}' not completed after a successful verification",
                stored.reference
            )));
        }

        let disposition = if transitioned {
            tracing::info!(
                reference = %stored.reference,
                amount = %stored.amount,
                currency = %stored.currency,
                payment_method = ?stored.payment_method,
                "Payment completed"
            );
            VerificationDisposition::Completed
        } else {
            tracing::info!(
                reference = %stored.reference,
                "Concurrent verification completed the payment first"
            );
            VerificationDisposition::AlreadyProcessed
        };

        Ok(VerificationOutcome {
            transaction: stored,
            disposition,
        })
    }
}

/// Compare the gateway's view with the stored row. Empty means it passed.
pub fn cross_validate(row: &PaymentTransaction, status: &GatewayTransactionStatus) -> Vec<String> {
    let mut mismatches = Vec::new();

    let status_text = status.status_text.trim().to_ascii_lowercase();
    if !COMPLETED_STATUS_TEXTS.contains(&status_text.as_str()) {
        mismatches.push(format!(
            "gateway status is '{}', expected completed",
            status.status_text
        ));
    }

    match status.amount {
        None => mismatches.push("gateway did not report an amount".to_string()),
        Some(reported) if (reported - row.amount).abs() > amount_tolerance() => {
            mismatches.push(format!(
                "amount mismatch: expected {}, gateway reported {}",
                row.amount, reported
            ))
        }
        Some(_) => {}
    }

    if let Some(currency) = &status.currency {
        if !currency.trim().eq_ignore_ascii_case(row.currency.code()) {
            mismatches.push(format!(
                "currency mismatch: expected {}, gateway reported {}",
                row.currency, currency
            ));
        }
    }

    if let Some(order_id) = &status.gateway_order_id {
        if order_id != &row.gateway_order_id {
            mismatches.push(format!(
                "gateway order mismatch: expected {}, gateway reported {}",
                row.gateway_order_id, order_id
            ));
        }
    }

    mismatches
}
