use super::super::models::{
    InitiatePaymentRequest, InitiatePaymentResponse, NewTransaction, TransactionView,
    MAX_LIST_LIMIT,
};
use super::super::repositories::PaymentLedger;
use super::payment_validation::validate_initiation;
use super::reference_generator::GenerateReference;
use crate::config::PaymentConfig;
use crate::core::{AppError, Result};
use crate::modules::gateways::{OrderRequest, PaymentGateway};
use std::sync::Arc;

/// Attempts at drawing a reference the ledger has not seen
pub const MAX_REFERENCE_ATTEMPTS: u32 = 5;

/// Payment initiation and owner-scoped reads.
///
/// Verification lives in `VerificationEngine`; this service never moves a
/// row out of `pending`.
pub struct PaymentService {
    ledger: Arc<dyn PaymentLedger>,
    gateway: Arc<dyn PaymentGateway>,
    references: Arc<dyn GenerateReference>,
    config: PaymentConfig,
}

impl PaymentService {
    /// Create a new PaymentService
    ///
    /// # Arguments
    /// * `ledger` - Payment ledger
    /// * `gateway` - Outbound gateway client
    /// * `references` - Reference source
    /// * `config` - Payment settings (currency, ceiling, URLs, feature flag)
    pub fn new(
        ledger: Arc<dyn PaymentLedger>,
        gateway: Arc<dyn PaymentGateway>,
        references: Arc<dyn GenerateReference>,
        config: PaymentConfig,
    ) -> Self {
        Self {
            ledger,
            gateway,
            references,
            config,
        }
    }

    pub fn config(&self) -> &PaymentConfig {
        &self.config
    }

    /// Start a payment for `owner_id`.
    ///
    /// Order: feature flag, validation, reference allocation, gateway order,
    /// then the pending row. A gateway failure leaves nothing in the ledger.
    ///
    /// # Errors
    /// * `ServiceDisabled` - payments are switched off
    /// * `Validation` - every rule the request broke
    /// * `ReferenceExhausted` - no free reference after `MAX_REFERENCE_ATTEMPTS`
    /// * gateway errors from `create_order`, unchanged
    pub async fn initiate(
        &self,
        owner_id: &str,
        request: InitiatePaymentRequest,
    ) -> Result<InitiatePaymentResponse> {
        self.config.ensure_enabled()?;

        let payment = validate_initiation(&request, &self.config)?;
        let reference = self.allocate_reference().await?;

        let order = self
            .gateway
            .create_order(OrderRequest {
                reference: reference.clone(),
                amount: payment.amount,
                currency: payment.currency,
                description: payment.description.clone(),
                billing: payment.billing,
                callback_url: payment.callback_url,
                cancel_url: payment.cancel_url,
            })
            .await
            .map_err(|e| {
                tracing::warn!(
                    reference = %reference,
                    gateway = self.gateway.name(),
                    error = %e,
                    "Gateway order creation failed"
                );
                e
            })?;

        let inserted = self
            .ledger
            .insert_pending(NewTransaction {
                reference: reference.clone(),
                owner_id: owner_id.to_string(),
                amount: payment.amount,
                currency: payment.currency,
                description: payment.description,
                gateway_order_id: order.gateway_order_id.clone(),
            })
            .await;

        if let Err(e) = inserted {
            // The gateway already holds an order nobody can verify through us.
            tracing::error!(
                reference = %reference,
                gateway_order_id = %order.gateway_order_id,
                error = %e,
                "Gateway order created but ledger insert failed; needs reconciliation"
            );
            return Err(e);
        }

        tracing::info!(
            reference = %reference,
            owner_id = %owner_id,
            amount = %payment.currency.format_amount(payment.amount),
            gateway_order_id = %order.gateway_order_id,
            "Payment initiated"
        );

        Ok(InitiatePaymentResponse {
            success: true,
            reference,
            checkout_url: order.checkout_url,
            gateway_order_id: order.gateway_order_id,
        })
    }

    /// Draw references until one is absent from the ledger
    async fn allocate_reference(&self) -> Result<String> {
        for attempt in 1..=MAX_REFERENCE_ATTEMPTS {
            let candidate = self.references.generate();
            if !self.ledger.reference_exists(&candidate).await? {
                return Ok(candidate);
            }
            tracing::warn!(
                reference = %candidate,
                attempt,
                "Generated reference already in use"
            );
        }

        Err(AppError::ReferenceExhausted(MAX_REFERENCE_ATTEMPTS))
    }

    /// Fetch one of the owner's payments. Other owners' rows are `NotFound`.
    pub async fn get_payment(&self, owner_id: &str, reference: &str) -> Result<TransactionView> {
        self.config.ensure_enabled()?;
        self.ledger
            .find_by_reference_for_owner(reference, owner_id)
            .await?
            .map(TransactionView::from)
            .ok_or_else(|| AppError::not_found(format!("Payment '{}' not found", reference)))
    }

    /// Newest first; `limit` is clamped to `1..=MAX_LIST_LIMIT`
    pub async fn list_payments(
        &self,
        owner_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<TransactionView>> {
        self.config.ensure_enabled()?;
        let limit = limit.clamp(1, MAX_LIST_LIMIT);
        let rows = self.ledger.list_for_owner(owner_id, limit, offset).await?;
        Ok(rows.into_iter().map(TransactionView::from).collect())
    }
}
