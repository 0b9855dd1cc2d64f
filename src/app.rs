//! Application assembly: shared services and route registration.

use std::sync::Arc;

use actix_web::{error::JsonPayloadError, web, HttpRequest};

use crate::config::{PaymentConfig, WebhookConfig};
use crate::core::AppError;
use crate::middleware::SessionAuth;
use crate::modules::gateways::PaymentGateway;
use crate::modules::health;
use crate::modules::payments::controllers as payment_controllers;
use crate::modules::payments::repositories::PaymentLedger;
use crate::modules::payments::services::{
    GenerateReference, PaymentService, VerificationEngine, WebhookProcessor,
};

/// Largest accepted JSON body
const JSON_LIMIT_BYTES: usize = 64 * 1024;

/// Services shared by every worker
#[derive(Clone)]
pub struct AppState {
    pub payments: Arc<PaymentService>,
    pub engine: Arc<VerificationEngine>,
    pub webhook: Arc<WebhookProcessor>,
    pub ledger: Arc<dyn PaymentLedger>,
    pub payment_config: PaymentConfig,
    pub session: SessionAuth,
}

impl AppState {
    /// Wire the services. Both confirmation paths share one engine.
    pub fn new(
        ledger: Arc<dyn PaymentLedger>,
        gateway: Arc<dyn PaymentGateway>,
        references: Arc<dyn GenerateReference>,
        payment_config: PaymentConfig,
        webhook_config: WebhookConfig,
        session_secret: &str,
    ) -> Self {
        let engine = Arc::new(VerificationEngine::new(ledger.clone(), gateway.clone()));
        let webhook = Arc::new(WebhookProcessor::new(
            engine.clone(),
            ledger.clone(),
            webhook_config,
        ));
        let payments = Arc::new(PaymentService::new(
            ledger.clone(),
            gateway,
            references,
            payment_config.clone(),
        ));

        Self {
            payments,
            engine,
            webhook,
            ledger,
            payment_config,
            session: SessionAuth::new(session_secret),
        }
    }
}

/// Register app data and every route on an `App` or `ServiceConfig`
pub fn configure(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.app_data(web::Data::new(state.payments.clone()))
        .app_data(web::Data::new(state.engine.clone()))
        .app_data(web::Data::new(state.webhook.clone()))
        .app_data(web::Data::new(state.ledger.clone()))
        .app_data(web::Data::new(state.payment_config.clone()))
        .app_data(
            web::JsonConfig::default()
                .limit(JSON_LIMIT_BYTES)
                .error_handler(json_error_handler),
        )
        .configure(health::configure)
        .service(
            web::scope("/api")
                .configure(|api| payment_controllers::configure(api, state.session.clone())),
        );
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(error = %err, "Rejected JSON body");
    AppError::validation(format!("Invalid JSON body: {}", err)).into()
}
