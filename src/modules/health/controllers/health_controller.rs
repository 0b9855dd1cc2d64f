use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::modules::payments::repositories::PaymentLedger;

/// Health check response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
}

/// Readiness response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub checks: ReadinessChecks,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessChecks {
    pub ledger: bool,
}

/// GET /health - Liveness check
/// Does not check dependencies
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /ready - Readiness check
/// 503 until the ledger answers
pub async fn readiness_check(ledger: web::Data<Arc<dyn PaymentLedger>>) -> impl Responder {
    let ledger_ok = match ledger.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, "Ledger readiness check failed");
            false
        }
    };

    let response = ReadinessResponse {
        ready: ledger_ok,
        checks: ReadinessChecks { ledger: ledger_ok },
    };

    if ledger_ok {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

/// Configure health check routes.
///
/// Plain routes rather than an empty scope, which would shadow `/api`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/ready", web::get().to(readiness_check));
}
