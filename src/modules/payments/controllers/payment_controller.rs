use std::sync::Arc;

use actix_web::{web, HttpResponse};

use super::webhook_controller::receive_webhook;
use crate::config::PaymentConfig;
use crate::core::error::AppError;
use crate::middleware::auth::{AuthenticatedOwner, SessionAuth};
use crate::modules::payments::models::{
    InitiatePaymentRequest, ListPaymentsQuery, VerifyPaymentRequest, MAX_LIST_LIMIT,
};
use crate::modules::payments::services::{
    PaymentService, VerificationEngine, VerificationRequest,
};

/// Start a payment and return the hosted checkout URL
/// POST /api/payments/initiate
pub async fn initiate_payment(
    service: web::Data<Arc<PaymentService>>,
    owner: AuthenticatedOwner,
    body: web::Json<InitiatePaymentRequest>,
) -> Result<HttpResponse, AppError> {
    let response = service.initiate(&owner.0, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}

/// Confirm a payment with the gateway after the client is redirected back
/// POST /api/payments/verify
pub async fn verify_payment(
    engine: web::Data<Arc<VerificationEngine>>,
    config: web::Data<PaymentConfig>,
    owner: AuthenticatedOwner,
    body: web::Json<VerifyPaymentRequest>,
) -> Result<HttpResponse, AppError> {
    config.ensure_enabled()?;

    let body = body.into_inner();
    if body.reference.trim().is_empty() {
        return Err(AppError::validation("reference is required"));
    }

    let request = VerificationRequest::for_owner(
        body.reference.trim(),
        body.gateway_order_id,
        owner.0,
    );
    let outcome = engine.verify(&request).await?;

    Ok(HttpResponse::Ok().json(outcome.response()))
}

/// Stored state of one of the caller's payments; never contacts the gateway
/// GET /api/payments/{reference}
pub async fn get_payment(
    service: web::Data<Arc<PaymentService>>,
    owner: AuthenticatedOwner,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let reference = path.into_inner();
    let payment = service.get_payment(&owner.0, &reference).await?;
    Ok(HttpResponse::Ok().json(payment))
}

/// GET /api/payments?limit=&offset=
pub async fn list_payments(
    service: web::Data<Arc<PaymentService>>,
    owner: AuthenticatedOwner,
    query: web::Query<ListPaymentsQuery>,
) -> Result<HttpResponse, AppError> {
    let payments = service
        .list_payments(&owner.0, query.limit, query.offset)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": payments,
        "limit": query.limit.clamp(1, MAX_LIST_LIMIT),
        "offset": query.offset,
    })))
}

/// Configure payment routes.
///
/// The session guard wraps each client resource rather than a catch-all scope,
/// so unmatched paths fall through to 404. The webhook carries its own
/// signature instead of a session.
pub fn configure(cfg: &mut web::ServiceConfig, session: SessionAuth) {
    cfg.service(
        web::scope("/payments")
            .route("/webhook", web::post().to(receive_webhook))
            .service(
                web::resource("")
                    .wrap(session.clone())
                    .route(web::get().to(list_payments)),
            )
            .service(
                web::resource("/initiate")
                    .wrap(session.clone())
                    .route(web::post().to(initiate_payment)),
            )
            .service(
                web::resource("/verify")
                    .wrap(session.clone())
                    .route(web::post().to(verify_payment)),
            )
            .service(
                web::resource("/{reference}")
                    .wrap(session)
                    .route(web::get().to(get_payment)),
            ),
    );
}
