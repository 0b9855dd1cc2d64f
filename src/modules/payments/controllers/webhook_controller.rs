use std::sync::Arc;

use actix_web::{web, HttpRequest, HttpResponse};
use futures_util::StreamExt;
use serde::Serialize;

use crate::config::PaymentConfig;
use crate::modules::payments::services::webhook_authenticator::SIGNATURE_HEADER;
use crate::modules::payments::services::{WebhookProcessor, WebhookStatus};

/// Largest notification body read; anything longer is acknowledged unprocessed
pub const MAX_WEBHOOK_BODY_BYTES: usize = 64 * 1024;

/// Acknowledgement body; `status` is diagnostic only
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
    pub status: &'static str,
}

/// Receive a gateway payment notification
/// POST /api/payments/webhook
///
/// Answers 200 for every processing outcome so the gateway never retries;
/// only a disabled payment subsystem yields 503.
pub async fn receive_webhook(
    req: HttpRequest,
    payload: web::Payload,
    processor: web::Data<Arc<WebhookProcessor>>,
    config: web::Data<PaymentConfig>,
) -> HttpResponse {
    if !config.enabled {
        return HttpResponse::ServiceUnavailable().json(WebhookAck {
            received: false,
            status: "disabled",
        });
    }

    let status = match read_capped(payload, MAX_WEBHOOK_BODY_BYTES).await {
        Some(body) => {
            let signature = req
                .headers()
                .get(SIGNATURE_HEADER)
                .and_then(|h| h.to_str().ok());
            processor.process(signature, &body).await
        }
        None => WebhookStatus::InvalidPayload,
    };

    HttpResponse::Ok().json(WebhookAck {
        received: true,
        status: status.as_str(),
    })
}

/// Collect the request body, giving up once it exceeds `limit` bytes or the
/// stream errors.
async fn read_capped(mut payload: web::Payload, limit: usize) -> Option<web::BytesMut> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read webhook body");
                return None;
            }
        };
        if body.len() + chunk.len() > limit {
            tracing::warn!(limit, "Webhook body exceeds size limit");
            return None;
        }
        body.extend_from_slice(&chunk);
    }
    Some(body)
}
