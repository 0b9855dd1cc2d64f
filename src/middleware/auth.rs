use crate::core::AppError;
use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    Error, FromRequest, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;

type HmacSha256 = Hmac<Sha256>;

/// Session authentication middleware.
///
/// Expects `Authorization: Bearer <owner_id>.<expiry unix secs>.<hex HMAC>`
/// signed with the shared session secret, and stores the owner as
/// [`AuthenticatedOwner`] in the request extensions.
#[derive(Clone)]
pub struct SessionAuth {
    secret: Arc<String>,
}

impl SessionAuth {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Arc::new(secret.into()),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionAuthMiddleware<S>;
    type Future = Ready<std::result::Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionAuthMiddleware {
            service: Rc::new(service),
            secret: self.secret.clone(),
        }))
    }
}

pub struct SessionAuthMiddleware<S> {
    service: Rc<S>,
    secret: Arc<String>,
}

impl<S, B> Service<ServiceRequest> for SessionAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, std::result::Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let svc = self.service.clone();
        let secret = self.secret.clone();

        Box::pin(async move {
            let owner_id = req
                .headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.strip_prefix("Bearer "))
                .map(str::trim)
                .and_then(|token| {
                    verify_session_token(token, &secret, chrono::Utc::now().timestamp())
                });

            let Some(owner_id) = owner_id else {
                tracing::debug!(path = %req.path(), "Missing or invalid session token");
                return Ok(req
                    .error_response(AppError::AuthenticationRequired)
                    .map_into_right_body());
            };

            req.extensions_mut().insert(AuthenticatedOwner(owner_id));

            svc.call(req).await.map(ServiceResponse::map_into_left_body)
        })
    }
}

/// Owner identity established by [`SessionAuth`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedOwner(pub String);

impl FromRequest for AuthenticatedOwner {
    type Error = AppError;
    type Future = Ready<std::result::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthenticatedOwner>()
                .cloned()
                .ok_or(AppError::AuthenticationRequired),
        )
    }
}

/// Build a session token for `owner_id` valid until `expires_at` (unix seconds)
pub fn issue_session_token(owner_id: &str, expires_at: i64, secret: &str) -> String {
    let payload = format!("{}.{}", owner_id, expires_at);
    format!("{}.{}", payload, sign(&payload, secret))
}

/// Returns the owner id when the token is well-formed, correctly signed and
/// not expired at `now` (unix seconds).
pub fn verify_session_token(token: &str, secret: &str, now: i64) -> Option<String> {
    let mut parts = token.rsplitn(3, '.');
    let signature = parts.next()?;
    let expires_at = parts.next()?;
    let owner_id = parts.next()?;

    if owner_id.is_empty() || secret.is_empty() {
        return None;
    }

    let provided = hex::decode(signature).ok()?;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(format!("{}.{}", owner_id, expires_at).as_bytes());
    mac.verify_slice(&provided).ok()?;

    let expires_at: i64 = expires_at.parse().ok()?;
    if expires_at <= now {
        return None;
    }

    Some(owner_id.to_string())
}

fn sign(payload: &str, secret: &str) -> String {
    match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mut mac) => {
            mac.update(payload.as_bytes());
            hex::encode(mac.finalize().into_bytes())
        }
        Err(_) => String::new(),
    }
}
