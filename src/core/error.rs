use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

/// Application-wide Result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Main application error type
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Input failed one or more business rules; every violated rule is listed
    #[error("Validation error: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Request carried no usable session credentials
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Resource not found (or owned by another principal)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or invalid configuration, never retried
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The gateway refused the token exchange
    #[error("Gateway authentication failed: {0}")]
    GatewayAuthentication(String),

    /// Network failure or timeout talking to the gateway, retryable
    #[error("Gateway unreachable: {0}")]
    GatewayUnreachable(String),

    /// Explicit non-success or malformed gateway response
    #[error("Gateway rejected request: {0}")]
    GatewayRejected(String),

    /// Could not find a free transaction reference
    #[error("Unable to allocate a unique reference after {0} attempts")]
    ReferenceExhausted(u32),

    /// Gateway state does not match the stored transaction
    #[error("Verification failed: {}", .0.join("; "))]
    VerificationFailed(Vec<String>),

    /// Payments are switched off by configuration
    #[error("Payment service is currently disabled")]
    ServiceDisabled,

    /// Unique constraint violation
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database operation errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            tracing::error!(kind = self.kind(), error = %self, "Request failed");
        }

        let mut error = serde_json::json!({
            "code": status_code.as_u16(),
            "kind": self.kind(),
            "message": self.public_message(),
        });

        match self {
            AppError::Validation(details) | AppError::VerificationFailed(details) => {
                error["details"] = serde_json::json!(details);
            }
            _ => {}
        }

        HttpResponse::build(status_code).json(serde_json::json!({
            "success": false,
            "error": error,
        }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::GatewayAuthentication(_) => StatusCode::BAD_GATEWAY,
            AppError::GatewayUnreachable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::GatewayRejected(_) => StatusCode::BAD_GATEWAY,
            AppError::ReferenceExhausted(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::VerificationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ServiceDisabled => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Helper functions for common error scenarios
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(vec![msg.into()])
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        AppError::NotFound(resource.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        AppError::Configuration(msg.into())
    }

    pub fn unreachable(msg: impl Into<String>) -> Self {
        AppError::GatewayUnreachable(msg.into())
    }

    pub fn rejected(msg: impl Into<String>) -> Self {
        AppError::GatewayRejected(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// Stable machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::AuthenticationRequired => "authentication_required",
            AppError::NotFound(_) => "not_found",
            AppError::Configuration(_) => "configuration_error",
            AppError::GatewayAuthentication(_) => "gateway_authentication_failed",
            AppError::GatewayUnreachable(_) => "gateway_unreachable",
            AppError::GatewayRejected(_) => "gateway_rejected",
            AppError::ReferenceExhausted(_) => "reference_exhausted",
            AppError::VerificationFailed(_) => "verification_failed",
            AppError::ServiceDisabled => "service_disabled",
            AppError::Conflict(_) => "conflict",
            AppError::Database(_) => "database_error",
            AppError::Json(_) => "invalid_json",
            AppError::Internal(_) => "internal_error",
        }
    }

    /// Whether the caller may retry the same request later
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::GatewayUnreachable(_) | AppError::VerificationFailed(_)
        )
    }

    /// Message safe to show to API clients.
    ///
    /// Server-side failures are collapsed to a fixed text so that database
    /// errors, gateway bodies and configuration details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            AppError::Configuration(_)
            | AppError::Database(_)
            | AppError::Internal(_)
            | AppError::ReferenceExhausted(_) => "Internal server error".to_string(),
            AppError::GatewayAuthentication(_) | AppError::GatewayRejected(_) => {
                "Payment gateway rejected the request".to_string()
            }
            AppError::GatewayUnreachable(_) => {
                "Payment gateway is temporarily unreachable, please retry".to_string()
            }
            AppError::Validation(_) => "Request validation failed".to_string(),
            AppError::VerificationFailed(_) => {
                "Payment could not be verified yet, please retry later".to_string()
            }
            other => other.to_string(),
        }
    }
}
