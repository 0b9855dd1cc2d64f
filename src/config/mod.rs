use crate::core::{AppError, Currency, Result};
use crate::modules::gateways::GatewayEnvironment;
use rust_decimal::Decimal;
use std::env;
use std::fmt;
use std::str::FromStr;

pub mod database;
pub mod server;

pub use database::{DatabaseConfig, LedgerBackend};
pub use server::ServerConfig;

/// Main application configuration.
///
/// Built once at process start and handed to the services that need a part of
/// it; nothing re-reads the environment afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub gateway: GatewayConfig,
    pub payments: PaymentConfig,
    pub webhook: WebhookConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
    pub log_json: bool,
}

/// Gateway credentials and endpoint selection
#[derive(Clone, Default)]
pub struct GatewayConfig {
    pub consumer_key: Option<String>,
    pub consumer_secret: Option<String>,
    /// Sandbox endpoint when true, production otherwise
    pub test_mode: bool,
    /// Explicit endpoint, used for self-hosted stubs in tests
    pub base_url_override: Option<String>,
    /// Registered IPN (webhook) id sent along with each order
    pub ipn_id: Option<String>,
}

impl GatewayConfig {
    pub fn environment(&self) -> GatewayEnvironment {
        if self.test_mode {
            GatewayEnvironment::Sandbox
        } else {
            GatewayEnvironment::Production
        }
    }

    pub fn base_url(&self) -> String {
        self.base_url_override
            .clone()
            .unwrap_or_else(|| self.environment().base_url().to_string())
    }

    pub fn has_credentials(&self) -> bool {
        non_blank(&self.consumer_key) && non_blank(&self.consumer_secret)
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("consumer_key", &redact(&self.consumer_key))
            .field("consumer_secret", &redact(&self.consumer_secret))
            .field("test_mode", &self.test_mode)
            .field("base_url_override", &self.base_url_override)
            .field("ipn_id", &self.ipn_id)
            .finish()
    }
}

/// Payment subsystem settings
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    /// Feature flag for the whole payment subsystem
    pub enabled: bool,
    /// The single currency this deployment accepts
    pub currency: Currency,
    /// Upper bound (inclusive) for a single payment
    pub max_amount: Decimal,
    pub reference_prefix: String,
    pub callback_url: String,
    pub cancel_url: Option<String>,
}

impl PaymentConfig {
    /// Fails with `ServiceDisabled` when the feature flag is off
    pub fn ensure_enabled(&self) -> Result<()> {
        if self.enabled {
            Ok(())
        } else {
            Err(AppError::ServiceDisabled)
        }
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            currency: Currency::KES,
            max_amount: Decimal::new(1_000_000, 0),
            reference_prefix: "PAY".to_string(),
            callback_url: "https://app.example.com/payments/return".to_string(),
            cancel_url: None,
        }
    }
}

#[derive(Clone, Default)]
pub struct WebhookConfig {
    pub secret: Option<String>,
    /// Accept unsigned notifications when no secret is configured
    pub allow_unsigned: bool,
}

impl fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("secret", &redact(&self.secret))
            .field("allow_unsigned", &self.allow_unsigned)
            .finish()
    }
}

#[derive(Clone)]
pub struct SecurityConfig {
    /// Shared secret used to check app session tokens
    pub session_token_secret: String,
}

impl fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("session_token_secret", &"[redacted]")
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let currency = env::var("PAYMENT_CURRENCY").unwrap_or_else(|_| "KES".to_string());

        let config = Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
                log_json: env::var("LOG_FORMAT")
                    .map(|v| v.eq_ignore_ascii_case("json"))
                    .unwrap_or(false),
            },
            database: DatabaseConfig::from_env()?,
            server: ServerConfig::from_env()?,
            gateway: GatewayConfig {
                consumer_key: optional_var("GATEWAY_CONSUMER_KEY"),
                consumer_secret: optional_var("GATEWAY_CONSUMER_SECRET"),
                test_mode: parse_bool("GATEWAY_TEST_MODE", true)?,
                base_url_override: optional_var("GATEWAY_BASE_URL"),
                ipn_id: optional_var("GATEWAY_IPN_ID"),
            },
            payments: PaymentConfig {
                enabled: parse_bool("PAYMENTS_ENABLED", true)?,
                currency: Currency::from_str(&currency).map_err(AppError::Configuration)?,
                max_amount: parse_var("PAYMENT_MAX_AMOUNT", "1000000")?,
                reference_prefix: env::var("PAYMENT_REFERENCE_PREFIX")
                    .unwrap_or_else(|_| "PAY".to_string()),
                callback_url: env::var("PAYMENT_CALLBACK_URL").map_err(|_| {
                    AppError::configuration("PAYMENT_CALLBACK_URL not set")
                })?,
                cancel_url: optional_var("PAYMENT_CANCEL_URL"),
            },
            webhook: WebhookConfig {
                secret: optional_var("WEBHOOK_SECRET"),
                allow_unsigned: parse_bool("WEBHOOK_ALLOW_UNSIGNED", false)?,
            },
            security: SecurityConfig {
                session_token_secret: env::var("SESSION_TOKEN_SECRET")
                    .map_err(|_| AppError::configuration("SESSION_TOKEN_SECRET not set"))?,
            },
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if self.payments.enabled && !self.gateway.has_credentials() {
            problems.push(
                "GATEWAY_CONSUMER_KEY and GATEWAY_CONSUMER_SECRET are required while payments are enabled",
            );
        }

        if self.payments.max_amount <= Decimal::ZERO {
            problems.push("PAYMENT_MAX_AMOUNT must be greater than 0");
        }

        if self.payments.reference_prefix.trim().is_empty()
            || !self
                .payments
                .reference_prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric())
        {
            problems.push("PAYMENT_REFERENCE_PREFIX must be non-empty and alphanumeric");
        }

        if self.security.session_token_secret.len() < 16 {
            problems.push("SESSION_TOKEN_SECRET must be at least 16 bytes");
        }

        if self.database.backend == LedgerBackend::MySql && self.database.url.is_none() {
            problems.push("DATABASE_URL is required for the mysql ledger backend");
        }

        if !problems.is_empty() {
            return Err(AppError::Configuration(problems.join("; ")));
        }

        if !non_blank(&self.webhook.secret) {
            if self.webhook.allow_unsigned {
                tracing::warn!(
                    "WEBHOOK_SECRET is not set and WEBHOOK_ALLOW_UNSIGNED=true: unsigned gateway notifications will be accepted"
                );
            } else {
                tracing::warn!(
                    "WEBHOOK_SECRET is not set: all gateway notifications will be rejected"
                );
            }
        }

        Ok(())
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: FromStr>(name: &str, default: &str) -> Result<T> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| AppError::Configuration(format!("Invalid {}", name)))
}

fn parse_bool(name: &str, default: bool) -> Result<bool> {
    match env::var(name) {
        Err(_) => Ok(default),
        Ok(v) => match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(AppError::Configuration(format!("Invalid {}", name))),
        },
    }
}

fn non_blank(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

fn redact(value: &Option<String>) -> &'static str {
    if value.is_some() {
        "[redacted]"
    } else {
        "<unset>"
    }
}
