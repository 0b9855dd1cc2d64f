use super::super::models::InitiatePaymentRequest;
use crate::config::PaymentConfig;
use crate::core::{AppError, Currency, Result};
use crate::modules::gateways::BillingInfo;
use rust_decimal::Decimal;

pub const MAX_DESCRIPTION_CHARS: usize = 100;

/// Initiation input that passed every rule
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPayment {
    pub amount: Decimal,
    pub currency: Currency,
    pub description: String,
    pub billing: BillingInfo,
    pub callback_url: String,
    pub cancel_url: Option<String>,
}

/// Check an initiation request against the deployment's payment rules.
///
/// Every violated rule is collected; the error lists all of them.
pub fn validate_initiation(
    request: &InitiatePaymentRequest,
    config: &PaymentConfig,
) -> Result<ValidatedPayment> {
    let mut violations = Vec::new();

    match request.amount {
        None => violations.push("amount is required".to_string()),
        Some(amount) => {
            if amount <= Decimal::ZERO {
                violations.push("amount must be greater than 0".to_string());
            } else if amount > config.max_amount {
                violations.push(format!("amount must not exceed {}", config.max_amount));
            }
            if amount > Decimal::ZERO {
                if let Err(msg) = config.currency.validate_amount(amount) {
                    violations.push(msg);
                }
            }
        }
    }

    match trimmed(&request.currency) {
        None => violations.push("currency is required".to_string()),
        Some(code) => match code.parse::<Currency>() {
            Ok(currency) if currency == config.currency => {}
            _ => violations.push(format!(
                "currency must be {} (got '{}')",
                config.currency, code
            )),
        },
    }

    let description = trimmed(&request.description);
    match description {
        None => violations.push("description is required".to_string()),
        Some(text) if text.chars().count() > MAX_DESCRIPTION_CHARS => violations.push(format!(
            "description must be at most {} characters",
            MAX_DESCRIPTION_CHARS
        )),
        Some(_) => {}
    }

    let email = trimmed(&request.email);
    match email {
        None => violations.push("email is required".to_string()),
        Some(address) if !looks_like_email(address) => {
            violations.push("email must be a valid email address".to_string())
        }
        Some(_) => {}
    }

    let phone = trimmed(&request.phone);
    if let Some(number) = phone {
        if !looks_like_phone(number) {
            violations.push("phone must contain 7 to 15 digits".to_string());
        }
    }

    for (field, value) in [
        ("callback_url", &request.callback_url),
        ("cancel_url", &request.cancel_url),
    ] {
        if let Some(url) = trimmed(value) {
            if !is_http_url(url) {
                violations.push(format!("{} must be an absolute http(s) URL", field));
            }
        }
    }

    if !violations.is_empty() {
        return Err(AppError::Validation(violations));
    }

    Ok(ValidatedPayment {
        amount: request.amount.unwrap_or_default(),
        currency: config.currency,
        description: description.unwrap_or_default().to_string(),
        billing: BillingInfo {
            email: email.unwrap_or_default().to_string(),
            phone: phone.map(str::to_string),
            first_name: trimmed(&request.first_name).map(str::to_string),
            last_name: trimmed(&request.last_name).map(str::to_string),
        },
        callback_url: trimmed(&request.callback_url)
            .map(str::to_string)
            .unwrap_or_else(|| config.callback_url.clone()),
        cancel_url: trimmed(&request.cancel_url)
            .map(str::to_string)
            .or_else(|| config.cancel_url.clone()),
    })
}

fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn looks_like_email(address: &str) -> bool {
    if address.chars().any(char::is_whitespace) {
        return false;
    }
    match address.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}

fn looks_like_phone(number: &str) -> bool {
    let digits = number.chars().filter(char::is_ascii_digit).count();
    let allowed = number
        .chars()
        .enumerate()
        .all(|(i, c)| c.is_ascii_digit() || c == ' ' || c == '-' || (c == '+' && i == 0));
    allowed && (7..=15).contains(&digits)
}

fn is_http_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    matches!(rest, Some(host) if !host.is_empty() && !host.starts_with('/'))
}
