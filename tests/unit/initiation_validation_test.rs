// Initiation input validation
//
// - Every violated rule is reported, not only the first
// - Amount bounds: > 0 and <= configured ceiling
// - Only the configured currency is accepted
// - Blank optional fields are treated as absent

use payconfirm::config::PaymentConfig;
use payconfirm::core::{AppError, Currency};
use payconfirm::modules::payments::models::InitiatePaymentRequest;
use payconfirm::modules::payments::services::validate_initiation;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn valid_request() -> InitiatePaymentRequest {
    InitiatePaymentRequest {
        amount: Some(dec!(10000)),
        currency: Some("KES".to_string()),
        description: Some("Community hall booking".to_string()),
        email: Some("member@example.com".to_string()),
        ..Default::default()
    }
}

fn violations(request: &InitiatePaymentRequest, config: &PaymentConfig) -> Vec<String> {
    match validate_initiation(request, config) {
        Ok(_) => Vec::new(),
        Err(AppError::Validation(list)) => list,
        Err(other) => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_empty_request_lists_every_required_field() {
    let list = violations(&InitiatePaymentRequest::default(), &PaymentConfig::default());
    assert_eq!(list.len(), 4, "{:?}", list);
    for field in ["amount", "currency", "description", "email"] {
        assert!(list.iter().any(|v| v.starts_with(field)), "missing {}: {:?}", field, list);
    }
}

#[test]
fn test_currency_is_case_insensitive_but_fixed() {
    let config = PaymentConfig::default();

    let mut lower = valid_request();
    lower.currency = Some("kes".to_string());
    assert!(violations(&lower, &config).is_empty());

    let mut usd = valid_request();
    usd.currency = Some("USD".to_string());
    assert_eq!(violations(&usd, &config).len(), 1);

    let ugx_config = PaymentConfig {
        currency: Currency::UGX,
        ..PaymentConfig::default()
    };
    let mut ugx = valid_request();
    ugx.currency = Some("UGX".to_string());
    ugx.amount = Some(dec!(5000.50));
    assert!(
        violations(&ugx, &ugx_config).iter().any(|v| v.contains("decimal")),
        "UGX has no minor unit"
    );
}

#[test]
fn test_description_length_limit() {
    let mut request = valid_request();
    request.description = Some("x".repeat(100));
    assert!(violations(&request, &PaymentConfig::default()).is_empty());

    request.description = Some("x".repeat(101));
    assert_eq!(violations(&request, &PaymentConfig::default()).len(), 1);
}

#[test]
fn test_blank_optionals_fall_back_to_configuration() {
    let config = PaymentConfig {
        cancel_url: Some("https://app.example.com/payments/cancel".to_string()),
        ..PaymentConfig::default()
    };
    let mut request = valid_request();
    request.phone = Some("   ".to_string());
    request.first_name = Some(String::new());
    request.callback_url = Some(" ".to_string());

    let validated = validate_initiation(&request, &config).unwrap();
    assert_eq!(validated.billing.phone, None);
    assert_eq!(validated.billing.first_name, None);
    assert_eq!(validated.callback_url, config.callback_url);
    assert_eq!(validated.cancel_url, config.cancel_url);
}

#[test]
fn test_client_urls_override_configuration() {
    let mut request = valid_request();
    request.callback_url = Some("https://client.example.com/done".to_string());
    let validated = validate_initiation(&request, &PaymentConfig::default()).unwrap();
    assert_eq!(validated.callback_url, "https://client.example.com/done");
}

proptest! {
    #[test]
    fn test_amounts_within_bounds_are_accepted(cents in 1i64..=100_000_000i64) {
        let mut request = valid_request();
        request.amount = Some(Decimal::new(cents, 2));
        prop_assert!(validate_initiation(&request, &PaymentConfig::default()).is_ok());
    }

    #[test]
    fn test_non_positive_amounts_are_rejected(cents in -100_000_000i64..=0i64) {
        let mut request = valid_request();
        request.amount = Some(Decimal::new(cents, 2));
        prop_assert!(validate_initiation(&request, &PaymentConfig::default()).is_err());
    }

    #[test]
    fn test_amounts_above_ceiling_are_rejected(extra in 1i64..=1_000_000i64) {
        let config = PaymentConfig::default();
        let mut request = valid_request();
        request.amount = Some(config.max_amount + Decimal::new(extra, 2));
        prop_assert!(validate_initiation(&request, &config).is_err());
    }
}
