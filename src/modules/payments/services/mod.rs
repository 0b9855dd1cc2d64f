pub mod payment_service;
pub mod payment_validation;
pub mod reference_generator;
pub mod verification_engine;
pub mod webhook_authenticator;
pub mod webhook_processor;

pub use payment_service::{PaymentService, MAX_REFERENCE_ATTEMPTS};
pub use payment_validation::{validate_initiation, ValidatedPayment};
pub use reference_generator::{GenerateReference, ReferenceGenerator};
pub use verification_engine::{
    VerificationDisposition, VerificationEngine, VerificationOutcome, VerificationRequest,
};
pub use webhook_processor::{WebhookProcessor, WebhookStatus};
