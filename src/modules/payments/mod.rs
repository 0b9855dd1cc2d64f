pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{PaymentTransaction, TransactionStatus};
pub use repositories::{MemoryLedger, MySqlLedger, PaymentLedger};
pub use services::{PaymentService, VerificationEngine, WebhookProcessor};
