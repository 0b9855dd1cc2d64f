pub mod payment_controller;
pub mod webhook_controller;

pub use payment_controller::configure;
pub use webhook_controller::{receive_webhook, WebhookAck, MAX_WEBHOOK_BODY_BYTES};
