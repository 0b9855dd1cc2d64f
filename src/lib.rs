//! Payment confirmation service library
//!
//! Initiates hosted-checkout payments with the gateway and confirms them,
//! exactly once, from either the client's verify call or the gateway webhook.

pub mod app;
pub mod config;
pub mod core;
pub mod logging;
pub mod middleware;
pub mod modules;

// Re-export commonly used types
pub use app::AppState;
pub use core::{AppError, Result};
pub use modules::gateways;
pub use modules::payments;
