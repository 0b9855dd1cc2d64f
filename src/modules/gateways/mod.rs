pub mod models;
pub mod services;

pub use models::GatewayEnvironment;
pub use services::{
    AccessToken, BillingInfo, CreatedOrder, GatewayTransactionStatus, OrderRequest,
    GatewayTimeouts, PaymentGateway, PesapalClient,
};
