pub mod gateway_trait;
pub mod pesapal;

pub use gateway_trait::{
    AccessToken, BillingInfo, CreatedOrder, GatewayTransactionStatus, OrderRequest,
    PaymentGateway,
};
pub use pesapal::{GatewayTimeouts, PesapalClient};
