pub mod payment_transaction;
pub mod requests;

pub use payment_transaction::{
    Completion, NewTransaction, PaymentTransaction, TransactionStatus, MAX_PAYMENT_METHOD_CHARS,
};
pub use requests::{
    InitiatePaymentRequest, InitiatePaymentResponse, ListPaymentsQuery, PaymentStatusResponse,
    TransactionView, VerifyPaymentRequest, MAX_LIST_LIMIT,
};
