pub mod auth;
pub mod request_id;

pub use auth::{issue_session_token, verify_session_token, AuthenticatedOwner, SessionAuth};
pub use request_id::{RequestId, RequestIdValue};
