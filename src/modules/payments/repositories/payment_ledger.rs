use super::super::models::{Completion, NewTransaction, PaymentTransaction};
use crate::core::Result;
use async_trait::async_trait;

/// Persisted set of payment transactions.
///
/// The ledger owns every row. Rows are inserted once as `pending` and changed
/// at most once, by `mark_completed`; nothing here deletes them.
#[async_trait]
pub trait PaymentLedger: Send + Sync {
    /// Whether any row already uses `reference`
    async fn reference_exists(&self, reference: &str) -> Result<bool>;

    /// Insert a new pending row. Fails with `Conflict` on a duplicate
    /// reference or gateway order id.
    async fn insert_pending(&self, new: NewTransaction) -> Result<PaymentTransaction>;

    async fn find_by_reference(&self, reference: &str) -> Result<Option<PaymentTransaction>>;

    /// Owner-scoped lookup; another owner's row is reported as absent
    async fn find_by_reference_for_owner(
        &self,
        reference: &str,
        owner_id: &str,
    ) -> Result<Option<PaymentTransaction>>;

    async fn find_by_gateway_order_id(
        &self,
        gateway_order_id: &str,
    ) -> Result<Option<PaymentTransaction>>;

    /// Conditional `pending -> completed` write.
    ///
    /// Returns true only for the caller that performed the transition; a row
    /// that is already completed (or missing) yields false and is untouched.
    async fn mark_completed(&self, reference: &str, completion: &Completion) -> Result<bool>;

    /// Owner's rows, newest first
    async fn list_for_owner(
        &self,
        owner_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<PaymentTransaction>>;

    /// Reachability check used by the readiness endpoint
    async fn ping(&self) -> Result<()>;
}
