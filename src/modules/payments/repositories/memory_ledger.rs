use super::super::models::{Completion, NewTransaction, PaymentTransaction};
use super::payment_ledger::PaymentLedger;
use crate::core::{AppError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// Process-local ledger.
///
/// Used for local development (`LEDGER_BACKEND=memory`) and tests. The write
/// lock gives `mark_completed` the same compare-and-set semantics as the
/// guarded UPDATE in MySQL.
#[derive(Default)]
pub struct MemoryLedger {
    rows: RwLock<HashMap<String, PaymentTransaction>>,
    completions: AtomicUsize,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `pending -> completed` writes so far
    pub fn completion_count(&self) -> usize {
        self.completions.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl PaymentLedger for MemoryLedger {
    async fn reference_exists(&self, reference: &str) -> Result<bool> {
        Ok(self.rows.read().await.contains_key(reference))
    }

    async fn insert_pending(&self, new: NewTransaction) -> Result<PaymentTransaction> {
        let mut rows = self.rows.write().await;

        if rows.contains_key(&new.reference) {
            return Err(AppError::Conflict(format!(
                "Transaction '{}' already exists",
                new.reference
            )));
        }
        if rows
            .values()
            .any(|row| row.gateway_order_id == new.gateway_order_id)
        {
            return Err(AppError::Conflict(format!(
                "Gateway order '{}' already recorded",
                new.gateway_order_id
            )));
        }

        let transaction = PaymentTransaction::new_pending(new);
        rows.insert(transaction.reference.clone(), transaction.clone());
        Ok(transaction)
    }

    async fn find_by_reference(&self, reference: &str) -> Result<Option<PaymentTransaction>> {
        Ok(self.rows.read().await.get(reference).cloned())
    }

    async fn find_by_reference_for_owner(
        &self,
        reference: &str,
        owner_id: &str,
    ) -> Result<Option<PaymentTransaction>> {
        Ok(self
            .rows
            .read()
            .await
            .get(reference)
            .filter(|row| row.owner_id == owner_id)
            .cloned())
    }

    async fn find_by_gateway_order_id(
        &self,
        gateway_order_id: &str,
    ) -> Result<Option<PaymentTransaction>> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .find(|row| row.gateway_order_id == gateway_order_id)
            .cloned())
    }

    async fn mark_completed(&self, reference: &str, completion: &Completion) -> Result<bool> {
        let mut rows = self.rows.write().await;
        let transitioned = match rows.get_mut(reference) {
            Some(row) => row.complete(completion),
            None => false,
        };
        if transitioned {
            self.completions.fetch_add(1, Ordering::SeqCst);
        }
        Ok(transitioned)
    }

    async fn list_for_owner(
        &self,
        owner_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<PaymentTransaction>> {
        let rows = self.rows.read().await;
        let mut owned: Vec<PaymentTransaction> = rows
            .values()
            .filter(|row| row.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.reference.cmp(&a.reference))
        });

        Ok(owned
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
