use super::super::models::{Completion, NewTransaction, PaymentTransaction, TransactionStatus};
use super::payment_ledger::PaymentLedger;
use crate::core::{AppError, Result};
use async_trait::async_trait;
use sqlx::MySqlPool;

const SELECT_COLUMNS: &str = r#"
    SELECT
        id, reference, owner_id, amount, currency, description,
        gateway_order_id, status, verified, payment_method,
        gateway_response, created_at, verified_at, updated_at
    FROM payment_transactions
"#;

/// MySQL-backed payment ledger
///
/// Uniqueness of `reference` and `gateway_order_id` is enforced by UNIQUE
/// indexes; completion is a single guarded UPDATE.
pub struct MySqlLedger {
    pool: MySqlPool,
}

impl MySqlLedger {
    /// Create a new MySqlLedger
    ///
    /// # Arguments
    /// * `pool` - Database connection pool
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(
        &self,
        clause: &str,
        binds: &[&str],
    ) -> Result<Option<PaymentTransaction>> {
        let sql = format!("{} WHERE {}", SELECT_COLUMNS, clause);
        let mut query = sqlx::query_as::<_, PaymentTransaction>(&sql);
        for value in binds {
            query = query.bind(*value);
        }

        query
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to fetch transaction: {}", e)))
    }
}

#[async_trait]
impl PaymentLedger for MySqlLedger {
    async fn reference_exists(&self, reference: &str) -> Result<bool> {
        let row: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) as count
            FROM payment_transactions
            WHERE reference = ?
            "#,
        )
        .bind(reference)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to check reference existence: {}", e)))?;

        Ok(row.0 > 0)
    }

    async fn insert_pending(&self, new: NewTransaction) -> Result<PaymentTransaction> {
        let transaction = PaymentTransaction::new_pending(new);

        sqlx::query(
            r#"
            INSERT INTO payment_transactions (
                id, reference, owner_id, amount, currency, description,
                gateway_order_id, status, verified, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&transaction.id)
        .bind(&transaction.reference)
        .bind(&transaction.owner_id)
        .bind(transaction.amount)
        .bind(transaction.currency)
        .bind(&transaction.description)
        .bind(&transaction.gateway_order_id)
        .bind(transaction.status)
        .bind(transaction.verified)
        .bind(transaction.created_at)
        .bind(transaction.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => AppError::Conflict(
                format!("Transaction '{}' already exists", transaction.reference),
            ),
            other => AppError::Internal(format!("Failed to create transaction: {}", other)),
        })?;

        self.find_by_reference(&transaction.reference)
            .await?
            .ok_or_else(|| AppError::internal("Transaction was created but not found"))
    }

    async fn find_by_reference(&self, reference: &str) -> Result<Option<PaymentTransaction>> {
        self.fetch_one_where("reference = ?", &[reference]).await
    }

    async fn find_by_reference_for_owner(
        &self,
        reference: &str,
        owner_id: &str,
    ) -> Result<Option<PaymentTransaction>> {
        self.fetch_one_where("reference = ? AND owner_id = ?", &[reference, owner_id])
            .await
    }

    async fn find_by_gateway_order_id(
        &self,
        gateway_order_id: &str,
    ) -> Result<Option<PaymentTransaction>> {
        self.fetch_one_where("gateway_order_id = ?", &[gateway_order_id])
            .await
    }

    async fn mark_completed(&self, reference: &str, completion: &Completion) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE payment_transactions
            SET status = ?, verified = TRUE, payment_method = ?,
                gateway_response = ?, verified_at = ?, updated_at = ?
            WHERE reference = ? AND status = ? AND verified = FALSE
            "#,
        )
        .bind(TransactionStatus::Completed)
        .bind(&completion.payment_method)
        .bind(&completion.gateway_response)
        .bind(completion.verified_at)
        .bind(completion.verified_at)
        .bind(reference)
        .bind(TransactionStatus::Pending)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to complete transaction: {}", e)))?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_for_owner(
        &self,
        owner_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<PaymentTransaction>> {
        let sql = format!(
            "{} WHERE owner_id = ? ORDER BY created_at DESC LIMIT ? OFFSET ?",
            SELECT_COLUMNS
        );

        sqlx::query_as::<_, PaymentTransaction>(&sql)
            .bind(owner_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to list transactions: {}", e)))
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(AppError::Database)
    }
}
