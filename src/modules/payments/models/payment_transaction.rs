use crate::core::Currency;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Payment transaction status.
///
/// The only transition is `Pending -> Completed`; there is no persisted
/// failure state, an unverified payment simply stays pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR(20)", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Awaiting gateway confirmation
    #[default]
    Pending,

    /// Confirmed by the gateway and cross-validated
    Completed,
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Pending => write!(f, "pending"),
            TransactionStatus::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TransactionStatus::Pending),
            "completed" => Ok(TransactionStatus::Completed),
            _ => Err(format!("Invalid transaction status: {}", s)),
        }
    }
}

/// One row of the payment ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PaymentTransaction {
    /// Surrogate key (UUID)
    pub id: String,

    /// Our unique transaction reference
    pub reference: String,

    /// Principal that initiated the payment
    pub owner_id: String,

    pub amount: Decimal,

    pub currency: Currency,

    pub description: String,

    /// Identifier assigned by the gateway when the order was created
    pub gateway_order_id: String,

    pub status: TransactionStatus,

    /// Set together with `status = completed`, never earlier
    pub verified: bool,

    /// Payment method reported by the gateway at completion
    pub payment_method: Option<String>,

    /// Raw gateway status payload, kept for audit
    pub gateway_response: Option<serde_json::Value>,

    pub created_at: DateTime<Utc>,

    pub verified_at: Option<DateTime<Utc>>,

    pub updated_at: DateTime<Utc>,
}

impl PaymentTransaction {
    /// Build a fresh pending record
    pub fn new_pending(new: NewTransaction) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            reference: new.reference,
            owner_id: new.owner_id,
            amount: new.amount,
            currency: new.currency,
            description: new.description,
            gateway_order_id: new.gateway_order_id,
            status: TransactionStatus::Pending,
            verified: false,
            payment_method: None,
            gateway_response: None,
            created_at: now,
            verified_at: None,
            updated_at: now,
        }
    }

    /// Completed and verified; no further mutation is allowed
    pub fn is_settled(&self) -> bool {
        self.status == TransactionStatus::Completed && self.verified
    }

    pub fn is_pending(&self) -> bool {
        self.status == TransactionStatus::Pending
    }

    /// Apply a completion in place. Returns false when already completed.
    pub fn complete(&mut self, completion: &Completion) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.status = TransactionStatus::Completed;
        self.verified = true;
        self.payment_method = completion.payment_method.clone();
        self.gateway_response = Some(completion.gateway_response.clone());
        self.verified_at = Some(completion.verified_at);
        self.updated_at = completion.verified_at;
        true
    }
}

/// Values needed to insert a pending row
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub reference: String,
    pub owner_id: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub description: String,
    pub gateway_order_id: String,
}

/// Width of the `payment_method` column, in characters
pub const MAX_PAYMENT_METHOD_CHARS: usize = 255;

/// Values written by the single `pending -> completed` transition
#[derive(Debug, Clone)]
pub struct Completion {
    pub payment_method: Option<String>,
    pub gateway_response: serde_json::Value,
    pub verified_at: DateTime<Utc>,
}

impl Completion {
    /// Completion stamped now. The gateway's method label is cut to the column width.
    pub fn now(payment_method: Option<String>, gateway_response: serde_json::Value) -> Self {
        let payment_method = payment_method.map(|method| {
            if method.chars().count() > MAX_PAYMENT_METHOD_CHARS {
                method.chars().take(MAX_PAYMENT_METHOD_CHARS).collect()
            } else {
                method
            }
        });
        Self {
            payment_method,
            gateway_response,
            verified_at: Utc::now(),
        }
    }
}
