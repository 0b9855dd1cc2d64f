use chrono::Utc;
use rand::rngs::OsRng;
use rand::RngCore;

/// Number of random bytes appended to every reference
pub const RANDOM_BYTES: usize = 4;

/// Source of transaction references
pub trait GenerateReference: Send + Sync {
    fn generate(&self) -> String;
}

/// Produces `PREFIX-<epoch millis>-<8 uppercase hex>` references.
///
/// Uniqueness against the ledger is checked by the caller.
#[derive(Debug, Clone)]
pub struct ReferenceGenerator {
    prefix: String,
}

impl ReferenceGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl GenerateReference for ReferenceGenerator {
    fn generate(&self) -> String {
        let mut random = [0u8; RANDOM_BYTES];
        OsRng.fill_bytes(&mut random);

        format!(
            "{}-{}-{}",
            self.prefix,
            Utc::now().timestamp_millis(),
            hex::encode_upper(random)
        )
    }
}

/// Cheap structural check applied before any ledger lookup
pub fn is_well_formed(reference: &str) -> bool {
    let mut parts = reference.rsplitn(3, '-');
    let (Some(random), Some(millis), Some(prefix)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    !prefix.is_empty()
        && prefix.chars().all(|c| c.is_ascii_alphanumeric())
        && !millis.is_empty()
        && millis.chars().all(|c| c.is_ascii_digit())
        && random.len() == RANDOM_BYTES * 2
        && random
            .chars()
            .all(|c| c.is_ascii_digit() || (c.is_ascii_uppercase() && c.is_ascii_hexdigit()))
}
