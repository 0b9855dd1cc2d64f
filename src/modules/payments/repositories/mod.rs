pub mod memory_ledger;
pub mod mysql_ledger;
pub mod payment_ledger;

pub use memory_ledger::MemoryLedger;
pub use mysql_ledger::MySqlLedger;
pub use payment_ledger::PaymentLedger;
