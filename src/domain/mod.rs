pub mod account;
pub mod amount;
pub mod currency;
pub mod error;
pub mod operations;
pub mod transaction;

// Re-export commonly used types
pub use account::{Account, NewAccount};
pub use amount::{AmountType, FixedPoint};
pub use currency::{format_inr, format_inr_plain};
pub use error::DomainError;
pub use operations::{
    FRAUD_LIMIT_UNITS, apply_deposit, apply_withdrawal, fraud_limit, validate_new_account,
    verify_biometric, verify_pin,
};
pub use transaction::{TransactionKind, TransactionRecord, TransactionRequest, TransactionStatus};
