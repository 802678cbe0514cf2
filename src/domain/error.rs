use thiserror::Error;

/// Domain-level errors representing business rule violations
///
/// The display text doubles as the user-facing message returned by the API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("No such account exists.")]
    AccountNotFound,

    #[error("Incorrect biometric code.")]
    IncorrectBiometric,

    #[error("Incorrect PIN code.")]
    IncorrectPin,

    #[error("Fraud Alert: Withdrawal exceeds limit!")]
    FraudLimitExceeded,

    #[error("Insufficient balance!")]
    InsufficientBalance,

    #[error("Invalid transaction type.")]
    InvalidTransactionType(String),

    #[error("Invalid amount.")]
    InvalidAmount,

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Card number must be exactly 16 digits.")]
    InvalidCardNumber,

    #[error("PIN must be exactly 4 digits.")]
    InvalidPin,

    #[error("Balance cannot be negative.")]
    NegativeBalance,

    #[error("Account with this card number already exists.")]
    DuplicateCard,
}
