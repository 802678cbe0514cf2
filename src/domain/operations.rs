use super::account::{Account, NewAccount};
use super::amount::AmountType;
use super::error::DomainError;

/// Per-withdrawal cap in whole currency units, applied regardless of balance
pub const FRAUD_LIMIT_UNITS: i64 = 10_000;

pub fn fraud_limit<A: AmountType>() -> A {
    A::from_whole_units(FRAUD_LIMIT_UNITS)
}

/// Apply a withdrawal to an account, returning the new balance
pub fn apply_withdrawal<A: AmountType>(
    account: &mut Account<A>,
    amount: A,
) -> Result<A, DomainError> {
    // Validate amount is positive
    if amount <= A::zero() {
        return Err(DomainError::InvalidAmount);
    }

    if amount > fraud_limit() {
        return Err(DomainError::FraudLimitExceeded);
    }

    // Check sufficient funds
    if account.balance() < amount {
        return Err(DomainError::InsufficientBalance);
    }

    let new_balance = account
        .balance()
        .checked_sub(amount)
        .ok_or(DomainError::Overflow)?;

    account.set_balance(new_balance);
    Ok(new_balance)
}

/// Apply a deposit to an account, returning the new balance
///
/// Deposits have no upper bound.
pub fn apply_deposit<A: AmountType>(
    account: &mut Account<A>,
    amount: A,
) -> Result<A, DomainError> {
    if amount <= A::zero() {
        return Err(DomainError::InvalidAmount);
    }

    let new_balance = account
        .balance()
        .checked_add(amount)
        .ok_or(DomainError::Overflow)?;

    account.set_balance(new_balance);
    Ok(new_balance)
}

pub fn verify_biometric<A: AmountType>(
    account: &Account<A>,
    biometric_code: &str,
) -> Result<(), DomainError> {
    if account.biometric_code() != biometric_code {
        return Err(DomainError::IncorrectBiometric);
    }
    Ok(())
}

pub fn verify_pin<A: AmountType>(account: &Account<A>, pin: &str) -> Result<(), DomainError> {
    if account.pin() != pin {
        return Err(DomainError::IncorrectPin);
    }
    Ok(())
}

/// Field checks for the admin "add account" operation
///
/// Uniqueness of the card number is the store's concern.
pub fn validate_new_account<A: AmountType>(new_account: &NewAccount<A>) -> Result<(), DomainError> {
    if new_account.card_number.chars().count() != 16 {
        return Err(DomainError::InvalidCardNumber);
    }

    if new_account.pin.chars().count() != 4 {
        return Err(DomainError::InvalidPin);
    }

    if new_account.balance < A::zero() {
        return Err(DomainError::NegativeBalance);
    }

    Ok(())
}
