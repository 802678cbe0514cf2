use serde::{Deserialize, Serialize};

use super::amount::AmountType;

/// Card-holder account with private fields enforcing invariants
///
/// Serialized in the accounts file and the admin listing with camelCase keys.
/// PIN and biometric code are kept in plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account<A: AmountType> {
    card_number: String,
    holder_name: String,
    pin: String,
    biometric_code: String,
    #[serde(bound = "")]
    balance: A,
}

impl<A: AmountType> Account<A> {
    /// Create a new account
    pub fn new(
        card_number: impl Into<String>,
        holder_name: impl Into<String>,
        pin: impl Into<String>,
        biometric_code: impl Into<String>,
        balance: A,
    ) -> Self {
        Self {
            card_number: card_number.into(),
            holder_name: holder_name.into(),
            pin: pin.into(),
            biometric_code: biometric_code.into(),
            balance,
        }
    }

    /// Get the card number (unique key)
    pub fn card_number(&self) -> &str {
        &self.card_number
    }

    pub fn holder_name(&self) -> &str {
        &self.holder_name
    }

    pub fn pin(&self) -> &str {
        &self.pin
    }

    pub fn biometric_code(&self) -> &str {
        &self.biometric_code
    }

    /// Get current balance
    pub fn balance(&self) -> A {
        self.balance
    }

    // Internal mutation for use by operations module
    pub(crate) fn set_balance(&mut self, amount: A) {
        self.balance = amount;
    }
}

/// Fields submitted by the admin "add account" operation
///
/// A missing balance defaults to zero.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount<A: AmountType> {
    #[serde(default)]
    pub card_number: String,
    #[serde(default)]
    pub holder_name: String,
    #[serde(default)]
    pub pin: String,
    #[serde(default)]
    pub biometric_code: String,
    #[serde(default, bound = "")]
    pub balance: A,
}

impl<A: AmountType> NewAccount<A> {
    /// Build the account without validation (see `operations::validate_new_account`)
    pub fn into_account(self) -> Account<A> {
        Account::new(
            self.card_number,
            self.holder_name,
            self.pin,
            self.biometric_code,
            self.balance,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::amount::FixedPoint;

    fn sample() -> Account<FixedPoint> {
        Account::new(
            "1111222233334444",
            "Sumitha",
            "1234",
            "123456789",
            FixedPoint::from_whole_units(5000),
        )
    }

    #[test]
    fn getters_return_correct_values() {
        let account = sample();

        assert_eq!(account.card_number(), "1111222233334444");
        assert_eq!(account.holder_name(), "Sumitha");
        assert_eq!(account.pin(), "1234");
        assert_eq!(account.biometric_code(), "123456789");
        assert_eq!(account.balance(), FixedPoint::from_whole_units(5000));
    }

    #[test]
    fn set_balance_updates_balance() {
        let mut account = sample();
        account.set_balance(FixedPoint::from_whole_units(3000));
        assert_eq!(account.balance(), FixedPoint::from_whole_units(3000));
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let value = serde_json::to_value(sample()).unwrap();

        assert_eq!(value["cardNumber"], "1111222233334444");
        assert_eq!(value["holderName"], "Sumitha");
        assert_eq!(value["biometricCode"], "123456789");
        assert_eq!(value["balance"].as_f64(), Some(5000.0));
    }

    #[test]
    fn deserializes_accounts_file_entry() {
        let json = r#"{
            "cardNumber": "2222333344445555",
            "holderName": "Divya",
            "pin": "2345",
            "biometricCode": "987654321",
            "balance": 6000
        }"#;

        let account: Account<FixedPoint> = serde_json::from_str(json).unwrap();
        assert_eq!(account.holder_name(), "Divya");
        assert_eq!(account.balance(), FixedPoint::from_whole_units(6000));
    }

    #[test]
    fn new_account_balance_defaults_to_zero() {
        let json = r#"{"cardNumber": "5555666677778888", "holderName": "Asha", "pin": "9999", "biometricCode": "1"}"#;

        let new_account: NewAccount<FixedPoint> = serde_json::from_str(json).unwrap();
        let account = new_account.into_account();
        assert_eq!(account.balance(), FixedPoint::zero());
        assert_eq!(account.card_number(), "5555666677778888");
    }
}
