use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::amount::AmountType;
use super::error::DomainError;

/// Transaction types offered at the ATM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Withdraw,
    Deposit,
    Balance,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Withdraw => "withdraw",
            Self::Deposit => "deposit",
            Self::Balance => "balance",
        }
    }

    /// Whether this kind moves money (and therefore needs an amount and a log record)
    pub fn moves_funds(&self) -> bool {
        !matches!(self, Self::Balance)
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "withdraw" => Ok(Self::Withdraw),
            "deposit" => Ok(Self::Deposit),
            "balance" => Ok(Self::Balance),
            _ => Err(DomainError::InvalidTransactionType(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Success,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

/// Immutable record of a settled transaction (append-only log entry)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord<A: AmountType> {
    pub tx_id: String,
    pub card_number: String,
    pub tx_type: TransactionKind,
    #[serde(bound = "")]
    pub amount: A,
    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
    pub status: TransactionStatus,
}

impl<A: AmountType> TransactionRecord<A> {
    /// Create a successful record stamped at `at`
    pub fn settled(
        card_number: impl Into<String>,
        tx_type: TransactionKind,
        amount: A,
        at: DateTime<Utc>,
    ) -> Self {
        let card_number = card_number.into();
        Self {
            tx_id: transaction_digest(&card_number, tx_type, amount, at),
            card_number,
            tx_type,
            amount,
            timestamp: at,
            status: TransactionStatus::Success,
        }
    }
}

/// A validated request to run one transaction against a card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest<A: AmountType> {
    pub card_number: String,
    pub kind: TransactionKind,
    /// Required for withdraw/deposit, ignored for balance
    pub amount: Option<A>,
}

/// Hex SHA-256 over card number, type, amount and timestamp
///
/// A log key only; it carries no idempotency or security meaning.
pub fn transaction_digest<A: AmountType>(
    card_number: &str,
    tx_type: TransactionKind,
    amount: A,
    at: DateTime<Utc>,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(card_number.as_bytes());
    hasher.update(tx_type.as_str().as_bytes());
    hasher.update(amount.to_decimal_string().as_bytes());
    hasher.update(iso_millis::format(&at).as_bytes());
    format!("{:x}", hasher.finalize())
}

/// ISO-8601 UTC timestamps with millisecond precision (`2024-05-01T10:00:00.000Z`)
pub mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(at: &DateTime<Utc>) -> String {
        at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(at))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let text = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&text)
            .map(|at| at.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::amount::FixedPoint;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!(
            "withdraw".parse::<TransactionKind>(),
            Ok(TransactionKind::Withdraw)
        );
        assert_eq!(
            " Deposit ".parse::<TransactionKind>(),
            Ok(TransactionKind::Deposit)
        );
        assert_eq!(
            "BALANCE".parse::<TransactionKind>(),
            Ok(TransactionKind::Balance)
        );
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert_eq!(
            "transfer".parse::<TransactionKind>(),
            Err(DomainError::InvalidTransactionType("transfer".to_string()))
        );
    }

    #[test]
    fn only_balance_leaves_funds_alone() {
        assert!(TransactionKind::Withdraw.moves_funds());
        assert!(TransactionKind::Deposit.moves_funds());
        assert!(!TransactionKind::Balance.moves_funds());
    }

    #[test]
    fn settled_record_is_successful() {
        let record = TransactionRecord::settled(
            "1111222233334444",
            TransactionKind::Withdraw,
            FixedPoint::from_whole_units(2000),
            fixed_time(),
        );

        assert_eq!(record.status, TransactionStatus::Success);
        assert_eq!(record.tx_type, TransactionKind::Withdraw);
        assert_eq!(record.tx_id.len(), 64);
        assert!(record.tx_id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn digest_depends_on_every_input() {
        let amount = FixedPoint::from_whole_units(100);
        let base = transaction_digest("1111222233334444", TransactionKind::Deposit, amount, fixed_time());

        assert_eq!(
            base,
            transaction_digest("1111222233334444", TransactionKind::Deposit, amount, fixed_time())
        );
        assert_ne!(
            base,
            transaction_digest("2222333344445555", TransactionKind::Deposit, amount, fixed_time())
        );
        assert_ne!(
            base,
            transaction_digest("1111222233334444", TransactionKind::Withdraw, amount, fixed_time())
        );
        assert_ne!(
            base,
            transaction_digest(
                "1111222233334444",
                TransactionKind::Deposit,
                amount,
                fixed_time() + chrono::Duration::milliseconds(1)
            )
        );
    }

    #[test]
    fn serializes_wire_shape() {
        let record = TransactionRecord::settled(
            "1111222233334444",
            TransactionKind::Deposit,
            FixedPoint::from_whole_units(1000),
            fixed_time(),
        );

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["txType"], "deposit");
        assert_eq!(value["status"], "success");
        assert_eq!(value["timestamp"], "2024-05-01T10:00:00.000Z");
        assert_eq!(value["cardNumber"], "1111222233334444");
        assert_eq!(value["amount"].as_f64(), Some(1000.0));

        let back: TransactionRecord<FixedPoint> = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }
}
