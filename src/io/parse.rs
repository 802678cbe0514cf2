use serde::Deserialize;
use serde_json::Value;

use crate::domain::{AmountType, DomainError, TransactionKind, TransactionRequest};

/// Raw `/transaction` body as received
///
/// `type` and `amount` stay loosely typed so that a bad value becomes a
/// business failure rather than a malformed-body rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransactionRequest {
    #[serde(default)]
    pub card_number: String,
    #[serde(rename = "type", default)]
    pub tx_type: String,
    #[serde(default)]
    pub amount: Option<Value>,
}

impl RawTransactionRequest {
    /// Parse this raw request into a strongly-typed TransactionRequest
    pub fn parse<A: AmountType>(self) -> Result<TransactionRequest<A>, DomainError> {
        let kind: TransactionKind = self.tx_type.parse()?;

        // A balance enquiry ignores whatever amount was sent
        if !kind.moves_funds() {
            return Ok(TransactionRequest {
                card_number: self.card_number,
                kind,
                amount: None,
            });
        }

        let amount = match self.amount {
            None | Some(Value::Null) => return Err(DomainError::InvalidAmount),
            Some(Value::Number(n)) => {
                let value = n.as_f64().ok_or(DomainError::InvalidAmount)?;
                A::from_f64(value)?
            }
            Some(Value::String(s)) if s.trim().is_empty() => {
                return Err(DomainError::InvalidAmount);
            }
            Some(Value::String(s)) => A::from_decimal_str(&s)?,
            Some(_) => return Err(DomainError::InvalidAmount),
        };

        Ok(TransactionRequest {
            card_number: self.card_number,
            kind,
            amount: Some(amount),
        })
    }
}
