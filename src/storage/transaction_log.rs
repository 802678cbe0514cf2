use std::sync::{PoisonError, RwLock};

use super::traits::TransactionLog;
use crate::domain::{AmountType, TransactionRecord};

/// In-memory, append-only transaction log
///
/// History is not persisted; it lives for the lifetime of the process.
pub struct InMemoryTransactionLog<A: AmountType> {
    records: RwLock<Vec<TransactionRecord<A>>>,
}

impl<A: AmountType> InMemoryTransactionLog<A> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }
}

impl<A: AmountType> Default for InMemoryTransactionLog<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: AmountType> TransactionLog<A> for InMemoryTransactionLog<A> {
    fn append(&self, record: TransactionRecord<A>) {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }

    fn list(&self, card_number: Option<&str>) -> Vec<TransactionRecord<A>> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        match card_number {
            Some(card) => records
                .iter()
                .filter(|r| r.card_number == card)
                .cloned()
                .collect(),
            None => records.clone(),
        }
    }

    fn remove_card(&self, card_number: &str) -> usize {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let before = records.len();
        records.retain(|r| r.card_number != card_number);
        before - records.len()
    }

    fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
