use async_trait::async_trait;
use tokio::io::AsyncWrite;

use super::error::StorageError;
use crate::domain::{Account, AmountType, DomainError, TransactionRecord};

/// Append-only log of settled transactions
pub trait TransactionLog<A: AmountType>: Send + Sync {
    /// Append a record (immutable after insertion)
    fn append(&self, record: TransactionRecord<A>);

    /// Records in insertion order, optionally restricted to one card
    fn list(&self, card_number: Option<&str>) -> Vec<TransactionRecord<A>>;

    /// Drop every record of a card, returning how many were removed
    fn remove_card(&self, card_number: &str) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Trait for managing card-holder accounts with pluggable storage backends
#[async_trait]
pub trait AccountStore<A: AmountType>: Send + Sync {
    type Entry<'a>: AccountEntry<'a, A> + Send
    where
        Self: 'a;

    /// Entry for an existing account, `NotFound` otherwise
    fn entry(&self, card_number: &str) -> Result<Self::Entry<'_>, StorageError>;

    /// Read-only lookup (returns a clone)
    fn find(&self, card_number: &str) -> Option<Account<A>>;

    /// Insert a new account; `DuplicateKey` if the card number is taken
    fn insert(&self, account: Account<A>) -> Result<(), StorageError>;

    /// Remove an account, running `cascade` while the account is still locked
    ///
    /// No other operation on the card can interleave with `cascade`.
    fn remove_with<R, F>(&self, card_number: &str, cascade: F) -> Option<(Account<A>, R)>
    where
        F: FnOnce(&Account<A>) -> R;

    /// Remove an account, returning it
    fn remove(&self, card_number: &str) -> Option<Account<A>> {
        self.remove_with(card_number, |_| ())
            .map(|(account, ())| account)
    }

    /// All accounts in insertion order
    fn accounts(&self) -> Vec<Account<A>>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Async snapshot of all accounts to a writer as pretty-printed JSON
    async fn snapshot<W>(&self, writer: W) -> Result<(), StorageError>
    where
        W: AsyncWrite + Unpin + Send;
}

/// Entry pattern for atomic account operations
pub trait AccountEntry<'a, A: AmountType> {
    /// Non-locking read (clones the account data)
    fn read(&self) -> Result<Account<A>, StorageError>;

    /// Atomic read-modify-write with validation
    ///
    /// The account stays exclusively locked while `update_fn` runs.
    fn try_update<F, R>(&mut self, update_fn: F) -> Result<R, StorageError>
    where
        F: FnOnce(&mut Account<A>) -> Result<R, DomainError>;
}

/// Durable home of the account list
#[async_trait]
pub trait AccountPersistence<A: AmountType>: Send + Sync {
    /// Previously persisted accounts, `None` when nothing was ever written
    async fn load(&self) -> Result<Option<Vec<Account<A>>>, StorageError>;

    /// Rewrite the full account list
    async fn persist<S>(&self, store: &S) -> Result<(), StorageError>
    where
        S: AccountStore<A>;
}
