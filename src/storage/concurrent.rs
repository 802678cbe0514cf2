use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::{DashMap, Entry};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::error::StorageError;
use super::traits::{AccountEntry, AccountStore};
use crate::domain::{Account, AmountType, DomainError};

/// Account plus its insertion sequence, so listings keep creation order
#[derive(Debug, Clone)]
struct Slot<A: AmountType> {
    seq: u64,
    account: Account<A>,
}

/// Concurrent in-memory account store using DashMap
pub struct ConcurrentAccountStore<A: AmountType> {
    accounts: DashMap<String, Slot<A>>,
    next_seq: AtomicU64,
}

impl<A: AmountType> ConcurrentAccountStore<A> {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            next_seq: AtomicU64::new(0),
        }
    }

    /// Build a store from accounts in order; later duplicates are skipped
    pub fn from_accounts(accounts: impl IntoIterator<Item = Account<A>>) -> Self {
        let store = Self::new();
        for account in accounts {
            if let Err(e) = store.insert(account) {
                tracing::warn!(error = %e, "Skipping duplicate account while loading");
            }
        }
        store
    }
}

impl<A: AmountType> Default for ConcurrentAccountStore<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// Entry for concurrent access
pub struct ConcurrentEntry<'a, A: AmountType> {
    card_number: String,
    accounts: &'a DashMap<String, Slot<A>>,
}

impl<'a, A: AmountType> AccountEntry<'a, A> for ConcurrentEntry<'a, A> {
    fn read(&self) -> Result<Account<A>, StorageError> {
        self.accounts
            .get(&self.card_number)
            .map(|slot| slot.account.clone())
            .ok_or(StorageError::NotFound)
    }

    fn try_update<F, R>(&mut self, update_fn: F) -> Result<R, StorageError>
    where
        F: FnOnce(&mut Account<A>) -> Result<R, DomainError>,
    {
        // get_mut holds the shard write lock across the check-then-mutate
        let mut slot = self
            .accounts
            .get_mut(&self.card_number)
            .ok_or(StorageError::NotFound)?;
        Ok(update_fn(&mut slot.account)?)
    }
}

#[async_trait]
impl<A: AmountType> AccountStore<A> for ConcurrentAccountStore<A> {
    type Entry<'a>
        = ConcurrentEntry<'a, A>
    where
        Self: 'a;

    fn entry(&self, card_number: &str) -> Result<Self::Entry<'_>, StorageError> {
        if !self.accounts.contains_key(card_number) {
            return Err(StorageError::NotFound);
        }
        Ok(ConcurrentEntry {
            card_number: card_number.to_string(),
            accounts: &self.accounts,
        })
    }

    fn find(&self, card_number: &str) -> Option<Account<A>> {
        self.accounts
            .get(card_number)
            .map(|slot| slot.account.clone())
    }

    fn insert(&self, account: Account<A>) -> Result<(), StorageError> {
        match self.accounts.entry(account.card_number().to_string()) {
            Entry::Occupied(e) => Err(StorageError::DuplicateKey(e.key().clone())),
            Entry::Vacant(e) => {
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                e.insert(Slot { seq, account });
                Ok(())
            }
        }
    }

    fn remove_with<R, F>(&self, card_number: &str, cascade: F) -> Option<(Account<A>, R)>
    where
        F: FnOnce(&Account<A>) -> R,
    {
        // The occupied entry holds the shard write lock until removal
        match self.accounts.entry(card_number.to_string()) {
            Entry::Occupied(e) => {
                let cascaded = cascade(&e.get().account);
                Some((e.remove().account, cascaded))
            }
            Entry::Vacant(_) => None,
        }
    }

    fn accounts(&self) -> Vec<Account<A>> {
        // DashMap holds brief per-shard locks during iteration
        let mut slots: Vec<Slot<A>> = self
            .accounts
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        slots.sort_by_key(|slot| slot.seq);
        slots.into_iter().map(|slot| slot.account).collect()
    }

    fn len(&self) -> usize {
        self.accounts.len()
    }

    async fn snapshot<W>(&self, mut writer: W) -> Result<(), StorageError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        // Collect first so no shard lock is held across an await
        let bytes = serde_json::to_vec_pretty(&self.accounts())?;

        writer.write_all(&bytes).await?;
        writer.flush().await?;
        Ok(())
    }
}
