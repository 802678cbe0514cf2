use std::cmp::Reverse;
use std::marker::PhantomData;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use super::error::EngineError;
use crate::domain::{
    Account, AmountType, DomainError, NewAccount, TransactionKind, TransactionRecord,
    TransactionRequest, apply_deposit, apply_withdrawal, validate_new_account, verify_biometric,
    verify_pin,
};
use crate::storage::{
    AccountEntry, AccountPersistence, AccountStore, ConcurrentAccountStore, TransactionLog,
    default_accounts,
};

/// Ordering of a transaction history listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryOrder {
    /// Order in which records were appended
    #[default]
    Inserted,
    /// Timestamp descending
    NewestFirst,
}

/// Result of a settled transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOutcome<A: AmountType> {
    pub kind: TransactionKind,
    /// Balance after the transaction
    pub balance: A,
    /// Log record, absent for balance enquiries
    pub record: Option<TransactionRecord<A>>,
}

/// Transaction processor orchestrating domain rules, storage and persistence
pub struct AtmProcessor<A, S, L, P>
where
    A: AmountType,
    S: AccountStore<A>,
    L: TransactionLog<A>,
    P: AccountPersistence<A>,
{
    store: S,
    log: L,
    persistence: P,
    _phantom: PhantomData<A>,
}

impl<A, L, P> AtmProcessor<A, ConcurrentAccountStore<A>, L, P>
where
    A: AmountType,
    L: TransactionLog<A> + Default,
    P: AccountPersistence<A>,
{
    /// Load accounts from persistence, seeding (and saving) defaults on first start
    pub async fn bootstrap(persistence: P) -> Result<Self, EngineError> {
        let processor = match persistence.load().await? {
            Some(accounts) => Self::new(
                ConcurrentAccountStore::from_accounts(accounts),
                L::default(),
                persistence,
            ),
            None => {
                info!("No accounts file found, seeding default accounts");
                let processor = Self::new(
                    ConcurrentAccountStore::from_accounts(default_accounts()),
                    L::default(),
                    persistence,
                );
                processor.persist().await;
                processor
            }
        };

        info!(accounts = processor.store.len(), "Account store ready");
        Ok(processor)
    }
}

impl<A, S, L, P> AtmProcessor<A, S, L, P>
where
    A: AmountType,
    S: AccountStore<A>,
    L: TransactionLog<A>,
    P: AccountPersistence<A>,
{
    /// Create a new processor over already-populated storage
    pub fn new(store: S, log: L, persistence: P) -> Self {
        Self {
            store,
            log,
            persistence,
            _phantom: PhantomData,
        }
    }

    /// Get reference to the account store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get reference to the transaction log
    pub fn log(&self) -> &L {
        &self.log
    }

    pub fn find_by_card(&self, card_number: &str) -> Result<Account<A>, EngineError> {
        self.store
            .find(card_number)
            .ok_or(EngineError::Domain(DomainError::AccountNotFound))
    }

    pub fn verify_biometric(
        &self,
        card_number: &str,
        biometric_code: &str,
    ) -> Result<(), EngineError> {
        let account = self.find_by_card(card_number)?;
        verify_biometric(&account, biometric_code).inspect_err(|_| {
            warn!(card_number, "Biometric verification failed");
        })?;
        Ok(())
    }

    /// Check the PIN, returning the account on success
    pub fn verify_pin(&self, card_number: &str, pin: &str) -> Result<Account<A>, EngineError> {
        let account = self.find_by_card(card_number)?;
        verify_pin(&account, pin).inspect_err(|_| {
            warn!(card_number, "PIN verification failed");
        })?;
        Ok(account)
    }

    /// Run a withdraw, deposit or balance enquiry
    pub async fn apply_transaction(
        &self,
        request: TransactionRequest<A>,
    ) -> Result<TransactionOutcome<A>, EngineError> {
        let TransactionRequest {
            card_number,
            kind,
            amount,
        } = request;
        debug!(card_number = %card_number, %kind, "Processing transaction");

        let (balance, record) = {
            let mut entry = self.store.entry(&card_number)?;

            if !kind.moves_funds() {
                let account = entry.read()?;
                return Ok(TransactionOutcome {
                    kind,
                    balance: account.balance(),
                    record: None,
                });
            }

            let amount = amount.ok_or(DomainError::InvalidAmount)?;
            // The record is appended under the account lock, so a concurrent
            // delete either removes it or never saw the account
            entry
                .try_update(|account| {
                    let balance = match kind {
                        TransactionKind::Withdraw => apply_withdrawal(account, amount)?,
                        _ => apply_deposit(account, amount)?,
                    };
                    let record =
                        TransactionRecord::settled(&card_number, kind, amount, Utc::now());
                    self.log.append(record.clone());
                    Ok((balance, record))
                })
                .inspect_err(|e| {
                    warn!(
                        card_number = %card_number,
                        %kind,
                        amount = %amount.to_decimal_string(),
                        error = %e,
                        "Transaction rejected"
                    );
                })?
        };
        self.persist().await;

        info!(card_number = %card_number, %kind, tx_id = %record.tx_id, "Transaction settled");
        Ok(TransactionOutcome {
            kind,
            balance,
            record: Some(record),
        })
    }

    /// Admin: create an account after validation
    pub async fn add_account(&self, new_account: NewAccount<A>) -> Result<Account<A>, EngineError> {
        validate_new_account(&new_account)?;

        let account = new_account.into_account();
        self.store.insert(account.clone())?;
        self.persist().await;

        info!(card_number = account.card_number(), "Account added");
        Ok(account)
    }

    /// Admin: delete an account and every transaction recorded against it
    ///
    /// Returns the removed account and the number of removed transactions.
    pub async fn delete_account(
        &self,
        card_number: &str,
    ) -> Result<(Account<A>, usize), EngineError> {
        let (account, removed) = self
            .store
            .remove_with(card_number, |_| self.log.remove_card(card_number))
            .ok_or(DomainError::AccountNotFound)?;
        self.persist().await;

        info!(card_number, removed_transactions = removed, "Account deleted");
        Ok((account, removed))
    }

    /// Admin listing, secrets included
    pub fn list_accounts(&self) -> Vec<Account<A>> {
        self.store.accounts()
    }

    pub fn list_transactions(
        &self,
        card_number: Option<&str>,
        order: HistoryOrder,
    ) -> Vec<TransactionRecord<A>> {
        let mut records = self.log.list(card_number);
        if order == HistoryOrder::NewestFirst {
            // Stable sort keeps append order among equal timestamps
            records.sort_by_key(|r| Reverse(r.timestamp));
        }
        records
    }

    /// Flush the full account list; failures are logged and swallowed
    async fn persist(&self) {
        if let Err(e) = self.persistence.persist(&self.store).await {
            error!(error = %e, "Failed to persist accounts");
        }
    }
}
