use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::{AmountType, TransactionKind, TransactionRequest};
use crate::engine::{AtmProcessor, EngineError};
use crate::storage::{AccountPersistence, AccountStore, TransactionLog};

/// Server operations a session drives
#[async_trait]
pub trait AtmBackend<A: AmountType>: Send + Sync {
    async fn insert_card(&self, card_number: &str) -> Result<(), EngineError>;

    async fn verify_biometric(&self, card_number: &str, code: &str) -> Result<(), EngineError>;

    /// Holder name on success
    async fn verify_pin(&self, card_number: &str, pin: &str) -> Result<String, EngineError>;

    async fn balance(&self, card_number: &str) -> Result<A, EngineError>;

    /// Withdraw or deposit, returning the new balance
    async fn transact(
        &self,
        card_number: &str,
        kind: TransactionKind,
        amount: A,
    ) -> Result<A, EngineError>;

    async fn eject(&self, card_number: &str) -> Result<(), EngineError>;
}

#[async_trait]
impl<A, S, L, P> AtmBackend<A> for AtmProcessor<A, S, L, P>
where
    A: AmountType,
    S: AccountStore<A>,
    L: TransactionLog<A>,
    P: AccountPersistence<A>,
{
    async fn insert_card(&self, card_number: &str) -> Result<(), EngineError> {
        self.find_by_card(card_number)?;
        info!(card_number, "Card inserted");
        Ok(())
    }

    async fn verify_biometric(&self, card_number: &str, code: &str) -> Result<(), EngineError> {
        AtmProcessor::verify_biometric(self, card_number, code)
    }

    async fn verify_pin(&self, card_number: &str, pin: &str) -> Result<String, EngineError> {
        let account = AtmProcessor::verify_pin(self, card_number, pin)?;
        Ok(account.holder_name().to_string())
    }

    async fn balance(&self, card_number: &str) -> Result<A, EngineError> {
        let outcome = self
            .apply_transaction(TransactionRequest {
                card_number: card_number.to_string(),
                kind: TransactionKind::Balance,
                amount: None,
            })
            .await?;
        Ok(outcome.balance)
    }

    async fn transact(
        &self,
        card_number: &str,
        kind: TransactionKind,
        amount: A,
    ) -> Result<A, EngineError> {
        let outcome = self
            .apply_transaction(TransactionRequest {
                card_number: card_number.to_string(),
                kind,
                amount: Some(amount),
            })
            .await?;
        Ok(outcome.balance)
    }

    async fn eject(&self, card_number: &str) -> Result<(), EngineError> {
        info!(card_number, "Card ejected");
        Ok(())
    }
}

#[async_trait]
impl<A, B> AtmBackend<A> for Arc<B>
where
    A: AmountType,
    B: AtmBackend<A> + ?Sized,
{
    async fn insert_card(&self, card_number: &str) -> Result<(), EngineError> {
        (**self).insert_card(card_number).await
    }

    async fn verify_biometric(&self, card_number: &str, code: &str) -> Result<(), EngineError> {
        (**self).verify_biometric(card_number, code).await
    }

    async fn verify_pin(&self, card_number: &str, pin: &str) -> Result<String, EngineError> {
        (**self).verify_pin(card_number, pin).await
    }

    async fn balance(&self, card_number: &str) -> Result<A, EngineError> {
        (**self).balance(card_number).await
    }

    async fn transact(
        &self,
        card_number: &str,
        kind: TransactionKind,
        amount: A,
    ) -> Result<A, EngineError> {
        (**self).transact(card_number, kind, amount).await
    }

    async fn eject(&self, card_number: &str) -> Result<(), EngineError> {
        (**self).eject(card_number).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FixedPoint;
    use crate::session::SessionController;
    use crate::storage::{
        ConcurrentAccountStore, InMemoryTransactionLog, MemoryOnly, default_accounts,
    };

    const CARD: &str = "2222333344445555";

    fn shared() -> Arc<
        AtmProcessor<
            FixedPoint,
            ConcurrentAccountStore<FixedPoint>,
            InMemoryTransactionLog<FixedPoint>,
            MemoryOnly,
        >,
    > {
        Arc::new(AtmProcessor::new(
            ConcurrentAccountStore::from_accounts(default_accounts()),
            InMemoryTransactionLog::new(),
            MemoryOnly,
        ))
    }

    #[tokio::test]
    async fn processor_backend_reports_domain_failures() {
        let backend = shared();

        let holder = AtmBackend::verify_pin(&backend, CARD, "2345").await.unwrap();
        assert_eq!(holder, "Divya");

        let err = AtmBackend::verify_pin(&backend, CARD, "1111").await.unwrap_err();
        assert_eq!(err.to_string(), "Incorrect PIN code.");

        let err = AtmBackend::insert_card(&backend, "nope").await.unwrap_err();
        assert_eq!(err.to_string(), "No such account exists.");
    }

    #[tokio::test]
    async fn sessions_sharing_a_processor_see_each_others_settlements() {
        let backend = shared();
        let mut first = SessionController::new(Arc::clone(&backend));
        let mut second = SessionController::new(Arc::clone(&backend));

        for session in [&mut first, &mut second] {
            session.insert_card(CARD).await.unwrap();
            session.verify_biometric("987654321").await.unwrap();
            session.verify_pin("2345").await.unwrap();
        }

        first.select(TransactionKind::Withdraw).await.unwrap();
        first.confirm("1000").await.unwrap();

        second.select(TransactionKind::Balance).await.unwrap();
        assert_eq!(
            second.state().balance(),
            Some(FixedPoint::from_whole_units(5000))
        );
        assert_eq!(backend.log().len(), 1);
    }

    /// Full withdrawal session over any store, run on a spawned task
    async fn withdraw_on_spawned_session<S>(store: S) -> Option<FixedPoint>
    where
        S: AccountStore<FixedPoint> + 'static,
    {
        let backend = Arc::new(AtmProcessor::new(
            store,
            InMemoryTransactionLog::new(),
            MemoryOnly,
        ));

        tokio::spawn(async move {
            let mut session = SessionController::new(backend);
            session.insert_card(CARD).await.unwrap();
            session.verify_biometric("987654321").await.unwrap();
            session.verify_pin("2345").await.unwrap();
            session.select(TransactionKind::Withdraw).await.unwrap();
            session.confirm("1500").await.unwrap();
            session.state().balance()
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn session_runs_on_spawned_task_for_any_store() {
        let store = ConcurrentAccountStore::from_accounts(default_accounts());

        let balance = withdraw_on_spawned_session(store).await;

        assert_eq!(balance, Some(FixedPoint::from_whole_units(4500)));
    }
}
