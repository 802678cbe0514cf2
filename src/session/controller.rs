//! Drives a session against a backend, one user step at a time.

use std::fmt;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::backend::AtmBackend;
use super::error::SessionError;
use super::state::{SessionEvent, SessionState, transition};
use crate::domain::{AmountType, TransactionKind, format_inr};
use crate::engine::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

/// User-facing outcome of one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.level == NoticeLevel::Success
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    pub at: DateTime<Utc>,
    pub message: String,
}

impl fmt::Display for JournalEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.at.format("%H:%M:%S"), self.message)
    }
}

/// Session driver owning the current state and an activity journal
///
/// Local input errors (blank fields, non-positive amounts) and out-of-order
/// steps come back as `Err` without touching the backend. Backend rejections
/// are `Ok` notices at error level; during card, biometric and PIN steps they
/// also end the session.
pub struct SessionController<A: AmountType, B: AtmBackend<A>> {
    backend: B,
    state: SessionState<A>,
    journal: Vec<JournalEntry>,
}

impl<A: AmountType, B: AtmBackend<A>> SessionController<A, B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: SessionState::Idle,
            journal: Vec::new(),
        }
    }

    pub fn state(&self) -> &SessionState<A> {
        &self.state
    }

    pub fn journal(&self) -> &[JournalEntry] {
        &self.journal
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn insert_card(&mut self, input: &str) -> Result<Notice, SessionError> {
        let card_number = non_blank(input, "a card number")?;
        let accepted = SessionEvent::CardAccepted {
            card_number: card_number.clone(),
        };
        self.check(&accepted)?;

        self.journal.clear();
        self.note(format!("Inserting card: {card_number}"));

        match self.backend.insert_card(&card_number).await {
            Ok(()) => {
                self.apply(accepted)?;
                self.note("Card verified - Please enter biometric code");
                Ok(Notice::success("Card inserted successfully."))
            }
            Err(e) => {
                self.apply(SessionEvent::CardRejected)?;
                Ok(self.report("card verification", e))
            }
        }
    }

    pub async fn verify_biometric(&mut self, input: &str) -> Result<Notice, SessionError> {
        let code = non_blank(input, "biometric code")?;
        self.check(&SessionEvent::BiometricAccepted)?;
        let card_number = self.current_card();

        self.note("Verifying biometric data...");
        match self.backend.verify_biometric(&card_number, &code).await {
            Ok(()) => {
                self.apply(SessionEvent::BiometricAccepted)?;
                self.note("Biometric verified - Please enter PIN");
                Ok(Notice::success("Biometric verified."))
            }
            Err(e) => {
                self.apply(SessionEvent::BiometricRejected)?;
                Ok(self.report("biometric verification", e))
            }
        }
    }

    pub async fn verify_pin(&mut self, input: &str) -> Result<Notice, SessionError> {
        let pin = non_blank(input, "PIN")?;
        self.check(&SessionEvent::PinRejected)?;
        let card_number = self.current_card();

        self.note("Verifying PIN...");
        let verified = match self.backend.verify_pin(&card_number, &pin).await {
            Ok(holder_name) => self
                .backend
                .balance(&card_number)
                .await
                .map(|balance| (holder_name, balance)),
            Err(e) => Err(e),
        };

        match verified {
            Ok((holder_name, balance)) => {
                self.note(format!("Access granted - Welcome {holder_name}"));
                self.apply(SessionEvent::PinAccepted {
                    holder_name,
                    balance,
                })?;
                Ok(Notice::success("PIN verified."))
            }
            Err(e) => {
                self.apply(SessionEvent::PinRejected)?;
                Ok(self.report("PIN verification", e))
            }
        }
    }

    /// Withdraw and deposit wait for an amount; balance is answered at once
    pub async fn select(&mut self, kind: TransactionKind) -> Result<Notice, SessionError> {
        self.apply(SessionEvent::Select(kind))?;
        self.note(format!("Selected: {kind}"));

        if kind.moves_funds() {
            return Ok(Notice::info(format!("Enter amount to {kind}")));
        }

        let card_number = self.current_card();
        self.note("Fetching balance...");
        match self.backend.balance(&card_number).await {
            Ok(balance) => {
                self.apply(SessionEvent::BalanceRefreshed { balance })?;
                let shown = format_inr(balance);
                self.note(format!("Current balance: {shown}"));
                Ok(Notice::info(format!("Balance: {shown}")))
            }
            Err(e) => Ok(self.report("balance inquiry", e)),
        }
    }

    pub fn cancel_selection(&mut self) -> Result<(), SessionError> {
        self.apply(SessionEvent::CancelSelection)
    }

    /// Submit an amount for the selected withdraw or deposit
    pub async fn confirm(&mut self, input: &str) -> Result<Notice, SessionError> {
        self.check(&SessionEvent::TransactionFailed)?;
        let amount = parse_amount::<A>(input)?;
        let (card_number, kind) = match (self.state.card_number(), self.state.selection()) {
            (Some(card), Some(kind)) => (card.to_string(), kind),
            _ => {
                return Err(SessionError::OutOfOrder {
                    state: self.state.name(),
                    event: "confirm a transaction",
                });
            }
        };

        self.note(format!("Processing {kind}: {}", format_inr(amount)));
        match self.backend.transact(&card_number, kind, amount).await {
            Ok(new_balance) => {
                let balance = self
                    .backend
                    .balance(&card_number)
                    .await
                    .unwrap_or(new_balance);
                self.apply(SessionEvent::Settled { balance })?;
                self.note(format!("{kind} successful: {}", format_inr(amount)));

                let verb = match kind {
                    TransactionKind::Withdraw => "Withdrawn",
                    _ => "Deposited",
                };
                Ok(Notice::success(format!("{verb}: {}", format_inr(amount))))
            }
            Err(e) => {
                self.apply(SessionEvent::TransactionFailed)?;
                Ok(self.report("transaction", e))
            }
        }
    }

    /// End the session from any state
    pub async fn eject(&mut self) -> Notice {
        if let Some(card_number) = self.state.card_number().map(str::to_string) {
            self.note("Ejecting card...");
            if let Err(e) = self.backend.eject(&card_number).await {
                warn!(card_number = %card_number, error = %e, "Backend eject failed");
            }
        }

        self.state = SessionState::Idle;
        self.note("Card ejected - Session ended");
        Notice::info("Card ejected successfully.")
    }

    fn check(&self, event: &SessionEvent<A>) -> Result<(), SessionError> {
        transition(&self.state, event.clone()).map(|_| ())
    }

    fn apply(&mut self, event: SessionEvent<A>) -> Result<(), SessionError> {
        let next = transition(&self.state, event)?;
        debug!(from = self.state.name(), to = next.name(), "Session transition");
        self.state = next;
        Ok(())
    }

    fn current_card(&self) -> String {
        self.state.card_number().unwrap_or_default().to_string()
    }

    fn note(&mut self, message: impl Into<String>) {
        self.journal.push(JournalEntry {
            at: Utc::now(),
            message: message.into(),
        });
    }

    /// Journal a backend failure and turn it into an error notice
    fn report(&mut self, step: &str, error: EngineError) -> Notice {
        match error.domain() {
            Some(e) => {
                let message = e.to_string();
                self.note(format!("{step} failed: {message}"));
                Notice::error(message)
            }
            None => {
                warn!(step, error = %error, "Backend failure");
                let message = format!("System error during {step}");
                self.note(message.clone());
                Notice::error(message)
            }
        }
    }
}

fn non_blank(input: &str, what: &'static str) -> Result<String, SessionError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(SessionError::EmptyInput(what));
    }
    Ok(trimmed.to_string())
}

fn parse_amount<A: AmountType>(input: &str) -> Result<A, SessionError> {
    let trimmed = non_blank(input, "an amount")?;
    let amount = A::from_decimal_str(&trimmed).map_err(|_| SessionError::InvalidAmount)?;
    if amount <= A::zero() {
        return Err(SessionError::InvalidAmount);
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use std::io;

    use async_trait::async_trait;

    use super::*;
    use crate::domain::FixedPoint;
    use crate::engine::AtmProcessor;
    use crate::storage::{
        ConcurrentAccountStore, InMemoryTransactionLog, MemoryOnly, StorageError, TransactionLog,
        default_accounts,
    };

    type TestProcessor = AtmProcessor<
        FixedPoint,
        ConcurrentAccountStore<FixedPoint>,
        InMemoryTransactionLog<FixedPoint>,
        MemoryOnly,
    >;

    const CARD: &str = "1111222233334444";

    fn units(n: i64) -> FixedPoint {
        FixedPoint::from_whole_units(n)
    }

    fn controller() -> SessionController<FixedPoint, TestProcessor> {
        SessionController::new(AtmProcessor::new(
            ConcurrentAccountStore::from_accounts(default_accounts()),
            InMemoryTransactionLog::new(),
            MemoryOnly,
        ))
    }

    async fn signed_in() -> SessionController<FixedPoint, TestProcessor> {
        let mut session = controller();
        assert!(session.insert_card(CARD).await.unwrap().is_success());
        assert!(session.verify_biometric("123456789").await.unwrap().is_success());
        assert!(session.verify_pin("1234").await.unwrap().is_success());
        session
    }

    #[tokio::test]
    async fn full_flow_reaches_transaction_ready_with_balance() {
        let session = signed_in().await;

        match session.state() {
            SessionState::TransactionReady {
                holder_name,
                balance,
                selection,
                ..
            } => {
                assert_eq!(holder_name, "Sumitha");
                assert_eq!(*balance, units(5000));
                assert_eq!(*selection, None);
            }
            other => panic!("unexpected state {other:?}"),
        }
        assert!(
            session
                .journal()
                .iter()
                .any(|e| e.message == "Access granted - Welcome Sumitha")
        );
    }

    #[tokio::test]
    async fn unknown_card_stays_idle() {
        let mut session = controller();

        let notice = session.insert_card("9999999999999999").await.unwrap();

        assert_eq!(notice, Notice::error("No such account exists."));
        assert!(session.state().is_idle());
    }

    #[tokio::test]
    async fn blank_input_never_reaches_backend() {
        let mut session = controller();

        assert_eq!(
            session.insert_card("   ").await,
            Err(SessionError::EmptyInput("a card number"))
        );
        assert!(session.journal().is_empty());
    }

    #[tokio::test]
    async fn wrong_biometric_ejects() {
        let mut session = controller();
        session.insert_card(CARD).await.unwrap();

        let notice = session.verify_biometric("000000000").await.unwrap();

        assert_eq!(notice, Notice::error("Incorrect biometric code."));
        assert!(session.state().is_idle());
    }

    #[tokio::test]
    async fn wrong_pin_ejects() {
        let mut session = controller();
        session.insert_card(CARD).await.unwrap();
        session.verify_biometric("123456789").await.unwrap();

        let notice = session.verify_pin("9999").await.unwrap();

        assert_eq!(notice, Notice::error("Incorrect PIN code."));
        assert!(session.state().is_idle());
    }

    #[tokio::test]
    async fn pin_before_biometric_is_out_of_order() {
        let mut session = controller();
        session.insert_card(CARD).await.unwrap();

        let result = session.verify_pin("1234").await;

        assert!(matches!(result, Err(SessionError::OutOfOrder { .. })));
        assert!(matches!(session.state(), SessionState::CardInserted { .. }));
    }

    #[tokio::test]
    async fn withdrawal_refreshes_cached_balance() {
        let mut session = signed_in().await;

        session.select(TransactionKind::Withdraw).await.unwrap();
        let notice = session.confirm("2000").await.unwrap();

        assert_eq!(notice, Notice::success("Withdrawn: ₹ 2,000.00"));
        assert_eq!(session.state().balance(), Some(units(3000)));
        assert_eq!(session.state().selection(), None);
        assert_eq!(session.backend().log().len(), 1);
    }

    #[tokio::test]
    async fn deposit_settles() {
        let mut session = signed_in().await;

        session.select(TransactionKind::Deposit).await.unwrap();
        let notice = session.confirm("250.50").await.unwrap();

        assert_eq!(notice, Notice::success("Deposited: ₹ 250.50"));
        assert_eq!(
            session.state().balance(),
            Some(FixedPoint::from_decimal_str("5250.50").unwrap())
        );
    }

    #[tokio::test]
    async fn failed_withdrawal_reports_in_place() {
        let mut session = signed_in().await;

        session.select(TransactionKind::Withdraw).await.unwrap();
        let notice = session.confirm("20000").await.unwrap();

        assert_eq!(notice, Notice::error("Fraud Alert: Withdrawal exceeds limit!"));
        assert_eq!(session.state().selection(), Some(TransactionKind::Withdraw));
        assert_eq!(session.state().balance(), Some(units(5000)));

        let notice = session.confirm("6000").await.unwrap();
        assert_eq!(notice, Notice::error("Insufficient balance!"));
        assert!(session.backend().log().is_empty());
    }

    #[tokio::test]
    async fn non_positive_amounts_rejected_locally() {
        let mut session = signed_in().await;
        session.select(TransactionKind::Deposit).await.unwrap();

        assert_eq!(session.confirm("0").await, Err(SessionError::InvalidAmount));
        assert_eq!(session.confirm("-5").await, Err(SessionError::InvalidAmount));
        assert_eq!(session.confirm("abc").await, Err(SessionError::InvalidAmount));
        assert_eq!(session.confirm("--5").await, Err(SessionError::InvalidAmount));
        assert_eq!(session.confirm("-+5").await, Err(SessionError::InvalidAmount));
        assert_eq!(
            session.confirm("").await,
            Err(SessionError::EmptyInput("an amount"))
        );
    }

    #[tokio::test]
    async fn confirm_without_selection_is_out_of_order() {
        let mut session = signed_in().await;

        let result = session.confirm("100").await;

        assert!(matches!(result, Err(SessionError::OutOfOrder { .. })));
    }

    #[tokio::test]
    async fn balance_selection_answers_immediately() {
        let mut session = signed_in().await;

        let notice = session.select(TransactionKind::Balance).await.unwrap();

        assert_eq!(notice, Notice::info("Balance: ₹ 5,000.00"));
        assert_eq!(session.state().selection(), None);
        assert!(session.backend().log().is_empty());
    }

    #[tokio::test]
    async fn eject_resets_and_next_card_clears_journal() {
        let mut session = signed_in().await;

        let notice = session.eject().await;
        assert_eq!(notice.message, "Card ejected successfully.");
        assert!(session.state().is_idle());
        assert_eq!(
            session.journal().last().map(|e| e.message.as_str()),
            Some("Card ejected - Session ended")
        );

        session.insert_card(CARD).await.unwrap();
        assert_eq!(session.journal()[0].message, format!("Inserting card: {CARD}"));
    }

    struct Offline;

    fn offline() -> EngineError {
        EngineError::Storage(StorageError::IoError(io::Error::other("offline")))
    }

    #[async_trait]
    impl AtmBackend<FixedPoint> for Offline {
        async fn insert_card(&self, _: &str) -> Result<(), EngineError> {
            Err(offline())
        }

        async fn verify_biometric(&self, _: &str, _: &str) -> Result<(), EngineError> {
            Err(offline())
        }

        async fn verify_pin(&self, _: &str, _: &str) -> Result<String, EngineError> {
            Err(offline())
        }

        async fn balance(&self, _: &str) -> Result<FixedPoint, EngineError> {
            Err(offline())
        }

        async fn transact(
            &self,
            _: &str,
            _: TransactionKind,
            _: FixedPoint,
        ) -> Result<FixedPoint, EngineError> {
            Err(offline())
        }

        async fn eject(&self, _: &str) -> Result<(), EngineError> {
            Err(offline())
        }
    }

    #[tokio::test]
    async fn backend_failure_is_a_system_error() {
        let mut session = SessionController::<FixedPoint, _>::new(Offline);

        let notice = session.insert_card(CARD).await.unwrap();

        assert_eq!(notice, Notice::error("System error during card verification"));
        assert!(session.state().is_idle());
        assert_eq!(session.eject().await.level, NoticeLevel::Info);
    }
}
