//! Session state machine: one variant per screen and a pure transition function.

use super::error::SessionError;
use crate::domain::{AmountType, TransactionKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState<A: AmountType> {
    Idle,
    CardInserted {
        card_number: String,
    },
    BiometricVerified {
        card_number: String,
    },
    TransactionReady {
        card_number: String,
        holder_name: String,
        balance: A,
        /// Withdraw or deposit awaiting an amount
        selection: Option<TransactionKind>,
    },
}

impl<A: AmountType> Default for SessionState<A> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<A: AmountType> SessionState<A> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::CardInserted { .. } => "card inserted",
            Self::BiometricVerified { .. } => "biometric verified",
            Self::TransactionReady { .. } => "transaction ready",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Card of the current session, if one is inserted
    pub fn card_number(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::CardInserted { card_number }
            | Self::BiometricVerified { card_number }
            | Self::TransactionReady { card_number, .. } => Some(card_number),
        }
    }

    /// Cached balance once the PIN is verified
    pub fn balance(&self) -> Option<A> {
        match self {
            Self::TransactionReady { balance, .. } => Some(*balance),
            _ => None,
        }
    }

    pub fn selection(&self) -> Option<TransactionKind> {
        match self {
            Self::TransactionReady { selection, .. } => *selection,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent<A: AmountType> {
    CardAccepted { card_number: String },
    CardRejected,
    BiometricAccepted,
    BiometricRejected,
    PinAccepted { holder_name: String, balance: A },
    PinRejected,
    Select(TransactionKind),
    BalanceRefreshed { balance: A },
    Settled { balance: A },
    TransactionFailed,
    CancelSelection,
    Eject,
}

impl<A: AmountType> SessionEvent<A> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CardAccepted { .. } | Self::CardRejected => "insert a card",
            Self::BiometricAccepted | Self::BiometricRejected => "verify biometric",
            Self::PinAccepted { .. } | Self::PinRejected => "verify PIN",
            Self::Select(_) => "select a transaction",
            Self::BalanceRefreshed { .. } => "refresh the balance",
            Self::Settled { .. } | Self::TransactionFailed => "confirm a transaction",
            Self::CancelSelection => "cancel a selection",
            Self::Eject => "eject",
        }
    }
}

/// Next state for `event`, or `OutOfOrder` leaving `state` as it was
///
/// Rejected verifications return to `Idle` (automatic eject); `Eject` resets
/// from anywhere.
pub fn transition<A: AmountType>(
    state: &SessionState<A>,
    event: SessionEvent<A>,
) -> Result<SessionState<A>, SessionError> {
    use SessionEvent as E;
    use SessionState as S;

    let next = match (state, event) {
        (_, E::Eject) => S::Idle,

        (S::Idle, E::CardAccepted { card_number }) => S::CardInserted { card_number },
        (S::Idle, E::CardRejected) => S::Idle,

        (S::CardInserted { card_number }, E::BiometricAccepted) => S::BiometricVerified {
            card_number: card_number.clone(),
        },
        (S::CardInserted { .. }, E::BiometricRejected) => S::Idle,

        (
            S::BiometricVerified { card_number },
            E::PinAccepted {
                holder_name,
                balance,
            },
        ) => S::TransactionReady {
            card_number: card_number.clone(),
            holder_name,
            balance,
            selection: None,
        },
        (S::BiometricVerified { .. }, E::PinRejected) => S::Idle,

        (ready @ S::TransactionReady { .. }, event) => return ready_transition(ready, event),

        (state, event) => {
            return Err(SessionError::OutOfOrder {
                state: state.name(),
                event: event.name(),
            });
        }
    };

    Ok(next)
}

fn ready_transition<A: AmountType>(
    state: &SessionState<A>,
    event: SessionEvent<A>,
) -> Result<SessionState<A>, SessionError> {
    let (mut balance, mut selection) = (state.balance().unwrap_or_default(), state.selection());

    match event {
        SessionEvent::Select(kind) => selection = kind.moves_funds().then_some(kind),
        SessionEvent::BalanceRefreshed { balance: fresh } => balance = fresh,
        SessionEvent::Settled { balance: fresh } if selection.is_some() => {
            balance = fresh;
            selection = None;
        }
        // Failure is reported in place; the selection stays for another attempt
        SessionEvent::TransactionFailed if selection.is_some() => {}
        SessionEvent::CancelSelection => selection = None,
        event => {
            return Err(SessionError::OutOfOrder {
                state: state.name(),
                event: event.name(),
            });
        }
    }

    let mut next = state.clone();
    if let SessionState::TransactionReady {
        balance: b,
        selection: s,
        ..
    } = &mut next
    {
        *b = balance;
        *s = selection;
    }
    Ok(next)
}
