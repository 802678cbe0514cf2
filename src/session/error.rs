use thiserror::Error;

/// Errors raised by the client-side session flow
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Cannot {event} while {state}")]
    OutOfOrder {
        state: &'static str,
        event: &'static str,
    },

    #[error("Please enter {0}")]
    EmptyInput(&'static str),

    #[error("Invalid amount")]
    InvalidAmount,
}
