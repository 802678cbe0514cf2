//! Prelude module for convenient imports
//!
//! Import everything you need with: `use atm::prelude::*;`

// Domain types
pub use crate::domain::{
    Account, AmountType, DomainError, FixedPoint, NewAccount, TransactionKind, TransactionRecord,
    TransactionRequest, TransactionStatus, format_inr,
};

// Storage types
pub use crate::storage::{
    AccountPersistence, AccountStore, ConcurrentAccountStore, InMemoryTransactionLog,
    JsonFilePersistence, MemoryOnly, PersistenceMode, StorageError, TransactionLog,
};

// Engine types
pub use crate::engine::{AtmProcessor, EngineError, HistoryOrder, TransactionOutcome};

// Session types
pub use crate::session::{AtmBackend, Notice, SessionController, SessionError, SessionState};

// HTTP types
pub use crate::api::{ApiResponse, AppState, AtmService, build_router};

// App types
pub use crate::app::{AppError, CliApp, init_tracing, run_server, shutdown_signal};
pub use crate::config::AtmConfig;
