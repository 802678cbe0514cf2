pub mod concurrent;
pub mod error;
pub mod persistence;
pub mod seed;
pub mod traits;
pub mod transaction_log;

// Re-export commonly used types
pub use concurrent::ConcurrentAccountStore;
pub use error::StorageError;
pub use persistence::{JsonFilePersistence, MemoryOnly, PersistenceMode};
pub use seed::default_accounts;
pub use traits::{AccountEntry, AccountPersistence, AccountStore, TransactionLog};
pub use transaction_log::InMemoryTransactionLog;
