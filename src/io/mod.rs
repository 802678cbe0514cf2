pub mod csv_writer;
pub mod error;
pub mod parse;

// Re-export commonly used types
pub use csv_writer::{export_file_name, write_transactions_csv};
pub use error::IoError;
pub use parse::RawTransactionRequest;
