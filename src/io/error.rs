use std::io;
use thiserror::Error;

/// IO-level errors for CSV export
#[derive(Error, Debug)]
pub enum IoError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formats_correctly() {
        let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed");
        assert_eq!(IoError::from(io_err).to_string(), "IO error: pipe closed");
    }

    #[test]
    fn csv_error_conversion() {
        let csv_err = csv::Error::from(io::Error::new(io::ErrorKind::Other, "boom"));

        match IoError::from(csv_err) {
            IoError::Csv(_) => {}
            _ => panic!("Expected Csv variant"),
        }
    }
}
