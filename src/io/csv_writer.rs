use std::io::Write;

use chrono::NaiveDate;

use super::error::IoError;
use crate::domain::{AmountType, TransactionRecord, format_inr_plain};

const HEADER: [&str; 6] = [
    "Date",
    "Card Number",
    "Type",
    "Amount",
    "Status",
    "Transaction Hash",
];

/// Write transaction history as CSV, one row per record in the given order
pub fn write_transactions_csv<A, W>(
    records: &[TransactionRecord<A>],
    writer: W,
) -> Result<(), IoError>
where
    A: AmountType,
    W: Write,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(HEADER)?;

    for record in records {
        let date = record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string();
        let amount = format_inr_plain(record.amount);
        csv_writer.write_record([
            date.as_str(),
            record.card_number.as_str(),
            record.tx_type.as_str(),
            amount.as_str(),
            record.status.as_str(),
            record.tx_id.as_str(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Download name for an export produced on `day`
pub fn export_file_name(day: NaiveDate) -> String {
    format!("transactions_{}.csv", day.format("%Y-%m-%d"))
}
