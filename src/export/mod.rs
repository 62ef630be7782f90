//! Spreadsheet export
//!
//! Renders leaderboard rows as CSV with human-readable headers, ready to be
//! served as a download or written to disk.

use std::io::Write;

use csv::WriterBuilder;

use crate::engine::LeaderboardRow;

/// Column headers, in output order
pub const LEADERBOARD_HEADERS: [&str; 7] = [
    "Global Rank",
    "Name",
    "Phone",
    "Store Name",
    "Region",
    "Rank Title",
    "Sales Amount",
];

/// UTF-8 byte order mark so spreadsheet apps detect the encoding
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Cells starting with these characters are evaluated as formulas by
/// spreadsheet apps; prefix them so they stay text.
fn harden(cell: &str) -> String {
    match cell.chars().next() {
        Some('=' | '+' | '-' | '@') => format!("'{}", cell),
        _ => cell.to_string(),
    }
}

fn record(row: &LeaderboardRow) -> [String; 7] {
    [
        row.rank.to_string(),
        harden(&row.name),
        harden(row.phone.as_deref().unwrap_or_default()),
        harden(row.store_name.as_deref().unwrap_or_default()),
        harden(row.region.as_deref().unwrap_or_default()),
        harden(&row.rank_title),
        row.total_sales_amount.to_string(),
    ]
}

/// Write rows as CSV into any writer.
pub fn write_leaderboard_csv<W: Write>(
    mut out: W,
    rows: &[LeaderboardRow],
) -> Result<(), ExportError> {
    out.write_all(UTF8_BOM)?;

    let mut wtr = WriterBuilder::new().from_writer(out);
    wtr.write_record(LEADERBOARD_HEADERS)?;
    for row in rows {
        wtr.write_record(record(row))?;
    }
    wtr.flush()?;

    Ok(())
}

/// Render rows as CSV bytes.
pub fn leaderboard_csv(rows: &[LeaderboardRow]) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    write_leaderboard_csv(&mut buf, rows)?;
    Ok(buf)
}
