//! LAN identifier extraction from uploaded CSV/TXT files.
//!
//! The first record is a header only when one of its cells is exactly `LAN`
//! or `LanID`; the `LAN` column wins when both exist. Without such a header
//! every record is data and the first column is read, so a plain
//! one-identifier-per-line text file works unchanged.

use thiserror::Error;

/// Header names that select the identifier column, in order of preference
const HEADER_NAMES: [&str; 2] = ["LAN", "LanID"];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed tabular data: {0}")]
    Malformed(#[from] csv::Error),
}

/// Ordered, trimmed, non-empty identifiers. Duplicates are kept; bounding
/// and de-duplication belong to the bulk request service.
pub fn parse_lan_ids(content: &[u8]) -> Result<Vec<String>, ParseError> {
    let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content);

    let mut records = reader.records();
    let Some(first) = records.next().transpose()? else {
        return Ok(vec![]);
    };

    let (column, mut lan_ids) = match header_column(&first) {
        Some(index) => (index, Vec::new()),
        None => (0, cell(&first, 0).into_iter().collect()),
    };

    for record in records {
        let record = record?;
        if let Some(lan) = cell(&record, column) {
            lan_ids.push(lan);
        }
    }

    Ok(lan_ids)
}

fn header_column(record: &csv::StringRecord) -> Option<usize> {
    HEADER_NAMES
        .iter()
        .find_map(|name| record.iter().position(|field| field == *name))
}

fn cell(record: &csv::StringRecord, column: usize) -> Option<String> {
    record
        .get(column)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
