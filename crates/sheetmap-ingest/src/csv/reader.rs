//! CSV file reading with encoding and delimiter detection.

use std::borrow::Cow;
use std::path::Path;

use encoding_rs::{Encoding, WINDOWS_1252};
use sheetmap_model::RawTable;

use crate::error::{IngestError, Result};

use super::header::{dedupe_headers, sniff_delimiter};

/// Maximum file size accepted by [`read_csv_table`] (50 MB).
pub const MAX_CSV_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Check file size before loading.
pub fn check_file_size(path: &Path) -> Result<()> {
    check_file_size_with_limit(path, MAX_CSV_FILE_SIZE)
}

/// Check file size against a custom limit.
pub fn check_file_size_with_limit(path: &Path, max_size: u64) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|e| io_error(path, e))?;

    if metadata.len() > max_size {
        return Err(IngestError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size,
        });
    }

    Ok(())
}

fn io_error(path: &Path, e: std::io::Error) -> IngestError {
    if e.kind() == std::io::ErrorKind::NotFound {
        IngestError::FileNotFound {
            path: path.to_path_buf(),
        }
    } else {
        IngestError::FileRead {
            path: path.to_path_buf(),
            source: e,
        }
    }
}

/// Decodes file bytes to text.
///
/// A byte order mark selects UTF-8 or UTF-16 and is stripped. Without one,
/// valid UTF-8 is taken as is and anything else is read as Windows-1252,
/// the usual encoding of spreadsheet exports on Windows.
pub fn decode_bytes(bytes: &[u8]) -> (Cow<'_, str>, &'static Encoding) {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return (text, encoding);
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => (Cow::Borrowed(text), encoding_rs::UTF_8),
        Err(_) => {
            let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
            (text, WINDOWS_1252)
        }
    }
}

/// Parses decoded CSV text. The first record is the header row.
///
/// Rows may be ragged; short rows are padded and blank lines skipped.
pub fn parse_csv_text(text: &str, delimiter: u8) -> std::result::Result<RawTable, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let raw_headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let headers = dedupe_headers(&raw_headers);

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        records.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    Ok(RawTable::from_text_rows(&headers, &records))
}

/// Reads a CSV file into a raw table.
pub fn read_csv_table(path: &Path) -> Result<RawTable> {
    check_file_size(path)?;
    let bytes = std::fs::read(path).map_err(|e| io_error(path, e))?;
    if bytes.is_empty() {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }

    let (text, encoding) = decode_bytes(&bytes);
    let first_line = text.lines().next().unwrap_or_default();
    if first_line.trim().is_empty() {
        return Err(IngestError::NoHeaderDetected {
            path: path.to_path_buf(),
        });
    }
    let delimiter = sniff_delimiter(first_line);

    let table = parse_csv_text(&text, delimiter).map_err(|e| IngestError::CsvParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    tracing::debug!(
        path = %path.display(),
        encoding = encoding.name(),
        delimiter = %char::from(delimiter).escape_default(),
        columns = table.headers.len(),
        rows = table.len(),
        "Decoded CSV"
    );

    Ok(table)
}
