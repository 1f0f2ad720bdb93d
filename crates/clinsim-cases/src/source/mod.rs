//! Readers that turn a case source file into a grid of text cells.
//!
//! Every cell is coerced to its string form here, so the rest of the crate
//! never sees mixed cell types.

mod delimited;
mod spreadsheet;

use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::LoadError;

/// Header row plus data rows, all cells already coerced to text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    /// Column names exactly as read (not yet trimmed).
    pub headers: Vec<String>,
    /// Data rows; each row is padded or truncated to the header width.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub(crate) fn push_row(&mut self, mut cells: Vec<String>) {
        if cells.iter().all(|cell| cell.trim().is_empty()) {
            return;
        }
        cells.resize(self.headers.len(), String::new());
        self.rows.push(cells);
    }
}

/// Supported source file kinds, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Excel or OpenDocument workbook; the first worksheet is read.
    Spreadsheet,
    /// Comma-separated values with a header row.
    Delimited,
}

impl SourceFormat {
    /// Picks the reader for `path`.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(Self::Spreadsheet),
            "csv" => Some(Self::Delimited),
            _ => None,
        }
    }
}

/// Parses CSV text held in memory.
///
/// # Errors
///
/// Returns a description of the problem if the bytes are not valid CSV.
pub fn parse_csv(bytes: &[u8]) -> Result<RawTable, String> {
    delimited::read_csv(bytes)
}

/// A source read from disk together with the digest of its bytes.
#[derive(Debug, Clone)]
pub struct SourceData {
    /// The coerced cell grid.
    pub table: RawTable,
    /// Lowercase hex SHA-256 of the raw file contents.
    pub version_hash: String,
}

/// Reads and coerces the file at `path`.
///
/// # Errors
///
/// Returns `LoadError::NotFound` if the file does not exist and
/// `LoadError::ParseFailure` if it cannot be read, has an unsupported
/// extension, or is not a valid workbook / CSV file.
pub fn read_source(path: &Path) -> Result<SourceData, LoadError> {
    let format = SourceFormat::from_path(path).ok_or_else(|| {
        LoadError::parse(path, "unsupported file type (expected .xlsx, .xls, .ods or .csv)")
    })?;

    let bytes = std::fs::read(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::parse(path, err.to_string()),
    })?;

    let version_hash = format!("{:x}", Sha256::digest(&bytes));
    debug!(path = %path.display(), bytes = bytes.len(), %version_hash, "read case source");

    let table = match format {
        SourceFormat::Spreadsheet => spreadsheet::read_first_sheet(bytes),
        SourceFormat::Delimited => delimited::read_csv(&bytes),
    }
    .map_err(|reason| LoadError::parse(path, reason))?;

    Ok(SourceData {
        table,
        version_hash,
    })
}
