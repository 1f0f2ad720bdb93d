//! Workbook reader backed by `calamine`.

use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};

use super::RawTable;

/// Reads the first worksheet; its first row is the header.
pub(super) fn read_first_sheet(bytes: Vec<u8>) -> Result<RawTable, String> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|err| err.to_string())?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| "workbook contains no worksheets".to_owned())?
        .map_err(|err| err.to_string())?;

    let mut rows = range.rows();
    let headers = rows
        .next()
        .ok_or_else(|| "worksheet is empty".to_owned())?
        .iter()
        .map(coerce_cell)
        .collect();

    let mut table = RawTable {
        headers,
        rows: Vec::new(),
    };
    for row in rows {
        table.push_row(row.iter().map(coerce_cell).collect());
    }
    Ok(table)
}

/// String form of a cell regardless of how the workbook typed it.
pub(super) fn coerce_cell(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.clone(),
        Data::Int(value) => value.to_string(),
        Data::Float(value) => format_number(*value),
        Data::Bool(true) => "TRUE".to_owned(),
        Data::Bool(false) => "FALSE".to_owned(),
        other => other.to_string(),
    }
}

/// Integral floats drop their fraction so a numeric step ID `2.0` matches `"2"`.
#[allow(clippy::float_cmp)]
fn format_number(value: f64) -> String {
    if value.is_finite() && value == value.trunc() && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integral_float_loses_fraction() {
        assert_eq!(coerce_cell(&Data::Float(2.0)), "2");
        assert_eq!(coerce_cell(&Data::Float(-5.0)), "-5");
    }

    #[test]
    fn test_fractional_float_keeps_fraction() {
        assert_eq!(coerce_cell(&Data::Float(2.5)), "2.5");
    }

    #[test]
    fn test_bool_and_empty_cells() {
        assert_eq!(coerce_cell(&Data::Bool(true)), "TRUE");
        assert_eq!(coerce_cell(&Data::Bool(false)), "FALSE");
        assert_eq!(coerce_cell(&Data::Empty), "");
    }

    #[test]
    fn test_text_and_int_cells() {
        assert_eq!(coerce_cell(&Data::String("END".to_owned())), "END");
        assert_eq!(coerce_cell(&Data::Int(7)), "7");
    }

    #[test]
    fn test_first_sheet_is_read_with_header_row() {
        // Arrange
        let bytes = include_bytes!("../../tests/fixtures/clinical_cases.xlsx").to_vec();

        // Act
        let table = read_first_sheet(bytes).unwrap();

        // Assert
        assert_eq!(table.headers.len(), 11);
        assert_eq!(table.headers[0], "Case ID");
        assert_eq!(table.headers[10], "Author Notes");
        // The blank third row is dropped.
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0][1], "1");
        assert_eq!(table.rows[1][1], "2");
        assert_eq!(table.rows[1][5], "TRUE");
        assert_eq!(table.rows[1][8], "5");
        assert_eq!(table.rows[1][10], "");
        assert_eq!(table.rows[2][0], "Sepsis");
    }

    #[test]
    fn test_garbage_bytes_are_rejected() {
        assert!(read_first_sheet(b"not a workbook".to_vec()).is_err());
    }
}
