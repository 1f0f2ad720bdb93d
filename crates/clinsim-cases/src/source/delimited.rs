//! CSV reader backed by the `csv` crate.

use super::RawTable;

pub(super) fn read_csv(bytes: &[u8]) -> Result<RawTable, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|err| err.to_string())?
        .iter()
        .map(str::to_owned)
        .collect();

    let mut table = RawTable {
        headers,
        rows: Vec::new(),
    };
    for record in reader.records() {
        let record = record.map_err(|err| err.to_string())?;
        table.push_row(record.iter().map(str::to_owned).collect());
    }
    Ok(table)
}
