use serde::Deserialize;
use std::io::Read;

use super::super::domain::NewLocation;

/// One data row plus its line number in the source file.
#[derive(Debug)]
pub(crate) struct LocationRecord {
    pub(crate) line: u64,
    pub(crate) request: NewLocation,
}

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<LocationRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut records = Vec::new();

    for result in csv_reader.records() {
        let record = result?;
        let line = record
            .position()
            .map(|position| position.line())
            .unwrap_or_default();
        let row: LocationRow = record.deserialize(Some(&headers))?;

        records.push(LocationRecord {
            line,
            request: NewLocation {
                code: row.code,
                name: row.name,
                total_spaces: row.total_spaces,
                address: row.address,
                fee_per_hour_minor: row.fee_per_hour,
            },
        });
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct LocationRow {
    code: String,
    name: String,
    total_spaces: i64,
    #[serde(alias = "location")]
    address: String,
    #[serde(alias = "fee_per_hour_minor")]
    fee_per_hour: i64,
}
