use std::io::Write;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use super::super::domain::CarEntry;

pub const REPORT_CSV_HEADER: &str =
    "id,plate_number,parking_code,entry_time,exit_time,charged_amount";

#[derive(Serialize)]
struct ReportRow<'a> {
    id: &'a str,
    plate_number: &'a str,
    parking_code: &'a str,
    entry_time: String,
    exit_time: Option<String>,
    charged_amount: u64,
}

fn timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Stream report rows as CSV. Open sessions leave `exit_time` empty.
fn write_csv<W: Write>(entries: &[CarEntry], writer: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    for entry in entries {
        writer.serialize(ReportRow {
            id: &entry.id.0,
            plate_number: &entry.plate_number,
            parking_code: entry.parking_code.as_str(),
            entry_time: timestamp(entry.entry_time),
            exit_time: entry.exit_time.map(timestamp),
            charged_amount: entry.charged_amount,
        })?;
    }

    if entries.is_empty() {
        writer.write_record(REPORT_CSV_HEADER.split(','))?;
    }

    writer.flush()?;
    Ok(())
}

pub fn export_csv(entries: &[CarEntry]) -> Result<Vec<u8>, csv::Error> {
    let mut buffer = Vec::new();
    write_csv(entries, &mut buffer)?;
    Ok(buffer)
}
