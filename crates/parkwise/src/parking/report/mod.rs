mod export;
mod summary;

pub use export::{export_csv, REPORT_CSV_HEADER};
pub use summary::{LocationOccupancy, OccupancySummary, RevenueSummary};

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::CarEntry;
use super::error::{ParkingError, ValidationError};
use super::repository::EntryRepository;

/// Which timestamp a report filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportDirection {
    Entry,
    Exit,
}

impl ReportDirection {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Entry => "Car Entries",
            Self::Exit => "Car Exits",
        }
    }

    /// The timestamp this direction keys on, if the entry has one.
    fn timestamp(self, entry: &CarEntry) -> Option<DateTime<Utc>> {
        match self {
            Self::Entry => Some(entry.entry_time),
            Self::Exit => entry.exit_time,
        }
    }
}

impl FromStr for ReportDirection {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "entry" | "entries" => Ok(Self::Entry),
            "exit" | "exits" => Ok(Self::Exit),
            other => Err(format!("unknown report type '{other}' (expected entry or exit)")),
        }
    }
}

impl fmt::Display for ReportDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entry => f.write_str("entry"),
            Self::Exit => f.write_str("exit"),
        }
    }
}

/// Read-only view over the ledger's entries.
pub struct ParkingReporter<E> {
    entries: Arc<E>,
}

impl<E> ParkingReporter<E>
where
    E: EntryRepository,
{
    pub fn new(entries: Arc<E>) -> Self {
        Self { entries }
    }

    /// Entries whose entry (or exit) time lies in `[start, end]`, oldest first.
    pub fn generate_report(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        direction: ReportDirection,
    ) -> Result<Vec<CarEntry>, ParkingError> {
        if start > end {
            return Err(ValidationError::InvertedRange { start, end }.into());
        }

        let mut matched: Vec<(DateTime<Utc>, CarEntry)> = self
            .entries
            .list_entries()?
            .into_iter()
            .filter_map(|entry| {
                direction
                    .timestamp(&entry)
                    .filter(|at| *at >= start && *at <= end)
                    .map(|at| (at, entry))
            })
            .collect();
        matched.sort_by(|(a_at, a), (b_at, b)| a_at.cmp(b_at).then_with(|| a.id.cmp(&b.id)));

        debug!(%direction, %start, %end, matched = matched.len(), "report generated");
        Ok(matched.into_iter().map(|(_, entry)| entry).collect())
    }
}

/// Total charged across `entries`. Open sessions contribute zero.
pub fn sum_charges(entries: &[CarEntry]) -> u64 {
    entries
        .iter()
        .fold(0u64, |total, entry| total.saturating_add(entry.charged_amount))
}
