use chrono::{DateTime, Utc};

use super::domain::{EntryId, ParkingCode};
use super::repository::RepositoryError;

/// Failure raised by the registry, ledger, fee calculator or reporter.
#[derive(Debug, thiserror::Error)]
pub enum ParkingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("parking location {0} not found")]
    LocationNotFound(ParkingCode),
    #[error("car entry {0} not found")]
    EntryNotFound(EntryId),
    #[error("parking location {code} has no available spaces")]
    Capacity { code: ParkingCode },
    #[error("car entry {id} already exited at {exit_time}")]
    AlreadyClosed {
        id: EntryId,
        exit_time: DateTime<Utc>,
    },
    #[error("exit time {exit_time} precedes entry time {entry_time}")]
    TemporalOrder {
        entry_time: DateTime<Utc>,
        exit_time: DateTime<Utc>,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ParkingError {
    pub fn kind(&self) -> ParkingErrorKind {
        match self {
            ParkingError::Validation(_) => ParkingErrorKind::Validation,
            ParkingError::LocationNotFound(_) | ParkingError::EntryNotFound(_) => {
                ParkingErrorKind::NotFound
            }
            ParkingError::Capacity { .. } => ParkingErrorKind::Capacity,
            ParkingError::AlreadyClosed { .. } => ParkingErrorKind::AlreadyClosed,
            ParkingError::TemporalOrder { .. } => ParkingErrorKind::TemporalOrder,
            ParkingError::Repository(_) => ParkingErrorKind::Repository,
        }
    }
}

/// Coarse error taxonomy callers map onto user-facing messages or status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParkingErrorKind {
    Validation,
    NotFound,
    Capacity,
    AlreadyClosed,
    TemporalOrder,
    Repository,
}

impl ParkingErrorKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Capacity => "capacity",
            Self::AlreadyClosed => "already_closed",
            Self::TemporalOrder => "temporal_order",
            Self::Repository => "repository",
        }
    }
}

/// Rejected input shape or value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },
    #[error("{field} must be a positive number (found {found})")]
    NotPositive { field: &'static str, found: i64 },
    #[error("{field} exceeds the supported maximum of {max}")]
    TooLarge { field: &'static str, max: u64 },
    #[error("parking code {0} already exists")]
    DuplicateCode(ParkingCode),
    #[error("report start {start} is after report end {end}")]
    InvertedRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("charge overflows for {billable_hours} hour(s) at {fee_per_hour_minor} per hour")]
    ChargeOverflow {
        billable_hours: u64,
        fee_per_hour_minor: u64,
    },
}
