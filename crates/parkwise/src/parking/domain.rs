use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::fees::SessionDuration;

/// Human-readable identifier of a parking location, e.g. `PKG001`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParkingCode(pub String);

impl ParkingCode {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ParkingCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for ParkingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Identifier wrapper for car entries. Assigned by the entry repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub String);

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self(value.trim().to_string())
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// A parking facility and its live space inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkingLocation {
    pub code: ParkingCode,
    pub name: String,
    pub address: String,
    pub total_spaces: u32,
    pub available_spaces: u32,
    pub fee_per_hour_minor: u64,
}

impl ParkingLocation {
    pub fn occupied_spaces(&self) -> u32 {
        self.total_spaces.saturating_sub(self.available_spaces)
    }

    /// Share of spaces still free, in percent.
    pub fn availability_pct(&self) -> f32 {
        if self.total_spaces == 0 {
            return 0.0;
        }
        self.available_spaces as f32 / self.total_spaces as f32 * 100.0
    }

    pub fn availability_level(&self) -> AvailabilityLevel {
        AvailabilityLevel::from_pct(self.availability_pct())
    }

    pub fn is_full(&self) -> bool {
        self.available_spaces == 0
    }
}

/// Inbound request for a new parking location. Numeric fields are signed so
/// that non-positive values can be rejected with a validation error instead of
/// failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLocation {
    pub code: String,
    pub name: String,
    pub total_spaces: i64,
    pub address: String,
    pub fee_per_hour_minor: i64,
}

/// Coarse availability banding used by location cards and dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityLevel {
    AlmostFull,
    Low,
    Limited,
    Good,
}

impl AvailabilityLevel {
    pub fn from_pct(pct: f32) -> Self {
        if pct < 10.0 {
            Self::AlmostFull
        } else if pct < 20.0 {
            Self::Low
        } else if pct < 50.0 {
            Self::Limited
        } else {
            Self::Good
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::AlmostFull => "Almost Full",
            Self::Low => "Low",
            Self::Limited => "Limited",
            Self::Good => "Good",
        }
    }
}

/// One vehicle occupancy session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarEntry {
    pub id: EntryId,
    pub plate_number: String,
    pub parking_code: ParkingCode,
    pub entry_time: DateTime<Utc>,
    pub exit_time: Option<DateTime<Utc>>,
    pub charged_amount: u64,
}

impl CarEntry {
    pub fn is_open(&self) -> bool {
        self.exit_time.is_none()
    }

    pub fn state(&self) -> SessionState {
        if self.is_open() {
            SessionState::Open
        } else {
            SessionState::Closed
        }
    }

    /// Elapsed time of a closed session; `None` while the car is still parked.
    pub fn duration(&self) -> Option<SessionDuration> {
        self.exit_time
            .map(|exit_time| SessionDuration::between(self.entry_time, exit_time))
    }
}

/// Draft handed to the entry repository, which assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCarEntry {
    pub plate_number: String,
    pub parking_code: ParkingCode,
    pub entry_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Open,
    Closed,
}

impl SessionState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "Active",
            Self::Closed => "Completed",
        }
    }
}
