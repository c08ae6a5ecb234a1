use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{
    AvailabilityLevel, CarEntry, EntryId, ParkingCode, ParkingLocation, SessionState,
};
use super::report::{OccupancySummary, ReportDirection, RevenueSummary};

#[derive(Debug, Clone, Serialize)]
pub struct LocationView {
    pub code: ParkingCode,
    pub name: String,
    pub address: String,
    pub total_spaces: u32,
    pub available_spaces: u32,
    pub occupied_spaces: u32,
    pub fee_per_hour_minor: u64,
    pub availability: AvailabilityLevel,
    pub availability_label: &'static str,
}

impl ParkingLocation {
    pub fn to_view(&self) -> LocationView {
        let availability = self.availability_level();
        LocationView {
            code: self.code.clone(),
            name: self.name.clone(),
            address: self.address.clone(),
            total_spaces: self.total_spaces,
            available_spaces: self.available_spaces,
            occupied_spaces: self.occupied_spaces(),
            fee_per_hour_minor: self.fee_per_hour_minor,
            availability,
            availability_label: availability.label(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CarEntryView {
    pub id: EntryId,
    pub plate_number: String,
    pub parking_code: ParkingCode,
    pub entry_time: DateTime<Utc>,
    pub exit_time: Option<DateTime<Utc>>,
    pub charged_amount: u64,
    pub state: SessionState,
    pub state_label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl CarEntry {
    pub fn to_view(&self) -> CarEntryView {
        let state = self.state();
        CarEntryView {
            id: self.id.clone(),
            plate_number: self.plate_number.clone(),
            parking_code: self.parking_code.clone(),
            entry_time: self.entry_time,
            exit_time: self.exit_time,
            charged_amount: self.charged_amount,
            state,
            state_label: state.label(),
            duration: self.duration().map(|duration| duration.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportView {
    pub direction: ReportDirection,
    pub direction_label: &'static str,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub entries: Vec<CarEntryView>,
    /// Only meaningful for exit reports; entry reports include open sessions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue: Option<RevenueSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub occupancy: OccupancySummary,
    pub active_sessions: Vec<CarEntryView>,
}
