use serde::Serialize;

use super::super::domain::{AvailabilityLevel, CarEntry, ParkingCode, ParkingLocation};
use super::sum_charges;

/// Totals shown alongside an exit report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RevenueSummary {
    pub transactions: usize,
    pub total_revenue: u64,
}

impl RevenueSummary {
    pub fn from_entries(entries: &[CarEntry]) -> Self {
        Self {
            transactions: entries.len(),
            total_revenue: sum_charges(entries),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationOccupancy {
    pub code: ParkingCode,
    pub name: String,
    pub total_spaces: u32,
    pub available_spaces: u32,
    pub availability: AvailabilityLevel,
    pub availability_label: &'static str,
}

/// Fleet-wide space usage across every location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccupancySummary {
    pub location_count: usize,
    pub total_spaces: u64,
    pub available_spaces: u64,
    pub occupied_spaces: u64,
    pub occupancy_rate_pct: f64,
    pub locations: Vec<LocationOccupancy>,
}

impl OccupancySummary {
    pub fn from_locations(locations: &[ParkingLocation]) -> Self {
        let total_spaces: u64 = locations
            .iter()
            .map(|location| u64::from(location.total_spaces))
            .sum();
        let available_spaces: u64 = locations
            .iter()
            .map(|location| u64::from(location.available_spaces))
            .sum();
        let occupied_spaces = total_spaces.saturating_sub(available_spaces);

        let occupancy_rate_pct = if total_spaces > 0 {
            occupied_spaces as f64 / total_spaces as f64 * 100.0
        } else {
            0.0
        };

        let locations = locations
            .iter()
            .map(|location| {
                let availability = location.availability_level();
                LocationOccupancy {
                    code: location.code.clone(),
                    name: location.name.clone(),
                    total_spaces: location.total_spaces,
                    available_spaces: location.available_spaces,
                    availability,
                    availability_label: availability.label(),
                }
            })
            .collect::<Vec<_>>();

        Self {
            location_count: locations.len(),
            total_spaces,
            available_spaces,
            occupied_spaces,
            occupancy_rate_pct,
            locations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parking::domain::EntryId;

    fn location(code: &str, total: u32, available: u32) -> ParkingLocation {
        ParkingLocation {
            code: ParkingCode::new(code),
            name: format!("{code} lot"),
            address: "Kigali".to_string(),
            total_spaces: total,
            available_spaces: available,
            fee_per_hour_minor: 500,
        }
    }

    #[test]
    fn occupancy_rate_spans_all_locations() {
        let summary = OccupancySummary::from_locations(&[
            location("PKG001", 100, 65),
            location("PKG002", 200, 120),
            location("PKG003", 150, 30),
        ]);

        assert_eq!(summary.location_count, 3);
        assert_eq!(summary.total_spaces, 450);
        assert_eq!(summary.available_spaces, 215);
        assert_eq!(summary.occupied_spaces, 235);
        assert!((summary.occupancy_rate_pct - 52.222).abs() < 0.01);
        assert_eq!(summary.locations[2].availability, AvailabilityLevel::Low);
    }

    #[test]
    fn empty_fleet_reports_zero_occupancy() {
        let summary = OccupancySummary::from_locations(&[]);
        assert_eq!(summary.occupancy_rate_pct, 0.0);
        assert!(summary.locations.is_empty());
    }

    #[test]
    fn revenue_counts_every_transaction() {
        let closed = CarEntry {
            id: EntryId::from("1"),
            plate_number: "RAA123B".to_string(),
            parking_code: ParkingCode::new("PKG001"),
            entry_time: "2023-06-01T08:00:00Z".parse().expect("valid"),
            exit_time: Some("2023-06-01T10:30:00Z".parse().expect("valid")),
            charged_amount: 1500,
        };
        let mut second = closed.clone();
        second.id = EntryId::from("3");
        second.charged_amount = 2000;

        let summary = RevenueSummary::from_entries(&[closed, second]);
        assert_eq!(summary.transactions, 2);
        assert_eq!(summary.total_revenue, 3500);
    }
}
