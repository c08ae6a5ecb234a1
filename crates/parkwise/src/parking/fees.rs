//! Hourly billing rules.
//!
//! Charges are whole billable hours times the location's hourly fee. Partial
//! hours round up and every session bills at least one hour, including a
//! zero-length one. An exit earlier than the entry is rejected outright.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use super::error::{ParkingError, ValidationError};

const MILLIS_PER_HOUR: i64 = 60 * 60 * 1000;
const MILLIS_PER_MINUTE: i64 = 60 * 1000;

/// Number of hours billed for a session.
pub fn billable_hours(
    entry_time: DateTime<Utc>,
    exit_time: DateTime<Utc>,
) -> Result<u64, ParkingError> {
    if exit_time < entry_time {
        return Err(ParkingError::TemporalOrder {
            entry_time,
            exit_time,
        });
    }

    let elapsed_ms = (exit_time - entry_time).num_milliseconds();

    let hours = (elapsed_ms + MILLIS_PER_HOUR - 1) / MILLIS_PER_HOUR;
    Ok(hours.max(1) as u64)
}

/// Charge in minor currency units for a session at the given hourly fee.
pub fn compute_charge(
    entry_time: DateTime<Utc>,
    exit_time: DateTime<Utc>,
    fee_per_hour_minor: u64,
) -> Result<u64, ParkingError> {
    let hours = billable_hours(entry_time, exit_time)?;
    hours.checked_mul(fee_per_hour_minor).ok_or_else(|| {
        ValidationError::ChargeOverflow {
            billable_hours: hours,
            fee_per_hour_minor,
        }
        .into()
    })
}

/// Whole hours and minutes spent in a session, truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionDuration {
    pub hours: i64,
    pub minutes: i64,
}

impl SessionDuration {
    pub fn between(entry_time: DateTime<Utc>, exit_time: DateTime<Utc>) -> Self {
        let elapsed_ms = (exit_time - entry_time).num_milliseconds().max(0);
        Self {
            hours: elapsed_ms / MILLIS_PER_HOUR,
            minutes: (elapsed_ms % MILLIS_PER_HOUR) / MILLIS_PER_MINUTE,
        }
    }
}

impl fmt::Display for SessionDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h {}m", self.hours, self.minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(raw: &str) -> DateTime<Utc> {
        raw.parse().expect("valid timestamp")
    }

    #[test]
    fn partial_hours_round_up() {
        let charge = compute_charge(at("2023-06-01T08:00:00Z"), at("2023-06-01T10:30:00Z"), 500)
            .expect("charge computes");
        assert_eq!(charge, 1500);
    }

    #[test]
    fn exact_hours_are_not_rounded() {
        let entry = at("2023-06-01T08:00:00Z");
        let hours = billable_hours(entry, entry + Duration::hours(2)).expect("ordered");
        assert_eq!(hours, 2);

        let hours = billable_hours(entry, entry + Duration::hours(2) + Duration::milliseconds(1))
            .expect("ordered");
        assert_eq!(hours, 3);
    }

    #[test]
    fn zero_length_session_bills_one_hour() {
        let entry = at("2023-06-01T08:00:00Z");
        assert_eq!(compute_charge(entry, entry, 800).expect("valid"), 800);
        assert_eq!(
            compute_charge(entry, entry + Duration::seconds(1), 800).expect("valid"),
            800
        );
    }

    #[test]
    fn exit_before_entry_is_rejected() {
        let entry = at("2023-06-01T08:00:00Z");
        let exit = entry - Duration::minutes(5);

        match compute_charge(entry, exit, 500) {
            Err(ParkingError::TemporalOrder {
                entry_time,
                exit_time,
            }) => {
                assert_eq!(entry_time, entry);
                assert_eq!(exit_time, exit);
            }
            other => panic!("expected temporal order error, got {other:?}"),
        }
    }

    #[test]
    fn sub_millisecond_backwards_exit_is_rejected() {
        let entry = at("2023-06-01T08:00:00.000900Z");
        let exit = at("2023-06-01T08:00:00.000400Z");

        assert!(matches!(
            compute_charge(entry, exit, 500),
            Err(ParkingError::TemporalOrder { .. })
        ));
        assert!(matches!(
            billable_hours(entry, entry - Duration::nanoseconds(1)),
            Err(ParkingError::TemporalOrder { .. })
        ));
    }

    #[test]
    fn overflowing_charge_is_a_validation_error() {
        let entry = at("2023-06-01T08:00:00Z");
        let result = compute_charge(entry, entry + Duration::hours(3), u64::MAX);
        assert!(matches!(
            result,
            Err(ParkingError::Validation(ValidationError::ChargeOverflow {
                billable_hours: 3,
                ..
            }))
        ));
    }

    #[test]
    fn duration_truncates_to_minutes() {
        let duration = SessionDuration::between(
            at("2023-06-01T11:00:00Z"),
            at("2023-06-01T14:45:59Z"),
        );
        assert_eq!(duration.to_string(), "3h 45m");
    }
}
