use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::domain::{CarEntry, EntryId, NewCarEntry, ParkingCode};
use super::error::{ParkingError, ValidationError};
use super::fees::{self, SessionDuration};
use super::locks::KeyedLocks;
use super::registry::ParkingRegistry;
use super::repository::{EntryRepository, LocationRepository};

/// Ordering applied when listing sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortPolicy {
    /// Open sessions first, then newest entry first within each group.
    #[default]
    ActiveFirst,
    NewestFirst,
    OldestFirst,
}

impl SortPolicy {
    pub fn compare(self, a: &CarEntry, b: &CarEntry) -> Ordering {
        match self {
            SortPolicy::ActiveFirst => b
                .is_open()
                .cmp(&a.is_open())
                .then_with(|| newest_first(a, b)),
            SortPolicy::NewestFirst => newest_first(a, b),
            SortPolicy::OldestFirst => a
                .entry_time
                .cmp(&b.entry_time)
                .then_with(|| a.id.cmp(&b.id)),
        }
    }
}

fn newest_first(a: &CarEntry, b: &CarEntry) -> Ordering {
    b.entry_time
        .cmp(&a.entry_time)
        .then_with(|| a.id.cmp(&b.id))
}

pub fn sort_entries(entries: &mut [CarEntry], policy: SortPolicy) {
    entries.sort_by(|a, b| policy.compare(a, b));
}

/// Estimated charge for a session that is still open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeeQuote {
    pub entry_id: EntryId,
    pub parking_code: ParkingCode,
    pub entry_time: DateTime<Utc>,
    pub quoted_at: DateTime<Utc>,
    pub billable_hours: u64,
    pub fee_per_hour_minor: u64,
    pub amount: u64,
    pub duration: SessionDuration,
}

/// Owns car-entry records and drives the open -> closed transition.
pub struct ParkingLedger<L, E> {
    registry: Arc<ParkingRegistry<L>>,
    entries: Arc<E>,
    locks: KeyedLocks<EntryId>,
}

impl<L, E> ParkingLedger<L, E>
where
    L: LocationRepository,
    E: EntryRepository,
{
    pub fn new(registry: Arc<ParkingRegistry<L>>, entries: Arc<E>) -> Self {
        Self {
            registry,
            entries,
            locks: KeyedLocks::default(),
        }
    }

    /// Open a session for `plate_number` at `parking_code`, taking one space.
    pub fn record_entry(
        &self,
        plate_number: &str,
        parking_code: &ParkingCode,
        now: DateTime<Utc>,
    ) -> Result<CarEntry, ParkingError> {
        let plate_number = plate_number.trim();
        if plate_number.is_empty() {
            return Err(ValidationError::Required {
                field: "plate_number",
            }
            .into());
        }

        self.registry.reserve_space(parking_code)?;

        let draft = NewCarEntry {
            plate_number: plate_number.to_string(),
            parking_code: parking_code.clone(),
            entry_time: now,
        };

        match self.entries.insert_entry(draft) {
            Ok(entry) => {
                info!(
                    entry_id = %entry.id,
                    plate = %entry.plate_number,
                    code = %entry.parking_code,
                    "car entry recorded"
                );
                Ok(entry)
            }
            Err(err) => {
                warn!(code = %parking_code, error = %err, "entry not stored, returning space");
                if let Err(release_err) = self.registry.release_space(parking_code) {
                    error!(
                        code = %parking_code,
                        error = %release_err,
                        "reserved space could not be returned"
                    );
                }
                Err(err.into())
            }
        }
    }

    /// Close an open session at `now`, fix its charge and free the space.
    pub fn record_exit(&self, id: &EntryId, now: DateTime<Utc>) -> Result<CarEntry, ParkingError> {
        let _guard = self.locks.lock(id);

        let open = self.get(id)?;
        if let Some(exit_time) = open.exit_time {
            warn!(entry_id = %id, "exit requested for a closed session");
            return Err(ParkingError::AlreadyClosed {
                id: id.clone(),
                exit_time,
            });
        }

        let location = self.registry.require(&open.parking_code)?;
        let charged_amount =
            fees::compute_charge(open.entry_time, now, location.fee_per_hour_minor)?;

        let entry = CarEntry {
            exit_time: Some(now),
            charged_amount,
            ..open.clone()
        };
        self.entries.update_entry(entry.clone())?;

        // The space and the session move together: if the space cannot be
        // returned, the session is reopened so the caller can retry.
        if let Err(err) = self.registry.release_space(&entry.parking_code) {
            warn!(entry_id = %id, error = %err, "space not released, reopening session");
            if let Err(restore_err) = self.entries.update_entry(open) {
                error!(entry_id = %id, error = %restore_err, "session could not be reopened");
            }
            return Err(err);
        }

        info!(
            entry_id = %entry.id,
            plate = %entry.plate_number,
            code = %entry.parking_code,
            charged_amount,
            "car exit recorded"
        );
        Ok(entry)
    }

    /// Price an open session as if it closed at `now`. Nothing is written.
    pub fn quote(&self, id: &EntryId, now: DateTime<Utc>) -> Result<FeeQuote, ParkingError> {
        let entry = self.get(id)?;
        if let Some(exit_time) = entry.exit_time {
            return Err(ParkingError::AlreadyClosed {
                id: id.clone(),
                exit_time,
            });
        }

        let location = self.registry.require(&entry.parking_code)?;
        let billable_hours = fees::billable_hours(entry.entry_time, now)?;
        let amount = fees::compute_charge(entry.entry_time, now, location.fee_per_hour_minor)?;

        Ok(FeeQuote {
            entry_id: entry.id,
            parking_code: entry.parking_code,
            entry_time: entry.entry_time,
            quoted_at: now,
            billable_hours,
            fee_per_hour_minor: location.fee_per_hour_minor,
            amount,
            duration: SessionDuration::between(entry.entry_time, now),
        })
    }

    pub fn get(&self, id: &EntryId) -> Result<CarEntry, ParkingError> {
        self.entries
            .fetch_entry(id)?
            .ok_or_else(|| ParkingError::EntryNotFound(id.clone()))
    }

    /// Open sessions, newest first.
    pub fn list_active(&self) -> Result<Vec<CarEntry>, ParkingError> {
        let mut active: Vec<CarEntry> = self
            .entries
            .list_entries()?
            .into_iter()
            .filter(CarEntry::is_open)
            .collect();
        sort_entries(&mut active, SortPolicy::NewestFirst);
        Ok(active)
    }

    pub fn list_all(&self, policy: SortPolicy) -> Result<Vec<CarEntry>, ParkingError> {
        let mut entries = self.entries.list_entries()?;
        sort_entries(&mut entries, policy);
        Ok(entries)
    }
}
