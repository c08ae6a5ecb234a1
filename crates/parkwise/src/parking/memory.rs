use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::domain::{CarEntry, EntryId, NewCarEntry, ParkingCode, ParkingLocation};
use super::repository::{EntryRepository, LocationRepository, RepositoryError};

#[derive(Debug, Default)]
struct EntryTable {
    rows: Vec<CarEntry>,
    last_id: u64,
}

/// Process-local store backing both repositories. Entry ids are a per-store
/// sequence starting at `1`.
#[derive(Debug, Default)]
pub struct InMemoryParkingStore {
    locations: Mutex<BTreeMap<ParkingCode, ParkingLocation>>,
    entries: Mutex<EntryTable>,
}

impl InMemoryParkingStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn locations(
        &self,
    ) -> Result<MutexGuard<'_, BTreeMap<ParkingCode, ParkingLocation>>, RepositoryError> {
        self.locations
            .lock()
            .map_err(|_| RepositoryError::Unavailable("location table poisoned".to_string()))
    }

    fn entries(&self) -> Result<MutexGuard<'_, EntryTable>, RepositoryError> {
        self.entries
            .lock()
            .map_err(|_| RepositoryError::Unavailable("entry table poisoned".to_string()))
    }
}

impl LocationRepository for InMemoryParkingStore {
    fn insert_location(
        &self,
        location: ParkingLocation,
    ) -> Result<ParkingLocation, RepositoryError> {
        let mut guard = self.locations()?;
        if guard.contains_key(&location.code) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(location.code.clone(), location.clone());
        Ok(location)
    }

    fn update_location(&self, location: ParkingLocation) -> Result<(), RepositoryError> {
        let mut guard = self.locations()?;
        match guard.get_mut(&location.code) {
            Some(existing) => {
                *existing = location;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_location(
        &self,
        code: &ParkingCode,
    ) -> Result<Option<ParkingLocation>, RepositoryError> {
        Ok(self.locations()?.get(code).cloned())
    }

    fn list_locations(&self) -> Result<Vec<ParkingLocation>, RepositoryError> {
        Ok(self.locations()?.values().cloned().collect())
    }
}

impl EntryRepository for InMemoryParkingStore {
    fn insert_entry(&self, entry: NewCarEntry) -> Result<CarEntry, RepositoryError> {
        let mut table = self.entries()?;
        table.last_id += 1;
        let stored = CarEntry {
            id: EntryId(table.last_id.to_string()),
            plate_number: entry.plate_number,
            parking_code: entry.parking_code,
            entry_time: entry.entry_time,
            exit_time: None,
            charged_amount: 0,
        };
        table.rows.push(stored.clone());
        Ok(stored)
    }

    fn update_entry(&self, entry: CarEntry) -> Result<(), RepositoryError> {
        let mut table = self.entries()?;
        match table.rows.iter_mut().find(|row| row.id == entry.id) {
            Some(row) => {
                *row = entry;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_entry(&self, id: &EntryId) -> Result<Option<CarEntry>, RepositoryError> {
        Ok(self.entries()?.rows.iter().find(|row| &row.id == id).cloned())
    }

    fn list_entries(&self) -> Result<Vec<CarEntry>, RepositoryError> {
        Ok(self.entries()?.rows.clone())
    }
}
