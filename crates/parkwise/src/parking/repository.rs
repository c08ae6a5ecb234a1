use super::domain::{CarEntry, EntryId, NewCarEntry, ParkingCode, ParkingLocation};

/// Storage collaborator for parking locations. Treated as authoritative; the
/// registry never caches beyond a single call.
pub trait LocationRepository: Send + Sync {
    fn insert_location(&self, location: ParkingLocation)
        -> Result<ParkingLocation, RepositoryError>;
    fn update_location(&self, location: ParkingLocation) -> Result<(), RepositoryError>;
    fn fetch_location(&self, code: &ParkingCode)
        -> Result<Option<ParkingLocation>, RepositoryError>;
    fn list_locations(&self) -> Result<Vec<ParkingLocation>, RepositoryError>;
}

/// Storage collaborator for car entries. `insert_entry` assigns the id.
pub trait EntryRepository: Send + Sync {
    fn insert_entry(&self, entry: NewCarEntry) -> Result<CarEntry, RepositoryError>;
    fn update_entry(&self, entry: CarEntry) -> Result<(), RepositoryError>;
    fn fetch_entry(&self, id: &EntryId) -> Result<Option<CarEntry>, RepositoryError>;
    fn list_entries(&self) -> Result<Vec<CarEntry>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
