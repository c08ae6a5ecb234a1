use std::sync::Arc;

use tracing::{debug, info, warn};

use super::domain::{NewLocation, ParkingCode, ParkingLocation};
use super::error::{ParkingError, ValidationError};
use super::locks::KeyedLocks;
use super::report::OccupancySummary;
use super::repository::{LocationRepository, RepositoryError};

/// Owns parking locations and is the only writer of their space counts.
pub struct ParkingRegistry<L> {
    repository: Arc<L>,
    locks: KeyedLocks<ParkingCode>,
}

impl<L> ParkingRegistry<L>
where
    L: LocationRepository,
{
    pub fn new(repository: Arc<L>) -> Self {
        Self {
            repository,
            locks: KeyedLocks::default(),
        }
    }

    /// Validate and persist a new location with every space available.
    pub fn create_location(&self, request: NewLocation) -> Result<ParkingLocation, ParkingError> {
        let location = validate_new_location(request)?;

        let _guard = self.locks.lock(&location.code);

        if self.repository.fetch_location(&location.code)?.is_some() {
            warn!(code = %location.code, "rejected duplicate parking code");
            return Err(ValidationError::DuplicateCode(location.code).into());
        }

        let stored = match self.repository.insert_location(location.clone()) {
            Ok(stored) => stored,
            Err(RepositoryError::Conflict) => {
                return Err(ValidationError::DuplicateCode(location.code).into())
            }
            Err(err) => return Err(err.into()),
        };

        info!(
            code = %stored.code,
            total_spaces = stored.total_spaces,
            fee_per_hour_minor = stored.fee_per_hour_minor,
            "parking location created"
        );
        Ok(stored)
    }

    pub fn find_by_code(
        &self,
        code: &ParkingCode,
    ) -> Result<Option<ParkingLocation>, ParkingError> {
        Ok(self.repository.fetch_location(code)?)
    }

    /// Like [`find_by_code`](Self::find_by_code) but unknown codes are an error.
    pub fn require(&self, code: &ParkingCode) -> Result<ParkingLocation, ParkingError> {
        self.find_by_code(code)?
            .ok_or_else(|| ParkingError::LocationNotFound(code.clone()))
    }

    pub fn list_locations(&self) -> Result<Vec<ParkingLocation>, ParkingError> {
        let mut locations = self.repository.list_locations()?;
        locations.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(locations)
    }

    /// Take one space at `code`. Fails without side effects when the lot is full.
    pub fn reserve_space(&self, code: &ParkingCode) -> Result<ParkingLocation, ParkingError> {
        let _guard = self.locks.lock(code);

        let mut location = self.require(code)?;
        if location.is_full() {
            warn!(code = %code, "no available spaces");
            return Err(ParkingError::Capacity { code: code.clone() });
        }

        location.available_spaces -= 1;
        self.repository.update_location(location.clone())?;
        debug!(code = %code, available = location.available_spaces, "space reserved");
        Ok(location)
    }

    /// Give one space back at `code`, never exceeding the lot's capacity.
    pub fn release_space(&self, code: &ParkingCode) -> Result<ParkingLocation, ParkingError> {
        let _guard = self.locks.lock(code);

        let mut location = self.require(code)?;
        if location.available_spaces >= location.total_spaces {
            warn!(code = %code, "release on a lot with no occupied spaces");
            location.available_spaces = location.total_spaces;
        } else {
            location.available_spaces += 1;
        }

        self.repository.update_location(location.clone())?;
        debug!(code = %code, available = location.available_spaces, "space released");
        Ok(location)
    }

    pub fn occupancy(&self) -> Result<OccupancySummary, ParkingError> {
        let locations = self.list_locations()?;
        Ok(OccupancySummary::from_locations(&locations))
    }
}

fn validate_new_location(request: NewLocation) -> Result<ParkingLocation, ValidationError> {
    let code = request.code.trim();
    if code.is_empty() {
        return Err(ValidationError::Required { field: "code" });
    }
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ValidationError::Required { field: "name" });
    }
    let address = request.address.trim();
    if address.is_empty() {
        return Err(ValidationError::Required { field: "address" });
    }

    if request.total_spaces <= 0 {
        return Err(ValidationError::NotPositive {
            field: "total_spaces",
            found: request.total_spaces,
        });
    }
    let total_spaces =
        u32::try_from(request.total_spaces).map_err(|_| ValidationError::TooLarge {
            field: "total_spaces",
            max: u64::from(u32::MAX),
        })?;

    if request.fee_per_hour_minor <= 0 {
        return Err(ValidationError::NotPositive {
            field: "fee_per_hour_minor",
            found: request.fee_per_hour_minor,
        });
    }

    Ok(ParkingLocation {
        code: ParkingCode::new(code),
        name: name.to_string(),
        address: address.to_string(),
        total_spaces,
        available_spaces: total_spaces,
        fee_per_hour_minor: request.fee_per_hour_minor as u64,
    })
}
