use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::response::Response;
use axum::Router;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::parking::clock::FixedClock;
use crate::parking::domain::{
    CarEntry, EntryId, NewCarEntry, NewLocation, ParkingCode, ParkingLocation,
};
use crate::parking::memory::InMemoryParkingStore;
use crate::parking::repository::{EntryRepository, LocationRepository, RepositoryError};
use crate::parking::{parking_router, ParkingService};

pub(super) type MemoryService = ParkingService<InMemoryParkingStore, InMemoryParkingStore>;

pub(super) fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 6, 1, hour, minute, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn downtown() -> NewLocation {
    NewLocation {
        code: "PKG001".to_string(),
        name: "Downtown Parking".to_string(),
        total_spaces: 100,
        address: "Kigali City Center".to_string(),
        fee_per_hour_minor: 500,
    }
}

pub(super) fn small_lot(code: &str, total_spaces: i64) -> NewLocation {
    NewLocation {
        code: code.to_string(),
        name: format!("Lot {code}"),
        total_spaces,
        address: "Nyarugenge".to_string(),
        fee_per_hour_minor: 300,
    }
}

pub(super) fn build_service() -> (Arc<MemoryService>, Arc<InMemoryParkingStore>, Arc<FixedClock>) {
    let store = Arc::new(InMemoryParkingStore::new());
    let clock = Arc::new(FixedClock::new(at(8, 0)));
    let service = Arc::new(ParkingService::new(
        store.clone(),
        store.clone(),
        clock.clone(),
    ));
    (service, store, clock)
}

pub(super) fn router_with_service(service: Arc<MemoryService>) -> Router {
    parking_router(service)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}

/// Store whose every call fails as if the backend were down.
pub(super) struct UnavailableStore;

impl LocationRepository for UnavailableStore {
    fn insert_location(
        &self,
        _location: ParkingLocation,
    ) -> Result<ParkingLocation, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".into()))
    }

    fn update_location(&self, _location: ParkingLocation) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("offline".into()))
    }

    fn fetch_location(
        &self,
        _code: &ParkingCode,
    ) -> Result<Option<ParkingLocation>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".into()))
    }

    fn list_locations(&self) -> Result<Vec<ParkingLocation>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".into()))
    }
}

/// Entry store that refuses new sessions but otherwise delegates to memory.
#[derive(Default)]
pub(super) struct RejectingEntries {
    pub(super) inner: InMemoryParkingStore,
}

impl EntryRepository for RejectingEntries {
    fn insert_entry(&self, _draft: NewCarEntry) -> Result<CarEntry, RepositoryError> {
        Err(RepositoryError::Unavailable("entries offline".into()))
    }

    fn update_entry(&self, entry: CarEntry) -> Result<(), RepositoryError> {
        self.inner.update_entry(entry)
    }

    fn fetch_entry(&self, id: &EntryId) -> Result<Option<CarEntry>, RepositoryError> {
        self.inner.fetch_entry(id)
    }

    fn list_entries(&self) -> Result<Vec<CarEntry>, RepositoryError> {
        self.inner.list_entries()
    }
}

/// Location store whose `update_location` fails on exactly one call.
pub(super) struct FlakyLocations {
    inner: InMemoryParkingStore,
    updates: AtomicUsize,
    fail_on: usize,
}

impl FlakyLocations {
    /// `fail_on` is 1-based: `2` fails the second update.
    pub(super) fn failing_update(fail_on: usize) -> Self {
        Self {
            inner: InMemoryParkingStore::new(),
            updates: AtomicUsize::new(0),
            fail_on,
        }
    }
}

impl LocationRepository for FlakyLocations {
    fn insert_location(
        &self,
        location: ParkingLocation,
    ) -> Result<ParkingLocation, RepositoryError> {
        self.inner.insert_location(location)
    }

    fn update_location(&self, location: ParkingLocation) -> Result<(), RepositoryError> {
        let call = self.updates.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_on {
            return Err(RepositoryError::Unavailable("flaky".into()));
        }
        self.inner.update_location(location)
    }

    fn fetch_location(
        &self,
        code: &ParkingCode,
    ) -> Result<Option<ParkingLocation>, RepositoryError> {
        self.inner.fetch_location(code)
    }

    fn list_locations(&self) -> Result<Vec<ParkingLocation>, RepositoryError> {
        self.inner.list_locations()
    }
}
