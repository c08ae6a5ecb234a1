//! Parking occupancy and fee engine.
//!
//! The registry owns location space counts, the ledger owns car-entry sessions
//! and drives their single open -> closed transition, fees are a pure function
//! of the two timestamps and the hourly rate, and reporting only ever reads.

pub mod clock;
pub mod domain;
pub mod error;
pub mod fees;
pub mod import;
pub mod ledger;
mod locks;
pub mod memory;
pub mod registry;
pub mod report;
pub mod repository;
pub mod router;
pub mod service;
pub mod views;

#[cfg(test)]
mod tests;

pub use clock::{Clock, FixedClock, SystemClock};
pub use domain::{
    AvailabilityLevel, CarEntry, EntryId, NewCarEntry, NewLocation, ParkingCode, ParkingLocation,
    SessionState,
};
pub use error::{ParkingError, ParkingErrorKind, ValidationError};
pub use fees::{billable_hours, compute_charge, SessionDuration};
pub use import::{ImportSummary, LocationImportError, LocationImporter};
pub use ledger::{FeeQuote, ParkingLedger, SortPolicy};
pub use memory::InMemoryParkingStore;
pub use registry::ParkingRegistry;
pub use report::{
    export_csv, sum_charges, OccupancySummary, ParkingReporter, ReportDirection, RevenueSummary,
};
pub use repository::{EntryRepository, LocationRepository, RepositoryError};
pub use router::parking_router;
pub use service::ParkingService;
pub use views::{CarEntryView, DashboardView, LocationView, ReportView};
