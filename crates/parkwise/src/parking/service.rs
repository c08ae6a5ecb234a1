use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::clock::Clock;
use super::domain::{CarEntry, EntryId, NewLocation, ParkingCode, ParkingLocation};
use super::error::ParkingError;
use super::ledger::{FeeQuote, ParkingLedger, SortPolicy};
use super::registry::ParkingRegistry;
use super::report::{ParkingReporter, ReportDirection, RevenueSummary};
use super::repository::{EntryRepository, LocationRepository};
use super::views::{DashboardView, ReportView};

/// Facade composing the registry, ledger and reporter behind an injected clock.
pub struct ParkingService<L, E> {
    registry: Arc<ParkingRegistry<L>>,
    ledger: ParkingLedger<L, E>,
    reporter: ParkingReporter<E>,
    clock: Arc<dyn Clock>,
}

impl<L, E> ParkingService<L, E>
where
    L: LocationRepository + 'static,
    E: EntryRepository + 'static,
{
    pub fn new(locations: Arc<L>, entries: Arc<E>, clock: Arc<dyn Clock>) -> Self {
        let registry = Arc::new(ParkingRegistry::new(locations));
        let ledger = ParkingLedger::new(registry.clone(), entries.clone());
        let reporter = ParkingReporter::new(entries);

        Self {
            registry,
            ledger,
            reporter,
            clock,
        }
    }

    pub fn registry(&self) -> &ParkingRegistry<L> {
        &self.registry
    }

    pub fn ledger(&self) -> &ParkingLedger<L, E> {
        &self.ledger
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn create_location(&self, request: NewLocation) -> Result<ParkingLocation, ParkingError> {
        self.registry.create_location(request)
    }

    pub fn locations(&self) -> Result<Vec<ParkingLocation>, ParkingError> {
        self.registry.list_locations()
    }

    pub fn location(&self, code: &ParkingCode) -> Result<ParkingLocation, ParkingError> {
        self.registry.require(code)
    }

    pub fn record_entry(
        &self,
        plate_number: &str,
        parking_code: &ParkingCode,
    ) -> Result<CarEntry, ParkingError> {
        self.ledger.record_entry(plate_number, parking_code, self.clock.now())
    }

    pub fn record_exit(&self, id: &EntryId) -> Result<CarEntry, ParkingError> {
        self.ledger.record_exit(id, self.clock.now())
    }

    pub fn quote(&self, id: &EntryId) -> Result<FeeQuote, ParkingError> {
        self.ledger.quote(id, self.clock.now())
    }

    pub fn entry(&self, id: &EntryId) -> Result<CarEntry, ParkingError> {
        self.ledger.get(id)
    }

    pub fn entries(
        &self,
        active_only: bool,
        policy: SortPolicy,
    ) -> Result<Vec<CarEntry>, ParkingError> {
        if active_only {
            self.ledger.list_active()
        } else {
            self.ledger.list_all(policy)
        }
    }

    pub fn report(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        direction: ReportDirection,
    ) -> Result<Vec<CarEntry>, ParkingError> {
        self.reporter.generate_report(start, end, direction)
    }

    pub fn report_view(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        direction: ReportDirection,
    ) -> Result<ReportView, ParkingError> {
        let entries = self.report(start, end, direction)?;
        let revenue = match direction {
            ReportDirection::Exit => Some(RevenueSummary::from_entries(&entries)),
            ReportDirection::Entry => None,
        };

        Ok(ReportView {
            direction,
            direction_label: direction.label(),
            start,
            end,
            entries: entries.iter().map(CarEntry::to_view).collect(),
            revenue,
        })
    }

    pub fn dashboard(&self) -> Result<DashboardView, ParkingError> {
        let occupancy = self.registry.occupancy()?;
        let active_sessions = self
            .ledger
            .list_active()?
            .iter()
            .map(CarEntry::to_view)
            .collect();

        Ok(DashboardView {
            occupancy,
            active_sessions,
        })
    }
}
