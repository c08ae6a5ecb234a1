use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use parkwise::error::AppError;
use parkwise::parking::{
    LocationImporter, LocationRepository, NewLocation, ParkingError, ParkingRegistry,
    ValidationError,
};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn demo_locations() -> Vec<NewLocation> {
    [
        ("PKG001", "Downtown Parking", 100, "Kigali City Center", 500),
        ("PKG002", "Airport Parking", 200, "Kigali International Airport", 800),
        ("PKG003", "Shopping Mall Parking", 150, "Kigali Heights", 600),
    ]
    .into_iter()
    .map(|(code, name, total_spaces, address, fee)| NewLocation {
        code: code.to_string(),
        name: name.to_string(),
        total_spaces,
        address: address.to_string(),
        fee_per_hour_minor: fee,
    })
    .collect()
}

/// Provision the demo locations, leaving any that already exist alone.
pub(crate) fn seed_demo_locations<L>(
    registry: &ParkingRegistry<L>,
) -> Result<usize, ParkingError>
where
    L: LocationRepository,
{
    let mut created = 0;
    for location in demo_locations() {
        match registry.create_location(location) {
            Ok(_) => created += 1,
            Err(ParkingError::Validation(ValidationError::DuplicateCode(_))) => {}
            Err(err) => return Err(err),
        }
    }

    info!(created, "demo parking locations seeded");
    Ok(created)
}

/// Startup provisioning: demo locations first (when enabled), then any CSV file.
/// Codes already registered by the seed are skipped by the importer.
pub(crate) fn provision_locations<L>(
    registry: &ParkingRegistry<L>,
    seed_demo: bool,
    locations_csv: Option<&Path>,
) -> Result<(), AppError>
where
    L: LocationRepository,
{
    if seed_demo {
        seed_demo_locations(registry)?;
    }

    if let Some(path) = locations_csv {
        let summary = LocationImporter::from_path(path, registry)?;
        info!(
            path = %path.display(),
            created = summary.created.len(),
            skipped = summary.skipped.len(),
            "parking locations provisioned from csv"
        );
    }

    Ok(())
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM[:SS]` (UTC) or a bare date (UTC midnight).
pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("failed to parse '{raw}' as an RFC 3339 timestamp or YYYY-MM-DD"))
}
