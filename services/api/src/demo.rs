use crate::infra::seed_demo_locations;
use chrono::{DateTime, Duration, Utc};
use clap::Args;
use parkwise::error::AppError;
use parkwise::parking::{
    export_csv, CarEntry, EntryId, EntryRepository, FixedClock, InMemoryParkingStore,
    LocationImporter, LocationRepository, ParkingCode, ParkingLocation, ParkingRegistry,
    ParkingService, ReportDirection, SortPolicy,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Start of the simulated day (RFC 3339 or YYYY-MM-DD). Defaults to today 07:00 UTC.
    #[arg(long, value_parser = crate::infra::parse_timestamp)]
    pub(crate) start: Option<DateTime<Utc>>,
    /// Print the exit report as CSV after the summary.
    #[arg(long)]
    pub(crate) csv: bool,
}

#[derive(Args, Debug)]
pub(crate) struct LocationImportArgs {
    /// CSV file with header code,name,total_spaces,address,fee_per_hour
    pub(crate) path: PathBuf,
    /// Seed the demo locations first so existing codes are reported as skipped
    #[arg(long)]
    pub(crate) seed: bool,
}

/// One step of the scripted day: minutes after the start, then what happens.
enum Step {
    Arrive { plate: &'static str, code: &'static str },
    Depart { plate: &'static str },
}

const SCRIPT: &[(i64, Step)] = &[
    (
        0,
        Step::Arrive {
            plate: "RAB123A",
            code: "PKG001",
        },
    ),
    (
        20,
        Step::Arrive {
            plate: "RAC456B",
            code: "PKG002",
        },
    ),
    (
        45,
        Step::Arrive {
            plate: "RAD789C",
            code: "PKG003",
        },
    ),
    (90, Step::Depart { plate: "RAC456B" }),
    (
        150,
        Step::Arrive {
            plate: "RAE012D",
            code: "PKG001",
        },
    ),
    (210, Step::Depart { plate: "RAB123A" }),
    (
        240,
        Step::Arrive {
            plate: "RAF345E",
            code: "PKG002",
        },
    ),
    (400, Step::Depart { plate: "RAD789C" }),
];

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let start = args.start.unwrap_or_else(default_start);

    let store = Arc::new(InMemoryParkingStore::new());
    let clock = Arc::new(FixedClock::new(start));
    let service = ParkingService::new(store.clone(), store, clock.clone());
    seed_demo_locations(service.registry())?;

    println!("Parking demo starting {}", start.to_rfc3339());
    let mut sessions: Vec<(&'static str, EntryId)> = Vec::new();

    for (offset, step) in SCRIPT {
        clock.set(start + Duration::minutes(*offset));
        match step {
            Step::Arrive { plate, code } => {
                match service.record_entry(plate, &ParkingCode::new(code)) {
                    Ok(entry) => {
                        println!(
                            "  {} {plate} entered {code} (entry {})",
                            stamp(&service),
                            entry.id
                        );
                        sessions.push((*plate, entry.id));
                    }
                    Err(err) => println!("  {} {plate} turned away: {err}", stamp(&service)),
                }
            }
            Step::Depart { plate } => {
                let Some((_, id)) = sessions.iter().find(|(candidate, _)| candidate == plate)
                else {
                    continue;
                };
                let entry = service.record_exit(id)?;
                println!(
                    "  {} {plate} left {} after {} and paid {}",
                    stamp(&service),
                    entry.parking_code,
                    entry
                        .duration()
                        .map(|duration| duration.to_string())
                        .unwrap_or_default(),
                    entry.charged_amount
                );
            }
        }
    }

    println!();
    render_locations(&service.locations()?);

    let active = service.entries(true, SortPolicy::NewestFirst)?;
    render_active(&service, &active)?;

    let end = service.now();
    let exits = service.report_view(start, end, ReportDirection::Exit)?;
    println!("\n{} between {} and {}", exits.direction_label, start, end);
    for entry in &exits.entries {
        println!(
            "  #{:<3} {:<8} {:<7} {:>6}",
            entry.id, entry.plate_number, entry.parking_code, entry.charged_amount
        );
    }
    if let Some(revenue) = exits.revenue {
        println!(
            "  {} transaction(s), total revenue {}",
            revenue.transactions, revenue.total_revenue
        );
    }

    if args.csv {
        let entries = service.report(start, end, ReportDirection::Exit)?;
        let csv = export_csv(&entries).map_err(|err| AppError::Io(err.into()))?;
        println!("\n{}", String::from_utf8_lossy(&csv));
    }

    Ok(())
}

pub(crate) fn run_location_import(args: LocationImportArgs) -> Result<(), AppError> {
    let registry = ParkingRegistry::new(Arc::new(InMemoryParkingStore::new()));
    if args.seed {
        seed_demo_locations(&registry)?;
    }

    let summary = LocationImporter::from_path(&args.path, &registry)?;

    println!("Location import from {}", args.path.display());
    println!("  Created: {}", summary.created.len());
    for location in &summary.created {
        println!("    {} {}", location.code, location.name);
    }
    if !summary.skipped.is_empty() {
        println!("  Skipped (already registered): {}", summary.skipped.len());
        for code in &summary.skipped {
            println!("    {code}");
        }
    }

    println!();
    render_locations(&registry.list_locations()?);
    Ok(())
}

fn default_start() -> DateTime<Utc> {
    let today = Utc::now().date_naive();
    today
        .and_hms_opt(7, 0, 0)
        .map(|naive| naive.and_utc())
        .unwrap_or_else(Utc::now)
}

fn stamp<L, E>(service: &ParkingService<L, E>) -> String
where
    L: LocationRepository + 'static,
    E: EntryRepository + 'static,
{
    service.now().format("%H:%M").to_string()
}

fn render_locations(locations: &[ParkingLocation]) {
    println!("Locations");
    for location in locations {
        let view = location.to_view();
        println!(
            "  {:<7} {:<22} {:>3}/{:<3} free  {:>4}/h  {}",
            view.code,
            view.name,
            view.available_spaces,
            view.total_spaces,
            view.fee_per_hour_minor,
            view.availability_label
        );
    }
}

fn render_active<L, E>(
    service: &ParkingService<L, E>,
    active: &[CarEntry],
) -> Result<(), AppError>
where
    L: LocationRepository + 'static,
    E: EntryRepository + 'static,
{
    if active.is_empty() {
        println!("\nActive sessions: none");
        return Ok(());
    }

    println!("\nActive sessions");
    for entry in active {
        let quote = service.quote(&entry.id)?;
        println!(
            "  #{:<3} {:<8} {:<7} {} so far, estimated fee {}",
            entry.id, entry.plate_number, entry.parking_code, quote.duration, quote.amount
        );
    }
    Ok(())
}
