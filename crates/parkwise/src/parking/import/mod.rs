//! Bulk provisioning of parking locations from CSV.
//!
//! Expected header: `code,name,total_spaces,address,fee_per_hour`. Every row goes
//! through [`ParkingRegistry::create_location`], so the usual validation applies.
//! Codes that already exist are skipped, which makes re-running an import
//! harmless; any other rejected row stops the import at that line.

mod parser;

use std::io::Read;
use std::path::Path;

use tracing::{info, warn};

use super::domain::{ParkingCode, ParkingLocation};
use super::error::{ParkingError, ValidationError};
use super::registry::ParkingRegistry;
use super::repository::LocationRepository;

#[derive(Debug)]
pub enum LocationImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Row { line: u64, source: ParkingError },
}

impl std::fmt::Display for LocationImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationImportError::Io(err) => write!(f, "failed to read location file: {}", err),
            LocationImportError::Csv(err) => write!(f, "invalid location CSV data: {}", err),
            LocationImportError::Row { line, source } => {
                write!(f, "location on line {} rejected: {}", line, source)
            }
        }
    }
}

impl std::error::Error for LocationImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LocationImportError::Io(err) => Some(err),
            LocationImportError::Csv(err) => Some(err),
            LocationImportError::Row { source, .. } => Some(source),
        }
    }
}

impl From<std::io::Error> for LocationImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for LocationImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Outcome of an import run.
#[derive(Debug, Default)]
pub struct ImportSummary {
    pub created: Vec<ParkingLocation>,
    pub skipped: Vec<ParkingCode>,
}

pub struct LocationImporter;

impl LocationImporter {
    pub fn from_path<P, L>(
        path: P,
        registry: &ParkingRegistry<L>,
    ) -> Result<ImportSummary, LocationImportError>
    where
        P: AsRef<Path>,
        L: LocationRepository,
    {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, registry)
    }

    pub fn from_reader<R, L>(
        reader: R,
        registry: &ParkingRegistry<L>,
    ) -> Result<ImportSummary, LocationImportError>
    where
        R: Read,
        L: LocationRepository,
    {
        let mut summary = ImportSummary::default();

        for record in parser::parse_records(reader)? {
            match registry.create_location(record.request) {
                Ok(location) => summary.created.push(location),
                Err(ParkingError::Validation(ValidationError::DuplicateCode(code))) => {
                    warn!(code = %code, line = record.line, "location already exists, skipping");
                    summary.skipped.push(code);
                }
                Err(source) => {
                    return Err(LocationImportError::Row {
                        line: record.line,
                        source,
                    })
                }
            }
        }

        info!(
            created = summary.created.len(),
            skipped = summary.skipped.len(),
            "location import finished"
        );
        Ok(summary)
    }
}
