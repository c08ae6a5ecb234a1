use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::domain::{CarEntry, EntryId, NewLocation, ParkingCode, ParkingLocation};
use super::error::{ParkingError, ParkingErrorKind};
use super::ledger::SortPolicy;
use super::report::{export_csv, ReportDirection};
use super::repository::{EntryRepository, LocationRepository};
use super::service::ParkingService;

/// Router builder exposing the parking REST surface.
pub fn parking_router<L, E>(service: Arc<ParkingService<L, E>>) -> Router
where
    L: LocationRepository + 'static,
    E: EntryRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/parkings",
            get(list_locations_handler::<L, E>).post(create_location_handler::<L, E>),
        )
        .route("/api/v1/parkings/:code", get(location_handler::<L, E>))
        .route(
            "/api/v1/car-entries",
            get(list_entries_handler::<L, E>).post(record_entry_handler::<L, E>),
        )
        .route("/api/v1/car-entries/:id", get(entry_handler::<L, E>))
        .route(
            "/api/v1/car-entries/:id/exit",
            put(record_exit_handler::<L, E>),
        )
        .route(
            "/api/v1/car-entries/:id/quote",
            get(quote_handler::<L, E>),
        )
        .route("/api/v1/reports", get(report_handler::<L, E>))
        .route("/api/v1/dashboard", get(dashboard_handler::<L, E>))
        .with_state(service)
}

pub fn status_for(kind: ParkingErrorKind) -> StatusCode {
    match kind {
        ParkingErrorKind::Validation | ParkingErrorKind::TemporalOrder => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ParkingErrorKind::NotFound => StatusCode::NOT_FOUND,
        ParkingErrorKind::Capacity | ParkingErrorKind::AlreadyClosed => StatusCode::CONFLICT,
        ParkingErrorKind::Repository => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn error_response(err: ParkingError) -> Response {
    let kind = err.kind();
    if kind == ParkingErrorKind::Repository {
        error!(error = %err, "parking repository failure");
    }

    let payload = json!({
        "error": err.to_string(),
        "kind": kind.label(),
    });
    (status_for(kind), axum::Json(payload)).into_response()
}

#[derive(Debug, Deserialize)]
pub struct EntryRequest {
    pub plate_number: String,
    pub parking_code: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct EntriesQuery {
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub sort: SortPolicy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(rename = "type", deserialize_with = "deserialize_direction")]
    pub direction: ReportDirection,
    #[serde(default)]
    pub format: ReportFormat,
}

/// Accepts the same spellings as `ReportDirection::from_str` (`entry`, `exits`, ...).
fn deserialize_direction<'de, D>(deserializer: D) -> Result<ReportDirection, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

pub(crate) async fn list_locations_handler<L, E>(
    State(service): State<Arc<ParkingService<L, E>>>,
) -> Response
where
    L: LocationRepository + 'static,
    E: EntryRepository + 'static,
{
    match service.locations() {
        Ok(locations) => {
            let views: Vec<_> = locations.iter().map(ParkingLocation::to_view).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn create_location_handler<L, E>(
    State(service): State<Arc<ParkingService<L, E>>>,
    axum::Json(request): axum::Json<NewLocation>,
) -> Response
where
    L: LocationRepository + 'static,
    E: EntryRepository + 'static,
{
    match service.create_location(request) {
        Ok(location) => (StatusCode::CREATED, axum::Json(location.to_view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn location_handler<L, E>(
    State(service): State<Arc<ParkingService<L, E>>>,
    Path(code): Path<String>,
) -> Response
where
    L: LocationRepository + 'static,
    E: EntryRepository + 'static,
{
    match service.location(&ParkingCode::new(&code)) {
        Ok(location) => (StatusCode::OK, axum::Json(location.to_view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn list_entries_handler<L, E>(
    State(service): State<Arc<ParkingService<L, E>>>,
    Query(query): Query<EntriesQuery>,
) -> Response
where
    L: LocationRepository + 'static,
    E: EntryRepository + 'static,
{
    match service.entries(query.active, query.sort) {
        Ok(entries) => {
            let views: Vec<_> = entries.iter().map(CarEntry::to_view).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn record_entry_handler<L, E>(
    State(service): State<Arc<ParkingService<L, E>>>,
    axum::Json(request): axum::Json<EntryRequest>,
) -> Response
where
    L: LocationRepository + 'static,
    E: EntryRepository + 'static,
{
    let code = ParkingCode::new(&request.parking_code);
    match service.record_entry(&request.plate_number, &code) {
        Ok(entry) => (StatusCode::CREATED, axum::Json(entry.to_view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn entry_handler<L, E>(
    State(service): State<Arc<ParkingService<L, E>>>,
    Path(id): Path<String>,
) -> Response
where
    L: LocationRepository + 'static,
    E: EntryRepository + 'static,
{
    match service.entry(&EntryId::from(id.as_str())) {
        Ok(entry) => (StatusCode::OK, axum::Json(entry.to_view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn record_exit_handler<L, E>(
    State(service): State<Arc<ParkingService<L, E>>>,
    Path(id): Path<String>,
) -> Response
where
    L: LocationRepository + 'static,
    E: EntryRepository + 'static,
{
    match service.record_exit(&EntryId::from(id.as_str())) {
        Ok(entry) => (StatusCode::OK, axum::Json(entry.to_view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn quote_handler<L, E>(
    State(service): State<Arc<ParkingService<L, E>>>,
    Path(id): Path<String>,
) -> Response
where
    L: LocationRepository + 'static,
    E: EntryRepository + 'static,
{
    match service.quote(&EntryId::from(id.as_str())) {
        Ok(quote) => (StatusCode::OK, axum::Json(quote)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn report_handler<L, E>(
    State(service): State<Arc<ParkingService<L, E>>>,
    Query(query): Query<ReportQuery>,
) -> Response
where
    L: LocationRepository + 'static,
    E: EntryRepository + 'static,
{
    match query.format {
        ReportFormat::Json => match service.report_view(query.start, query.end, query.direction) {
            Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
            Err(err) => error_response(err),
        },
        ReportFormat::Csv => {
            let entries = match service.report(query.start, query.end, query.direction) {
                Ok(entries) => entries,
                Err(err) => return error_response(err),
            };
            match export_csv(&entries) {
                Ok(body) => (
                    StatusCode::OK,
                    [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
                    body,
                )
                    .into_response(),
                Err(err) => {
                    error!(error = %err, "report export failed");
                    let payload = json!({ "error": err.to_string() });
                    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
                }
            }
        }
    }
}

pub(crate) async fn dashboard_handler<L, E>(
    State(service): State<Arc<ParkingService<L, E>>>,
) -> Response
where
    L: LocationRepository + 'static,
    E: EntryRepository + 'static,
{
    match service.dashboard() {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}
