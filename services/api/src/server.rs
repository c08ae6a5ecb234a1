use crate::cli::ServeArgs;
use crate::infra::{provision_locations, AppState};
use crate::routes::with_parking_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use parkwise::config::AppConfig;
use parkwise::error::AppError;
use parkwise::parking::{InMemoryParkingStore, ParkingService, SystemClock};
use parkwise::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if args.no_seed {
        config.parking.seed_demo = false;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryParkingStore::new());
    let parking_service = Arc::new(ParkingService::new(
        store.clone(),
        store,
        Arc::new(SystemClock),
    ));
    provision_locations(
        parking_service.registry(),
        config.parking.seed_demo,
        args.locations.as_deref(),
    )?;

    let app = with_parking_routes(parking_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "parking service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
