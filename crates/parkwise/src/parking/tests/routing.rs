use super::common::*;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::parking::clock::FixedClock;
use crate::parking::domain::ParkingCode;
use crate::parking::memory::InMemoryParkingStore;
use crate::parking::router::location_handler;
use crate::parking::ParkingService;

fn json_request(method: &str, uri: &str, payload: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request builds")
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

fn downtown_payload() -> Value {
    json!({
        "code": "PKG001",
        "name": "Downtown Parking",
        "total_spaces": 100,
        "address": "Kigali City Center",
        "fee_per_hour_minor": 500
    })
}

#[tokio::test]
async fn create_location_route_returns_created_view() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(json_request("POST", "/api/v1/parkings", downtown_payload()))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    assert_eq!(body["code"], "PKG001");
    assert_eq!(body["available_spaces"], 100);
    assert_eq!(body["availability_label"], "Good");
}

#[tokio::test]
async fn duplicate_codes_are_unprocessable() {
    let (service, _, _) = build_service();
    service.create_location(downtown()).expect("seeded");
    let router = router_with_service(service);

    let response = router
        .oneshot(json_request("POST", "/api/v1/parkings", downtown_payload()))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert_eq!(body["kind"], "validation");
}

#[tokio::test]
async fn non_positive_capacity_is_unprocessable() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);
    let mut payload = downtown_payload();
    payload["total_spaces"] = json!(0);

    let response = router
        .oneshot(json_request("POST", "/api/v1/parkings", payload))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn location_handler_returns_not_found_for_unknown_code() {
    let (service, _, _) = build_service();

    let response = location_handler::<InMemoryParkingStore, InMemoryParkingStore>(
        State(service),
        Path("PKG404".to_string()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json_body(response).await;
    assert_eq!(body["kind"], "not_found");
}

#[tokio::test]
async fn full_lot_entry_is_a_conflict() {
    let (service, _, _) = build_service();
    service
        .create_location(small_lot("TINY", 1))
        .expect("seeded");
    service
        .record_entry("RAA001A", &ParkingCode::new("TINY"))
        .expect("first car parks");
    let router = router_with_service(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/car-entries",
            json!({ "plate_number": "RAA002A", "parking_code": "TINY" }),
        ))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json_body(response).await;
    assert_eq!(body["kind"], "capacity");
}

#[tokio::test]
async fn exit_route_closes_the_session_and_repeats_conflict() {
    let (service, _, clock) = build_service();
    service.create_location(downtown()).expect("seeded");
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/car-entries",
            json!({ "plate_number": "RAB123A", "parking_code": "PKG001" }),
        ))
        .await
        .expect("route responds");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = read_json_body(response).await;
    let id = created["id"].as_str().expect("id is a string").to_string();
    assert_eq!(created["state_label"], "Active");

    clock.set(at(10, 30));
    let uri = format!("/api/v1/car-entries/{id}/exit");
    let response = router
        .clone()
        .oneshot(empty_request("PUT", &uri))
        .await
        .expect("route responds");
    assert_eq!(response.status(), StatusCode::OK);
    let closed = read_json_body(response).await;
    assert_eq!(closed["charged_amount"], 1500);
    assert_eq!(closed["duration"], "2h 30m");

    let response = router
        .oneshot(empty_request("PUT", &uri))
        .await
        .expect("route responds");
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn quote_route_prices_open_sessions() {
    let (service, _, clock) = build_service();
    service.create_location(downtown()).expect("seeded");
    let entry = service
        .record_entry("RAB123A", &ParkingCode::new("PKG001"))
        .expect("entry");
    clock.set(at(8, 10));
    let router = router_with_service(service);

    let response = router
        .oneshot(empty_request(
            "GET",
            &format!("/api/v1/car-entries/{}/quote", entry.id),
        ))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["amount"], 500);
    assert_eq!(body["billable_hours"], 1);
}

#[tokio::test]
async fn inverted_report_window_is_unprocessable() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(empty_request(
            "GET",
            "/api/v1/reports?start=2023-06-02T00:00:00Z&end=2023-06-01T00:00:00Z&type=exit",
        ))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn report_route_exports_csv() {
    let (service, _, clock) = build_service();
    service.create_location(downtown()).expect("seeded");
    let entry = service
        .record_entry("RAB123A", &ParkingCode::new("PKG001"))
        .expect("entry");
    clock.set(at(10, 30));
    service.record_exit(&entry.id).expect("exit");
    let router = router_with_service(service);

    let response = router
        .oneshot(empty_request(
            "GET",
            concat!(
                "/api/v1/reports?start=2023-06-01T00:00:00Z&end=2023-06-01T23:59:59Z",
                "&type=exit&format=csv"
            ),
        ))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    let body = read_text_body(response).await;
    let mut lines = body.lines();
    assert_eq!(
        lines.next(),
        Some("id,plate_number,parking_code,entry_time,exit_time,charged_amount")
    );
    assert_eq!(
        lines.next(),
        Some("1,RAB123A,PKG001,2023-06-01T08:00:00Z,2023-06-01T10:30:00Z,1500")
    );
    assert_eq!(lines.next(), None);
}

#[tokio::test]
async fn dashboard_reports_occupancy_and_active_sessions() {
    let (service, _, _) = build_service();
    service.create_location(downtown()).expect("seeded");
    service
        .record_entry("RAB123A", &ParkingCode::new("PKG001"))
        .expect("entry");
    let router = router_with_service(service);

    let response = router
        .oneshot(empty_request("GET", "/api/v1/dashboard"))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["occupancy"]["occupied_spaces"], 1);
    assert_eq!(body["active_sessions"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn repository_failures_map_to_internal_errors() {
    let service = Arc::new(ParkingService::new(
        Arc::new(UnavailableStore),
        Arc::new(InMemoryParkingStore::new()),
        Arc::new(FixedClock::new(at(8, 0))),
    ));
    let router = crate::parking::parking_router(service);

    let response = router
        .oneshot(empty_request("GET", "/api/v1/parkings"))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn report_type_accepts_plural_spellings() {
    let (service, _, clock) = build_service();
    service.create_location(downtown()).expect("seeded");
    let entry = service
        .record_entry("RAB123A", &ParkingCode::new("PKG001"))
        .expect("entry");
    clock.set(at(9, 0));
    service.record_exit(&entry.id).expect("exit");
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(empty_request(
            "GET",
            "/api/v1/reports?start=2023-06-01T00:00:00Z&end=2023-06-01T23:59:59Z&type=exits",
        ))
        .await
        .expect("route responds");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["direction"], "exit");
    assert_eq!(body["revenue"]["total_revenue"], 500);

    let response = router
        .oneshot(empty_request(
            "GET",
            "/api/v1/reports?start=2023-06-01T00:00:00Z&end=2023-06-01T23:59:59Z&type=both",
        ))
        .await
        .expect("route responds");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
