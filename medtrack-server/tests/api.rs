//! Router tests: the full `/api` surface against the in-memory store

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Days, NaiveDate, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use medtrack_server::http::{build_router, AppState, ServerConfig, StatisticsSettings};
use medtrack_server::MemoryStore;

fn app() -> Router {
    let state = AppState::new(Arc::new(MemoryStore::new()), StatisticsSettings::default());
    build_router(state, &ServerConfig::default())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn days_from_today(days: u64) -> String {
    today().checked_add_days(Days::new(days)).unwrap().to_string()
}

fn device_body(serial: &str) -> Value {
    json!({
        "name": "Evita V500",
        "device_type": "VENTILATOR",
        "manufacturer": "Draeger",
        "model_number": "V500",
        "serial_number": serial,
        "location": "ICU Bed 4",
        "acquisition_date": "2021-03-15",
        "purchase_price": "45000.00"
    })
}

async fn create_device(app: &Router, body: Value) -> Value {
    let (status, device) = send(app, "POST", "/api/devices/", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", device);
    device
}

#[tokio::test]
async fn create_then_retrieve_round_trips() {
    let app = app();
    let created = create_device(&app, device_body("SN-1")).await;

    assert_eq!(created["status"], "AVAILABLE");
    assert_eq!(created["description"], "");
    assert_eq!(created["purchase_price"], "45000.00");
    assert_eq!(created["maintenance_records"], json!([]));
    assert_eq!(created["documents"], json!([]));

    let id = created["id"].as_i64().unwrap();
    let (status, fetched) = send(&app, "GET", &format!("/api/devices/{}/", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn missing_required_fields_are_all_reported() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/devices/",
        Some(json!({"name": "Evita V500", "device_type": "TOASTER"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    let fields = &body["fields"];
    assert_eq!(fields["device_type"][0], "\"TOASTER\" is not a valid choice");
    for field in [
        "manufacturer",
        "model_number",
        "serial_number",
        "location",
        "acquisition_date",
    ] {
        assert_eq!(fields[field][0], "this field is required", "{}", field);
    }
    assert!(fields.get("name").is_none());
}

#[tokio::test]
async fn duplicate_serial_number_is_rejected() {
    let app = app();
    create_device(&app, device_body("SN-1")).await;

    let (status, body) = send(&app, "POST", "/api/devices/", Some(device_body("SN-1"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["fields"]["serial_number"][0],
        "device with this serial number already exists"
    );

    // nothing was written
    let (_, list) = send(&app, "GET", "/api/devices/", None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn server_assigned_fields_are_read_only() {
    let app = app();
    let mut body = device_body("SN-1");
    body["created_at"] = json!("2020-01-01T00:00:00Z");

    let (status, response) = send(&app, "POST", "/api/devices/", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["fields"]["created_at"][0], "this field is read-only");
}

#[tokio::test]
async fn put_requires_every_field_and_patch_does_not() {
    let app = app();
    let created = create_device(&app, device_body("SN-1")).await;
    let uri = format!("/api/devices/{}/", created["id"]);

    let (status, body) = send(&app, "PUT", &uri, Some(json!({"location": "OR 2"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"]["name"][0], "this field is required");

    let (status, patched) = send(&app, "PATCH", &uri, Some(json!({"location": "OR 2"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["location"], "OR 2");
    assert_eq!(patched["name"], created["name"]);
    assert_eq!(patched["serial_number"], created["serial_number"]);
    assert_eq!(patched["created_at"], created["created_at"]);
    assert_ne!(patched["updated_at"], created["updated_at"]);

    let mut full = device_body("SN-1");
    full["status"] = json!("IN_USE");
    let (status, replaced) = send(&app, "PUT", &uri, Some(full)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replaced["status"], "IN_USE");
    assert_eq!(replaced["location"], "ICU Bed 4");
}

#[tokio::test]
async fn update_to_a_taken_serial_is_rejected() {
    let app = app();
    create_device(&app, device_body("SN-1")).await;
    let second = create_device(&app, device_body("SN-2")).await;

    let uri = format!("/api/devices/{}/", second["id"]);
    let (status, _) = send(&app, "PATCH", &uri, Some(json!({"serial_number": "SN-1"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // keeping its own serial is fine
    let (status, _) = send(&app, "PATCH", &uri, Some(json!({"serial_number": "SN-2"}))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unknown_and_malformed_ids_are_404() {
    let app = app();
    for uri in ["/api/devices/99/", "/api/devices/abc/", "/api/maintenance/7", "/api/documents/7/"] {
        let (status, body) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(body["error"], "not_found");
    }

    let (status, _) = send(&app, "DELETE", "/api/devices/99/", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "GET", "/api/nothing-here/", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn malformed_bodies_are_400() {
    let app = app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/devices/")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "POST", "/api/devices/", Some(json!([1, 2]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn trailing_slash_is_optional() {
    let app = app();
    let created = create_device(&app, device_body("SN-1")).await;

    for uri in [
        "/api/devices".to_string(),
        "/api/devices/".to_string(),
        format!("/api/devices/{}", created["id"]),
        "/api/devices/statistics".to_string(),
        "/api/choices".to_string(),
        "/api/health".to_string(),
    ] {
        let (status, _) = send(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::OK, "{}", uri);
    }
}

#[tokio::test]
async fn list_uses_the_reduced_representation() {
    let app = app();
    create_device(&app, device_body("SN-1")).await;

    let (_, list) = send(&app, "GET", "/api/devices/", None).await;
    let item = list[0].as_object().unwrap();
    assert_eq!(item.len(), 9);
    assert!(item.get("description").is_none());
    assert!(item.get("maintenance_records").is_none());
    assert_eq!(item["serial_number"], "SN-1");
}

#[tokio::test]
async fn filters_combine_with_and() {
    let app = app();
    let mut a = device_body("SN-A");
    a["status"] = json!("ACTIVE");
    create_device(&app, a).await;

    let mut b = device_body("SN-B");
    b["status"] = json!("ACTIVE");
    b["device_type"] = json!("MONITOR");
    create_device(&app, b).await;

    create_device(&app, device_body("SN-C")).await;

    let (status, list) = send(
        &app,
        "GET",
        "/api/devices/?status=ACTIVE&device_type=VENTILATOR",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let serials: Vec<_> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["serial_number"].as_str().unwrap())
        .collect();
    assert_eq!(serials, vec!["SN-A"]);

    let (status, body) = send(&app, "GET", "/api/devices/?status=BROKEN", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"]["status"][0], "\"BROKEN\" is not a valid choice");
}

#[tokio::test]
async fn search_matches_any_field_case_insensitively() {
    let app = app();
    let mut acme = device_body("SN-1");
    acme["manufacturer"] = json!("Acme Corp");
    create_device(&app, acme).await;
    create_device(&app, device_body("SN-2")).await;

    let (_, list) = send(&app, "GET", "/api/devices/?search=acme", None).await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["manufacturer"], "Acme Corp");

    let (_, list) = send(&app, "GET", "/api/devices/?search=sn-", None).await;
    assert_eq!(list.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn pagination_wraps_the_results() {
    let app = app();
    for serial in ["SN-1", "SN-2", "SN-3"] {
        create_device(&app, device_body(serial)).await;
    }

    let (status, page) = send(&app, "GET", "/api/devices/?page=2&page_size=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 3);
    assert_eq!(page["page"], 2);
    assert_eq!(page["page_size"], 1);
    assert_eq!(page["results"].as_array().unwrap().len(), 1);
    // newest first
    assert_eq!(page["results"][0]["serial_number"], "SN-2");

    let (status, _) = send(&app, "GET", "/api/devices/?page=9&page_size=1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", "/api/devices/?page=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn maintenance_records_belong_to_a_device() {
    let app = app();
    let device = create_device(&app, device_body("SN-1")).await;
    let id = device["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/api/maintenance/",
        Some(json!({
            "device": 999,
            "maintenance_type": "PREVENTIVE",
            "maintenance_date": "2024-05-02",
            "performed_by": "J. Ortiz",
            "description": "Filter replacement"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["fields"]["device"][0],
        "invalid pk \"999\" - object does not exist"
    );

    let (status, record) = send(
        &app,
        "POST",
        "/api/maintenance/",
        Some(json!({
            "device": id,
            "maintenance_type": "CALIBRATION",
            "maintenance_date": "2024-05-02",
            "performed_by": "J. Ortiz",
            "description": "Flow sensor calibration",
            "cost": 120.5
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", record);
    assert_eq!(record["device"], id);
    assert_eq!(record["cost"], "120.50");

    let (_, detail) = send(&app, "GET", &format!("/api/devices/{}/", id), None).await;
    assert_eq!(detail["maintenance_records"][0]["id"], record["id"]);

    let record_uri = format!("/api/maintenance/{}/", record["id"]);
    let (status, patched) = send(
        &app,
        "PATCH",
        &record_uri,
        Some(json!({"performed_by": "Biomed team"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["performed_by"], "Biomed team");
    assert_eq!(patched["created_at"], record["created_at"]);

    let (status, _) = send(&app, "DELETE", &record_uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &record_uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn record_lists_filter_by_device() {
    let app = app();
    let first = create_device(&app, device_body("SN-1")).await;
    let second = create_device(&app, device_body("SN-2")).await;

    for device in [&first, &second] {
        let (status, _) = send(
            &app,
            "POST",
            "/api/documents/",
            Some(json!({
                "device": device["id"],
                "document_type": "MANUAL",
                "title": "Operator manual",
                "file_path": "/docs/v500/manual.pdf"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, all) = send(&app, "GET", "/api/documents/", None).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let uri = format!("/api/documents/?device={}", first["id"]);
    let (_, owned) = send(&app, "GET", &uri, None).await;
    let owned = owned.as_array().unwrap();
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0]["device"], first["id"]);
    assert_eq!(owned[0]["description"], "");

    let (status, _) = send(&app, "GET", "/api/documents/?device=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn document_upload_date_is_read_only() {
    let app = app();
    let device = create_device(&app, device_body("SN-1")).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/documents/",
        Some(json!({
            "device": device["id"],
            "document_type": "INVOICE",
            "title": "Purchase invoice",
            "file_path": "/docs/v500/invoice.pdf",
            "upload_date": "2024-01-01T00:00:00Z"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"]["upload_date"][0], "this field is read-only");
}

#[tokio::test]
async fn deleting_a_device_cascades() {
    let app = app();
    let device = create_device(&app, device_body("SN-1")).await;
    let id = device["id"].as_i64().unwrap();

    send(
        &app,
        "POST",
        "/api/maintenance/",
        Some(json!({
            "device": id,
            "maintenance_type": "INSPECTION",
            "maintenance_date": "2024-06-01",
            "performed_by": "Biomed team",
            "description": "Annual inspection"
        })),
    )
    .await;
    send(
        &app,
        "POST",
        "/api/documents/",
        Some(json!({
            "device": id,
            "document_type": "CERTIFICATE",
            "title": "Electrical safety",
            "file_path": "/docs/v500/safety.pdf"
        })),
    )
    .await;

    let (_, detail) = send(&app, "GET", &format!("/api/devices/{}/", id), None).await;
    assert_eq!(detail["maintenance_records"].as_array().unwrap().len(), 1);
    assert_eq!(detail["documents"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app, "DELETE", &format!("/api/devices/{}/", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (_, records) = send(&app, "GET", &format!("/api/maintenance/?device={}", id), None).await;
    assert_eq!(records, json!([]));
    let (_, documents) = send(&app, "GET", &format!("/api/documents/?device={}", id), None).await;
    assert_eq!(documents, json!([]));
}

#[tokio::test]
async fn statistics_follow_creates_and_deletes() {
    let app = app();

    let mut due = device_body("SN-1");
    due["next_maintenance_date"] = json!(days_from_today(10));
    let due = create_device(&app, due).await;

    let mut later = device_body("SN-2");
    later["status"] = json!("IN_MAINTENANCE");
    later["device_type"] = json!("MONITOR");
    later["next_maintenance_date"] = json!(days_from_today(45));
    create_device(&app, later).await;

    let mut edge = device_body("SN-3");
    edge["status"] = json!("ACTIVE");
    edge["next_maintenance_date"] = json!(today().to_string());
    create_device(&app, edge).await;

    // no next date at all
    create_device(&app, device_body("SN-4")).await;

    let (status, stats) = send(&app, "GET", "/api/devices/statistics/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_devices"], 4);
    assert_eq!(stats["available_devices"], 2);
    assert_eq!(stats["active_devices"], 1);
    assert_eq!(stats["maintenance_needed"], 1);
    assert_eq!(stats["maintenance_due_soon"], 2);

    let type_sum: i64 = stats["device_types"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["count"].as_i64().unwrap())
        .sum();
    let status_sum: i64 = stats["status_distribution"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["count"].as_i64().unwrap())
        .sum();
    assert_eq!(type_sum, 4);
    assert_eq!(status_sum, 4);
    assert_eq!(stats["device_types"][0]["device_type"], "VENTILATOR");
    assert_eq!(stats["device_types"][0]["count"], 3);
    assert_eq!(stats["recent_activity"].as_array().unwrap().len(), 4);

    let (status, _) = send(&app, "DELETE", &format!("/api/devices/{}/", due["id"]), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, stats) = send(&app, "GET", "/api/devices/statistics/", None).await;
    assert_eq!(stats["total_devices"], 3);
    assert_eq!(stats["available_devices"], 1);
    assert_eq!(stats["maintenance_due_soon"], 1);
    assert!(stats["recent_activity"]
        .as_array()
        .unwrap()
        .iter()
        .all(|d| d["id"] != due["id"]));
}

#[tokio::test]
async fn choices_and_health() {
    let app = app();

    let (status, choices) = send(&app, "GET", "/api/choices/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(choices["maintenance_type"].as_array().unwrap().len(), 4);
    assert_eq!(choices["document_type"].as_array().unwrap().len(), 5);

    let (status, health) = send(&app, "GET", "/api/health/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "ok");
    assert_eq!(health["backend"], "memory");
}
