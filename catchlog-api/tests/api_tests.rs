//! Integration tests for catchlog-api HTTP endpoints
//!
//! Routers run against an in-memory SQLite pool and an in-memory asset store.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use catchlog_api::assets::InMemoryAssetStore;
use catchlog_api::db::reference::{insert_reference, ReferenceList};
use catchlog_api::{build_router, AppState};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot`

const TOKEN: &str = "test-admin-token";
const BOUNDARY: &str = "catchlog-test-boundary";

/// One multipart part: a text field or a file
enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        field: &'a str,
        file_name: &'a str,
        content_type: &'a str,
    },
}

fn multipart_body(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                field,
                file_name,
                content_type,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        field, file_name
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
                body.extend_from_slice(format!("bytes of {}", file_name).as_bytes());
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn image<'a>(field: &'a str, file_name: &'a str) -> Part<'a> {
    Part::File {
        field,
        file_name,
        content_type: "image/jpeg",
    }
}

fn multipart_request(method: &str, uri: &str, parts: &[Part]) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .header("x-admin-api-key", TOKEN)
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

fn admin_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-admin-api-key", TOKEN)
        .body(Body::empty())
        .unwrap()
}

fn public_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

struct TestApp {
    router: Router,
    pool: SqlitePool,
    store: Arc<InMemoryAssetStore>,
}

impl TestApp {
    async fn new() -> Self {
        Self::with_store(InMemoryAssetStore::new("mem://bucket")).await
    }

    async fn with_store(store: InMemoryAssetStore) -> Self {
        let pool = catchlog_api::db::init_memory_pool().await.unwrap();
        let store = Arc::new(store);
        let state = AppState::new(
            pool.clone(),
            store.clone(),
            Some(TOKEN.to_string()),
            16 * 1024 * 1024,
        );
        Self {
            router: build_router(state),
            pool,
            store,
        }
    }

    async fn send_raw(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let (status, text) = self.send_raw(request).await;
        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap()
        };
        (status, body)
    }
}

// =============================================================================
// Public endpoints
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_no_auth_required() {
    let app = TestApp::new().await;
    let (status, body) = app.send(public_request("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "catchlog-api");
    assert!(body["version"].is_string());
    assert!(body["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn test_reference_lists_are_public() {
    let app = TestApp::new().await;
    insert_reference(&app.pool, ReferenceList::Boats, "Pacific Queen")
        .await
        .unwrap();
    insert_reference(&app.pool, ReferenceList::Locations, "San Diego")
        .await
        .unwrap();

    let (status, body) = app.send(public_request("/getBoatNames")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{"id": 1, "name": "Pacific Queen"}]));

    let (status, body) = app.send(public_request("/getLocations")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["name"], "San Diego");

    for uri in ["/getTripTypes", "/getLandingTypes", "/getFishTypes"] {
        let (status, body) = app.send(public_request(uri)).await;
        assert_eq!(status, StatusCode::OK, "{}", uri);
        assert_eq!(body, json!([]), "{}", uri);
    }
}

// =============================================================================
// Admin key
// =============================================================================

#[tokio::test]
async fn test_missing_admin_key_forbidden() {
    let app = TestApp::new().await;
    let (status, body) = app.send(public_request("/getTripsList")).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");
    assert_eq!(body["error"]["message"], "Unauthorized access");
}

#[tokio::test]
async fn test_wrong_admin_key_forbidden() {
    let app = TestApp::new().await;
    let request = Request::builder()
        .uri("/getTripsList")
        .header("x-admin-api-key", "guess")
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_auth_disabled_without_token() {
    let pool = catchlog_api::db::init_memory_pool().await.unwrap();
    let state = AppState::new(
        pool,
        Arc::new(InMemoryAssetStore::new("mem://bucket")),
        None,
        1024 * 1024,
    );
    let response = build_router(state)
        .oneshot(public_request("/getTripsList"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// Create / read / delete
// =============================================================================

#[tokio::test]
async fn test_create_trip_distributes_catch_pictures() {
    let app = TestApp::new().await;
    let catches = r#"[{"species":"tuna","picturesCount":2},{"species":"bass","picturesCount":1}]"#;

    let (status, created) = app
        .send(multipart_request(
            "POST",
            "/createTrip",
            &[
                Part::Text("nickname", "Reel Deal"),
                Part::Text("userEmail", "angler@example.com"),
                Part::Text("conditions", "4"),
                Part::Text("tripDate", "2024-06-01"),
                Part::Text("fishCaught", catches),
                image("pictures", "deck.jpg"),
                image("fishCaughtPictures", "t1.jpg"),
                image("fishCaughtPictures", "t2.jpg"),
                image("fishCaughtPictures", "b1.jpg"),
            ],
        ))
        .await;

    assert_eq!(status, StatusCode::OK, "{}", created);
    assert_eq!(created["status"], "Pending");
    let trip_id = created["tripId"].as_str().unwrap().to_string();
    assert!(created["createdAt"].is_string());

    let (status, trip) = app
        .send(admin_request("GET", &format!("/getTrip/{}", trip_id)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(trip["nickname"], "Reel Deal");
    assert_eq!(trip["conditions"], 4);
    assert_eq!(trip["pictures"].as_array().unwrap().len(), 1);

    let fishes = trip["fishes"].as_array().unwrap();
    assert_eq!(fishes.len(), 2);
    assert_eq!(fishes[0]["species"], "tuna");
    assert_eq!(fishes[0]["report_id"], trip_id.as_str());
    assert!(fishes[0].get("picturesCount").is_none());

    let tuna: Vec<&str> = fishes[0]["attachments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(tuna.len(), 2);
    assert!(tuna[0].starts_with("mem://bucket/") && tuna[0].ends_with("-t1.jpg"));
    assert!(tuna[1].ends_with("-t2.jpg"));
    assert!(fishes[1]["attachments"][0]
        .as_str()
        .unwrap()
        .ends_with("-b1.jpg"));

    assert_eq!(app.store.objects().await.len(), 4);
}

#[tokio::test]
async fn test_create_trip_keeps_going_when_an_upload_fails() {
    let app = TestApp::with_store(InMemoryAssetStore::new("mem://bucket").failing_for(["-b.jpg"])).await;

    let (status, created) = app
        .send(multipart_request(
            "POST",
            "/createTrip",
            &[
                Part::Text("fishCaught", r#"{"species":"tuna","picturesCount":3}"#),
                image("fishCaughtPictures", "a.jpg"),
                image("fishCaughtPictures", "b.jpg"),
                image("fishCaughtPictures", "c.jpg"),
            ],
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let trip_id = created["tripId"].as_str().unwrap();
    let (_, trip) = app
        .send(admin_request("GET", &format!("/getTrip/{}", trip_id)))
        .await;
    let attachments = trip["fishes"][0]["attachments"].as_array().unwrap();
    assert_eq!(attachments.len(), 2);
    assert!(attachments[0].as_str().unwrap().ends_with("-a.jpg"));
    assert!(attachments[1].as_str().unwrap().ends_with("-c.jpg"));
}

#[tokio::test]
async fn test_create_rejects_non_image_file() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send(multipart_request(
            "POST",
            "/createTrip",
            &[Part::File {
                field: "pictures",
                file_name: "notes.txt",
                content_type: "text/plain",
            }],
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Only image files are allowed!");
}

#[tokio::test]
async fn test_create_rejects_unexpected_file_field() {
    let app = TestApp::new().await;
    let (status, _) = app
        .send(multipart_request(
            "POST",
            "/createTrip",
            &[image("avatar", "me.jpg")],
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_rejects_too_many_trip_pictures() {
    let app = TestApp::new().await;
    let names: Vec<String> = (0..11).map(|i| format!("p{}.jpg", i)).collect();
    let parts: Vec<Part> = names.iter().map(|n| image("pictures", n)).collect();

    let (status, _) = app.send(multipart_request("POST", "/createTrip", &parts)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.store.objects().await.is_empty());
}

#[tokio::test]
async fn test_create_rejects_malformed_catch_list() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send(multipart_request(
            "POST",
            "/createTrip",
            &[Part::Text("fishCaught", "[not json")],
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_create_rejects_non_numeric_anglers() {
    let app = TestApp::new().await;
    let (status, _) = app
        .send(multipart_request(
            "POST",
            "/createTrip",
            &[Part::Text("anglers", "lots")],
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_missing_trip_not_found() {
    let app = TestApp::new().await;
    let (status, body) = app.send(admin_request("GET", "/getTrip/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_delete_trip() {
    let app = TestApp::new().await;
    let (_, created) = app
        .send(multipart_request(
            "POST",
            "/createTrip",
            &[Part::Text("fishCaught", r#"[{"species":"tuna"}]"#)],
        ))
        .await;
    let trip_id = created["tripId"].as_str().unwrap();

    let (status, body) = app
        .send(admin_request("DELETE", &format!("/deleteTrip/{}", trip_id)))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = app
        .send(admin_request("GET", &format!("/getTrip/{}", trip_id)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(admin_request("DELETE", &format!("/deleteTrip/{}", trip_id)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_trips_list_filters_by_user_email() {
    let app = TestApp::new().await;
    for email in ["alice@example.com", "bob@example.com"] {
        let (status, _) = app
            .send(multipart_request(
                "POST",
                "/createTrip",
                &[
                    Part::Text("userEmail", email),
                    Part::Text("fishCaught", r#"[{"species":"tuna"}]"#),
                ],
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, all) = app.send(admin_request("GET", "/getTripsList")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, mine) = app
        .send(admin_request("GET", "/getTripsList?userEmail=bob@example.com"))
        .await;
    let mine = mine.as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["userEmail"], "bob@example.com");
    assert_eq!(mine[0]["fishes"].as_array().unwrap().len(), 1);
}

// =============================================================================
// Edit
// =============================================================================

#[tokio::test]
async fn test_edit_unknown_trip_bad_request() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send(multipart_request(
            "PUT",
            "/editTrip/ghost",
            &[Part::Text("city", "Oceanside")],
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "trip not found");
}

#[tokio::test]
async fn test_edit_reconciles_catches_and_pictures() {
    let app = TestApp::new().await;
    let (_, created) = app
        .send(multipart_request(
            "POST",
            "/createTrip",
            &[
                Part::Text("nickname", "Before"),
                Part::Text("city", "San Diego"),
                Part::Text("fishCaught", r#"[{"species":"tuna","weight":20,"picturesCount":1}]"#),
                image("pictures", "old.jpg"),
                image("fishCaughtPictures", "t1.jpg"),
            ],
        ))
        .await;
    let trip_id = created["tripId"].as_str().unwrap().to_string();

    let (_, before) = app
        .send(admin_request("GET", &format!("/getTrip/{}", trip_id)))
        .await;
    let catch_id = before["fishes"][0]["id"].as_str().unwrap().to_string();
    let kept_attachments = before["fishes"][0]["attachments"].clone();

    // Known id keeps its attachments; unknown id becomes a new catch
    let catches = json!([
        {"id": catch_id, "weight": 25, "attachments": kept_attachments},
        {"id": "stale-id", "species": "bass", "picturesCount": 1}
    ])
    .to_string();

    let (status, edited) = app
        .send(multipart_request(
            "PUT",
            &format!("/editTrip/{}", trip_id),
            &[
                Part::Text("nickname", "After"),
                Part::Text("fishCaught", &catches),
                image("fishCaughtPictures", "b1.jpg"),
            ],
        ))
        .await;

    assert_eq!(status, StatusCode::OK, "{}", edited);
    assert_eq!(edited["nickname"], "After");
    assert_eq!(edited["city"], "San Diego");
    assert_eq!(edited["pictures"], before["pictures"]);

    let fishes = edited["fishes"].as_array().unwrap();
    assert_eq!(fishes.len(), 2);
    assert_eq!(fishes[0]["id"], catch_id.as_str());
    assert_eq!(fishes[0]["species"], "tuna");
    assert_eq!(fishes[0]["weight"], 25);
    assert_eq!(fishes[0]["attachments"], kept_attachments);
    assert_ne!(fishes[1]["id"], "stale-id");
    assert_eq!(fishes[1]["species"], "bass");
    assert!(fishes[1]["attachments"][0]
        .as_str()
        .unwrap()
        .ends_with("-b1.jpg"));
}

#[tokio::test]
async fn test_edit_pictures_action_delete_clears_trip_pictures() {
    let app = TestApp::new().await;
    let (_, created) = app
        .send(multipart_request(
            "POST",
            "/createTrip",
            &[image("pictures", "old.jpg")],
        ))
        .await;
    let trip_id = created["tripId"].as_str().unwrap();

    let (status, edited) = app
        .send(multipart_request(
            "PUT",
            &format!("/editTrip/{}", trip_id),
            &[
                Part::Text("picturesAction", "delete"),
                image("pictures", "new.jpg"),
            ],
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["pictures"], json!([]));
}

#[tokio::test]
async fn test_edit_new_pictures_replace_old() {
    let app = TestApp::new().await;
    let (_, created) = app
        .send(multipart_request(
            "POST",
            "/createTrip",
            &[image("pictures", "old.jpg")],
        ))
        .await;
    let trip_id = created["tripId"].as_str().unwrap();

    let (_, edited) = app
        .send(multipart_request(
            "PUT",
            &format!("/editTrip/{}", trip_id),
            &[image("pictures", "new1.jpg"), image("pictures", "new2.jpg")],
        ))
        .await;

    let pictures = edited["pictures"].as_array().unwrap();
    assert_eq!(pictures.len(), 2);
    assert!(pictures[0].as_str().unwrap().ends_with("-new1.jpg"));
    assert!(pictures[1].as_str().unwrap().ends_with("-new2.jpg"));
}

#[tokio::test]
async fn test_edit_with_catches_echoed_from_get_trip() {
    let app = TestApp::new().await;
    let (_, created) = app
        .send(multipart_request(
            "POST",
            "/createTrip",
            &[Part::Text("fishCaught", r#"[{"species":"tuna","picturesCount":0}]"#)],
        ))
        .await;
    let trip_id = created["tripId"].as_str().unwrap().to_string();

    let (_, before) = app
        .send(admin_request("GET", &format!("/getTrip/{}", trip_id)))
        .await;
    let echoed = before["fishes"].to_string();

    let (status, _) = app
        .send(multipart_request(
            "PUT",
            &format!("/editTrip/{}", trip_id),
            &[Part::Text("fishCaught", &echoed)],
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, raw) = app
        .send_raw(admin_request("GET", &format!("/getTrip/{}", trip_id)))
        .await;
    assert_eq!(status, StatusCode::OK);

    // One trip and one catch: each catch column appears once per object
    assert_eq!(raw.matches("\"report_id\"").count(), 1, "{}", raw);
    assert_eq!(raw.matches("\"createdAt\"").count(), 2, "{}", raw);
    assert_eq!(raw.matches("\"updatedAt\"").count(), 2, "{}", raw);

    let after: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(after["fishes"][0]["report_id"], trip_id.as_str());
    assert_eq!(after["fishes"][0]["species"], "tuna");
}
