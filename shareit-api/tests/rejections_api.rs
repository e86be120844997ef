mod common;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use common::{build_test_app, send, send_with_headers, ts, ITEM, OWNER, RENTER};

fn assert_error_body(body: &Value, title: &str) {
    assert_eq!(body["error"], title, "unexpected body: {}", body);
    assert!(
        body["description"].as_str().is_some_and(|d| !d.is_empty()),
        "missing description: {}",
        body
    );
}

async fn waiting_booking(app: &common::TestApp) -> i64 {
    let (status, created) = send(
        &app.router,
        Method::POST,
        "/bookings",
        Some(RENTER),
        Some(json!({
            "itemId": ITEM,
            "start": "2025-01-10T10:00:00",
            "end": "2025-01-12T10:00:00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    created["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_decide_without_approved_flag_is_json_error() {
    let app = build_test_app(ts(1, 1, 9)).await;
    let id = waiting_booking(&app).await;

    let uri = format!("/bookings/{}", id);
    let (status, body) = send(&app.router, Method::PATCH, &uri, Some(OWNER), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_body(&body, "Validation failed");

    let uri = format!("/bookings/{}?approved=maybe", id);
    let (status, body) = send(&app.router, Method::PATCH, &uri, Some(OWNER), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_body(&body, "Validation failed");

    let (_, still_waiting) = send(
        &app.router,
        Method::GET,
        &format!("/bookings/{}", id),
        Some(RENTER),
        None,
    )
    .await;
    assert_eq!(still_waiting["status"], "WAITING");
}

#[tokio::test]
async fn test_non_numeric_path_ids_are_json_errors() {
    let app = build_test_app(ts(1, 1, 9)).await;

    for (method, uri) in [
        (Method::GET, "/bookings/abc"),
        (Method::PATCH, "/bookings/abc?approved=true"),
        (Method::GET, "/items/abc"),
        (Method::GET, "/items/abc/comment-eligibility"),
    ] {
        let (status, body) = send(&app.router, method, uri, Some(OWNER), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_error_body(&body, "Validation failed");
    }
}

#[tokio::test]
async fn test_missing_identity_header_is_json_error() {
    let app = build_test_app(ts(1, 1, 9)).await;

    for (method, uri) in [
        (Method::GET, "/bookings"),
        (Method::GET, "/bookings/owner"),
        (Method::GET, "/bookings/1"),
        (Method::PATCH, "/bookings/1?approved=true"),
        (Method::GET, "/items"),
    ] {
        let (status, body) = send(&app.router, method, uri, None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_error_body(&body, "Bad request");
    }
}

#[tokio::test]
async fn test_malformed_identity_header_is_json_error() {
    let app = build_test_app(ts(1, 1, 9)).await;
    let headers = [("X-Sharer-User-Id", "not-a-number")];

    let (status, body) =
        send_with_headers(&app.router, Method::GET, "/bookings", &headers, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_body(&body, "Bad request");

    // Anonymous item reads are allowed, a garbled identity is not.
    let uri = format!("/items/{}", ITEM);
    let (status, body) = send_with_headers(&app.router, Method::GET, &uri, &headers, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_body(&body, "Bad request");
}

#[tokio::test]
async fn test_bad_state_query_and_body_share_error_shape() {
    let app = build_test_app(ts(1, 1, 9)).await;

    let (status, body) = send(
        &app.router,
        Method::GET,
        "/bookings?state=LATER",
        Some(RENTER),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_body(&body, "Unknown state: LATER");

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/bookings",
        Some(RENTER),
        Some(json!({ "itemId": ITEM })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_body(&body, "Validation failed");
}
