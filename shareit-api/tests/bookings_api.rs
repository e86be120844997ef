mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{build_test_app, send, ts, ITEM, OWNER, RENTER, STRANGER, UNAVAILABLE_ITEM};

fn booking_body(item_id: i64, start: &str, end: &str) -> serde_json::Value {
    json!({ "itemId": item_id, "start": start, "end": end })
}

#[tokio::test]
async fn test_create_booking_returns_waiting() {
    let app = build_test_app(ts(1, 1, 9)).await;

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/bookings",
        Some(RENTER),
        Some(booking_body(ITEM, "2025-01-10T10:00:00", "2025-01-12T10:00:00")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "WAITING");
    assert_eq!(body["itemId"], ITEM);
    assert_eq!(body["item"]["name"], "Drill");
    assert_eq!(body["booker"]["id"], RENTER);
    assert_eq!(body["start"], "2025-01-10T10:00:00");
    assert!(body.get("ownerId").is_none());
}

#[tokio::test]
async fn test_create_booking_rejects_bad_interval() {
    let app = build_test_app(ts(1, 1, 9)).await;

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/bookings",
        Some(RENTER),
        Some(booking_body(ITEM, "2025-01-12T10:00:00", "2025-01-10T10:00:00")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_create_booking_on_unavailable_item_conflicts() {
    let app = build_test_app(ts(1, 1, 9)).await;

    let (status, _) = send(
        &app.router,
        Method::POST,
        "/bookings",
        Some(RENTER),
        Some(booking_body(
            UNAVAILABLE_ITEM,
            "2025-01-10T10:00:00",
            "2025-01-12T10:00:00",
        )),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_owner_cannot_book_own_item() {
    let app = build_test_app(ts(1, 1, 9)).await;

    let (status, _) = send(
        &app.router,
        Method::POST,
        "/bookings",
        Some(OWNER),
        Some(booking_body(ITEM, "2025-01-10T10:00:00", "2025-01-12T10:00:00")),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_identity_header_is_bad_request() {
    let app = build_test_app(ts(1, 1, 9)).await;

    let (status, _) = send(
        &app.router,
        Method::POST,
        "/bookings",
        None,
        Some(booking_body(ITEM, "2025-01-10T10:00:00", "2025-01-12T10:00:00")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = build_test_app(ts(1, 1, 9)).await;

    let (status, _) = send(
        &app.router,
        Method::POST,
        "/bookings",
        Some(RENTER),
        Some(json!({ "itemId": ITEM, "start": "tomorrow" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_decide_twice_conflicts() {
    let app = build_test_app(ts(1, 1, 9)).await;
    let (_, created) = send(
        &app.router,
        Method::POST,
        "/bookings",
        Some(RENTER),
        Some(booking_body(ITEM, "2025-01-10T10:00:00", "2025-01-12T10:00:00")),
    )
    .await;
    let uri = format!("/bookings/{}?approved=true", created["id"]);

    let (status, body) = send(&app.router, Method::PATCH, &uri, Some(OWNER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "APPROVED");

    let (status, _) = send(&app.router, Method::PATCH, &uri, Some(OWNER), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_only_owner_may_decide() {
    let app = build_test_app(ts(1, 1, 9)).await;
    let (_, created) = send(
        &app.router,
        Method::POST,
        "/bookings",
        Some(RENTER),
        Some(booking_body(ITEM, "2025-01-10T10:00:00", "2025-01-12T10:00:00")),
    )
    .await;
    let uri = format!("/bookings/{}?approved=false", created["id"]);

    let (status, _) = send(&app.router, Method::PATCH, &uri, Some(RENTER), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app.router, Method::PATCH, &uri, Some(OWNER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "REJECTED");
}

#[tokio::test]
async fn test_get_booking_hidden_from_strangers() {
    let app = build_test_app(ts(1, 1, 9)).await;
    let (_, created) = send(
        &app.router,
        Method::POST,
        "/bookings",
        Some(RENTER),
        Some(booking_body(ITEM, "2025-01-10T10:00:00", "2025-01-12T10:00:00")),
    )
    .await;
    let uri = format!("/bookings/{}", created["id"]);

    let (status, _) = send(&app.router, Method::GET, &uri, Some(RENTER), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app.router, Method::GET, &uri, Some(OWNER), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app.router, Method::GET, &uri, Some(STRANGER), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_state_reports_literal() {
    let app = build_test_app(ts(1, 1, 9)).await;

    let (status, body) = send(
        &app.router,
        Method::GET,
        "/bookings?state=SOMETIMES",
        Some(RENTER),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unknown state: SOMETIMES");
}

#[tokio::test]
async fn test_list_buckets_follow_clock() {
    let app = build_test_app(ts(1, 1, 9)).await;
    for (start, end) in [
        ("2025-01-02T10:00:00", "2025-01-03T10:00:00"),
        ("2025-01-10T10:00:00", "2025-01-12T10:00:00"),
    ] {
        let (status, _) = send(
            &app.router,
            Method::POST,
            "/bookings",
            Some(RENTER),
            Some(booking_body(ITEM, start, end)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    app.clock.set(ts(1, 11, 0));

    let (_, past) = send(&app.router, Method::GET, "/bookings?state=PAST", Some(RENTER), None).await;
    assert_eq!(past.as_array().unwrap().len(), 1);
    assert_eq!(past[0]["start"], "2025-01-02T10:00:00");

    let (_, current) = send(
        &app.router,
        Method::GET,
        "/bookings?state=current",
        Some(RENTER),
        None,
    )
    .await;
    assert_eq!(current.as_array().unwrap().len(), 1);
    assert_eq!(current[0]["start"], "2025-01-10T10:00:00");

    let (_, all) = send(&app.router, Method::GET, "/bookings", Some(RENTER), None).await;
    let starts: Vec<_> = all
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["start"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(starts, vec!["2025-01-10T10:00:00", "2025-01-02T10:00:00"]);

    let (_, waiting) = send(
        &app.router,
        Method::GET,
        "/bookings/owner?state=WAITING",
        Some(OWNER),
        None,
    )
    .await;
    assert_eq!(waiting.as_array().unwrap().len(), 2);

    let (_, none) = send(
        &app.router,
        Method::GET,
        "/bookings/owner?state=WAITING",
        Some(STRANGER),
        None,
    )
    .await;
    assert!(none.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_listing_for_unknown_user_is_not_found() {
    let app = build_test_app(ts(1, 1, 9)).await;

    let (status, _) = send(&app.router, Method::GET, "/bookings", Some(999), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app.router, Method::GET, "/bookings/owner", Some(999), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_availability_only_gates_new_requests() {
    let app = build_test_app(ts(1, 1, 9)).await;
    let (_, created) = send(
        &app.router,
        Method::POST,
        "/bookings",
        Some(RENTER),
        Some(booking_body(ITEM, "2025-01-10T10:00:00", "2025-01-12T10:00:00")),
    )
    .await;

    assert!(app.store.set_item_available(ITEM, false).await);

    let (status, _) = send(
        &app.router,
        Method::POST,
        "/bookings",
        Some(RENTER),
        Some(booking_body(ITEM, "2025-02-10T10:00:00", "2025-02-12T10:00:00")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // The pending request survives and can still be approved.
    let uri = format!("/bookings/{}?approved=true", created["id"]);
    let (status, body) = send(&app.router, Method::PATCH, &uri, Some(OWNER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "APPROVED");

    assert!(app.store.set_item_available(ITEM, true).await);
    assert!(!app.store.set_item_available(404, true).await);

    let (status, _) = send(
        &app.router,
        Method::POST,
        "/bookings",
        Some(RENTER),
        Some(booking_body(ITEM, "2025-02-10T10:00:00", "2025-02-12T10:00:00")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
