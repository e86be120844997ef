#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::{NaiveDate, NaiveDateTime};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use shareit_api::{app, AppState};
use shareit_core::{Comment, FixedClock, InMemoryStore, Item, User};

pub const RENTER: i64 = 10;
pub const OWNER: i64 = 20;
pub const STRANGER: i64 = 30;
pub const ITEM: i64 = 1;
pub const UNAVAILABLE_ITEM: i64 = 2;

pub fn ts(month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, month, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
    pub clock: Arc<FixedClock>,
}

/// Router over a seeded in-memory store: users 10/20/30, owner 20 with an
/// available drill (1) and an unavailable tent (2), one comment on the drill.
pub async fn build_test_app(now: NaiveDateTime) -> TestApp {
    let store = Arc::new(InMemoryStore::new());
    for (id, name) in [(RENTER, "Anna"), (OWNER, "Boris"), (STRANGER, "Clara")] {
        store
            .add_user(User {
                id,
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()).into(),
            })
            .await;
    }
    for (id, name, available) in [(ITEM, "Drill", true), (UNAVAILABLE_ITEM, "Tent", false)] {
        store
            .add_item(Item {
                id,
                name: name.to_string(),
                description: format!("{} for rent", name),
                available,
                owner_id: OWNER,
                request_id: None,
            })
            .await;
    }
    store
        .add_comment(Comment {
            id: 1,
            text: "Strong and quiet".to_string(),
            item_id: ITEM,
            author_name: "Clara".to_string(),
            created: ts(1, 2, 18),
        })
        .await;

    let clock = Arc::new(FixedClock::new(now));
    let state = AppState::in_memory(store.clone(), clock.clone());

    TestApp {
        router: app(state),
        store,
        clock,
    }
}

/// Sends a request and returns the status with the parsed JSON body
/// (`Value::Null` for empty or non-JSON bodies).
pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    user: Option<i64>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let user = user.map(|id| id.to_string());
    let headers: Vec<(&str, &str)> = user
        .as_deref()
        .map(|id| vec![("X-Sharer-User-Id", id)])
        .unwrap_or_default();
    send_with_headers(router, method, uri, &headers, body).await
}

pub async fn send_with_headers(
    router: &Router,
    method: Method,
    uri: &str,
    headers: &[(&str, &str)],
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}
