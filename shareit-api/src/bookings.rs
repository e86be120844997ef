use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::get,
    Json, Router,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use shareit_core::{Booking, BookingState, BookingStatus, ItemRef, NewBooking, UserRef};
use tracing::info;

use crate::error::AppError;
use crate::identity::Caller;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub item_id: i64,
    #[serde(with = "shareit_shared::datetime")]
    pub start: NaiveDateTime,
    #[serde(with = "shareit_shared::datetime")]
    pub end: NaiveDateTime,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: i64,
    #[serde(with = "shareit_shared::datetime")]
    pub start: NaiveDateTime,
    #[serde(with = "shareit_shared::datetime")]
    pub end: NaiveDateTime,
    pub item_id: i64,
    pub item: ItemRef,
    pub booker: UserRef,
    pub status: BookingStatus,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            start: booking.start,
            end: booking.end,
            item_id: booking.item.id,
            item: booking.item,
            booker: booking.booker,
            status: booking.status,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StateQuery {
    pub state: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DecisionQuery {
    pub approved: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", get(list_renter_bookings).post(create_booking))
        .route("/bookings/owner", get(list_owner_bookings))
        .route("/bookings/{booking_id}", get(get_booking).patch(decide_booking))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /bookings
async fn create_booking(
    State(state): State<AppState>,
    Caller(user_id): Caller,
    payload: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> Result<Json<BookingResponse>, AppError> {
    let Json(req) = payload?;

    let booking = state
        .engine
        .create_booking(
            user_id,
            NewBooking {
                item_id: req.item_id,
                start: req.start,
                end: req.end,
            },
        )
        .await?;

    Ok(Json(booking.into()))
}

/// PATCH /bookings/{booking_id}?approved=
async fn decide_booking(
    State(state): State<AppState>,
    Caller(user_id): Caller,
    booking_id: Result<Path<i64>, PathRejection>,
    decision: Result<Query<DecisionQuery>, QueryRejection>,
) -> Result<Json<BookingResponse>, AppError> {
    let Path(booking_id) = booking_id?;
    let Query(decision) = decision?;

    let booking = state
        .engine
        .decide_booking(user_id, booking_id, decision.approved)
        .await?;

    info!("Booking {} decided by owner {}: {}", booking.id, user_id, booking.status);
    Ok(Json(booking.into()))
}

/// GET /bookings/{booking_id}
async fn get_booking(
    State(state): State<AppState>,
    Caller(user_id): Caller,
    booking_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<BookingResponse>, AppError> {
    let Path(booking_id) = booking_id?;
    let booking = state.engine.get_booking(user_id, booking_id).await?;
    Ok(Json(booking.into()))
}

/// GET /bookings?state=
async fn list_renter_bookings(
    State(state): State<AppState>,
    Caller(user_id): Caller,
    query: Result<Query<StateQuery>, QueryRejection>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let Query(query) = query?;
    let filter = BookingState::parse(query.state.as_deref())?;
    let bookings = state.engine.list_for_renter(user_id, filter).await?;
    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}

/// GET /bookings/owner?state=
async fn list_owner_bookings(
    State(state): State<AppState>,
    Caller(user_id): Caller,
    query: Result<Query<StateQuery>, QueryRejection>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let Query(query) = query?;
    let filter = BookingState::parse(query.state.as_deref())?;
    let bookings = state.engine.list_for_owner(user_id, filter).await?;
    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}
