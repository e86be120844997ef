pub mod clock;
pub mod engine;
pub mod memory;
pub mod models;
pub mod projection;
pub mod repository;

pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::BookingEngine;
pub use memory::{Fixture, InMemoryStore};
pub use models::{
    Booking, BookingDraft, BookingFilter, BookingShort, BookingState, BookingStatus, Comment, Item, ItemRef,
    ItemView, NewBooking, User, UserRef,
};
pub use projection::ItemProjection;

use chrono::NaiveDateTime;

pub type UserId = i64;
pub type ItemId = i64;
pub type BookingId = i64;

/// Domain failures surfaced by the engine and the projection.
///
/// `NotFound` covers both "absent" and "present but not yours", so callers
/// cannot probe for bookings or items they are not allowed to see.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("End date {end} must be after start date {start}")]
    InvalidInterval {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    NotEligible(String),
    #[error("Storage failure: {0}")]
    Storage(String),
}

impl CoreError {
    pub fn not_found(what: impl Into<String>) -> Self {
        CoreError::NotFound(what.into())
    }

    pub fn conflict(what: impl Into<String>) -> Self {
        CoreError::Conflict(what.into())
    }
}

impl From<repository::RepoError> for CoreError {
    fn from(err: repository::RepoError) -> Self {
        tracing::error!("Repository call failed: {}", err);
        CoreError::Storage(err.to_string())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
