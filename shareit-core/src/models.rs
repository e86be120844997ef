use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use shareit_shared::Masked;
use std::fmt;
use std::str::FromStr;

use crate::{BookingId, CoreError, CoreResult, ItemId, UserId};

// ============================================================================
// External collaborators (read-only views)
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Masked<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub owner_id: UserId,
    #[serde(default)]
    pub request_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub item_id: ItemId,
    pub author_name: String,
    #[serde(with = "shareit_shared::datetime")]
    pub created: NaiveDateTime,
}

// ============================================================================
// Booking
// ============================================================================

/// Lifecycle state of a booking. `Waiting` is initial, the other two are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Waiting,
    Approved,
    Rejected,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Waiting => "WAITING",
            BookingStatus::Approved => "APPROVED",
            BookingStatus::Rejected => "REJECTED",
        }
    }

    /// Owner decision: `Waiting → Approved | Rejected`. Anything else is a conflict.
    pub fn transition(self, approve: bool) -> CoreResult<BookingStatus> {
        match self {
            BookingStatus::Waiting if approve => Ok(BookingStatus::Approved),
            BookingStatus::Waiting => Ok(BookingStatus::Rejected),
            resolved => Err(CoreError::conflict(format!("Booking is already {}", resolved))),
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WAITING" => Ok(BookingStatus::Waiting),
            "APPROVED" => Ok(BookingStatus::Approved),
            "REJECTED" => Ok(BookingStatus::Rejected),
            other => Err(CoreError::InvalidArgument(format!("Unknown booking status: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemRef {
    pub id: ItemId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRef {
    pub id: UserId,
    pub name: String,
}

/// A time-bounded rental request over the half-open interval `[start, end)`.
///
/// `item`, `booker` and `owner_id` are fixed at creation; only `status` changes.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Booking {
    pub id: BookingId,
    #[serde(with = "shareit_shared::datetime")]
    pub start: NaiveDateTime,
    #[serde(with = "shareit_shared::datetime")]
    pub end: NaiveDateTime,
    pub item: ItemRef,
    pub booker: UserRef,
    #[serde(skip_serializing)]
    pub owner_id: UserId,
    pub status: BookingStatus,
}

impl Booking {
    pub fn is_participant(&self, user_id: UserId) -> bool {
        self.booker.id == user_id || self.owner_id == user_id
    }

    pub fn to_short(&self) -> BookingShort {
        BookingShort {
            id: self.id,
            booker_id: self.booker.id,
            start: self.start,
            end: self.end,
        }
    }
}

/// Caller-supplied part of a booking request.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub item_id: ItemId,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// What the engine hands to the store on creation: validated, with references resolved.
#[derive(Debug, Clone)]
pub struct BookingDraft {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub item: ItemRef,
    pub booker: UserRef,
    pub owner_id: UserId,
}

// ============================================================================
// Listing filters
// ============================================================================

/// The `state` filter accepted by the renter and owner listings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingState {
    #[default]
    All,
    Current,
    Past,
    Future,
    Waiting,
    Rejected,
}

impl BookingState {
    /// Parses an optional raw filter; absent means `All`.
    pub fn parse(raw: Option<&str>) -> CoreResult<BookingState> {
        match raw {
            None => Ok(BookingState::All),
            Some(s) => s.parse(),
        }
    }

    /// Pins the filter to a sampled instant so the store sees a concrete predicate.
    pub fn resolve(self, now: NaiveDateTime) -> BookingFilter {
        match self {
            BookingState::All => BookingFilter::All,
            BookingState::Current => BookingFilter::ActiveAt(now),
            BookingState::Past => BookingFilter::EndedBefore(now),
            BookingState::Future => BookingFilter::StartsAfter(now),
            BookingState::Waiting => BookingFilter::Status(BookingStatus::Waiting),
            BookingState::Rejected => BookingFilter::Status(BookingStatus::Rejected),
        }
    }
}

impl FromStr for BookingState {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ALL" => Ok(BookingState::All),
            "CURRENT" => Ok(BookingState::Current),
            "PAST" => Ok(BookingState::Past),
            "FUTURE" => Ok(BookingState::Future),
            "WAITING" => Ok(BookingState::Waiting),
            "REJECTED" => Ok(BookingState::Rejected),
            _ => Err(CoreError::InvalidArgument(format!("Unknown state: {}", s))),
        }
    }
}

/// Store-facing predicate. Temporal variants carry the instant they were resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingFilter {
    All,
    /// `start < now < end`
    ActiveAt(NaiveDateTime),
    /// `end < now`
    EndedBefore(NaiveDateTime),
    /// `start > now`
    StartsAfter(NaiveDateTime),
    Status(BookingStatus),
}

impl BookingFilter {
    pub fn matches(&self, booking: &Booking) -> bool {
        match *self {
            BookingFilter::All => true,
            BookingFilter::ActiveAt(now) => booking.start < now && now < booking.end,
            BookingFilter::EndedBefore(now) => booking.end < now,
            BookingFilter::StartsAfter(now) => booking.start > now,
            BookingFilter::Status(status) => booking.status == status,
        }
    }
}

// ============================================================================
// Item projection
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookingShort {
    pub id: BookingId,
    pub booker_id: UserId,
    #[serde(with = "shareit_shared::datetime")]
    pub start: NaiveDateTime,
    #[serde(with = "shareit_shared::datetime")]
    pub end: NaiveDateTime,
}

/// Item with owner-only scheduling data and its comments, computed per read.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub request_id: Option<i64>,
    pub last_booking: Option<BookingShort>,
    pub next_booking: Option<BookingShort>,
    pub comments: Vec<Comment>,
}

impl ItemView {
    pub fn new(
        item: Item,
        last_booking: Option<BookingShort>,
        next_booking: Option<BookingShort>,
        comments: Vec<Comment>,
    ) -> Self {
        Self {
            id: item.id,
            name: item.name,
            description: item.description,
            available: item.available,
            request_id: item.request_id,
            last_booking,
            next_booking,
            comments,
        }
    }
}
