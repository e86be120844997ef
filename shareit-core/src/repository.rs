use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::models::{Booking, BookingDraft, BookingFilter, BookingStatus, Comment, Item, User};
use crate::{BookingId, ItemId, UserId};

pub type RepoError = Box<dyn std::error::Error + Send + Sync>;
pub type RepoResult<T> = Result<T, RepoError>;

/// Account lookups. Account management itself lives elsewhere.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn user_exists(&self, id: UserId) -> RepoResult<bool>;

    async fn find_user(&self, id: UserId) -> RepoResult<Option<User>>;
}

/// Item lookups. Catalog CRUD and search live elsewhere.
#[async_trait]
pub trait ItemCatalog: Send + Sync {
    async fn find_item(&self, id: ItemId) -> RepoResult<Option<Item>>;

    /// Items owned by `owner_id`, in insertion order.
    async fn items_by_owner(&self, owner_id: UserId) -> RepoResult<Vec<Item>>;
}

#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn comments_for_item(&self, item_id: ItemId) -> RepoResult<Vec<Comment>>;
}

/// Booking persistence and the temporal/status queries the engine dispatches to.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Persists a new `WAITING` booking and returns it with its assigned id.
    async fn insert(&self, draft: BookingDraft) -> RepoResult<Booking>;

    async fn find_by_id(&self, id: BookingId) -> RepoResult<Option<Booking>>;

    /// Atomically moves a booking from `from` to `to`.
    ///
    /// Returns `None` when the booking is missing or no longer in `from`; two
    /// concurrent callers racing on the same row can never both get `Some`.
    async fn transition_status(
        &self,
        id: BookingId,
        from: BookingStatus,
        to: BookingStatus,
    ) -> RepoResult<Option<Booking>>;

    /// Bookings made by `booker_id` matching `filter`, newest `start` first.
    async fn find_by_booker(
        &self,
        booker_id: UserId,
        filter: BookingFilter,
    ) -> RepoResult<Vec<Booking>>;

    /// Bookings on items owned by `owner_id` matching `filter`, newest `start` first.
    async fn find_by_owner(
        &self,
        owner_id: UserId,
        filter: BookingFilter,
    ) -> RepoResult<Vec<Booking>>;

    /// Latest-ending `APPROVED` booking of the item that started before `now`.
    async fn last_for_item(&self, item_id: ItemId, now: NaiveDateTime) -> RepoResult<Option<Booking>>;

    /// Earliest-starting `APPROVED` booking of the item that starts after `now`.
    async fn next_for_item(&self, item_id: ItemId, now: NaiveDateTime) -> RepoResult<Option<Booking>>;

    /// Whether `booker_id` has an `APPROVED` booking of the item that ended before `now`.
    async fn has_completed_booking(
        &self,
        booker_id: UserId,
        item_id: ItemId,
        now: NaiveDateTime,
    ) -> RepoResult<bool>;
}
