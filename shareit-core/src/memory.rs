use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::models::{Booking, BookingDraft, BookingFilter, BookingStatus, Comment, Item, User};
use crate::repository::{
    BookingRepository, CommentStore, ItemCatalog, RepoResult, UserDirectory,
};
use crate::{BookingId, ItemId, UserId};

/// Seed data for the in-memory backend.
#[derive(Debug, Default, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    items: BTreeMap<ItemId, Item>,
    comments: Vec<Comment>,
    bookings: BTreeMap<BookingId, Booking>,
    next_booking_id: BookingId,
}

/// Process-local store backing every repository trait.
///
/// All tables sit behind one lock, so each trait call observes and mutates a
/// consistent snapshot.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, user: User) {
        self.tables.write().await.users.insert(user.id, user);
    }

    pub async fn add_item(&self, item: Item) {
        self.tables.write().await.items.insert(item.id, item);
    }

    pub async fn add_comment(&self, comment: Comment) {
        self.tables.write().await.comments.push(comment);
    }

    pub async fn load_fixture(&self, fixture: Fixture) {
        let mut tables = self.tables.write().await;
        tracing::info!(
            "Loading fixture: {} users, {} items, {} comments",
            fixture.users.len(),
            fixture.items.len(),
            fixture.comments.len()
        );
        for user in fixture.users {
            tables.users.insert(user.id, user);
        }
        for item in fixture.items {
            tables.items.insert(item.id, item);
        }
        tables.comments.extend(fixture.comments);
    }

    /// Flips an item's availability flag. Existing bookings are not touched.
    pub async fn set_item_available(&self, item_id: ItemId, available: bool) -> bool {
        match self.tables.write().await.items.get_mut(&item_id) {
            Some(item) => {
                item.available = available;
                true
            }
            None => false,
        }
    }

    async fn select<P>(&self, predicate: P) -> Vec<Booking>
    where
        P: Fn(&Booking) -> bool,
    {
        let tables = self.tables.read().await;
        let mut found: Vec<Booking> = tables
            .bookings
            .values()
            .filter(|b| predicate(b))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.start.cmp(&a.start).then(b.id.cmp(&a.id)));
        found
    }
}

#[async_trait]
impl UserDirectory for InMemoryStore {
    async fn user_exists(&self, id: UserId) -> RepoResult<bool> {
        Ok(self.tables.read().await.users.contains_key(&id))
    }

    async fn find_user(&self, id: UserId) -> RepoResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }
}

#[async_trait]
impl ItemCatalog for InMemoryStore {
    async fn find_item(&self, id: ItemId) -> RepoResult<Option<Item>> {
        Ok(self.tables.read().await.items.get(&id).cloned())
    }

    async fn items_by_owner(&self, owner_id: UserId) -> RepoResult<Vec<Item>> {
        Ok(self
            .tables
            .read()
            .await
            .items
            .values()
            .filter(|item| item.owner_id == owner_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CommentStore for InMemoryStore {
    async fn comments_for_item(&self, item_id: ItemId) -> RepoResult<Vec<Comment>> {
        Ok(self
            .tables
            .read()
            .await
            .comments
            .iter()
            .filter(|c| c.item_id == item_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BookingRepository for InMemoryStore {
    async fn insert(&self, draft: BookingDraft) -> RepoResult<Booking> {
        let mut tables = self.tables.write().await;
        tables.next_booking_id += 1;
        let booking = Booking {
            id: tables.next_booking_id,
            start: draft.start,
            end: draft.end,
            item: draft.item,
            booker: draft.booker,
            owner_id: draft.owner_id,
            status: BookingStatus::Waiting,
        };
        tables.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn find_by_id(&self, id: BookingId) -> RepoResult<Option<Booking>> {
        Ok(self.tables.read().await.bookings.get(&id).cloned())
    }

    async fn transition_status(
        &self,
        id: BookingId,
        from: BookingStatus,
        to: BookingStatus,
    ) -> RepoResult<Option<Booking>> {
        let mut tables = self.tables.write().await;
        match tables.bookings.get_mut(&id) {
            Some(booking) if booking.status == from => {
                booking.status = to;
                Ok(Some(booking.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn find_by_booker(
        &self,
        booker_id: UserId,
        filter: BookingFilter,
    ) -> RepoResult<Vec<Booking>> {
        Ok(self
            .select(|b| b.booker.id == booker_id && filter.matches(b))
            .await)
    }

    async fn find_by_owner(
        &self,
        owner_id: UserId,
        filter: BookingFilter,
    ) -> RepoResult<Vec<Booking>> {
        Ok(self
            .select(|b| b.owner_id == owner_id && filter.matches(b))
            .await)
    }

    async fn last_for_item(&self, item_id: ItemId, now: NaiveDateTime) -> RepoResult<Option<Booking>> {
        let tables = self.tables.read().await;
        Ok(tables
            .bookings
            .values()
            .filter(|b| b.item.id == item_id && b.status == BookingStatus::Approved && b.start < now)
            .max_by(|a, b| a.end.cmp(&b.end).then(a.id.cmp(&b.id)))
            .cloned())
    }

    async fn next_for_item(&self, item_id: ItemId, now: NaiveDateTime) -> RepoResult<Option<Booking>> {
        let tables = self.tables.read().await;
        Ok(tables
            .bookings
            .values()
            .filter(|b| b.item.id == item_id && b.status == BookingStatus::Approved && b.start > now)
            .min_by(|a, b| a.start.cmp(&b.start).then(a.id.cmp(&b.id)))
            .cloned())
    }

    async fn has_completed_booking(
        &self,
        booker_id: UserId,
        item_id: ItemId,
        now: NaiveDateTime,
    ) -> RepoResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables.bookings.values().any(|b| {
            b.booker.id == booker_id
                && b.item.id == item_id
                && b.status == BookingStatus::Approved
                && b.end < now
        }))
    }
}
