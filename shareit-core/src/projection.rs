use chrono::NaiveDateTime;
use std::sync::Arc;
use tracing::debug;

use crate::clock::Clock;
use crate::models::{Item, ItemView};
use crate::repository::{BookingRepository, CommentStore, ItemCatalog, UserDirectory};
use crate::{CoreError, CoreResult, ItemId, UserId};

/// Read-side view of items with their last/next approved booking and comments.
///
/// Nothing here is cached: every call recomputes from the stores.
pub struct ItemProjection {
    items: Arc<dyn ItemCatalog>,
    bookings: Arc<dyn BookingRepository>,
    comments: Arc<dyn CommentStore>,
    users: Arc<dyn UserDirectory>,
    clock: Arc<dyn Clock>,
}

impl ItemProjection {
    pub fn new(
        items: Arc<dyn ItemCatalog>,
        bookings: Arc<dyn BookingRepository>,
        comments: Arc<dyn CommentStore>,
        users: Arc<dyn UserDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            items,
            bookings,
            comments,
            users,
            clock,
        }
    }

    /// Scheduling data is attached only when `viewer_id` owns the item.
    pub async fn project_item(&self, item_id: ItemId, viewer_id: Option<UserId>) -> CoreResult<ItemView> {
        debug!("Projecting item {} for viewer {:?}", item_id, viewer_id);

        let item = self
            .items
            .find_item(item_id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("Item with id={} not found", item_id)))?;

        let with_bookings = viewer_id == Some(item.owner_id);
        self.view(item, with_bookings, self.clock.now()).await
    }

    pub async fn project_owner_items(&self, owner_id: UserId) -> CoreResult<Vec<ItemView>> {
        debug!("Projecting items of owner {}", owner_id);

        if !self.users.user_exists(owner_id).await? {
            return Err(CoreError::not_found(format!("User with id={} not found", owner_id)));
        }

        let now = self.clock.now();
        let items = self.items.items_by_owner(owner_id).await?;
        let mut views = Vec::with_capacity(items.len());
        for item in items {
            views.push(self.view(item, true, now).await?);
        }
        Ok(views)
    }

    async fn view(&self, item: Item, with_bookings: bool, now: NaiveDateTime) -> CoreResult<ItemView> {
        let (last, next) = if with_bookings {
            let last = self.bookings.last_for_item(item.id, now).await?;
            let next = self.bookings.next_for_item(item.id, now).await?;
            (last.map(|b| b.to_short()), next.map(|b| b.to_short()))
        } else {
            (None, None)
        };

        let comments = self.comments.comments_for_item(item.id).await?;
        Ok(ItemView::new(item, last, next, comments))
    }
}
