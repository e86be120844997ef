use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::models::{Booking, BookingDraft, BookingState, BookingStatus, ItemRef, NewBooking, UserRef};
use crate::repository::{BookingRepository, ItemCatalog, UserDirectory};
use crate::{BookingId, CoreError, CoreResult, ItemId, UserId};

/// Booking lifecycle: creation, the owner's one-shot decision, and the
/// participant-scoped reads.
///
/// Every validation runs before the first store mutation, so a failed call
/// never leaves a partial write behind.
pub struct BookingEngine {
    bookings: Arc<dyn BookingRepository>,
    items: Arc<dyn ItemCatalog>,
    users: Arc<dyn UserDirectory>,
    clock: Arc<dyn Clock>,
}

impl BookingEngine {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        items: Arc<dyn ItemCatalog>,
        users: Arc<dyn UserDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            bookings,
            items,
            users,
            clock,
        }
    }

    pub async fn create_booking(&self, requester_id: UserId, request: NewBooking) -> CoreResult<Booking> {
        debug!(
            "Creating booking for user {} and item {}",
            requester_id, request.item_id
        );

        if request.end <= request.start {
            return Err(CoreError::InvalidInterval {
                start: request.start,
                end: request.end,
            });
        }

        let booker = self
            .users
            .find_user(requester_id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("User with id={} not found", requester_id)))?;

        let item = self
            .items
            .find_item(request.item_id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("Item with id={} not found", request.item_id)))?;

        if item.owner_id == requester_id {
            warn!("User {} tried to book own item {}", requester_id, item.id);
            return Err(CoreError::not_found(format!("Item with id={} not found", item.id)));
        }

        if !item.available {
            return Err(CoreError::conflict(format!(
                "Item with id={} is not available",
                item.id
            )));
        }

        let booking = self
            .bookings
            .insert(BookingDraft {
                start: request.start,
                end: request.end,
                item: ItemRef {
                    id: item.id,
                    name: item.name,
                },
                booker: UserRef {
                    id: booker.id,
                    name: booker.name,
                },
                owner_id: item.owner_id,
            })
            .await?;

        info!("Booking created with id: {}", booking.id);
        Ok(booking)
    }

    /// The owner's approve/reject decision. Only a `WAITING` booking can be decided,
    /// and only once: the store applies the change conditionally on the status.
    pub async fn decide_booking(
        &self,
        actor_id: UserId,
        booking_id: BookingId,
        approve: bool,
    ) -> CoreResult<Booking> {
        debug!("User {} deciding booking {}: approve={}", actor_id, booking_id, approve);

        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .filter(|b| b.owner_id == actor_id)
            .ok_or_else(|| booking_not_found(booking_id))?;

        let target = booking.status.transition(approve)?;

        let updated = self
            .bookings
            .transition_status(booking.id, BookingStatus::Waiting, target)
            .await?
            .ok_or_else(|| {
                warn!("Booking {} was decided concurrently", booking_id);
                CoreError::conflict(format!("Booking with id={} is already decided", booking_id))
            })?;

        info!("Booking {} status changed to {}", booking_id, updated.status);
        Ok(updated)
    }

    pub async fn get_booking(&self, actor_id: UserId, booking_id: BookingId) -> CoreResult<Booking> {
        debug!("Getting booking {} by user {}", booking_id, actor_id);

        self.bookings
            .find_by_id(booking_id)
            .await?
            .filter(|b| b.is_participant(actor_id))
            .ok_or_else(|| booking_not_found(booking_id))
    }

    pub async fn list_for_renter(&self, actor_id: UserId, state: BookingState) -> CoreResult<Vec<Booking>> {
        debug!("Getting bookings for user {} with state {:?}", actor_id, state);

        self.ensure_user(actor_id).await?;
        let filter = state.resolve(self.clock.now());
        Ok(self.bookings.find_by_booker(actor_id, filter).await?)
    }

    pub async fn list_for_owner(&self, actor_id: UserId, state: BookingState) -> CoreResult<Vec<Booking>> {
        debug!("Getting bookings for owner {} with state {:?}", actor_id, state);

        self.ensure_user(actor_id).await?;
        let filter = state.resolve(self.clock.now());
        Ok(self.bookings.find_by_owner(actor_id, filter).await?)
    }

    /// Gate applied before a comment is stored: the author must have finished an
    /// approved rental of the item.
    pub async fn check_comment_eligibility(&self, author_id: UserId, item_id: ItemId) -> CoreResult<()> {
        debug!("Checking comment eligibility of user {} for item {}", author_id, item_id);

        self.ensure_user(author_id).await?;
        if self.items.find_item(item_id).await?.is_none() {
            return Err(CoreError::not_found(format!("Item with id={} not found", item_id)));
        }

        let now = self.clock.now();
        if self.bookings.has_completed_booking(author_id, item_id, now).await? {
            Ok(())
        } else {
            Err(CoreError::NotEligible(format!(
                "User with id={} cannot comment item with id={} without completed booking",
                author_id, item_id
            )))
        }
    }

    async fn ensure_user(&self, user_id: UserId) -> CoreResult<()> {
        if self.users.user_exists(user_id).await? {
            Ok(())
        } else {
            Err(CoreError::not_found(format!("User with id={} not found", user_id)))
        }
    }
}

fn booking_not_found(booking_id: BookingId) -> CoreError {
    CoreError::not_found(format!("Booking with id={} not found", booking_id))
}
