use std::sync::Arc;
use shareit_core::{BookingEngine, Clock, InMemoryStore, ItemProjection};
use shareit_store::{DbClient, PgBookingRepository, PgCatalogRepository};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<BookingEngine>,
    pub projection: Arc<ItemProjection>,
}

impl AppState {
    /// Wires every collaborator to one process-local store.
    pub fn in_memory(store: Arc<InMemoryStore>, clock: Arc<dyn Clock>) -> Self {
        let engine = BookingEngine::new(store.clone(), store.clone(), store.clone(), clock.clone());
        let projection = ItemProjection::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store,
            clock,
        );

        Self {
            engine: Arc::new(engine),
            projection: Arc::new(projection),
        }
    }

    pub fn postgres(db: &DbClient, clock: Arc<dyn Clock>) -> Self {
        let bookings = Arc::new(PgBookingRepository::new(db.pool.clone()));
        let catalog = Arc::new(PgCatalogRepository::new(db.pool.clone()));

        let engine = BookingEngine::new(bookings.clone(), catalog.clone(), catalog.clone(), clock.clone());
        let projection = ItemProjection::new(
            catalog.clone(),
            bookings,
            catalog.clone(),
            catalog,
            clock,
        );

        Self {
            engine: Arc::new(engine),
            projection: Arc::new(projection),
        }
    }
}
