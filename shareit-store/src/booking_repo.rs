use async_trait::async_trait;
use chrono::NaiveDateTime;
use shareit_core::models::{Booking, BookingDraft, BookingFilter, BookingStatus, ItemRef, UserRef};
use shareit_core::repository::{BookingRepository, RepoError, RepoResult};
use shareit_core::{BookingId, ItemId, UserId};
use sqlx::{PgPool, Postgres, QueryBuilder};

/// Bookings joined with the item (name, owner) and booker (name) they reference.
const SELECT_BOOKING: &str = r#"
    SELECT b.id, b.start_date, b.end_date, b.status,
           b.item_id, i.name AS item_name, i.owner_id,
           b.booker_id, u.name AS booker_name
    FROM bookings b
    JOIN items i ON i.id = b.item_id
    JOIN users u ON u.id = b.booker_id
"#;

const INSERT_BOOKING: &str = "INSERT INTO bookings (start_date, end_date, item_id, booker_id, status)
    VALUES ($1, $2, $3, $4, $5)
    RETURNING *";

/// Conditional on the current status; zero rows means someone else decided first.
const UPDATE_STATUS: &str = "UPDATE bookings SET status = $1
    WHERE id = $2 AND status = $3
    RETURNING *";

/// Runs `statement` as a CTE named `b` and reads the joined booking back from it.
fn returning_booking(statement: &str) -> String {
    format!(
        "WITH b AS ({}) {}",
        statement,
        SELECT_BOOKING.replace("FROM bookings b", "FROM b")
    )
}

fn last_for_item_sql() -> String {
    format!(
        "{} WHERE b.item_id = $1 AND b.status = 'APPROVED' AND b.start_date < $2
         ORDER BY b.end_date DESC, b.id DESC LIMIT 1",
        SELECT_BOOKING
    )
}

fn next_for_item_sql() -> String {
    format!(
        "{} WHERE b.item_id = $1 AND b.status = 'APPROVED' AND b.start_date > $2
         ORDER BY b.start_date ASC, b.id ASC LIMIT 1",
        SELECT_BOOKING
    )
}

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_filtered(
        &self,
        scope_column: &'static str,
        scope_id: UserId,
        filter: BookingFilter,
    ) -> RepoResult<Vec<Booking>> {
        let mut qb = filtered_query(scope_column, scope_id, filter);
        let rows: Vec<BookingRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn fetch_one(&self, sql: String, item_id: ItemId, now: NaiveDateTime) -> RepoResult<Option<Booking>> {
        let row: Option<BookingRow> = sqlx::query_as(&sql)
            .bind(item_id)
            .bind(now)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Booking::try_from).transpose()
    }
}

fn filtered_query(
    scope_column: &'static str,
    scope_id: UserId,
    filter: BookingFilter,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new(SELECT_BOOKING);
    qb.push(" WHERE ").push(scope_column).push(" = ").push_bind(scope_id);
    push_filter(&mut qb, filter);
    qb.push(" ORDER BY b.start_date DESC, b.id DESC");
    qb
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: BookingFilter) {
    match filter {
        BookingFilter::All => {}
        BookingFilter::ActiveAt(now) => {
            qb.push(" AND b.start_date < ").push_bind(now);
            qb.push(" AND b.end_date > ").push_bind(now);
        }
        BookingFilter::EndedBefore(now) => {
            qb.push(" AND b.end_date < ").push_bind(now);
        }
        BookingFilter::StartsAfter(now) => {
            qb.push(" AND b.start_date > ").push_bind(now);
        }
        BookingFilter::Status(status) => {
            qb.push(" AND b.status = ").push_bind(status.as_str());
        }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: i64,
    start_date: NaiveDateTime,
    end_date: NaiveDateTime,
    status: String,
    item_id: i64,
    item_name: String,
    owner_id: i64,
    booker_id: i64,
    booker_name: String,
}

impl TryFrom<BookingRow> for Booking {
    type Error = RepoError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let status: BookingStatus = row.status.parse()?;
        Ok(Booking {
            id: row.id,
            start: row.start_date,
            end: row.end_date,
            item: ItemRef {
                id: row.item_id,
                name: row.item_name,
            },
            booker: UserRef {
                id: row.booker_id,
                name: row.booker_name,
            },
            owner_id: row.owner_id,
            status,
        })
    }
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn insert(&self, draft: BookingDraft) -> RepoResult<Booking> {
        let sql = returning_booking(INSERT_BOOKING);

        let row: BookingRow = sqlx::query_as(&sql)
            .bind(draft.start)
            .bind(draft.end)
            .bind(draft.item.id)
            .bind(draft.booker.id)
            .bind(BookingStatus::Waiting.as_str())
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!("Inserted booking row {}", row.id);
        Booking::try_from(row)
    }

    async fn find_by_id(&self, id: BookingId) -> RepoResult<Option<Booking>> {
        let sql = format!("{} WHERE b.id = $1", SELECT_BOOKING);
        let row: Option<BookingRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Booking::try_from).transpose()
    }

    async fn transition_status(
        &self,
        id: BookingId,
        from: BookingStatus,
        to: BookingStatus,
    ) -> RepoResult<Option<Booking>> {
        // The row lock serializes racing decisions; only one sees `status = from`.
        let sql = returning_booking(UPDATE_STATUS);

        let row: Option<BookingRow> = sqlx::query_as(&sql)
            .bind(to.as_str())
            .bind(id)
            .bind(from.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Booking::try_from).transpose()
    }

    async fn find_by_booker(
        &self,
        booker_id: UserId,
        filter: BookingFilter,
    ) -> RepoResult<Vec<Booking>> {
        self.fetch_filtered("b.booker_id", booker_id, filter).await
    }

    async fn find_by_owner(
        &self,
        owner_id: UserId,
        filter: BookingFilter,
    ) -> RepoResult<Vec<Booking>> {
        self.fetch_filtered("i.owner_id", owner_id, filter).await
    }

    async fn last_for_item(&self, item_id: ItemId, now: NaiveDateTime) -> RepoResult<Option<Booking>> {
        self.fetch_one(last_for_item_sql(), item_id, now).await
    }

    async fn next_for_item(&self, item_id: ItemId, now: NaiveDateTime) -> RepoResult<Option<Booking>> {
        self.fetch_one(next_for_item_sql(), item_id, now).await
    }

    async fn has_completed_booking(
        &self,
        booker_id: UserId,
        item_id: ItemId,
        now: NaiveDateTime,
    ) -> RepoResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM bookings
                WHERE booker_id = $1 AND item_id = $2
                  AND status = 'APPROVED' AND end_date < $3
            )
            "#,
        )
        .bind(booker_id)
        .bind(item_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
