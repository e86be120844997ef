use async_trait::async_trait;
use chrono::NaiveDateTime;
use shareit_core::models::{Comment, Item, User};
use shareit_core::repository::{CommentStore, ItemCatalog, RepoResult, UserDirectory};
use shareit_core::{ItemId, UserId};
use shareit_shared::Masked;
use sqlx::PgPool;

/// Read-only access to the users, items and comments tables owned by the
/// account and catalog services.
pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: Masked::new(row.email),
        }
    }
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: i64,
    name: String,
    description: String,
    is_available: bool,
    owner_id: i64,
    request_id: Option<i64>,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Item {
            id: row.id,
            name: row.name,
            description: row.description,
            available: row.is_available,
            owner_id: row.owner_id,
            request_id: row.request_id,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    text: String,
    item_id: i64,
    author_name: String,
    created: NaiveDateTime,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            text: row.text,
            item_id: row.item_id,
            author_name: row.author_name,
            created: row.created,
        }
    }
}

#[async_trait]
impl UserDirectory for PgCatalogRepository {
    async fn user_exists(&self, id: UserId) -> RepoResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn find_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as("SELECT id, name, email FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }
}

#[async_trait]
impl ItemCatalog for PgCatalogRepository {
    async fn find_item(&self, id: ItemId) -> RepoResult<Option<Item>> {
        let row: Option<ItemRow> = sqlx::query_as(
            "SELECT id, name, description, is_available, owner_id, request_id FROM items WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Item::from))
    }

    async fn items_by_owner(&self, owner_id: UserId) -> RepoResult<Vec<Item>> {
        let rows: Vec<ItemRow> = sqlx::query_as(
            r#"
            SELECT id, name, description, is_available, owner_id, request_id
            FROM items
            WHERE owner_id = $1
            ORDER BY id
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Item::from).collect())
    }
}

#[async_trait]
impl CommentStore for PgCatalogRepository {
    async fn comments_for_item(&self, item_id: ItemId) -> RepoResult<Vec<Comment>> {
        let rows: Vec<CommentRow> = sqlx::query_as(
            r#"
            SELECT c.id, c.text, c.item_id, u.name AS author_name, c.created
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.item_id = $1
            ORDER BY c.id
            "#,
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Comment::from).collect())
    }
}
