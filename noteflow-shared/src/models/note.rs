/// Note model and database operations
///
/// Notes are the tenant-scoped resource of the system. Every operation on an
/// existing note filters on BOTH the note id and the caller's tenant id, so a
/// cross-tenant access is indistinguishable from a missing note.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE notes (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title TEXT NOT NULL DEFAULT '',
///     content TEXT NOT NULL DEFAULT '',
///     tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
///     author_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Note model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Note {
    /// Unique note ID (UUID v4)
    pub id: Uuid,

    /// Note title (may be empty)
    pub title: String,

    /// Note body (may be empty)
    pub content: String,

    /// Owning tenant
    pub tenant_id: Uuid,

    /// User who created the note
    pub author_id: Uuid,

    /// When the note was created
    pub created_at: DateTime<Utc>,

    /// When the note was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new note
///
/// Tenant and author are stamped from the authenticated request context,
/// never taken from the request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNote {
    /// Owning tenant
    pub tenant_id: Uuid,

    /// Authoring user
    pub author_id: Uuid,

    /// Note title
    pub title: String,

    /// Note body
    pub content: String,
}

/// Input for updating an existing note
///
/// Only non-None fields are updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateNote {
    /// New title
    pub title: Option<String>,

    /// New content
    pub content: Option<String>,
}

impl Note {
    /// Creates a note if the tenant is under its note cap
    ///
    /// The cap check and the insert run in one transaction that first locks
    /// the tenant row (`SELECT ... FOR UPDATE`). Concurrent creations for
    /// the same tenant serialize on that lock, so the count each one reads
    /// already includes every previously committed insert and the cap
    /// cannot be overshot. A plain conditional insert would not be enough:
    /// under READ COMMITTED two statements can both count the same
    /// pre-insert snapshot.
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `data` - Note creation data
    /// * `max_notes` - The tenant's note cap (0 = unlimited)
    ///
    /// # Returns
    ///
    /// The created note, or None if the tenant is already at its cap
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use noteflow_shared::models::note::{CreateNote, Note};
    /// # use sqlx::PgPool;
    /// # use uuid::Uuid;
    /// # async fn example(pool: PgPool, tenant_id: Uuid, author_id: Uuid) -> Result<(), sqlx::Error> {
    /// let created = Note::create_if_under_cap(&pool, CreateNote {
    ///     tenant_id,
    ///     author_id,
    ///     title: "Hello".to_string(),
    ///     content: "World".to_string(),
    /// }, 3).await?;
    ///
    /// if created.is_none() {
    ///     println!("Note limit reached");
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create_if_under_cap(
        pool: &PgPool,
        data: CreateNote,
        max_notes: i32,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // Serialize cap checks per tenant
        sqlx::query("SELECT id FROM tenants WHERE id = $1 FOR UPDATE")
            .bind(data.tenant_id)
            .execute(&mut *tx)
            .await?;

        if max_notes > 0 {
            let (count,): (i64,) =
                sqlx::query_as("SELECT COUNT(*) FROM notes WHERE tenant_id = $1")
                    .bind(data.tenant_id)
                    .fetch_one(&mut *tx)
                    .await?;

            if count >= i64::from(max_notes) {
                tx.rollback().await?;
                return Ok(None);
            }
        }

        let note = sqlx::query_as::<_, Note>(
            r#"
            INSERT INTO notes (title, content, tenant_id, author_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, content, tenant_id, author_id, created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.content)
        .bind(data.tenant_id)
        .bind(data.author_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(note))
    }

    /// Lists all notes belonging to a tenant, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails
    pub async fn list_by_tenant(pool: &PgPool, tenant_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let notes = sqlx::query_as::<_, Note>(
            r#"
            SELECT id, title, content, tenant_id, author_id, created_at, updated_at
            FROM notes
            WHERE tenant_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(tenant_id)
        .fetch_all(pool)
        .await?;

        Ok(notes)
    }

    /// Finds a note by id, scoped to a tenant
    ///
    /// # Returns
    ///
    /// The note if it exists AND belongs to the tenant, None otherwise
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails
    pub async fn find_scoped(
        pool: &PgPool,
        id: Uuid,
        tenant_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let note = sqlx::query_as::<_, Note>(
            r#"
            SELECT id, title, content, tenant_id, author_id, created_at, updated_at
            FROM notes
            WHERE id = $1 AND tenant_id = $2
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(pool)
        .await?;

        Ok(note)
    }

    /// Updates a note, scoped to a tenant
    ///
    /// Only non-None fields in `data` are updated; `updated_at` is bumped.
    /// If neither field is provided the note is returned unchanged (aside
    /// from the timestamp bump).
    ///
    /// # Returns
    ///
    /// The updated note if it exists AND belongs to the tenant, None otherwise
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails
    pub async fn update_scoped(
        pool: &PgPool,
        id: Uuid,
        tenant_id: Uuid,
        data: UpdateNote,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE notes SET updated_at = NOW()");
        let mut bind_count = 2;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.content.is_some() {
            bind_count += 1;
            query.push_str(&format!(", content = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 AND tenant_id = $2 \
             RETURNING id, title, content, tenant_id, author_id, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Note>(&query).bind(id).bind(tenant_id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(content) = data.content {
            q = q.bind(content);
        }

        let note = q.fetch_optional(pool).await?;

        Ok(note)
    }

    /// Deletes a note, scoped to a tenant
    ///
    /// # Returns
    ///
    /// True if a note was deleted, false if no note matched (missing or
    /// belonging to another tenant)
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails
    pub async fn delete_scoped(
        pool: &PgPool,
        id: Uuid,
        tenant_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
