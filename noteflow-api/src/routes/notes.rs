/// Note CRUD endpoints
///
/// All endpoints require authentication. The tenant is always taken from the
/// caller's token, never from the request, so every operation is confined to
/// the caller's own tenant. A note belonging to another tenant produces the
/// same 404 as a note that does not exist.
///
/// # Endpoints
///
/// - `POST /notes` - Create a note (subject to the tenant's plan cap)
/// - `GET /notes` - List the tenant's notes, newest first
/// - `GET /notes/:id` - Fetch a single note
/// - `PUT /notes/:id` - Update a note's title and/or content
/// - `DELETE /notes/:id` - Delete a note

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use noteflow_shared::{
    auth::middleware::CurrentUser,
    models::note::{CreateNote, Note, UpdateNote},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error message returned when a free tenant hits its note cap
const NOTE_LIMIT_MESSAGE: &str = "Note limit reached. Upgrade to Pro to add more notes.";

/// Note creation request
#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    /// Note title (defaults to empty)
    pub title: Option<String>,

    /// Note body (defaults to empty)
    pub content: Option<String>,
}

/// Note update request
///
/// Omitted fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateNoteRequest {
    /// New title
    pub title: Option<String>,

    /// New content
    pub content: Option<String>,
}

/// Note view returned by all note endpoints
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteResponse {
    /// Note ID
    pub id: Uuid,

    /// Note title
    pub title: String,

    /// Note body
    pub content: String,

    /// Owning tenant
    pub tenant_id: Uuid,

    /// Authoring user
    pub author_id: Uuid,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl From<Note> for NoteResponse {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            title: note.title,
            content: note.content,
            tenant_id: note.tenant_id,
            author_id: note.author_id,
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}

/// Response for a successful deletion
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteNoteResponse {
    /// Always true
    pub deleted: bool,
}

/// Note creation endpoint
///
/// Creates a note in the caller's tenant. Free-plan tenants are limited by
/// their note cap; the cap check and the insert run under a per-tenant row
/// lock, so concurrent requests cannot slip past the limit together.
///
/// # Endpoint
///
/// ```text
/// POST /notes
/// Authorization: Bearer <token>
/// Content-Type: application/json
///
/// { "title": "Standup", "content": "Ship the release" }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid token
/// - `403 Forbidden`: Tenant is at its note cap
pub async fn create_note(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<CreateNoteRequest>,
) -> ApiResult<Json<NoteResponse>> {
    let note = Note::create_if_under_cap(
        &state.db,
        CreateNote {
            tenant_id: current.tenant.id,
            author_id: current.user.id,
            title: req.title.unwrap_or_default(),
            content: req.content.unwrap_or_default(),
        },
        current.tenant.max_notes,
    )
    .await?
    .ok_or_else(|| ApiError::Forbidden(NOTE_LIMIT_MESSAGE.to_string()))?;

    tracing::debug!(note_id = %note.id, tenant_id = %note.tenant_id, "Note created");

    Ok(Json(note.into()))
}

/// Note list endpoint
///
/// Returns every note in the caller's tenant, newest first.
pub async fn list_notes(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<NoteResponse>>> {
    let notes = Note::list_by_tenant(&state.db, current.tenant.id).await?;

    Ok(Json(notes.into_iter().map(NoteResponse::from).collect()))
}

/// Single note endpoint
///
/// # Errors
///
/// - `404 Not Found`: No such note in the caller's tenant
pub async fn get_note(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<NoteResponse>> {
    let note = Note::find_scoped(&state.db, id, current.tenant.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Note not found".to_string()))?;

    Ok(Json(note.into()))
}

/// Note update endpoint
///
/// Updates the provided fields and bumps `updatedAt`.
///
/// # Errors
///
/// - `404 Not Found`: No such note in the caller's tenant
pub async fn update_note(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateNoteRequest>,
) -> ApiResult<Json<NoteResponse>> {
    let note = Note::update_scoped(
        &state.db,
        id,
        current.tenant.id,
        UpdateNote {
            title: req.title,
            content: req.content,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Note not found".to_string()))?;

    Ok(Json(note.into()))
}

/// Note deletion endpoint
///
/// # Errors
///
/// - `404 Not Found`: No such note in the caller's tenant
pub async fn delete_note(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteNoteResponse>> {
    let deleted = Note::delete_scoped(&state.db, id, current.tenant.id).await?;

    if !deleted {
        return Err(ApiError::NotFound("Note not found".to_string()));
    }

    tracing::debug!(note_id = %id, tenant_id = %current.tenant.id, "Note deleted");

    Ok(Json(DeleteNoteResponse { deleted: true }))
}
