use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::middleware::CurrentUser;
use crate::error::ApiError;
use crate::models::*;
use crate::AppState;

// ============================================================
// Envelope helpers
// ============================================================

fn ok_data<T: Serialize>(data: T) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

fn ok_list<T: Serialize>(items: Vec<T>) -> Json<Value> {
    Json(json!({ "success": true, "count": items.len(), "data": items }))
}

fn created<T: Serialize>(data: T) -> (StatusCode, Json<Value>) {
    (StatusCode::CREATED, ok_data(data))
}

/// Malformed ids are indistinguishable from absent ones: both are a 404.
fn parse_id(raw: &str, message: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(message.to_string()))
}

/// Raw list-query parameters as they arrive on the wire.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
    pub tags: Option<String>,
    pub favorite: Option<String>,
}

impl ListQuery {
    fn into_filter(self) -> ResourceFilter {
        ResourceFilter::from_params(self.q.as_deref(), self.tags.as_deref(), self.favorite.as_deref())
    }
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "OK", "message": "Server is running" }))
}

// ============================================================
// Auth
// ============================================================

pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (token, user) = state.auth.register(input)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "token": token, "user": user })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> Result<Json<Value>, ApiError> {
    let (token, user) = state.auth.login(input)?;
    Ok(Json(json!({ "success": true, "token": token, "user": user })))
}

pub async fn current_user(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Result<Json<Value>, ApiError> {
    state.auth.current_user(user_id).map(ok_data)
}

// ============================================================
// Notes
// ============================================================

pub async fn list_notes(
    State(state): State<AppState>,
    Extension(CurrentUser(owner)): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    state
        .notes
        .list(owner, &query.into_filter())
        .map(ok_list)
}

pub async fn get_note(
    State(state): State<AppState>,
    Extension(CurrentUser(owner)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id, "Note not found")?;
    state.notes.get(owner, id).map(ok_data)
}

pub async fn create_note(
    State(state): State<AppState>,
    Extension(CurrentUser(owner)): Extension<CurrentUser>,
    Json(input): Json<CreateNoteInput>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    state.notes.create(owner, input).map(created)
}

pub async fn update_note(
    State(state): State<AppState>,
    Extension(CurrentUser(owner)): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(input): Json<UpdateNoteInput>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id, "Note not found")?;
    state.notes.update(owner, id, input).map(ok_data)
}

pub async fn delete_note(
    State(state): State<AppState>,
    Extension(CurrentUser(owner)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id, "Note not found")?;
    state.notes.delete(owner, id)?;
    Ok(ok_data(json!({})))
}

pub async fn toggle_note_favorite(
    State(state): State<AppState>,
    Extension(CurrentUser(owner)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id, "Note not found")?;
    state.notes.toggle_favorite(owner, id).map(ok_data)
}

// ============================================================
// Bookmarks
// ============================================================

pub async fn list_bookmarks(
    State(state): State<AppState>,
    Extension(CurrentUser(owner)): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    state
        .bookmarks
        .list(owner, &query.into_filter())
        .map(ok_list)
}

pub async fn get_bookmark(
    State(state): State<AppState>,
    Extension(CurrentUser(owner)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id, "Bookmark not found")?;
    state.bookmarks.get(owner, id).map(ok_data)
}

pub async fn create_bookmark(
    State(state): State<AppState>,
    Extension(CurrentUser(owner)): Extension<CurrentUser>,
    Json(input): Json<CreateBookmarkInput>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    state.bookmarks.create(owner, input).await.map(created)
}

pub async fn update_bookmark(
    State(state): State<AppState>,
    Extension(CurrentUser(owner)): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(input): Json<UpdateBookmarkInput>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id, "Bookmark not found")?;
    state.bookmarks.update(owner, id, input).map(ok_data)
}

pub async fn delete_bookmark(
    State(state): State<AppState>,
    Extension(CurrentUser(owner)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id, "Bookmark not found")?;
    state.bookmarks.delete(owner, id)?;
    Ok(ok_data(json!({})))
}

pub async fn toggle_bookmark_favorite(
    State(state): State<AppState>,
    Extension(CurrentUser(owner)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id, "Bookmark not found")?;
    state.bookmarks.toggle_favorite(owner, id).map(ok_data)
}

/// Request body for the metadata probe.
#[derive(Debug, Default, Deserialize)]
pub struct FetchMetadataInput {
    #[serde(default)]
    pub url: String,
}

pub async fn fetch_metadata(
    State(state): State<AppState>,
    Json(input): Json<FetchMetadataInput>,
) -> Result<Json<Value>, ApiError> {
    state.bookmarks.fetch_metadata(&input.url).await.map(ok_data)
}
