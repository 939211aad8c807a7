use crate::api::AppState;
use crate::api::middleware::{AppJson, BasicAuth};
use crate::api::schemas::messaging::{IncomingMessage, PostQuery};
use crate::error::Result;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

/// Posts a new message, scheduled for automatic destruction.
///
/// # Errors
/// Returns `AppError::Auth` on missing or invalid credentials.
/// Returns `AppError::Validation` if the message length or expiry override
/// is out of bounds.
pub async fn post_message(
    _auth: BasicAuth,

    State(state): State<AppState>,

    Query(query): Query<PostQuery>,

    AppJson(payload): AppJson<IncomingMessage>,
) -> Result<impl IntoResponse> {
    let record = state.message_service.create(&payload.message, query.test_expiry).await?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// Fetches a message by id if it hasn't expired.
///
/// # Errors
/// Returns `AppError::NotFound` for expired and never-issued ids alike.
pub async fn get_message(State(state): State<AppState>, Path(message_id): Path<String>) -> Result<impl IntoResponse> {
    let record = state.message_service.fetch(&message_id).await?;

    Ok(Json(record))
}
