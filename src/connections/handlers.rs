use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{CreateConnectionRequest, CreatedConnectionResponse, RespondRequest, StatusResponse},
    repo_types::{ConnectionPeer, PendingConnection},
    services,
};
use crate::{auth::jwt::AuthUser, error::AppResult, state::AppState};

pub fn connection_routes() -> Router<AppState> {
    Router::new()
        .route("/connections", get(list_connections).post(create_connection))
        .route("/connections/pending", get(pending_connections))
        .route("/connections/status/:other_id", get(connection_status))
        .route("/connections/:id/respond", post(respond))
}

#[instrument(skip(state))]
pub async fn create_connection(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateConnectionRequest>,
) -> AppResult<(StatusCode, HeaderMap, Json<CreatedConnectionResponse>)> {
    let connection = services::create_connection(&state, user_id, body.receiver_id).await?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&status_location(body.receiver_id)) {
        headers.insert(header::LOCATION, location);
    }

    Ok((
        StatusCode::CREATED,
        headers,
        Json(CreatedConnectionResponse { id: connection.id }),
    ))
}

fn status_location(other_id: Uuid) -> String {
    format!("{}/connections/status/{other_id}", crate::app::API_PREFIX)
}

#[instrument(skip(state))]
pub async fn list_connections(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<ConnectionPeer>>> {
    Ok(Json(services::connections(&state, user_id).await?))
}

#[instrument(skip(state))]
pub async fn pending_connections(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<PendingConnection>>> {
    Ok(Json(services::pending_connections(&state, user_id).await?))
}

#[instrument(skip(state))]
pub async fn connection_status(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(other_id): Path<Uuid>,
) -> AppResult<Json<StatusResponse>> {
    let status = services::connection_status(&state, user_id, other_id).await?;
    Ok(Json(StatusResponse { status }))
}

#[instrument(skip(state))]
pub async fn respond(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<RespondRequest>,
) -> AppResult<StatusCode> {
    services::respond(&state, user_id, id, body.status).await?;
    Ok(StatusCode::NO_CONTENT)
}
