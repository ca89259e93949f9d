use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{ListQuery, UpdateProfileRequest};
use super::repo_types::{Profile, PublicProfile};
use super::services::{self, MAX_LIST_LIMIT};
use crate::{auth::jwt::AuthUser, error::AppResult, state::AppState};

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me).patch(update_me))
        .route("/profiles", get(list_profiles))
        .route("/profiles/:id", get(get_profile))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Profile>> {
    Ok(Json(services::get_profile(&state.db, user_id).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<Profile>> {
    let profile = services::update_profile(&state.db, user_id, payload).await?;
    Ok(Json(profile))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PublicProfile>> {
    Ok(Json(services::get_profile(&state.db, id).await?.into()))
}

#[instrument(skip(state))]
pub async fn list_profiles(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(q): Query<ListQuery>,
) -> AppResult<Json<Vec<PublicProfile>>> {
    let limit = q.limit.clamp(1, MAX_LIST_LIMIT);
    let profiles = Profile::list(&state.db, limit).await?;
    Ok(Json(profiles.into_iter().map(PublicProfile::from).collect()))
}
