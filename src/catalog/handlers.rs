use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{BookSessionRequest, CreateSkillRequest, SkillQuery},
    repo_types::{Session, Skill},
    services,
};
use crate::{
    auth::jwt::AuthUser,
    error::{AppError, AppResult},
    state::AppState,
};

const MAX_PAGE: i64 = 100;

pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/skills", get(list_skills).post(create_skill))
        .route("/skills/:id", get(get_skill))
        .route("/sessions", get(list_sessions).post(book_session))
}

#[instrument(skip(state))]
pub async fn list_skills(
    State(state): State<AppState>,
    Query(q): Query<SkillQuery>,
) -> AppResult<Json<Vec<Skill>>> {
    let category = q.category.as_deref().map(str::trim).filter(|c| !c.is_empty());
    let skills = Skill::list(
        &state.db,
        category,
        q.limit.clamp(1, MAX_PAGE),
        q.offset.max(0),
    )
    .await?;
    Ok(Json(skills))
}

#[instrument(skip(state))]
pub async fn get_skill(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Skill>> {
    let skill = Skill::find_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Skill"))?;
    Ok(Json(skill))
}

#[instrument(skip(state, body))]
pub async fn create_skill(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateSkillRequest>,
) -> AppResult<(StatusCode, Json<Skill>)> {
    let skill = services::create_skill(&state, user_id, body).await?;
    Ok((StatusCode::CREATED, Json(skill)))
}

#[instrument(skip(state))]
pub async fn list_sessions(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<Session>>> {
    Ok(Json(Session::list_for(&state.db, user_id).await?))
}

#[instrument(skip(state))]
pub async fn book_session(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<BookSessionRequest>,
) -> AppResult<(StatusCode, Json<Session>)> {
    let session = services::book_session(&state, user_id, body).await?;
    Ok((StatusCode::CREATED, Json(session)))
}
