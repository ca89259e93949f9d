use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::buckets::{self, SearchResults, PROFILE_POOL};
use crate::{
    auth::jwt::AuthUser,
    error::AppResult,
    profiles::{Profile, PublicProfile},
    state::AppState,
};

const SEARCH_USERS_LIMIT: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct BucketQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchUsersQuery {
    #[serde(default)]
    pub query: String,
}

pub fn search_routes() -> Router<AppState> {
    Router::new()
        .route("/search", get(bucketed_search))
        .route("/users/search", get(search_users))
}

#[instrument(skip(state))]
pub async fn bucketed_search(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<BucketQuery>,
) -> AppResult<Json<SearchResults>> {
    if params.q.trim().is_empty() {
        return Ok(Json(SearchResults::default()));
    }
    let pool = Profile::list(&state.db, PROFILE_POOL).await?;
    let results = buckets::bucket(&pool, &params.q, user_id);
    debug!(
        usernames = results.username_matches.len(),
        names = results.name_matches.len(),
        "search buckets"
    );
    Ok(Json(results))
}

#[instrument(skip(state))]
pub async fn search_users(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(params): Query<SearchUsersQuery>,
) -> AppResult<Json<Vec<PublicProfile>>> {
    let query = params.query.trim();
    if query.is_empty() {
        return Ok(Json(Vec::new()));
    }
    let profiles = Profile::search(&state.db, query, SEARCH_USERS_LIMIT).await?;
    Ok(Json(profiles.into_iter().map(PublicProfile::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::JwtKeys;
    use axum::{body::Body, extract::FromRef, http::{Request, StatusCode}};
    use tower::ServiceExt;

    #[tokio::test]
    async fn blank_query_short_circuits() {
        let state = AppState::fake();
        let token = JwtKeys::from_ref(&state).sign_access(uuid::Uuid::new_v4()).unwrap();

        let res = crate::app::build_app(state)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/search?q=%20%20")
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }
}
