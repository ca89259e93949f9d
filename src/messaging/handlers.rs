use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    conversations::ConversationSummary,
    dto::{CanMessageResponse, History, SendMessageRequest, UnreadResponse},
    repo_types::Message,
    services,
};
use crate::{auth::jwt::AuthUser, error::AppResult, state::AppState};

pub fn message_routes() -> Router<AppState> {
    Router::new()
        .route("/messages", post(send_message))
        .route("/messages/unread", get(unread_count))
        .route("/messages/:other_id", get(history))
        .route("/messages/:other_id/can", get(can_message))
        .route("/conversations", get(conversations))
}

#[instrument(skip(state, body))]
pub async fn send_message(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<SendMessageRequest>,
) -> AppResult<(StatusCode, Json<Message>)> {
    let message = services::send(&state, user_id, body.receiver_id, &body.content).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

#[instrument(skip(state))]
pub async fn history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(other_id): Path<Uuid>,
) -> AppResult<Json<History>> {
    Ok(Json(services::history(&state, user_id, other_id).await?))
}

#[instrument(skip(state))]
pub async fn can_message(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(other_id): Path<Uuid>,
) -> AppResult<Json<CanMessageResponse>> {
    let can_message = services::can_message(&state, user_id, other_id).await?;
    Ok(Json(CanMessageResponse { can_message }))
}

#[instrument(skip(state))]
pub async fn conversations(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<ConversationSummary>>> {
    Ok(Json(services::conversations(&state, user_id).await?))
}

#[instrument(skip(state))]
pub async fn unread_count(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<UnreadResponse>> {
    let count = services::unread_count(&state, user_id).await?;
    Ok(Json(UnreadResponse { count }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::JwtKeys;
    use axum::{body::Body, extract::FromRef, http::Request};
    use tower::ServiceExt;

    #[tokio::test]
    async fn blank_message_is_rejected_before_gate_check() {
        let state = AppState::fake();
        let token = JwtKeys::from_ref(&state).sign_access(Uuid::new_v4()).unwrap();
        let receiver = Uuid::new_v4();

        let res = crate::app::build_app(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/messages")
                    .header("authorization", format!("Bearer {token}"))
                    .header("content-type", "application/json")
                    .body(Body::from(format!(
                        r#"{{"receiver_id":"{receiver}","content":"   "}}"#
                    )))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn conversations_require_auth() {
        let res = crate::app::build_app(AppState::fake())
            .oneshot(
                Request::builder()
                    .uri("/api/v1/conversations")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
