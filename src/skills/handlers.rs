use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{OnboardingRequest, SkillRequest, UserSkillsResponse},
    repo,
    repo_types::{SkillType, UserSkill},
    services,
};
use crate::{auth::jwt::AuthUser, error::AppResult, profiles::Profile, state::AppState};

pub fn skill_routes() -> Router<AppState> {
    Router::new()
        .route("/users/:id/skills", get(get_user_skills))
        .route("/me/skills", get(my_skills).post(add_skill).delete(remove_skill))
        .route("/me/onboarding", post(onboarding))
}

#[instrument(skip(state))]
pub async fn get_user_skills(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<UserSkillsResponse>> {
    let teaching = repo::get_user_skills_by_type(&state.db, user_id, SkillType::Teaching).await?;
    let learning = repo::get_user_skills_by_type(&state.db, user_id, SkillType::Learning).await?;
    Ok(Json(UserSkillsResponse { teaching, learning }))
}

#[instrument(skip(state))]
pub async fn my_skills(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<UserSkill>>> {
    Ok(Json(repo::list_user_skills(&state.db, user_id).await?))
}

#[instrument(skip(state, body))]
pub async fn add_skill(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<SkillRequest>,
) -> AppResult<StatusCode> {
    services::add(&state.db, user_id, &body.skill_name, body.skill_type).await?;
    Ok(StatusCode::CREATED)
}

#[instrument(skip(state, body))]
pub async fn remove_skill(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<SkillRequest>,
) -> AppResult<StatusCode> {
    services::remove(&state.db, user_id, &body.skill_name, body.skill_type).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, body))]
pub async fn onboarding(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<OnboardingRequest>,
) -> AppResult<Json<Profile>> {
    Ok(Json(
        services::complete_onboarding(&state.db, user_id, body).await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    #[test]
    fn user_skill_serializes_type_key() {
        let skill = UserSkill {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            skill_name: "Guitar".into(),
            skill_type: SkillType::Teaching,
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_value(&skill).unwrap();
        assert_eq!(json["type"], "teaching");
        assert_eq!(json["skill_name"], "Guitar");
    }

    #[test]
    fn skill_request_uses_type_key() {
        let req: SkillRequest =
            serde_json::from_str(r#"{"skill_name":"Go","type":"learning"}"#).unwrap();
        assert_eq!(req.skill_type, SkillType::Learning);
    }

    #[test]
    fn unknown_skill_type_is_rejected() {
        assert!(SkillType::try_from("mentoring".to_string()).is_err());
        assert_eq!(
            SkillType::try_from("teaching".to_string()).unwrap(),
            SkillType::Teaching
        );
    }
}
