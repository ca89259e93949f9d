use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::{
    dto::OnboardingRequest,
    repo,
    repo_types::SkillType,
};
use crate::{
    error::{AppError, AppResult},
    profiles::Profile,
};

pub const MAX_SKILL_NAME_LEN: usize = 80;

pub fn normalize_skill_name(raw: &str) -> AppResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("Skill name cannot be empty"));
    }
    if name.chars().count() > MAX_SKILL_NAME_LEN {
        return Err(AppError::bad_request("Skill name is too long"));
    }
    Ok(name.to_string())
}

/// Flattens the selection into (name, type) pairs, dropping repeats.
pub fn onboarding_selection(req: &OnboardingRequest) -> AppResult<Vec<(String, SkillType)>> {
    let mut out: Vec<(String, SkillType)> = Vec::new();
    let tagged = req
        .teaching
        .iter()
        .map(|s| (s, SkillType::Teaching))
        .chain(req.learning.iter().map(|s| (s, SkillType::Learning)));
    for (raw, kind) in tagged {
        let name = normalize_skill_name(raw)?;
        if !out.iter().any(|(n, k)| *n == name && *k == kind) {
            out.push((name, kind));
        }
    }
    if out.is_empty() {
        return Err(AppError::bad_request(
            "Please select at least one skill you can teach or want to learn",
        ));
    }
    Ok(out)
}

pub async fn add(db: &PgPool, user_id: Uuid, raw_name: &str, kind: SkillType) -> AppResult<String> {
    let name = normalize_skill_name(raw_name)?;
    repo::add_user_skill(db, user_id, &name, kind).await?;
    info!(%user_id, skill = %name, kind = kind.as_str(), "skill added");
    Ok(name)
}

pub async fn remove(db: &PgPool, user_id: Uuid, raw_name: &str, kind: SkillType) -> AppResult<()> {
    let name = normalize_skill_name(raw_name)?;
    if !repo::remove_user_skill(db, user_id, &name, kind).await? {
        return Err(AppError::NotFound("Skill"));
    }
    info!(%user_id, skill = %name, kind = kind.as_str(), "skill removed");
    Ok(())
}

/// Stores the initial selection and marks the profile onboarded.
pub async fn complete_onboarding(
    db: &PgPool,
    user_id: Uuid,
    req: OnboardingRequest,
) -> AppResult<Profile> {
    let selection = onboarding_selection(&req)?;

    let mut tx = db.begin().await.map_err(anyhow::Error::from)?;
    for (name, kind) in &selection {
        repo::add_user_skill(&mut *tx, user_id, name, *kind).await?;
    }
    let profile = Profile::mark_onboarded_tx(&mut tx, user_id).await?;
    tx.commit().await.map_err(anyhow::Error::from)?;

    info!(%user_id, skills = selection.len(), "onboarding complete");
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skill_names_are_trimmed_and_bounded() {
        assert_eq!(normalize_skill_name("  Guitar ").unwrap(), "Guitar");
        assert!(normalize_skill_name("   ").is_err());
        assert!(normalize_skill_name(&"x".repeat(MAX_SKILL_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn onboarding_requires_a_skill() {
        let err = onboarding_selection(&OnboardingRequest {
            teaching: vec![],
            learning: vec![],
        })
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn onboarding_keeps_same_name_under_both_types_once_each() {
        let sel = onboarding_selection(&OnboardingRequest {
            teaching: vec!["Piano".into(), " Piano".into()],
            learning: vec!["Piano".into()],
        })
        .unwrap();
        assert_eq!(
            sel,
            vec![
                ("Piano".to_string(), SkillType::Teaching),
                ("Piano".to_string(), SkillType::Learning)
            ]
        );
    }
}
