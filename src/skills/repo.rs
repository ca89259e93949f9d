use anyhow::Context;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use super::repo_types::{SkillType, UserSkill};

/// Appends a skill; an identical (user, name, type) row is left as is.
/// Runs on the pool or inside a caller's transaction.
pub async fn add_user_skill<'e, E>(
    executor: E,
    user_id: Uuid,
    skill_name: &str,
    skill_type: SkillType,
) -> anyhow::Result<()>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        r#"
        INSERT INTO user_skills (user_id, skill_name, type)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, skill_name, type) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(skill_name)
    .bind(skill_type.as_str())
    .execute(executor)
    .await
    .context("add user skill")?;
    Ok(())
}

/// Returns whether a row was removed.
pub async fn remove_user_skill(
    db: &PgPool,
    user_id: Uuid,
    skill_name: &str,
    skill_type: SkillType,
) -> anyhow::Result<bool> {
    let res = sqlx::query(
        r#"
        DELETE FROM user_skills
        WHERE user_id = $1 AND skill_name = $2 AND type = $3
        "#,
    )
    .bind(user_id)
    .bind(skill_name)
    .bind(skill_type.as_str())
    .execute(db)
    .await
    .context("remove user skill")?;
    Ok(res.rows_affected() > 0)
}

pub async fn get_user_skills_by_type(
    db: &PgPool,
    user_id: Uuid,
    skill_type: SkillType,
) -> anyhow::Result<Vec<String>> {
    let names = sqlx::query_scalar::<_, String>(
        r#"
        SELECT skill_name
          FROM user_skills
         WHERE user_id = $1 AND type = $2
         ORDER BY created_at ASC
        "#,
    )
    .bind(user_id)
    .bind(skill_type.as_str())
    .fetch_all(db)
    .await
    .context("list user skills by type")?;
    Ok(names)
}

pub async fn list_user_skills(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<UserSkill>> {
    let rows = sqlx::query_as::<_, UserSkill>(
        r#"
        SELECT id, user_id, skill_name, type, created_at
          FROM user_skills
         WHERE user_id = $1
         ORDER BY created_at ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("list user skills")?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    #[tokio::test]
    async fn add_user_skill_surfaces_pool_errors() {
        let state = AppState::fake();
        let err = add_user_skill(&state.db, Uuid::new_v4(), "Go", SkillType::Learning)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("add user skill"));
    }
}
