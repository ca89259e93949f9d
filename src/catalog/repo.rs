use anyhow::Context;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{NewSkill, Session, Skill};

const SKILL_COLUMNS: &str = "id, teacher_id, title, description, category, level, duration, \
     price, image_url, created_at, updated_at";
const SESSION_COLUMNS: &str =
    "id, skill_id, teacher_id, student_id, date, duration, status, created_at, updated_at";

pub const SCHEDULED: &str = "scheduled";

impl Skill {
    pub async fn list(
        db: &PgPool,
        category: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<Skill>> {
        let sql = format!(
            "SELECT {SKILL_COLUMNS} FROM skills \
             WHERE ($1::text IS NULL OR category = $1) \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, Skill>(&sql)
            .bind(category)
            .bind(limit)
            .bind(offset)
            .fetch_all(db)
            .await
            .context("list skills")?;
        Ok(rows)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Skill>> {
        let sql = format!("SELECT {SKILL_COLUMNS} FROM skills WHERE id = $1");
        let row = sqlx::query_as::<_, Skill>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await
            .context("find skill")?;
        Ok(row)
    }

    pub async fn create(db: &PgPool, teacher_id: Uuid, new: &NewSkill) -> anyhow::Result<Skill> {
        let sql = format!(
            "INSERT INTO skills (teacher_id, title, description, category, level, duration, price, image_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {SKILL_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Skill>(&sql)
            .bind(teacher_id)
            .bind(&new.title)
            .bind(&new.description)
            .bind(&new.category)
            .bind(new.level.as_deref())
            .bind(new.duration)
            .bind(new.price)
            .bind(new.image_url.as_deref())
            .fetch_one(db)
            .await
            .context("insert skill")?;
        Ok(row)
    }
}

impl Session {
    /// Sessions where the user teaches or attends, soonest first.
    pub async fn list_for(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Session>> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM sessions \
             WHERE teacher_id = $1 OR student_id = $1 \
             ORDER BY date ASC"
        );
        let rows = sqlx::query_as::<_, Session>(&sql)
            .bind(user_id)
            .fetch_all(db)
            .await
            .context("list sessions")?;
        Ok(rows)
    }

    pub async fn book(
        db: &PgPool,
        skill: &Skill,
        student_id: Uuid,
        date: OffsetDateTime,
    ) -> anyhow::Result<Session> {
        let sql = format!(
            "INSERT INTO sessions (skill_id, teacher_id, student_id, date, duration, status) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {SESSION_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Session>(&sql)
            .bind(skill.id)
            .bind(skill.teacher_id)
            .bind(student_id)
            .bind(date)
            .bind(skill.duration)
            .bind(SCHEDULED)
            .fetch_one(db)
            .await
            .context("insert session")?;
        Ok(row)
    }
}
