use anyhow::Context;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::repo_types::{Profile, ProfileChanges};

const PROFILE_COLUMNS: &str = "id, email, name, username, avatar_url, bio, is_teacher, \
     is_onboarded, role, contact_info, created_at, updated_at";

impl Profile {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Profile>> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1");
        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await
            .context("find profile by id")?;
        Ok(profile)
    }

    /// Up to `limit` profiles, oldest first.
    pub async fn list(db: &PgPool, limit: i64) -> anyhow::Result<Vec<Profile>> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY created_at ASC LIMIT $1");
        let rows = sqlx::query_as::<_, Profile>(&sql)
            .bind(limit)
            .fetch_all(db)
            .await
            .context("list profiles")?;
        Ok(rows)
    }

    /// Case-insensitive match on name or username.
    pub async fn search(db: &PgPool, query: &str, limit: i64) -> anyhow::Result<Vec<Profile>> {
        let sql = format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles \
             WHERE name ILIKE $1 OR username ILIKE $1 \
             ORDER BY name ASC LIMIT $2"
        );
        let pattern = format!("%{}%", escape_like(query));
        let rows = sqlx::query_as::<_, Profile>(&sql)
            .bind(pattern)
            .bind(limit)
            .fetch_all(db)
            .await
            .context("search profiles")?;
        Ok(rows)
    }

    /// Whether some profile other than `except` holds `username`.
    pub async fn username_taken(
        db: &PgPool,
        username: &str,
        except: Option<Uuid>,
    ) -> anyhow::Result<bool> {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM profiles
                WHERE username = $1 AND ($2::uuid IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(username)
        .bind(except)
        .fetch_one(db)
        .await
        .context("check username")?;
        Ok(taken)
    }

    pub async fn create_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        email: &str,
        name: &str,
        username: &str,
    ) -> anyhow::Result<Profile> {
        let sql = format!(
            "INSERT INTO profiles (id, email, name, username) \
             VALUES ($1, $2, $3, $4) RETURNING {PROFILE_COLUMNS}"
        );
        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .bind(email)
            .bind(name)
            .bind(username)
            .fetch_one(&mut **tx)
            .await
            .context("insert profile")?;
        Ok(profile)
    }

    pub async fn update(
        db: &PgPool,
        id: Uuid,
        changes: &ProfileChanges,
    ) -> anyhow::Result<Option<Profile>> {
        let sql = format!(
            "UPDATE profiles SET \
                name = COALESCE($2, name), \
                username = COALESCE($3, username), \
                bio = COALESCE($4, bio), \
                avatar_url = COALESCE($5, avatar_url), \
                is_teacher = COALESCE($6, is_teacher), \
                updated_at = now() \
             WHERE id = $1 RETURNING {PROFILE_COLUMNS}"
        );
        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .bind(changes.name.as_deref())
            .bind(changes.username.as_deref())
            .bind(changes.bio.as_deref())
            .bind(changes.avatar_url.as_deref())
            .bind(changes.is_teacher)
            .fetch_optional(db)
            .await
            .context("update profile")?;
        Ok(profile)
    }

    pub async fn mark_onboarded_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> anyhow::Result<Profile> {
        let sql = format!(
            "UPDATE profiles SET is_onboarded = TRUE, updated_at = now() \
             WHERE id = $1 RETURNING {PROFILE_COLUMNS}"
        );
        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .fetch_one(&mut **tx)
            .await
            .context("mark profile onboarded")?;
        Ok(profile)
    }
}

fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
