use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::Message;

const MESSAGE_COLUMNS: &str = "id, sender_id, receiver_id, content, read, created_at";

impl Message {
    pub async fn create(
        db: &PgPool,
        sender_id: Uuid,
        receiver_id: Uuid,
        content: &str,
    ) -> anyhow::Result<Message> {
        let sql = format!(
            "INSERT INTO messages (sender_id, receiver_id, content, read) \
             VALUES ($1, $2, $3, FALSE) RETURNING {MESSAGE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Message>(&sql)
            .bind(sender_id)
            .bind(receiver_id)
            .bind(content)
            .fetch_one(db)
            .await
            .context("insert message")?;
        Ok(row)
    }

    /// Full history between two users, oldest first.
    pub async fn between(db: &PgPool, a: Uuid, b: Uuid) -> anyhow::Result<Vec<Message>> {
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages \
             WHERE (sender_id = $1 AND receiver_id = $2) \
                OR (sender_id = $2 AND receiver_id = $1) \
             ORDER BY created_at ASC"
        );
        let rows = sqlx::query_as::<_, Message>(&sql)
            .bind(a)
            .bind(b)
            .fetch_all(db)
            .await
            .context("list messages between users")?;
        Ok(rows)
    }

    /// Latest messages involving `user_id`, newest first.
    pub async fn recent_for(db: &PgPool, user_id: Uuid, limit: i64) -> anyhow::Result<Vec<Message>> {
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages \
             WHERE sender_id = $1 OR receiver_id = $1 \
             ORDER BY created_at DESC LIMIT $2"
        );
        let rows = sqlx::query_as::<_, Message>(&sql)
            .bind(user_id)
            .bind(limit)
            .fetch_all(db)
            .await
            .context("list recent messages")?;
        Ok(rows)
    }

    /// Marks the given messages read when addressed to `receiver_id`.
    pub async fn mark_read(
        db: &PgPool,
        receiver_id: Uuid,
        ids: &[Uuid],
    ) -> anyhow::Result<Vec<Message>> {
        let sql = format!(
            "UPDATE messages SET read = TRUE \
             WHERE receiver_id = $1 AND id = ANY($2) AND NOT read \
             RETURNING {MESSAGE_COLUMNS}"
        );
        let rows = sqlx::query_as::<_, Message>(&sql)
            .bind(receiver_id)
            .bind(ids)
            .fetch_all(db)
            .await
            .context("mark messages read")?;
        Ok(rows)
    }

    pub async fn unread_count(db: &PgPool, receiver_id: Uuid) -> anyhow::Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages WHERE receiver_id = $1 AND NOT read",
        )
        .bind(receiver_id)
        .fetch_one(db)
        .await
        .context("count unread messages")?;
        Ok(count)
    }
}
