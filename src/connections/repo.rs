use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{Connection, ConnectionPeer, ConnectionStatus, PendingConnection};

const CONNECTION_COLUMNS: &str = "id, sender_id, receiver_id, status, created_at, updated_at";

impl Connection {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Connection>> {
        let sql = format!("SELECT {CONNECTION_COLUMNS} FROM connections WHERE id = $1");
        let row = sqlx::query_as::<_, Connection>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await
            .context("find connection by id")?;
        Ok(row)
    }

    /// The row for the unordered pair, whichever side sent it.
    pub async fn find_between(db: &PgPool, a: Uuid, b: Uuid) -> anyhow::Result<Option<Connection>> {
        let sql = format!(
            "SELECT {CONNECTION_COLUMNS} FROM connections \
             WHERE (sender_id = $1 AND receiver_id = $2) \
                OR (sender_id = $2 AND receiver_id = $1) \
             LIMIT 1"
        );
        let row = sqlx::query_as::<_, Connection>(&sql)
            .bind(a)
            .bind(b)
            .fetch_optional(db)
            .await
            .context("find connection between users")?;
        Ok(row)
    }

    pub async fn create(db: &PgPool, sender_id: Uuid, receiver_id: Uuid) -> anyhow::Result<Connection> {
        let sql = format!(
            "INSERT INTO connections (sender_id, receiver_id, status) \
             VALUES ($1, $2, 'pending') RETURNING {CONNECTION_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Connection>(&sql)
            .bind(sender_id)
            .bind(receiver_id)
            .fetch_one(db)
            .await
            .context("insert connection")?;
        Ok(row)
    }

    /// Moves a pending row to `status`; `None` when it is no longer pending.
    pub async fn update_status(
        db: &PgPool,
        id: Uuid,
        status: ConnectionStatus,
    ) -> anyhow::Result<Option<Connection>> {
        let sql = format!(
            "UPDATE connections SET status = $2, updated_at = now() \
             WHERE id = $1 AND status = 'pending' RETURNING {CONNECTION_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Connection>(&sql)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(db)
            .await
            .context("update connection status")?;
        Ok(row)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Connection>> {
        let sql = format!("DELETE FROM connections WHERE id = $1 RETURNING {CONNECTION_COLUMNS}");
        let row = sqlx::query_as::<_, Connection>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await
            .context("delete connection")?;
        Ok(row)
    }

    /// Requests received by `user_id` that are still pending, newest first.
    pub async fn pending_for(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<PendingConnection>> {
        let rows = sqlx::query_as::<_, PendingConnection>(
            r#"
            SELECT c.id,
                   c.sender_id,
                   p.name       AS sender_name,
                   p.username   AS sender_username,
                   p.avatar_url AS sender_avatar_url,
                   c.created_at
              FROM connections c
              JOIN profiles p ON p.id = c.sender_id
             WHERE c.receiver_id = $1 AND c.status = 'pending'
             ORDER BY c.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
        .context("list pending connections")?;
        Ok(rows)
    }

    /// Accepted connections of `user_id`, described by the other party.
    pub async fn accepted_for(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<ConnectionPeer>> {
        let rows = sqlx::query_as::<_, ConnectionPeer>(
            r#"
            SELECT c.id,
                   p.id AS user_id,
                   p.name,
                   p.username,
                   p.avatar_url
              FROM connections c
              JOIN profiles p
                ON p.id = CASE WHEN c.sender_id = $1 THEN c.receiver_id ELSE c.sender_id END
             WHERE (c.sender_id = $1 OR c.receiver_id = $1)
               AND c.status = 'accepted'
             ORDER BY p.name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
        .context("list connections")?;
        Ok(rows)
    }

    pub async fn accepted_between(db: &PgPool, a: Uuid, b: Uuid) -> anyhow::Result<bool> {
        let ok: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM connections
                 WHERE status = 'accepted'
                   AND ((sender_id = $1 AND receiver_id = $2)
                     OR (sender_id = $2 AND receiver_id = $1))
            )
            "#,
        )
        .bind(a)
        .bind(b)
        .fetch_one(db)
        .await
        .context("check accepted connection")?;
        Ok(ok)
    }
}
