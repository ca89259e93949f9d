use tracing::{info, warn};
use uuid::Uuid;

use super::{
    lifecycle::{self, Outcome, Response, VisibleStatus},
    repo_types::{Connection, ConnectionPeer, ConnectionStatus, PendingConnection},
};
use crate::{
    error::{is_unique_violation, AppError, AppResult},
    profiles::Profile,
    realtime::{ChangeOp, RowChange},
    state::AppState,
};

pub async fn create_connection(
    state: &AppState,
    sender_id: Uuid,
    receiver_id: Uuid,
) -> AppResult<Connection> {
    lifecycle::check_request(sender_id, receiver_id)?;

    if Profile::find_by_id(&state.db, receiver_id).await?.is_none() {
        return Err(AppError::NotFound("Profile"));
    }

    let existing = Connection::find_between(&state.db, sender_id, receiver_id).await?;
    lifecycle::check_no_existing(existing.as_ref())?;
    if let Some(stale) = existing {
        // a leftover declined row would block the pair index
        Connection::delete(&state.db, stale.id).await?;
    }

    let connection = Connection::create(&state.db, sender_id, receiver_id)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                warn!(%sender_id, %receiver_id, "concurrent duplicate connection request");
                AppError::ConnectionExists
            } else {
                AppError::Internal(e)
            }
        })?;

    info!(connection_id = %connection.id, %sender_id, %receiver_id, "connection request sent");
    state
        .events
        .publish_change(RowChange::connection(ChangeOp::Insert, connection.clone()));
    Ok(connection)
}

pub async fn connection_status(
    state: &AppState,
    user_id: Uuid,
    other_id: Uuid,
) -> AppResult<VisibleStatus> {
    let row = Connection::find_between(&state.db, user_id, other_id).await?;
    Ok(VisibleStatus::from(row.map(|c| c.status)))
}

pub async fn pending_connections(
    state: &AppState,
    user_id: Uuid,
) -> AppResult<Vec<PendingConnection>> {
    Ok(Connection::pending_for(&state.db, user_id).await?)
}

pub async fn connections(state: &AppState, user_id: Uuid) -> AppResult<Vec<ConnectionPeer>> {
    Ok(Connection::accepted_for(&state.db, user_id).await?)
}

/// Accepts (status update) or declines (row delete) a pending request.
pub async fn respond(
    state: &AppState,
    actor: Uuid,
    connection_id: Uuid,
    response: Response,
) -> AppResult<()> {
    let connection = Connection::find_by_id(&state.db, connection_id)
        .await?
        .ok_or(AppError::NotFound("Connection"))?;

    let change = match lifecycle::respond(&connection, actor, response)? {
        Outcome::Accept => {
            let updated =
                Connection::update_status(&state.db, connection_id, ConnectionStatus::Accepted)
                    .await?
                    .ok_or_else(already_answered)?;
            RowChange::connection(ChangeOp::Update, updated)
        }
        Outcome::Delete => {
            let deleted = Connection::delete(&state.db, connection_id)
                .await?
                .ok_or_else(already_answered)?;
            RowChange::connection(ChangeOp::Delete, deleted)
        }
    };

    info!(%connection_id, %actor, ?response, "connection request answered");
    state.events.publish_change(change);
    Ok(())
}

fn already_answered() -> AppError {
    AppError::InvalidTransition("Connection request was already answered".into())
}
