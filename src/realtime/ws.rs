use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
        FromRef, Query, State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use super::bus::{Frame, UserChannel};
use crate::{
    auth::jwt::JwtKeys,
    error::{AppError, AppResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RealtimeQuery {
    pub access_token: String,
}

/// GET /realtime?access_token=...
///
/// Browsers cannot set headers on a WebSocket handshake, so the access token
/// travels in the query string.
#[instrument(skip(state, query, ws))]
pub async fn realtime_ws(
    State(state): State<AppState>,
    Query(query): Query<RealtimeQuery>,
    ws: WebSocketUpgrade,
) -> AppResult<Response> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify_access(&query.access_token).map_err(|e| {
        warn!(error = %e, "realtime handshake rejected");
        AppError::Unauthorized("Invalid or expired token".into())
    })?;

    // subscribe before the upgrade so nothing published in between is lost
    let channel = state.events.subscribe_user(claims.sub);
    info!(user_id = %claims.sub, "realtime channel opened");

    Ok(ws.on_upgrade(move |socket| run_channel(socket, channel)))
}

async fn run_channel(socket: WebSocket, mut channel: UserChannel) {
    let user_id = channel.user_id();
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            frame = channel.next() => {
                let Some(frame) = frame else {
                    let _ = sender.send(WsMessage::Close(None)).await;
                    break;
                };
                let Ok(text) = encode_frame(&frame) else {
                    continue;
                };
                if sender.send(WsMessage::Text(text)).await.is_err() {
                    break;
                }
            }
            incoming = receiver.next() => match incoming {
                Some(Ok(WsMessage::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(other)) => debug!(user_id = %user_id, ?other, "ignoring client frame"),
            }
        }
    }

    info!(user_id = %user_id, "realtime channel closed");
}

fn encode_frame(frame: &Frame) -> anyhow::Result<String> {
    serde_json::to_string(frame).map_err(|e| {
        warn!(error = %e, "failed to encode realtime frame");
        e.into()
    })
}
