use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{
    conversations::{self, ConversationSummary},
    dto::History,
    repo_types::Message,
};
use crate::{
    connections::Connection,
    error::{AppError, AppResult},
    realtime::{ChangeOp, RowChange},
    state::AppState,
};

pub const MAX_CONTENT_CHARS: usize = 4000;
const CONVERSATION_WINDOW: i64 = 1000;

/// Two users may message each other once they share an accepted connection.
pub async fn can_message(state: &AppState, a: Uuid, b: Uuid) -> AppResult<bool> {
    if a == b {
        return Ok(false);
    }
    Ok(Connection::accepted_between(&state.db, a, b).await?)
}

pub fn normalize_content(raw: &str) -> AppResult<String> {
    let content = raw.trim();
    if content.is_empty() {
        return Err(AppError::bad_request("Message cannot be empty"));
    }
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(AppError::bad_request("Message is too long"));
    }
    Ok(content.to_string())
}

/// History with `other_id`; incoming unread messages are marked read afterwards.
pub async fn history(state: &AppState, me: Uuid, other_id: Uuid) -> AppResult<History> {
    if !can_message(state, me, other_id).await? {
        debug!(%me, %other_id, "history requested without accepted connection");
        return Ok(History {
            can_message: false,
            messages: Vec::new(),
        });
    }

    let messages = Message::between(&state.db, me, other_id).await?;

    let unread = conversations::unread_ids(me, &messages);
    if !unread.is_empty() {
        match Message::mark_read(&state.db, me, &unread).await {
            Ok(updated) => {
                for msg in updated {
                    state
                        .events
                        .publish_change(RowChange::message(ChangeOp::Update, msg));
                }
            }
            // the history is still useful; the badge catches up on the next read
            Err(e) => warn!(error = %e, %me, "failed to mark messages read"),
        }
    }

    Ok(History {
        can_message: true,
        messages,
    })
}

pub async fn send(
    state: &AppState,
    sender_id: Uuid,
    receiver_id: Uuid,
    raw_content: &str,
) -> AppResult<Message> {
    let content = normalize_content(raw_content)?;

    if !can_message(state, sender_id, receiver_id).await? {
        warn!(%sender_id, %receiver_id, "message blocked: no accepted connection");
        return Err(AppError::CannotMessage);
    }

    let message = Message::create(&state.db, sender_id, receiver_id, &content).await?;
    info!(message_id = %message.id, %sender_id, %receiver_id, "message sent");

    state
        .events
        .publish_change(RowChange::message(ChangeOp::Insert, message.clone()));
    Ok(message)
}

pub async fn conversations(state: &AppState, me: Uuid) -> AppResult<Vec<ConversationSummary>> {
    let recent = Message::recent_for(&state.db, me, CONVERSATION_WINDOW).await?;
    Ok(conversations::summarize(me, &recent))
}

pub async fn unread_count(state: &AppState, me: Uuid) -> AppResult<i64> {
    Ok(Message::unread_count(&state.db, me).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_is_trimmed_and_bounded() {
        assert_eq!(normalize_content("  hi  ").unwrap(), "hi");
        assert!(matches!(normalize_content(" \n "), Err(AppError::BadRequest(_))));
        assert!(normalize_content(&"é".repeat(MAX_CONTENT_CHARS)).is_ok());
        assert!(normalize_content(&"a".repeat(MAX_CONTENT_CHARS + 1)).is_err());
    }

    #[tokio::test]
    async fn nobody_messages_themselves() {
        let state = AppState::fake();
        let me = Uuid::new_v4();
        assert!(!can_message(&state, me, me).await.unwrap());
    }
}
