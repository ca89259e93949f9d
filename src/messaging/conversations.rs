use std::collections::HashMap;

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::Message;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConversationSummary {
    pub user_id: Uuid,
    pub last_message: String,
    pub last_sender_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub last_message_at: OffsetDateTime,
    pub unread: i64,
}

/// One summary per counterpart of `me`, most recent conversation first.
pub fn summarize(me: Uuid, messages: &[Message]) -> Vec<ConversationSummary> {
    let mut by_peer: HashMap<Uuid, ConversationSummary> = HashMap::new();

    for msg in messages {
        let peer = msg.counterpart(me);
        let unread = i64::from(msg.receiver_id == me && !msg.read);
        by_peer
            .entry(peer)
            .and_modify(|s| {
                if msg.created_at > s.last_message_at {
                    s.last_message = msg.content.clone();
                    s.last_sender_id = msg.sender_id;
                    s.last_message_at = msg.created_at;
                }
                s.unread += unread;
            })
            .or_insert_with(|| ConversationSummary {
                user_id: peer,
                last_message: msg.content.clone(),
                last_sender_id: msg.sender_id,
                last_message_at: msg.created_at,
                unread,
            });
    }

    let mut out: Vec<_> = by_peer.into_values().collect();
    out.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
    out
}

/// Ids of messages addressed to `me` that are still unread.
pub fn unread_ids(me: Uuid, messages: &[Message]) -> Vec<Uuid> {
    messages
        .iter()
        .filter(|m| m.receiver_id == me && !m.read)
        .map(|m| m.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn msg(from: Uuid, to: Uuid, content: &str, mins: i64, read: bool) -> Message {
        Message {
            id: Uuid::new_v4(),
            sender_id: from,
            receiver_id: to,
            content: content.into(),
            read,
            created_at: OffsetDateTime::UNIX_EPOCH + Duration::minutes(mins),
        }
    }

    #[test]
    fn one_summary_per_peer_newest_first() {
        let (me, ann, bob) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let messages = vec![
            msg(ann, me, "hi", 1, true),
            msg(me, ann, "hello ann", 2, false),
            msg(bob, me, "yo", 3, false),
            msg(bob, me, "you there?", 4, false),
        ];

        let out = summarize(me, &messages);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].user_id, bob);
        assert_eq!(out[0].last_message, "you there?");
        assert_eq!(out[0].unread, 2);
        assert_eq!(out[1].user_id, ann);
        assert_eq!(out[1].last_sender_id, me);
        // my own unread outgoing message does not count
        assert_eq!(out[1].unread, 0);
    }

    #[test]
    fn input_order_does_not_matter() {
        let (me, ann) = (Uuid::new_v4(), Uuid::new_v4());
        let messages = vec![msg(ann, me, "later", 9, true), msg(ann, me, "earlier", 1, true)];
        assert_eq!(summarize(me, &messages)[0].last_message, "later");
    }

    #[test]
    fn unread_ids_only_counts_incoming() {
        let (me, ann) = (Uuid::new_v4(), Uuid::new_v4());
        let incoming = msg(ann, me, "a", 1, false);
        let outgoing = msg(me, ann, "b", 2, false);
        let seen = msg(ann, me, "c", 3, true);
        let ids = unread_ids(me, &[incoming.clone(), outgoing, seen]);
        assert_eq!(ids, vec![incoming.id]);
    }
}
