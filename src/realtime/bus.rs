use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::connections::Connection;
use crate::messaging::Message;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Connections,
    Messages,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChangeOp {
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ChangeRecord {
    Connection(Connection),
    Message(Message),
}

/// A row-level change on a table that users subscribe to.
#[derive(Debug, Clone, Serialize)]
pub struct RowChange {
    pub table: Table,
    pub op: ChangeOp,
    pub record: ChangeRecord,
}

impl RowChange {
    pub fn connection(op: ChangeOp, row: Connection) -> Self {
        Self {
            table: Table::Connections,
            op,
            record: ChangeRecord::Connection(row),
        }
    }

    pub fn message(op: ChangeOp, row: Message) -> Self {
        Self {
            table: Table::Messages,
            op,
            record: ChangeRecord::Message(row),
        }
    }

    /// A change concerns the sender and the receiver of the row.
    pub fn concerns(&self, user_id: Uuid) -> bool {
        let (sender, receiver) = match &self.record {
            ChangeRecord::Connection(c) => (c.sender_id, c.receiver_id),
            ChangeRecord::Message(m) => (m.sender_id, m.receiver_id),
        };
        sender == user_id || receiver == user_id
    }
}

/// What a subscribed client receives.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Frame {
    Change(RowChange),
    /// Events were dropped; the client must refetch.
    Resync,
}

/// Row changes and sign-outs travel on separate channels so that row traffic
/// can never push a sign-out out of a lagging subscriber's buffer.
#[derive(Clone)]
pub struct EventBus {
    changes: broadcast::Sender<RowChange>,
    sign_outs: broadcast::Sender<Uuid>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (changes, _) = broadcast::channel(capacity.max(1));
        let (sign_outs, _) = broadcast::channel(capacity.max(1));
        Self { changes, sign_outs }
    }

    /// Returns the number of subscribers that will see the change.
    pub fn publish_change(&self, change: RowChange) -> usize {
        debug!(table = ?change.table, op = ?change.op, "row change");
        self.changes.send(change).unwrap_or_else(|_| {
            debug!("row change published with no subscribers");
            0
        })
    }

    pub fn signed_out(&self, user_id: Uuid) -> usize {
        self.sign_outs.send(user_id).unwrap_or(0)
    }

    pub fn subscribe_user(&self, user_id: Uuid) -> UserChannel {
        UserChannel {
            user_id,
            changes: self.changes.subscribe(),
            sign_outs: self.sign_outs.subscribe(),
        }
    }

    #[cfg(test)]
    pub fn subscriber_count(&self) -> usize {
        self.changes.receiver_count()
    }
}

/// Subscription keyed by a user id; yields only events naming that user.
pub struct UserChannel {
    user_id: Uuid,
    changes: broadcast::Receiver<RowChange>,
    sign_outs: broadcast::Receiver<Uuid>,
}

impl UserChannel {
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// `None` once the user signs out or the bus is gone. A pending sign-out
    /// wins over buffered row changes.
    pub async fn next(&mut self) -> Option<Frame> {
        loop {
            tokio::select! {
                biased;
                signal = self.sign_outs.recv() => match signal {
                    Ok(user_id) if user_id == self.user_id => return None,
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => {
                        // one of the dropped sign-outs may have been ours
                        warn!(user_id = %self.user_id, skipped, "sign-out signals lagged; closing channel");
                        return None;
                    }
                    Err(RecvError::Closed) => return None,
                },
                change = self.changes.recv() => match change {
                    Ok(change) if change.concerns(self.user_id) => {
                        return Some(Frame::Change(change))
                    }
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(user_id = %self.user_id, skipped, "realtime subscriber lagged");
                        return Some(Frame::Resync);
                    }
                    Err(RecvError::Closed) => return None,
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connections::ConnectionStatus;
    use time::OffsetDateTime;

    fn connection(sender_id: Uuid, receiver_id: Uuid) -> Connection {
        Connection {
            id: Uuid::new_v4(),
            sender_id,
            receiver_id,
            status: ConnectionStatus::Pending,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    fn message(sender_id: Uuid, receiver_id: Uuid) -> Message {
        Message {
            id: Uuid::new_v4(),
            sender_id,
            receiver_id,
            content: "hi".into(),
            read: false,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[tokio::test]
    async fn user_channel_only_sees_own_rows() {
        let bus = EventBus::new(16);
        let (alice, bob, carol) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let mut bob_channel = bus.subscribe_user(bob);

        bus.publish_change(RowChange::connection(ChangeOp::Insert, connection(alice, carol)));
        bus.publish_change(RowChange::message(ChangeOp::Insert, message(alice, bob)));

        match bob_channel.next().await {
            Some(Frame::Change(change)) => {
                assert_eq!(change.table, Table::Messages);
                assert!(change.concerns(bob));
            }
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    #[tokio::test]
    async fn sign_out_closes_only_that_users_channel() {
        let bus = EventBus::new(16);
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let mut alice_channel = bus.subscribe_user(alice);
        let mut bob_channel = bus.subscribe_user(bob);

        bus.signed_out(alice);
        bus.publish_change(RowChange::connection(ChangeOp::Update, connection(alice, bob)));

        assert!(alice_channel.next().await.is_none());
        assert!(matches!(bob_channel.next().await, Some(Frame::Change(_))));
    }

    #[tokio::test]
    async fn lagging_subscriber_gets_resync() {
        let bus = EventBus::new(2);
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let mut channel = bus.subscribe_user(bob);

        for _ in 0..5 {
            bus.publish_change(RowChange::message(ChangeOp::Insert, message(alice, bob)));
        }

        assert!(matches!(channel.next().await, Some(Frame::Resync)));
        assert!(matches!(channel.next().await, Some(Frame::Change(_))));
    }

    #[tokio::test]
    async fn sign_out_closes_a_lagging_channel() {
        let bus = EventBus::new(2);
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let mut channel = bus.subscribe_user(bob);

        bus.signed_out(bob);
        for _ in 0..3 {
            bus.publish_change(RowChange::message(ChangeOp::Insert, message(alice, Uuid::new_v4())));
        }

        assert!(channel.next().await.is_none());
    }

    #[test]
    fn publish_without_subscribers_is_fine() {
        let bus = EventBus::new(4);
        assert_eq!(bus.signed_out(Uuid::new_v4()), 0);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn frame_serializes_with_type_tag() {
        let change = RowChange::connection(
            ChangeOp::Delete,
            connection(Uuid::new_v4(), Uuid::new_v4()),
        );
        let json = serde_json::to_value(Frame::Change(change)).unwrap();
        assert_eq!(json["type"], "change");
        assert_eq!(json["table"], "connections");
        assert_eq!(json["op"], "delete");
        assert_eq!(json["record"]["status"], "pending");

        let resync = serde_json::to_value(Frame::Resync).unwrap();
        assert_eq!(resync["type"], "resync");
    }
}
