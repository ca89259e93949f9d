//! Connection request state machine.
//!
//! `none -> pending -> accepted`, or `pending -> (deleted)` on decline, which
//! returns the pair to `none` so a new request can be sent.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::{Connection, ConnectionStatus};
use crate::error::{AppError, AppResult};

/// Status as reported to clients.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VisibleStatus {
    None,
    Pending,
    Accepted,
}

impl From<Option<ConnectionStatus>> for VisibleStatus {
    fn from(status: Option<ConnectionStatus>) -> Self {
        match status {
            Some(ConnectionStatus::Pending) => VisibleStatus::Pending,
            Some(ConnectionStatus::Accepted) => VisibleStatus::Accepted,
            // a declined pair may be requested again
            Some(ConnectionStatus::Declined) | None => VisibleStatus::None,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Response {
    Accepted,
    Declined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accept,
    Delete,
}

pub fn check_request(sender_id: Uuid, receiver_id: Uuid) -> AppResult<()> {
    if sender_id == receiver_id {
        return Err(AppError::bad_request("You cannot connect with yourself"));
    }
    Ok(())
}

/// A new request is allowed only when no row exists for the pair.
pub fn check_no_existing(existing: Option<&Connection>) -> AppResult<()> {
    match existing {
        None => Ok(()),
        Some(c) if c.status == ConnectionStatus::Declined => Ok(()),
        Some(_) => Err(AppError::ConnectionExists),
    }
}

pub fn respond(connection: &Connection, actor: Uuid, response: Response) -> AppResult<Outcome> {
    if connection.receiver_id != actor {
        return Err(AppError::Forbidden(
            "Only the receiver can respond to a connection request".into(),
        ));
    }
    if connection.status != ConnectionStatus::Pending {
        return Err(AppError::InvalidTransition(format!(
            "Connection request is already {}",
            connection.status
        )));
    }
    Ok(match response {
        Response::Accepted => Outcome::Accept,
        Response::Declined => Outcome::Delete,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn conn(sender_id: Uuid, receiver_id: Uuid, status: ConnectionStatus) -> Connection {
        Connection {
            id: Uuid::new_v4(),
            sender_id,
            receiver_id,
            status,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn declined_reads_as_none() {
        assert_eq!(
            VisibleStatus::from(Some(ConnectionStatus::Declined)),
            VisibleStatus::None
        );
        assert_eq!(VisibleStatus::from(None), VisibleStatus::None);
        assert_eq!(
            VisibleStatus::from(Some(ConnectionStatus::Accepted)),
            VisibleStatus::Accepted
        );
    }

    #[test]
    fn cannot_request_self() {
        let me = Uuid::new_v4();
        assert!(matches!(check_request(me, me), Err(AppError::BadRequest(_))));
        assert!(check_request(me, Uuid::new_v4()).is_ok());
    }

    #[test]
    fn second_request_for_pair_is_duplicate() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let pending = conn(b, a, ConnectionStatus::Pending);
        assert!(matches!(
            check_no_existing(Some(&pending)),
            Err(AppError::ConnectionExists)
        ));
        let accepted = conn(a, b, ConnectionStatus::Accepted);
        assert!(matches!(
            check_no_existing(Some(&accepted)),
            Err(AppError::ConnectionExists)
        ));
        assert!(check_no_existing(None).is_ok());
    }

    #[test]
    fn receiver_accepts_or_deletes_pending() {
        let (sender, receiver) = (Uuid::new_v4(), Uuid::new_v4());
        let c = conn(sender, receiver, ConnectionStatus::Pending);
        assert_eq!(respond(&c, receiver, Response::Accepted).unwrap(), Outcome::Accept);
        assert_eq!(respond(&c, receiver, Response::Declined).unwrap(), Outcome::Delete);
    }

    #[test]
    fn sender_cannot_answer_own_request() {
        let (sender, receiver) = (Uuid::new_v4(), Uuid::new_v4());
        let c = conn(sender, receiver, ConnectionStatus::Pending);
        assert!(matches!(
            respond(&c, sender, Response::Accepted),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn accepted_connection_cannot_be_answered_again() {
        let (sender, receiver) = (Uuid::new_v4(), Uuid::new_v4());
        let c = conn(sender, receiver, ConnectionStatus::Accepted);
        let err = respond(&c, receiver, Response::Declined).unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
        assert!(err.to_string().contains("accepted"));
    }
}
