use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::lifecycle::{Response, VisibleStatus};

#[derive(Debug, Deserialize)]
pub struct CreateConnectionRequest {
    pub receiver_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct CreatedConnectionResponse {
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: VisibleStatus,
}

#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    pub status: Response,
}
