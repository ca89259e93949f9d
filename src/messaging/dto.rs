use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::Message;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub receiver_id: Uuid,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct History {
    pub can_message: bool,
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
pub struct CanMessageResponse {
    pub can_message: bool,
}

#[derive(Debug, Serialize)]
pub struct UnreadResponse {
    pub count: i64,
}
