pub mod conversations;
mod dto;
pub mod handlers;
mod repo;
mod repo_types;
pub mod services;

pub use repo_types::Message;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::message_routes())
}
