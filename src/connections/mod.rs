mod dto;
pub mod handlers;
pub mod lifecycle;
mod repo;
mod repo_types;
pub mod services;

pub use repo_types::Connection;
#[cfg(test)]
pub use repo_types::ConnectionStatus;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::connection_routes())
}
