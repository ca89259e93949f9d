use crate::state::AppState;
use axum::Router;

mod claims;
mod dto;
pub mod handlers;
pub mod jwt;
mod password;
mod repo;
mod repo_types;
pub mod services;
mod username;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::auth_routes())
}
