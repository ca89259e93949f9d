//! Live change propagation: a typed in-process bus plus per-user WebSocket channels.

mod bus;
pub mod ws;

pub use bus::{ChangeOp, EventBus, RowChange};

use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router() -> Router<AppState> {
    Router::new().route("/realtime", get(ws::realtime_ws))
}
