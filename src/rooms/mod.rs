mod join;
mod leave;
mod msg;
mod new;
mod room;
mod ws;

use axum::{routing::{get, post}, Router};

use crate::AppState;

pub(crate) use msg::message_to_html;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(room::room))
        .route("/new", post(new::new_room))
        .route("/join", post(join::join_room))
        .route("/send", post(msg::send_msg))
        .route("/leave", post(leave::leave_room))
        .route("/end", post(leave::end_room))
        .route("/ws", get(ws::room_ws))
}
