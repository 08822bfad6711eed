use axum::{debug_handler, extract::State, response::Redirect, Form};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{
    escape_html, include_res, markdown_to_html,
    model::Message,
    session::{load_seat, open_store, save_seat},
    transcript::format_timestamp,
    AppResult, AppState, Events, SharedStorage,
};

#[derive(Deserialize)]
pub(crate) struct SendMessageQuery {
    content: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn send_msg(
    State(storage): State<SharedStorage>,
    State(events): State<Events>,
    session: Session,

    Form(SendMessageQuery { content }): Form<SendMessageQuery>,
) -> AppResult<Redirect> {
    let seat = load_seat(&session).await?;
    let storage = storage.lock().await;
    let mut store = open_store(&storage, &events, seat);

    if !store.send_message(&content) {
        tracing::debug!("message rejected");
    }

    save_seat(&session, &store.seat()).await?;
    Ok(Redirect::to("/r"))
}

/// `me` marks the caller's own messages.
pub(crate) fn message_to_html(msg: &Message, me: Option<&str>) -> String {
    let class = if msg.is_system {
        "message system"
    } else if me == Some(msg.sender_id.as_str()) {
        "message mine"
    } else {
        "message"
    };

    let content_html = if msg.is_system {
        escape_html(&msg.content)
    } else {
        markdown_to_html(&msg.content)
    };

    include_res!(str, "/pages/rooms/message.html")
        .replace("{class}", class)
        .replace("{id}", &escape_html(&msg.id))
        .replace("{time}", &format_timestamp(msg.timestamp))
        .replace("{sender}", &escape_html(&msg.sender_display_char))
        .replace("{content}", &content_html)
}
