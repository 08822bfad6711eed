use axum::{debug_handler, extract::{Path, State}, response::{Html, IntoResponse, Response}};

use crate::{
    escape_html, include_res, res,
    rooms::message_to_html,
    storage::RoomStorage,
    transcript::format_timestamp,
    AppResult, SharedStorage,
};

#[debug_handler(state = crate::AppState)]
pub(crate) async fn transcript(
    Path(id): Path<String>,
    State(storage): State<SharedStorage>,
) -> AppResult<Response> {
    let rooms = RoomStorage::new(&*storage.lock().await).load_rooms();
    let Some(room) = rooms.into_iter().find(|r| r.id == id) else {
        return res::sorry("transcript");
    };

    let mut messages = String::new();
    for m in &room.messages {
        messages += &message_to_html(m, None);
    }

    let ended = match room.ended_at {
        Some(at) => format!("ended {}", format_timestamp(at)),
        None => "still open".to_owned(),
    };

    Ok(Html(
        include_res!(str, "/pages/transcripts/transcript.html")
            .replace("{messages}", &messages)
            .replace("{created}", &format_timestamp(room.created_at))
            .replace("{ended}", &ended)
            .replace("{count}", &room.participants.len().to_string())
            .replace("{id}", &escape_html(&room.id))
            .replace("{room_code}", &escape_html(&room.code))
            .replace("{room_name}", &escape_html(&room.name)),
    )
    .into_response())
}
