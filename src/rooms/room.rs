use axum::{debug_handler, extract::State, response::{Html, IntoResponse, Redirect, Response}};
use tower_sessions::Session;

use crate::{
    escape_html, include_res,
    model::Role,
    session::{load_seat, open_store, save_seat},
    store::Seat,
    AppResult, AppState, Events, SharedStorage,
};

use super::msg;

#[debug_handler(state = AppState)]
pub(crate) async fn room(
    State(storage): State<SharedStorage>,
    State(events): State<Events>,
    session: Session,
) -> AppResult<Response> {
    let seat = load_seat(&session).await?;
    let storage = storage.lock().await;
    let store = open_store(&storage, &events, seat);

    let (Some(room), Some(me)) = (store.active_room(), store.current_user()) else {
        return Ok(Redirect::to("/").into_response());
    };

    // ended under us by the host: nothing left to do here but read
    if room.is_ended() {
        let transcript_url = format!("/t/{}", room.id);
        save_seat(&session, &Seat::default()).await?;
        return Ok(Redirect::to(&transcript_url).into_response());
    }

    let mut participants = String::new();
    for p in &room.participants {
        participants += &include_res!(str, "/pages/rooms/participant.html")
            .replace("{role}", match p.role {
                Role::Host => "host",
                Role::Participant => "participant",
            })
            .replace("{display_char}", &escape_html(&p.display_char))
            .replace("{name}", &escape_html(&p.name));
    }

    let mut messages = String::new();
    for m in &room.messages {
        messages += &msg::message_to_html(m, Some(&me.id));
    }

    let leave_label = if me.is_host() { "End room for everyone" } else { "Leave room" };
    let body = include_res!(str, "/pages/rooms/room.html")
        .replace("{leave_action}", if me.is_host() { "/r/end" } else { "/r/leave" })
        .replace("{leave_label}", leave_label)
        .replace("{room_id}", &escape_html(&room.id))
        .replace("{room_code}", &escape_html(&room.code))
        .replace("{participants}", &participants)
        .replace("{messages}", &messages)
        .replace("{me}", &escape_html(&format!("{} ({})", me.name, me.display_char)))
        .replace("{room_name}", &escape_html(&room.name));

    Ok(Html(body).into_response())
}
