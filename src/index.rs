use axum::{debug_handler, extract::State, response::{Html, IntoResponse, Redirect, Response}};
use tower_sessions::Session;

use crate::{
    escape_html, include_res,
    session::{load_seat, open_store},
    storage::KeyValue,
    store::ChatStore,
    transcript::format_timestamp,
    AppResult, AppState, Events, SharedStorage,
};

#[debug_handler(state = AppState)]
pub async fn index(
    State(storage): State<SharedStorage>,
    State(events): State<Events>,
    session: Session,
) -> AppResult<Response> {
    let seat = load_seat(&session).await?;
    if seat.active_room_id.is_some() && seat.current_user.is_some() {
        return Ok(Redirect::to("/r").into_response());
    }

    let storage = storage.lock().await;
    let store = open_store(&storage, &events, seat);
    Ok(index_page(&store, None).into_response())
}

/// Landing page: create and join forms, an optional error toast, and past transcripts.
pub(crate) fn index_page<S: KeyValue>(store: &ChatStore<S>, error: Option<&str>) -> Html<String> {
    let mut transcript_items = String::new();
    for room in store.ended_rooms() {
        transcript_items += &include_res!(str, "/pages/transcript_item.html")
            .replace("{id}", &escape_html(&room.id))
            .replace("{count}", &room.messages.len().to_string())
            .replace("{ended}", &format_timestamp(room.ended_at.unwrap_or(room.created_at)))
            .replace("{code}", &escape_html(&room.code))
            .replace("{name}", &escape_html(&room.name));
    }
    if transcript_items.is_empty() {
        transcript_items = "<li class=\"empty\">No ended rooms yet.</li>".to_owned();
    }

    // a participant who left keeps the room around; offer its code back
    let join_code = store
        .active_room()
        .filter(|r| !r.is_ended())
        .map(|r| escape_html(&r.code))
        .unwrap_or_default();

    let error = error
        .map(|e| format!("<p class=\"toast\">{}</p>", escape_html(e)))
        .unwrap_or_default();

    Html(
        include_res!(str, "/pages/index.html")
            .replace("{transcript_items}", &transcript_items)
            .replace("{join_code}", &join_code)
            .replace("{error}", &error),
    )
}
