use tower_sessions::Session;

use crate::{
    storage::FileStorage,
    store::{ChatStore, Seat},
    AppResult, Events,
};

pub const SEAT: &str = "seat";

pub async fn load_seat(session: &Session) -> AppResult<Seat> {
    Ok(session.get::<Seat>(SEAT).await?.unwrap_or_default())
}

pub async fn save_seat(session: &Session, seat: &Seat) -> AppResult<()> {
    session.insert(SEAT, seat).await?;
    Ok(())
}

/// Opens the caller's store over shared storage, forwarding its changes to websocket listeners.
pub fn open_store<'a>(storage: &'a FileStorage, events: &Events, seat: Seat) -> ChatStore<&'a FileStorage> {
    let mut store = ChatStore::restore(storage, seat);
    let events = events.clone();
    store.subscribe(move |event| {
        // no receivers is fine
        let _ = events.send(event.clone());
    });
    store
}
