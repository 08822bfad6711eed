//! Room and message state for one caller.
//!
//! A [`ChatStore`] holds the caller's active room and current user next to the
//! collection of every room storage knows about. Each mutation re-reads the
//! collection, applies the change, writes the whole collection back and then
//! tells subscribers. Bad input and missing rooms come back as `false`/`None`,
//! never as errors.

mod display;
mod events;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::{
    ids::{new_id, new_room_code, normalize_code, now_ms},
    model::{ChatRoom, Message, User},
    storage::{KeyValue, RoomStorage},
};

pub use display::get_display_char;
pub use events::{EventKind, Listener, StoreEvent};

/// What a caller carries between requests: which room they are in and as whom.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub active_room_id: Option<String>,
    pub current_user: Option<User>,
}

pub struct ChatStore<S> {
    storage: RoomStorage<S>,
    rooms: Vec<ChatRoom>,
    /// False after a failed read: `rooms` may be missing what storage holds.
    in_sync: bool,
    active_room: Option<ChatRoom>,
    current_user: Option<User>,
    listeners: Vec<Listener>,
}

impl<S: KeyValue> ChatStore<S> {
    pub fn new(kv: S) -> Self {
        let mut store = Self {
            storage: RoomStorage::new(kv),
            rooms: Vec::new(),
            in_sync: false,
            active_room: None,
            current_user: None,
            listeners: Vec::new(),
        };
        store.reload();
        store
    }

    /// Rebuilds a caller's view from a saved seat. A seat pointing at a room
    /// storage no longer has is dropped entirely.
    pub fn restore(kv: S, seat: Seat) -> Self {
        let mut store = Self::new(kv);
        store.active_room = seat
            .active_room_id
            .and_then(|id| store.find_room(&id).cloned());
        if store.active_room.is_some() {
            store.current_user = seat.current_user;
        }
        store
    }

    pub fn seat(&self) -> Seat {
        Seat {
            active_room_id: self.active_room.as_ref().map(|r| r.id.clone()),
            current_user: self.current_user.clone(),
        }
    }

    pub fn subscribe(&mut self, listener: impl Fn(&StoreEvent) + Send + Sync + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn active_room(&self) -> Option<&ChatRoom> {
        self.active_room.as_ref()
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    /// Every room storage knows about, active and ended, in insertion order.
    pub fn saved_rooms(&self) -> &[ChatRoom] {
        &self.rooms
    }

    /// Ended rooms, most recently ended first.
    pub fn ended_rooms(&self) -> Vec<&ChatRoom> {
        let mut ended: Vec<&ChatRoom> = self.rooms.iter().filter(|r| r.is_ended()).collect();
        ended.sort_by(|a, b| b.ended_at.cmp(&a.ended_at));
        ended
    }

    pub fn find_room(&self, id: &str) -> Option<&ChatRoom> {
        self.rooms.iter().find(|r| r.id == id)
    }

    /// Re-reads the collection and swaps in the stored copy of the active room.
    pub fn refresh(&mut self) {
        self.reload();
        let stored = self
            .active_room
            .as_ref()
            .and_then(|active| self.rooms.iter().find(|r| r.id == active.id))
            .cloned();
        if let Some(stored) = stored {
            self.active_room = Some(stored);
        }
    }

    /// On a read error the last known collection is kept and writes are held
    /// back until a read succeeds again.
    fn reload(&mut self) {
        match self.storage.try_load_rooms() {
            Ok(rooms) => {
                self.rooms = rooms.unwrap_or_default();
                self.in_sync = true;
            }
            Err(e) => {
                error!("could not read rooms, keeping {} known: {e}", self.rooms.len());
                self.in_sync = false;
            }
        }
    }

    pub fn create_room(&mut self, name: &str, host_name: &str) -> Option<ChatRoom> {
        let (name, host_name) = (name.trim(), host_name.trim());
        if name.is_empty() || host_name.is_empty() {
            return None;
        }
        self.refresh();

        let host = User::host(host_name);
        let code = new_room_code();
        let room = ChatRoom {
            id: new_id(),
            name: name.to_owned(),
            code: code.clone(),
            created_at: now_ms(),
            ended_at: None,
            host_id: host.id.clone(),
            participants: vec![host.clone()],
            messages: vec![Message::system(format!(
                "{host_name} created \"{name}\". Share the code {code} to invite others."
            ))],
        };

        info!(room_id = %room.id, %code, "room created");
        self.commit(&room, EventKind::Created);
        self.active_room = Some(room.clone());
        self.current_user = Some(host);
        Some(room)
    }

    pub fn join_room(&mut self, code: &str, user_name: &str) -> bool {
        let code = normalize_code(code);
        let user_name = user_name.trim();
        if code.is_empty() || user_name.is_empty() {
            return false;
        }
        self.refresh();

        let open = |r: &&ChatRoom| r.code == code && !r.is_ended();
        let Some(mut room) = self
            .active_room
            .iter()
            .find(open)
            .or_else(|| self.rooms.iter().find(open))
            .cloned()
        else {
            debug!(%code, "no open room with that code");
            return false;
        };

        if room.has_name(user_name) {
            debug!(%code, "name already taken in room");
            return false;
        }

        let user = User::participant(user_name, get_display_char(user_name, &room.participants));
        room.messages
            .push(Message::system(format!("{user_name} joined the room")));
        room.participants.push(user.clone());

        info!(room_id = %room.id, user_id = %user.id, "joined room");
        self.commit(&room, EventKind::Joined);
        self.active_room = Some(room);
        self.current_user = Some(user);
        true
    }

    pub fn send_message(&mut self, content: &str) -> bool {
        let content = content.trim();
        if content.is_empty() || self.active_room.is_none() {
            return false;
        }
        let Some(user) = self.current_user.clone() else {
            return false;
        };
        self.refresh();

        let Some(mut room) = self.active_room.clone() else {
            return false;
        };
        if room.is_ended() || room.participant(&user.id).is_none() {
            return false;
        }

        room.messages.push(Message::from_user(&user, content));
        self.commit(&room, EventKind::MessageSent);
        self.active_room = Some(room);
        true
    }

    /// Host only. Marks the room ended and clears the caller's seat.
    pub fn end_room(&mut self) {
        let is_host = self.current_user.as_ref().is_some_and(User::is_host);
        if self.active_room.is_none() || !is_host {
            return;
        }
        self.refresh();

        if let Some(mut room) = self.active_room.take() {
            if !room.is_ended() {
                room.ended_at = Some(now_ms());
                room.messages
                    .push(Message::system("The host ended the room".to_owned()));

                info!(room_id = %room.id, messages = room.messages.len(), "room ended");
                self.commit(&room, EventKind::Ended);
            }
        }
        self.current_user = None;
    }

    /// A host leaving ends the room. Anyone else drops out of the participant
    /// list; the room stays active for the rest.
    pub fn leave_room(&mut self) {
        let Some(user) = self.current_user.clone() else {
            return;
        };
        if self.active_room.is_none() {
            return;
        }
        if user.is_host() {
            self.end_room();
            return;
        }
        self.refresh();

        if let Some(mut room) = self.active_room.clone() {
            if !room.is_ended() && room.participant(&user.id).is_some() {
                room.messages
                    .push(Message::system(format!("{} left the room", user.name)));
                room.participants.retain(|p| p.id != user.id);

                info!(room_id = %room.id, user_id = %user.id, "left room");
                self.commit(&room, EventKind::Left);
                self.active_room = Some(room);
            }
        }
        self.current_user = None;
    }

    fn commit(&mut self, room: &ChatRoom, kind: EventKind) {
        match self.rooms.iter_mut().find(|r| r.id == room.id) {
            Some(slot) => *slot = room.clone(),
            None => self.rooms.push(room.clone()),
        }
        if self.in_sync {
            self.storage.save_rooms(&self.rooms);
        } else {
            warn!(room_id = %room.id, "storage unreadable, change kept in memory only");
        }

        let event = StoreEvent {
            room_id: room.id.clone(),
            code: room.code.clone(),
            kind,
        };
        for listener in &self.listeners {
            listener(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::{
        model::Role,
        storage::{FlakyStorage, MemoryStorage, ROOMS_KEY},
    };

    fn hosted(kv: &MemoryStorage) -> (ChatStore<&MemoryStorage>, ChatRoom) {
        let mut store = ChatStore::new(kv);
        let room = store.create_room("Standup", "Alice").unwrap();
        (store, room)
    }

    #[test]
    fn create_room_makes_a_single_host() {
        let kv = MemoryStorage::default();
        let (store, room) = hosted(&kv);

        assert_eq!(room.participants.len(), 1);
        let host = &room.participants[0];
        assert_eq!(host.role, Role::Host);
        assert_eq!(host.display_char, "H");
        assert_eq!(room.host_id, host.id);
        assert_eq!(store.current_user(), Some(host));
        assert_eq!(store.active_room(), Some(&room));
    }

    #[test]
    fn create_room_announces_the_code() {
        let kv = MemoryStorage::default();
        let (_, room) = hosted(&kv);

        assert_eq!(room.code.len(), 6);
        assert_eq!(room.code, room.code.to_uppercase());
        assert_eq!(room.messages.len(), 1);
        assert!(room.messages[0].is_system);
        assert!(room.messages[0].content.contains(&room.code));
    }

    #[test]
    fn create_room_rejects_blank_input() {
        let kv = MemoryStorage::default();
        let mut store = ChatStore::new(&kv);
        assert!(store.create_room("  ", "Alice").is_none());
        assert!(store.create_room("Standup", "").is_none());
        assert!(store.saved_rooms().is_empty());
        assert_eq!(kv.get(ROOMS_KEY).unwrap(), None);
    }

    #[test]
    fn create_room_persists() {
        let kv = MemoryStorage::default();
        let (_, room) = hosted(&kv);
        let reloaded = ChatStore::new(&kv);
        assert_eq!(reloaded.saved_rooms(), &[room]);
    }

    #[test]
    fn join_adds_participant_and_message() {
        let kv = MemoryStorage::default();
        let (_, room) = hosted(&kv);

        let mut bob = ChatStore::new(&kv);
        assert!(bob.join_room(&room.code.to_lowercase(), " Bob "));

        let joined = bob.active_room().unwrap();
        assert_eq!(joined.id, room.id);
        assert_eq!(joined.participants.len(), 2);
        assert_eq!(joined.messages.len(), 2);
        assert!(joined.messages[1].is_system);

        let me = bob.current_user().unwrap();
        assert_eq!(me.name, "Bob");
        assert_eq!(me.display_char, "B");
        assert_eq!(me.role, Role::Participant);
    }

    #[test]
    fn join_rejects_unknown_code_and_blank_input() {
        let kv = MemoryStorage::default();
        let (_, room) = hosted(&kv);

        let mut store = ChatStore::new(&kv);
        assert!(!store.join_room("NOPE00", "Bob"));
        assert!(!store.join_room("", "Bob"));
        assert!(!store.join_room(&room.code, "   "));
        assert!(store.active_room().is_none());
        assert!(store.current_user().is_none());
    }

    #[test]
    fn join_rejects_duplicate_name_ignoring_case() {
        let kv = MemoryStorage::default();
        let (_, room) = hosted(&kv);

        assert!(ChatStore::new(&kv).join_room(&room.code, "Jane"));
        assert!(!ChatStore::new(&kv).join_room(&room.code, "jane"));
        assert!(!ChatStore::new(&kv).join_room(&room.code, "ALICE"));
    }

    #[test]
    fn second_jane_gets_an_ordinal() {
        let kv = MemoryStorage::default();
        let (_, room) = hosted(&kv);

        let mut jane = ChatStore::new(&kv);
        assert!(jane.join_room(&room.code, "Jane"));
        let mut jim = ChatStore::new(&kv);
        assert!(jim.join_room(&room.code, "Jim"));

        assert_eq!(jane.current_user().unwrap().display_char, "J");
        assert_eq!(jim.current_user().unwrap().display_char, "J2");
    }

    #[test]
    fn send_message_appends_as_current_user() {
        let kv = MemoryStorage::default();
        let (mut alice, _) = hosted(&kv);

        assert!(alice.send_message("  hello there  "));
        let room = alice.active_room().unwrap();
        let last = room.messages.last().unwrap();
        assert_eq!(last.content, "hello there");
        assert_eq!(last.sender_id, room.host_id);
        assert_eq!(last.sender_display_char, "H");
        assert!(!last.is_system);
    }

    #[test]
    fn send_message_needs_content_and_a_seat() {
        let kv = MemoryStorage::default();
        let (mut alice, _) = hosted(&kv);
        assert!(!alice.send_message("   "));

        let mut nobody = ChatStore::new(&kv);
        assert!(!nobody.send_message("hi"));
    }

    #[test]
    fn ended_room_rejects_everything() {
        let kv = MemoryStorage::default();
        let (mut alice, room) = hosted(&kv);
        let mut bob = ChatStore::new(&kv);
        assert!(bob.join_room(&room.code, "Bob"));

        alice.end_room();

        assert!(!bob.send_message("anyone?"));
        assert!(!ChatStore::new(&kv).join_room(&room.code, "Carol"));

        let before = ChatStore::new(&kv).find_room(&room.id).cloned().unwrap();
        bob.leave_room();
        let after = ChatStore::new(&kv).find_room(&room.id).cloned().unwrap();
        assert_eq!(before, after);
        assert!(bob.current_user().is_none());
    }

    #[test]
    fn end_room_is_host_only() {
        let kv = MemoryStorage::default();
        let (_, room) = hosted(&kv);
        let mut bob = ChatStore::new(&kv);
        assert!(bob.join_room(&room.code, "Bob"));

        bob.end_room();

        assert!(!bob.active_room().unwrap().is_ended());
        assert!(bob.current_user().is_some());
        assert!(!ChatStore::new(&kv).find_room(&room.id).unwrap().is_ended());
    }

    #[test]
    fn host_leaving_ends_the_room() {
        let kv = MemoryStorage::default();
        let (mut alice, room) = hosted(&kv);

        alice.leave_room();

        assert!(alice.active_room().is_none());
        assert!(alice.current_user().is_none());
        let stored = ChatStore::new(&kv).find_room(&room.id).cloned().unwrap();
        assert!(stored.is_ended());
        assert_eq!(stored.messages.len(), 2);
    }

    #[test]
    fn participant_leaving_keeps_room_open() {
        let kv = MemoryStorage::default();
        let (_, room) = hosted(&kv);
        let mut bob = ChatStore::new(&kv);
        assert!(bob.join_room(&room.code, "Bob"));

        bob.leave_room();

        assert!(bob.current_user().is_none());
        let still_active = bob.active_room().unwrap();
        assert_eq!(still_active.participants.len(), 1);
        assert_eq!(
            still_active.messages.last().unwrap().content,
            "Bob left the room"
        );
        assert!(!still_active.is_ended());
        assert!(!bob.send_message("wait"));
    }

    #[test]
    fn leave_twice_is_harmless() {
        let kv = MemoryStorage::default();
        let (_, room) = hosted(&kv);
        let mut bob = ChatStore::new(&kv);
        assert!(bob.join_room(&room.code, "Bob"));

        bob.leave_room();
        let after_first = ChatStore::new(&kv).find_room(&room.id).cloned();
        bob.leave_room();
        bob.end_room();
        let after_second = ChatStore::new(&kv).find_room(&room.id).cloned();
        assert_eq!(after_first, after_second);
    }

    #[test]
    fn messages_from_other_callers_are_merged_not_lost() {
        let kv = MemoryStorage::default();
        let (mut alice, room) = hosted(&kv);
        let mut bob = ChatStore::new(&kv);
        assert!(bob.join_room(&room.code, "Bob"));

        assert!(bob.send_message("from bob"));
        assert!(alice.send_message("from alice"));
        assert!(bob.send_message("bob again"));

        let stored = ChatStore::new(&kv).find_room(&room.id).cloned().unwrap();
        let contents: Vec<&str> = stored.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(&contents[2..], ["from bob", "from alice", "bob again"]);
    }

    #[test]
    fn failed_read_does_not_overwrite_stored_rooms() {
        let kv = FlakyStorage::default();
        let first = ChatStore::new(&kv).create_room("One", "Ann").unwrap();

        kv.fail_reads_of(Some(ROOMS_KEY));
        let mut blind = ChatStore::new(&kv);
        let second = blind.create_room("Two", "Bea").unwrap();
        assert_eq!(blind.active_room().map(|r| &r.id), Some(&second.id));

        kv.fail_reads_of(None);
        let stored = ChatStore::new(&kv);
        let ids: Vec<&str> = stored.saved_rooms().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, [first.id.as_str()]);

        // once reads work again the held-back room goes out with the next write
        assert!(blind.send_message("back"));
        let ids: Vec<String> = ChatStore::new(&kv)
            .saved_rooms()
            .iter()
            .map(|r| r.id.clone())
            .collect();
        assert_eq!(ids, [first.id, second.id]);
    }

    #[test]
    fn seat_round_trips_through_restore() {
        let kv = MemoryStorage::default();
        let (alice, room) = hosted(&kv);

        let seat = alice.seat();
        assert_eq!(seat.active_room_id.as_deref(), Some(room.id.as_str()));

        let mut again = ChatStore::restore(&kv, seat);
        assert_eq!(again.active_room().map(|r| &r.id), Some(&room.id));
        assert!(again.send_message("still here"));
    }

    #[test]
    fn restore_drops_seat_for_unknown_room() {
        let kv = MemoryStorage::default();
        let seat = Seat {
            active_room_id: Some("gone".into()),
            current_user: Some(User::host("Alice")),
        };
        let store = ChatStore::restore(&kv, seat);
        assert!(store.active_room().is_none());
        assert!(store.current_user().is_none());
    }

    #[test]
    fn ended_rooms_newest_first() {
        let kv = MemoryStorage::default();
        let (mut first, _) = hosted(&kv);
        first.end_room();
        let (mut second, _) = hosted(&kv);
        second.end_room();
        let (open, _) = hosted(&kv);

        let mut store = ChatStore::new(&kv);
        store.refresh();
        let ended = store.ended_rooms();
        assert_eq!(ended.len(), 2);
        assert!(ended[0].ended_at >= ended[1].ended_at);
        assert!(ended.iter().all(|r| Some(&r.id) != open.active_room().map(|a| &a.id)));
    }

    #[test]
    fn listeners_hear_every_mutation() {
        let kv = MemoryStorage::default();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let mut alice = ChatStore::new(&kv);
        let sink = seen.clone();
        alice.subscribe(move |e| sink.lock().unwrap().push(e.kind));
        let room = alice.create_room("Standup", "Alice").unwrap();

        let mut bob = ChatStore::new(&kv);
        let sink = seen.clone();
        bob.subscribe(move |e| sink.lock().unwrap().push(e.kind));
        assert!(bob.join_room(&room.code, "Bob"));
        assert!(bob.send_message("hi"));
        bob.leave_room();
        alice.end_room();
        alice.end_room();

        assert_eq!(
            *seen.lock().unwrap(),
            [
                EventKind::Created,
                EventKind::Joined,
                EventKind::MessageSent,
                EventKind::Left,
                EventKind::Ended,
            ]
        );
    }
}
