use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Created,
    Joined,
    MessageSent,
    Left,
    Ended,
}

/// Published after a mutation has been written to storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreEvent {
    pub room_id: String,
    pub code: String,
    pub kind: EventKind,
}

pub type Listener = Box<dyn Fn(&StoreEvent) + Send + Sync>;
