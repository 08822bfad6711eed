use serde::{Deserialize, Serialize};

use crate::ids::{new_id, now_ms};

pub const SYSTEM_SENDER_ID: &str = "system";
pub const SYSTEM_DISPLAY_CHAR: &str = "System";
pub const HOST_DISPLAY_CHAR: &str = "H";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Host,
    Participant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub display_char: String,
    pub role: Role,
}

impl User {
    pub fn host(name: &str) -> User {
        User {
            id: new_id(),
            name: name.to_owned(),
            display_char: HOST_DISPLAY_CHAR.to_owned(),
            role: Role::Host,
        }
    }

    pub fn participant(name: &str, display_char: String) -> User {
        User {
            id: new_id(),
            name: name.to_owned(),
            display_char,
            role: Role::Participant,
        }
    }

    pub fn is_host(&self) -> bool {
        self.role == Role::Host
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    pub sender_display_char: String,
    pub content: String,
    /// epoch millis
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_system: bool,
}

impl Message {
    pub fn from_user(user: &User, content: &str) -> Message {
        Message {
            id: new_id(),
            sender_id: user.id.clone(),
            sender_display_char: user.display_char.clone(),
            content: content.to_owned(),
            timestamp: now_ms(),
            is_system: false,
        }
    }

    pub fn system(content: String) -> Message {
        Message {
            id: new_id(),
            sender_id: SYSTEM_SENDER_ID.to_owned(),
            sender_display_char: SYSTEM_DISPLAY_CHAR.to_owned(),
            content,
            timestamp: now_ms(),
            is_system: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRoom {
    pub id: String,
    pub name: String,
    pub code: String,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<i64>,
    pub host_id: String,
    pub participants: Vec<User>,
    pub messages: Vec<Message>,
}

impl ChatRoom {
    pub fn is_ended(&self) -> bool {
        self.ended_at.is_some()
    }

    pub fn participant(&self, user_id: &str) -> Option<&User> {
        self.participants.iter().find(|p| p.id == user_id)
    }

    pub fn has_name(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.participants.iter().any(|p| p.name.to_lowercase() == name)
    }
}
