use serde::{Deserialize, Serialize};

use crate::message::model::MessageDto;
use crate::user::Role;
use crate::{chat, user};

#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    JoinChat {
        chat_id: chat::Id,
    },
    LeaveChat {
        chat_id: chat::Id,
    },
    SendMessage {
        chat_id: chat::Id,
        sender_id: user::Id,
        sender_role: Role,
        text: String,
    },
}

#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Echoed to every joined connection, the sender included; the sender
    /// reconciles its optimistic copy against this authoritative one.
    ReceiveMessage(MessageDto),
    MessageFailed { error: String },
}
