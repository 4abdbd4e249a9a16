use mongodb::bson::serde_helpers::serialize_object_id_as_hex_string;
use serde::{Deserialize, Serialize};

use crate::user::Role;
use crate::{chat, user};

use super::Id;

/// Which account collection the sender document lives in. Derived from the
/// chat's authoritative participants, never taken from the client payload.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SenderModel {
    Customer,
    Seller,
}

impl From<Role> for SenderModel {
    fn from(role: Role) -> Self {
        match role {
            Role::Buyer => Self::Customer,
            Role::Seller => Self::Seller,
        }
    }
}

#[derive(Serialize, Deserialize, Clone)]
pub struct Message {
    #[serde(alias = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<Id>,
    pub chat_id: chat::Id,
    pub sender: user::Id,
    pub sender_model: SenderModel,
    pub text: String,
    pub timestamp: i64,
}

impl Message {
    pub fn new(chat_id: chat::Id, sender: user::Id, sender_model: SenderModel, text: &str) -> Self {
        Self {
            id: None,
            chat_id,
            sender,
            sender_model,
            text: text.to_string(),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    pub fn with_id(&self, id: Id) -> Self {
        Self {
            id: Some(id),
            ..self.clone()
        }
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct MessageDto {
    #[serde(serialize_with = "serialize_object_id_as_hex_string")]
    pub id: Id,
    #[serde(serialize_with = "serialize_object_id_as_hex_string")]
    pub chat_room: chat::Id,
    #[serde(serialize_with = "serialize_object_id_as_hex_string")]
    pub sender: user::Id,
    pub text: String,
    pub timestamp: i64,
    pub sender_model: SenderModel,
}

impl From<Message> for MessageDto {
    fn from(message: Message) -> Self {
        Self {
            id: message.id.expect("message id must be set after insert"),
            chat_room: message.chat_id,
            sender: message.sender,
            text: message.text,
            timestamp: message.timestamp,
            sender_model: message.sender_model,
        }
    }
}

#[cfg(test)]
mod tests {
    use mongodb::bson::oid::ObjectId;

    use super::{Message, SenderModel};
    use crate::user::Role;

    #[test]
    fn sender_model_follows_role() {
        assert_eq!(SenderModel::from(Role::Buyer), SenderModel::Customer);
        assert_eq!(SenderModel::from(Role::Seller), SenderModel::Seller);
    }

    #[test]
    fn dto_carries_persisted_fields() {
        let chat_id = ObjectId::new();
        let sender = ObjectId::new();
        let id = ObjectId::new();

        let message =
            Message::new(chat_id, sender, SenderModel::Customer, "hello").with_id(id);
        let dto = super::MessageDto::from(message);

        assert_eq!(dto.id, id);
        assert_eq!(dto.chat_room, chat_id);
        assert_eq!(dto.sender, sender);
        assert_eq!(dto.text, "hello");
        assert_eq!(dto.sender_model, SenderModel::Customer);
    }
}
