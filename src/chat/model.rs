use mongodb::bson::serde_helpers::serialize_object_id_as_hex_string;
use serde::{Deserialize, Serialize, Serializer};

use crate::user::Role;
use crate::{product, user};

use super::Id;

/// A chat room between exactly one buyer and one seller, optionally opened
/// from a product page. The two identities are fixed at creation.
#[derive(Serialize, Deserialize, Clone)]
pub struct Chat {
    #[serde(alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    /// The pair in canonical order, kept for non-directional lookup.
    pub participants: [user::Id; 2],
    pub buyer_id: user::Id,
    pub seller_id: user::Id,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<product::Id>,
    pub last_message_text: Option<String>,
    pub last_message_sender_id: Option<user::Id>,
    pub last_message_timestamp: i64,
    pub buyer_unread_count: i64,
    pub seller_unread_count: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Chat {
    pub fn new(buyer_id: user::Id, seller_id: user::Id, product_id: Option<product::Id>) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            id: None,
            participants: Self::sorted_pair(&buyer_id, &seller_id),
            buyer_id,
            seller_id,
            product_id,
            last_message_text: None,
            last_message_sender_id: None,
            last_message_timestamp: now,
            buyer_unread_count: 0,
            seller_unread_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Canonical ordering of the pair, by hex representation. Lookups sort
    /// the same way, so call-site ordering never matters.
    pub fn sorted_pair(a: &user::Id, b: &user::Id) -> [user::Id; 2] {
        let mut pair = [*a, *b];
        pair.sort_by(|x, y| x.to_hex().cmp(&y.to_hex()));
        pair
    }

    /// Derives the role of an id from the authoritative participant fields.
    /// `None` means the id is not part of this chat.
    pub fn role_of(&self, user_id: &user::Id) -> Option<Role> {
        if self.buyer_id == *user_id {
            Some(Role::Buyer)
        } else if self.seller_id == *user_id {
            Some(Role::Seller)
        } else {
            None
        }
    }

    pub fn participant(&self, role: Role) -> &user::Id {
        match role {
            Role::Buyer => &self.buyer_id,
            Role::Seller => &self.seller_id,
        }
    }

    pub fn unread_count(&self, role: Role) -> i64 {
        match role {
            Role::Buyer => self.buyer_unread_count,
            Role::Seller => self.seller_unread_count,
        }
    }
}

/// Per-requester projection for the chat list: the counterpart, the product
/// context, the last-message cache and the requester's own unread counter.
#[derive(Serialize)]
pub struct ChatDto {
    #[serde(serialize_with = "serialize_object_id_as_hex_string")]
    pub id: Id,
    #[serde(serialize_with = "serialize_object_id_as_hex_string")]
    pub recipient: user::Id,
    pub recipient_name: Option<String>,
    #[serde(
        serialize_with = "serialize_opt_object_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub product_id: Option<product::Id>,
    pub product_name: Option<String>,
    pub last_message_text: Option<String>,
    pub last_message_timestamp: i64,
    pub unread_count: i64,
}

impl ChatDto {
    pub fn new(
        chat: Chat,
        requester_role: Role,
        recipient_name: Option<String>,
        product_name: Option<String>,
    ) -> super::Result<Self> {
        let id = chat.id.ok_or(super::Error::NotCreated)?;
        let recipient = *chat.participant(requester_role.counterpart());

        Ok(Self {
            id,
            recipient,
            recipient_name,
            product_id: chat.product_id,
            product_name,
            unread_count: chat.unread_count(requester_role),
            last_message_text: chat.last_message_text,
            last_message_timestamp: chat.last_message_timestamp,
        })
    }
}

fn serialize_opt_object_id<S>(id: &Option<product::Id>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match id {
        Some(id) => serializer.serialize_some(&id.to_hex()),
        None => serializer.serialize_none(),
    }
}
