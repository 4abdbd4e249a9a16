use futures::stream::TryStreamExt;
use mongodb::IndexModel;
use mongodb::bson::doc;
use mongodb::options::IndexOptions;

use crate::user::Role;
use crate::{chat, user};

use super::Id;
use super::model::Chat;

const CHATS_COLLECTION: &str = "chats";

fn unread_field(role: Role) -> &'static str {
    match role {
        Role::Buyer => "buyer_unread_count",
        Role::Seller => "seller_unread_count",
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        &*err.kind,
        mongodb::error::ErrorKind::Write(mongodb::error::WriteFailure::WriteError(we))
            if we.code == 11000
    )
}

#[derive(Clone)]
pub struct ChatRepository {
    collection: mongodb::Collection<Chat>,
}

impl ChatRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection(CHATS_COLLECTION),
        }
    }

    /// The unique (buyer_id, seller_id) index is the authority on the
    /// one-chat-per-pair rule; resolver races surface here as duplicate keys.
    pub async fn create_indexes(&self) -> super::Result<()> {
        let unique_pair = IndexModel::builder()
            .keys(doc! {"buyer_id": 1, "seller_id": 1})
            .options(IndexOptions::builder().unique(true).build())
            .build();

        let members = IndexModel::builder()
            .keys(doc! {"participants": 1})
            .build();

        self.collection.create_index(unique_pair).await?;
        self.collection.create_index(members).await?;

        Ok(())
    }
}

impl ChatRepository {
    pub async fn insert(&self, chat: &Chat) -> super::Result<Chat> {
        let result = self.collection.insert_one(chat).await.map_err(|e| {
            if is_duplicate_key(&e) {
                chat::Error::AlreadyExists(chat.participants)
            } else {
                chat::Error::from(e)
            }
        })?;

        if let Some(id) = result.inserted_id.as_object_id() {
            return self.find_by_id(&id).await;
        }

        Err(chat::Error::NotCreated)
    }

    pub async fn find_by_id(&self, id: &Id) -> super::Result<Chat> {
        self.collection
            .find_one(doc! {"_id": id})
            .await?
            .ok_or(chat::Error::NotFound(Some(*id)))
    }

    pub async fn find_by_participants(&self, pair: &[user::Id; 2]) -> super::Result<Chat> {
        self.collection
            .find_one(doc! {"participants": {"$all": pair.to_vec()}})
            .await?
            .ok_or(chat::Error::NotFound(None))
    }

    pub async fn find_by_member(&self, user_id: &user::Id) -> super::Result<Vec<Chat>> {
        let cursor = self
            .collection
            .find(doc! {"participants": user_id})
            .sort(doc! {"updated_at": -1})
            .await?;

        let chats = cursor.try_collect::<Vec<Chat>>().await?;

        Ok(chats)
    }

    /// Single atomic document update for a delivered message: refresh the
    /// last-message cache, zero the sender's counter and increment the
    /// recipient's. The `$inc` applies on top of whatever a concurrent
    /// writer persisted, never on a stale read.
    pub async fn register_message(
        &self,
        id: &Id,
        sender_id: &user::Id,
        sender_role: Role,
        text: &str,
        timestamp: i64,
    ) -> super::Result<()> {
        let mut set = doc! {
            "last_message_text": text,
            "last_message_sender_id": sender_id,
            "last_message_timestamp": timestamp,
            "updated_at": chrono::Utc::now().timestamp(),
        };
        set.insert(unread_field(sender_role), 0_i64);

        let mut inc = mongodb::bson::Document::new();
        inc.insert(unread_field(sender_role.counterpart()), 1_i64);

        self.collection
            .update_one(doc! {"_id": id}, doc! {"$set": set, "$inc": inc})
            .await?;
        Ok(())
    }

    /// Zero one side's counter. The filter skips the write when the counter
    /// is already zero.
    pub async fn reset_unread(&self, id: &Id, role: Role) -> super::Result<()> {
        let mut filter = doc! {"_id": id};
        filter.insert(unread_field(role), doc! {"$gt": 0});

        let mut set = doc! {"updated_at": chrono::Utc::now().timestamp()};
        set.insert(unread_field(role), 0_i64);

        self.collection
            .update_one(filter, doc! {"$set": set})
            .await?;
        Ok(())
    }
}
