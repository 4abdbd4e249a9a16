use futures::TryStreamExt;
use mongodb::bson::doc;

use crate::{chat, message};

use super::Id;
use super::model::Message;

const MESSAGES_COLLECTION: &str = "messages";

#[derive(Clone)]
pub struct MessageRepository {
    collection: mongodb::Collection<Message>,
}

impl MessageRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection(MESSAGES_COLLECTION),
        }
    }
}

impl MessageRepository {
    pub async fn insert(&self, message: &Message) -> super::Result<Id> {
        let result = self.collection.insert_one(message).await?;

        if let Some(id) = result.inserted_id.as_object_id() {
            return Ok(id);
        }

        Err(message::Error::Unexpected(
            "Failed to insert message".to_owned(),
        ))
    }

    pub async fn find_by_chat_id(&self, chat_id: &chat::Id) -> super::Result<Vec<Message>> {
        let cursor = self
            .collection
            .find(doc! {"chat_id": chat_id})
            .sort(doc! {"timestamp": 1})
            .await?;

        let messages = cursor.try_collect::<Vec<Message>>().await?;

        Ok(messages)
    }

    /// Last `limit` messages, returned in ascending order.
    pub async fn find_by_chat_id_limited(
        &self,
        chat_id: &chat::Id,
        limit: usize,
    ) -> super::Result<Vec<Message>> {
        let cursor = self
            .collection
            .find(doc! {"chat_id": chat_id})
            .sort(doc! {"timestamp": -1})
            .limit(limit as i64)
            .await?;

        let messages = cursor
            .try_collect::<Vec<Message>>()
            .await
            .map(|mut messages| {
                messages.reverse();
                messages
            })?;

        Ok(messages)
    }

    /// Messages strictly before the cursor, ascending.
    pub async fn find_by_chat_id_before(
        &self,
        chat_id: &chat::Id,
        before: i64,
    ) -> super::Result<Vec<Message>> {
        let cursor = self
            .collection
            .find(doc! {
                "chat_id": chat_id,
                "timestamp": {"$lt": before}
            })
            .sort(doc! {"timestamp": 1})
            .await?;

        let messages = cursor.try_collect::<Vec<Message>>().await?;

        Ok(messages)
    }

    pub async fn find_by_chat_id_limited_before(
        &self,
        chat_id: &chat::Id,
        limit: usize,
        before: i64,
    ) -> super::Result<Vec<Message>> {
        let cursor = self
            .collection
            .find(doc! {
                "chat_id": chat_id,
                "timestamp": {"$lt": before}
            })
            .sort(doc! {"timestamp": -1})
            .limit(limit as i64)
            .await?;

        let messages = cursor
            .try_collect::<Vec<Message>>()
            .await
            .map(|mut messages| {
                messages.reverse();
                messages
            })?;

        Ok(messages)
    }
}
