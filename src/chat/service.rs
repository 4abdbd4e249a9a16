use std::sync::Arc;

use dashmap::DashMap;
use futures::future::try_join_all;
use redis::AsyncCommands;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::auth::Identity;
use crate::integration::cache;
use crate::message::model::Message;
use crate::product::repository::ProductRepository;
use crate::user::Role;
use crate::user::repository::UserRepository;
use crate::{chat, user};

use super::Id;
use super::model::{Chat, ChatDto};
use super::repository::ChatRepository;

const CHAT_TTL: i64 = 3600;

/// Per-chat critical sections. An entry lives only while some task holds or
/// awaits its lock; releasing an uncontended lock prunes the entry.
#[derive(Clone, Default)]
struct LockRegistry {
    locks: Arc<DashMap<Id, Arc<Mutex<()>>>>,
}

impl LockRegistry {
    async fn acquire(&self, id: &Id) -> ChatLock {
        let mutex = self
            .locks
            .entry(*id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let guard = mutex.lock_owned().await;

        ChatLock {
            id: *id,
            guard: Some(guard),
            locks: Arc::clone(&self.locks),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.len()
    }
}

/// Holds one chat's critical section until dropped.
pub struct ChatLock {
    id: Id,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<DashMap<Id, Arc<Mutex<()>>>>,
}

impl Drop for ChatLock {
    fn drop(&mut self) {
        self.guard.take();
        // a strong count of one means neither a holder nor a waiter is left
        self.locks
            .remove_if(&self.id, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}

#[derive(Clone)]
pub struct ChatService {
    repository: Arc<ChatRepository>,
    user_repository: Arc<UserRepository>,
    product_repository: Arc<ProductRepository>,
    redis_con: redis::aio::ConnectionManager,
    /// Routing-level state only; counter updates themselves are single
    /// atomic document writes.
    locks: LockRegistry,
}

impl ChatService {
    pub fn new(
        repository: ChatRepository,
        user_repository: UserRepository,
        product_repository: ProductRepository,
        redis_con: redis::aio::ConnectionManager,
    ) -> Self {
        Self {
            repository: Arc::new(repository),
            user_repository: Arc::new(user_repository),
            product_repository: Arc::new(product_repository),
            redis_con,
            locks: LockRegistry::default(),
        }
    }
}

impl ChatService {
    /// Serializes read-modify-write sequences targeting one chat. Unrelated
    /// chats proceed independently.
    pub async fn lock(&self, id: &Id) -> ChatLock {
        self.locks.acquire(id).await
    }
}

impl ChatService {
    /// Find-or-create for a (buyer, seller) pair. Concurrent resolves for
    /// the same pair converge on one chat: the unique index rejects the
    /// loser's insert and the existing chat is fetched instead.
    pub async fn resolve(
        &self,
        identity: &Identity,
        other_participant: &user::Id,
        product_id: Option<crate::product::Id>,
    ) -> super::Result<Id> {
        if identity.id == *other_participant {
            return Err(chat::Error::SameParticipant);
        }

        let (buyer_id, seller_id) = match identity.role {
            Role::Buyer => (identity.id, *other_participant),
            Role::Seller => (*other_participant, identity.id),
        };

        let pair = Chat::sorted_pair(&buyer_id, &seller_id);

        match self.repository.find_by_participants(&pair).await {
            Ok(chat) => chat.id.ok_or(chat::Error::NotCreated),
            Err(chat::Error::NotFound(_)) => {
                match self
                    .repository
                    .insert(&Chat::new(buyer_id, seller_id, product_id))
                    .await
                {
                    Ok(chat) => chat.id.ok_or(chat::Error::NotCreated),
                    Err(chat::Error::AlreadyExists(_)) => {
                        let chat = self.repository.find_by_participants(&pair).await?;
                        chat.id.ok_or(chat::Error::NotCreated)
                    }
                    Err(err) => Err(err),
                }
            }
            Err(err) => Err(err),
        }
    }

    pub async fn find_by_id(&self, id: &Id) -> super::Result<Chat> {
        self.repository.find_by_id(id).await
    }

    pub async fn find_all(&self, identity: &Identity) -> super::Result<Vec<ChatDto>> {
        let chats = self.repository.find_by_member(&identity.id).await?;

        let dtos = try_join_all(
            chats
                .into_iter()
                .map(|chat| async { self.chat_to_dto(chat, identity).await }),
        )
        .await?;

        Ok(dtos.into_iter().flatten().collect())
    }

    async fn chat_to_dto(&self, chat: Chat, identity: &Identity) -> super::Result<Option<ChatDto>> {
        let Some(role) = chat.role_of(&identity.id) else {
            return Ok(None);
        };

        let recipient = *chat.participant(role.counterpart());
        let recipient_name = self
            .user_repository
            .find_name(&recipient, role.counterpart())
            .await?;

        let product_name = match &chat.product_id {
            Some(product_id) => self.product_repository.find_name(product_id).await?,
            None => None,
        };

        ChatDto::new(chat, role, recipient_name, product_name).map(Some)
    }
}

// read-state transitions
impl ChatService {
    /// Explicit mark-read: zero the caller's own counter, independent of any
    /// channel join.
    pub async fn mark_read(&self, id: &Id, identity: &Identity) -> super::Result<()> {
        let _guard = self.lock(id).await;

        let chat = self.repository.find_by_id(id).await?;
        let role = chat.role_of(&identity.id).ok_or(chat::Error::NotParticipant)?;

        self.repository.reset_unread(id, role).await
    }

    /// Joining a channel counts as reading it. A join to an unknown chat is
    /// a silent no-op, and a non-participant join never touches counters.
    pub async fn reset_unread_on_join(&self, id: &Id, identity: &Identity) -> super::Result<()> {
        let _guard = self.lock(id).await;

        let chat = match self.repository.find_by_id(id).await {
            Ok(chat) => chat,
            Err(chat::Error::NotFound(_)) => return Ok(()),
            Err(err) => return Err(err),
        };

        if let Some(role) = chat.role_of(&identity.id) {
            if chat.unread_count(role) > 0 {
                self.repository.reset_unread(id, role).await?;
            }
        }

        Ok(())
    }

    /// Applies a delivered message to the chat document. Callers hold the
    /// per-chat lock across append + apply.
    pub async fn register_message(&self, message: &Message, sender_role: Role) -> super::Result<()> {
        self.repository
            .register_message(
                &message.chat_id,
                &message.sender,
                sender_role,
                &message.text,
                message.timestamp,
            )
            .await
    }
}

// participant validation, backed by the cache
impl ChatService {
    pub async fn check_member(&self, chat_id: &Id, user_id: &user::Id) -> super::Result<()> {
        let participants = self.find_participants(chat_id).await?;

        if !participants.contains(user_id) {
            return Err(chat::Error::NotParticipant);
        }

        Ok(())
    }

    /// The participant pair is immutable, so a cached copy never goes stale.
    async fn find_participants(&self, chat_id: &Id) -> super::Result<[user::Id; 2]> {
        let mut con = self.redis_con.clone();
        let cache_key = cache::Key::Chat(*chat_id);

        let cached: Option<Vec<String>> = con.smembers(cache_key.clone()).await?;
        if let Some(members) = cached {
            if members.len() == 2 {
                if let (Ok(a), Ok(b)) = (
                    user::Id::parse_str(&members[0]),
                    user::Id::parse_str(&members[1]),
                ) {
                    return Ok([a, b]);
                }
            }
        }

        let chat = self.repository.find_by_id(chat_id).await?;
        let participants = chat.participants;

        let hex = participants.iter().map(|p| p.to_hex()).collect::<Vec<_>>();
        let _: () = con.sadd(&cache_key, &hex).await?;
        let _: () = con.expire(&cache_key, CHAT_TTL).await?;

        Ok(participants)
    }
}
