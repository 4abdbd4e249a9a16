use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{Notify, RwLock, mpsc};
use uuid::Uuid;

use crate::auth::Identity;
use crate::chat;

use super::model::Event;

/// Per-connection state: who is on the wire, which channels they joined and
/// the outbox feeding their write task. Routing state only; nothing here
/// survives a restart.
#[derive(Clone)]
pub struct Ws {
    pub conn_id: Uuid,
    identity: Identity,
    joined: Arc<RwLock<HashSet<chat::Id>>>,
    outbox: mpsc::UnboundedSender<Event>,
    pub close: Arc<Notify>,
}

impl Ws {
    pub fn new(identity: Identity, outbox: mpsc::UnboundedSender<Event>) -> Self {
        Self {
            conn_id: Uuid::new_v4(),
            identity,
            joined: Arc::new(RwLock::new(HashSet::new())),
            outbox,
            close: Arc::new(Notify::new()),
        }
    }
}

impl Ws {
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn outbox(&self) -> mpsc::UnboundedSender<Event> {
        self.outbox.clone()
    }

    /// A closed inbox means the write task is gone; the registry prunes the
    /// stale outbox on the next delivery.
    pub fn push(&self, event: Event) {
        let _ = self.outbox.send(event);
    }

    pub async fn add_joined(&self, chat_id: &chat::Id) {
        self.joined.write().await.insert(*chat_id);
    }

    pub async fn remove_joined(&self, chat_id: &chat::Id) {
        self.joined.write().await.remove(chat_id);
    }

    pub async fn joined(&self) -> Vec<chat::Id> {
        self.joined.read().await.iter().copied().collect()
    }
}
