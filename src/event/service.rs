use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use log::debug;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::chat;
use crate::chat::service::ChatService;
use crate::event;
use crate::message::model::{Message, MessageDto};
use crate::message::service::MessageService;
use crate::user;
use crate::user::Role;

use super::context;
use super::model::{Command, Event};

/// Outboxes of the connections currently joined to one chat's channel.
type Channel = HashMap<Uuid, mpsc::UnboundedSender<Event>>;

#[derive(Clone)]
pub struct EventService {
    chat_service: Arc<ChatService>,
    message_service: Arc<MessageService>,
    channels: Arc<DashMap<chat::Id, Channel>>,
}

impl EventService {
    pub fn new(chat_service: ChatService, message_service: MessageService) -> Self {
        Self {
            chat_service: Arc::new(chat_service),
            message_service: Arc::new(message_service),
            channels: Arc::new(DashMap::new()),
        }
    }
}

impl EventService {
    pub async fn handle_command(&self, ctx: &context::Ws, command: Command) -> super::Result<()> {
        debug!("handling command: {command:?}");

        match command {
            Command::JoinChat { chat_id } => self.join(ctx, &chat_id).await,
            Command::LeaveChat { chat_id } => {
                self.leave(ctx, &chat_id).await;
                Ok(())
            }
            Command::SendMessage {
                chat_id,
                sender_id,
                sender_role,
                text,
            } => self.send(ctx, chat_id, sender_id, sender_role, &text).await,
        }
    }

    /// Registering the connection is pure routing; joining as a participant
    /// additionally counts as reading the chat.
    async fn join(&self, ctx: &context::Ws, chat_id: &chat::Id) -> super::Result<()> {
        self.channels
            .entry(*chat_id)
            .or_default()
            .insert(ctx.conn_id, ctx.outbox());
        ctx.add_joined(chat_id).await;

        debug!("connection {} joined chat {chat_id}", ctx.conn_id);

        self.chat_service
            .reset_unread_on_join(chat_id, ctx.identity())
            .await
            .map_err(event::Error::from)
    }

    async fn leave(&self, ctx: &context::Ws, chat_id: &chat::Id) {
        let mut emptied = false;
        if let Some(mut channel) = self.channels.get_mut(chat_id) {
            channel.remove(&ctx.conn_id);
            emptied = channel.is_empty();
        }
        if emptied {
            self.channels.remove_if(chat_id, |_, channel| channel.is_empty());
        }

        ctx.remove_joined(chat_id).await;

        debug!("connection {} left chat {chat_id}", ctx.conn_id);
    }

    /// The validated send pipeline. Holds the per-chat lock from lookup to
    /// fan-out so two sends to one chat never interleave, while sends to
    /// other chats proceed untouched.
    async fn send(
        &self,
        ctx: &context::Ws,
        chat_id: chat::Id,
        sender_id: user::Id,
        sender_role: Role,
        text: &str,
    ) -> super::Result<()> {
        if text.trim().is_empty() {
            return Err(event::Error::MalformedEvent);
        }

        let _guard = self.chat_service.lock(&chat_id).await;

        let chat = self.chat_service.find_by_id(&chat_id).await?;

        // the claimed role is cross-checked against the chat's authoritative
        // participants, and the payload sender against the session identity
        let derived_role = chat.role_of(&sender_id);
        if sender_id != ctx.identity().id || derived_role != Some(sender_role) {
            return Err(event::Error::from(chat::Error::NotParticipant));
        }

        let message = self
            .message_service
            .create(Message::new(chat_id, sender_id, sender_role.into(), text))
            .await?;

        self.chat_service
            .register_message(&message, sender_role)
            .await?;

        self.broadcast(&chat_id, Event::ReceiveMessage(MessageDto::from(message)));

        Ok(())
    }

    /// Fan-out to whoever is joined at delivery time, sender included.
    fn broadcast(&self, chat_id: &chat::Id, event: Event) {
        if let Some(mut channel) = self.channels.get_mut(chat_id) {
            channel.retain(|_, outbox| outbox.send(event.clone()).is_ok());
        }
    }

    pub async fn drop_connection(&self, ctx: &context::Ws) {
        for chat_id in ctx.joined().await {
            self.leave(ctx, &chat_id).await;
        }
    }
}
