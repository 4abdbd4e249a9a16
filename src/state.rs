use axum::extract::FromRef;

use crate::chat::repository::ChatRepository;
use crate::chat::service::ChatService;
use crate::event::service::EventService;
use crate::integration;
use crate::message::repository::MessageRepository;
use crate::message::service::MessageService;
use crate::product::repository::ProductRepository;
use crate::user::repository::UserRepository;

#[derive(Clone)]
pub struct AppState {
    pub chat_service: ChatService,
    pub message_service: MessageService,
    pub event_service: EventService,
}

impl AppState {
    pub async fn init(config: &integration::Config) -> crate::Result<Self> {
        let db = integration::db::init(&config.mongo).await?;
        let redis_con = integration::cache::init(&config.redis).await?;

        let chat_repository = ChatRepository::new(&db);
        chat_repository.create_indexes().await?;

        let chat_service = ChatService::new(
            chat_repository,
            UserRepository::new(&db),
            ProductRepository::new(&db),
            redis_con,
        );
        let message_service =
            MessageService::new(MessageRepository::new(&db), config.max_message_len);
        let event_service = EventService::new(chat_service.clone(), message_service.clone());

        Ok(Self {
            chat_service,
            message_service,
            event_service,
        })
    }
}

impl FromRef<AppState> for ChatService {
    fn from_ref(state: &AppState) -> Self {
        state.chat_service.clone()
    }
}

impl FromRef<AppState> for MessageService {
    fn from_ref(state: &AppState) -> Self {
        state.message_service.clone()
    }
}

impl FromRef<AppState> for EventService {
    fn from_ref(state: &AppState) -> Self {
        state.event_service.clone()
    }
}
