#![allow(dead_code)]

use mongodb::bson::oid::ObjectId;
use tokio::sync::mpsc;

use marketplace_chat::auth::Identity;
use marketplace_chat::chat::repository::ChatRepository;
use marketplace_chat::chat::service::ChatService;
use marketplace_chat::event::context::Ws;
use marketplace_chat::event::model::Event;
use marketplace_chat::event::service::EventService;
use marketplace_chat::integration::{cache, db};
use marketplace_chat::message::repository::MessageRepository;
use marketplace_chat::message::service::MessageService;
use marketplace_chat::product::repository::ProductRepository;
use marketplace_chat::user::Role;
use marketplace_chat::user::repository::UserRepository;

use testcontainers_modules::mongo::Mongo;
use testcontainers_modules::redis::{REDIS_PORT, Redis};
use testcontainers_modules::testcontainers::ContainerAsync;
use testcontainers_modules::testcontainers::runners::AsyncRunner;

pub const MAX_MESSAGE_LEN: usize = 2000;

pub struct TestApp {
    _mongo: ContainerAsync<Mongo>,
    _redis: ContainerAsync<Redis>,
    pub db: mongodb::Database,
    pub chat_service: ChatService,
    pub message_service: MessageService,
    pub event_service: EventService,
}

impl TestApp {
    pub async fn init() -> Self {
        let mongo = Mongo::default().start().await.unwrap();
        let redis = Redis::default().start().await.unwrap();

        let mongo_config = db::Config::new(
            mongo.get_host().await.unwrap().to_string(),
            mongo.get_host_port_ipv4(27017).await.unwrap(),
            String::from("test_marketplace_chat"),
        );
        let cache_config = cache::Config::new(
            redis.get_host().await.unwrap().to_string(),
            redis.get_host_port_ipv4(REDIS_PORT).await.unwrap(),
        );

        let db = db::init(&mongo_config).await.unwrap();
        let redis_con = cache::init(&cache_config).await.unwrap();

        let chat_repository = ChatRepository::new(&db);
        chat_repository.create_indexes().await.unwrap();

        let chat_service = ChatService::new(
            chat_repository,
            UserRepository::new(&db),
            ProductRepository::new(&db),
            redis_con,
        );
        let message_service = MessageService::new(MessageRepository::new(&db), MAX_MESSAGE_LEN);
        let event_service = EventService::new(chat_service.clone(), message_service.clone());

        Self {
            _mongo: mongo,
            _redis: redis,
            db,
            chat_service,
            message_service,
            event_service,
        }
    }

    /// Stand-in for an upgraded socket: the connection context plus the
    /// inbox its write task would drain.
    pub fn connect(&self, identity: &Identity) -> (Ws, mpsc::UnboundedReceiver<Event>) {
        let (outbox, inbox) = mpsc::unbounded_channel();
        (Ws::new(identity.clone(), outbox), inbox)
    }
}

pub fn buyer() -> Identity {
    Identity::new(ObjectId::new(), Role::Buyer)
}

pub fn seller() -> Identity {
    Identity::new(ObjectId::new(), Role::Seller)
}
