use mongodb::bson::oid::ObjectId;

use marketplace_chat::message;
use marketplace_chat::message::model::{Message, SenderModel};
use marketplace_chat::message::repository::MessageRepository;
use marketplace_chat::message::service::MessageService;

mod common;

use common::TestApp;

#[tokio::test]
async fn created_message_lands_at_the_tail() {
    let app = TestApp::init().await;
    let chat_id = ObjectId::new();
    let sender = ObjectId::new();

    let repository = MessageRepository::new(&app.db);
    let backlog =
        Message::new(chat_id, sender, SenderModel::Customer, "first").with_timestamp(100);
    repository.insert(&backlog).await.unwrap();

    app.message_service
        .create(Message::new(chat_id, sender, SenderModel::Customer, "second"))
        .await
        .unwrap();

    let messages = app
        .message_service
        .find_by_chat_id_and_params(&chat_id, None, None)
        .await
        .unwrap();

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].text, "first");
    assert_eq!(messages[1].text, "second");
    assert!(messages[0].timestamp <= messages[1].timestamp);
}

#[tokio::test]
async fn history_is_scoped_to_one_chat() {
    let app = TestApp::init().await;
    let chat_id = ObjectId::new();
    let other_chat = ObjectId::new();
    let sender = ObjectId::new();

    app.message_service
        .create(Message::new(chat_id, sender, SenderModel::Customer, "mine"))
        .await
        .unwrap();
    app.message_service
        .create(Message::new(other_chat, sender, SenderModel::Customer, "not mine"))
        .await
        .unwrap();

    let messages = app
        .message_service
        .find_by_chat_id_and_params(&chat_id, None, None)
        .await
        .unwrap();

    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].text, "mine");
}

#[tokio::test]
async fn pagination_limits_and_cuts_before_a_timestamp() {
    let app = TestApp::init().await;
    let chat_id = ObjectId::new();
    let sender = ObjectId::new();

    let repository = MessageRepository::new(&app.db);
    for (text, timestamp) in [("one", 100), ("two", 200), ("three", 300), ("four", 400)] {
        let message = Message::new(chat_id, sender, SenderModel::Seller, text)
            .with_timestamp(timestamp);
        repository.insert(&message).await.unwrap();
    }

    // limit keeps the newest n, still in ascending order
    let limited = app
        .message_service
        .find_by_chat_id_and_params(&chat_id, Some(2), None)
        .await
        .unwrap();
    assert_eq!(
        limited.iter().map(|m| m.text.as_str()).collect::<Vec<_>>(),
        vec!["three", "four"]
    );

    // before is exclusive
    let older = app
        .message_service
        .find_by_chat_id_and_params(&chat_id, None, Some(300))
        .await
        .unwrap();
    assert_eq!(
        older.iter().map(|m| m.text.as_str()).collect::<Vec<_>>(),
        vec!["one", "two"]
    );

    let page = app
        .message_service
        .find_by_chat_id_and_params(&chat_id, Some(1), Some(300))
        .await
        .unwrap();
    assert_eq!(
        page.iter().map(|m| m.text.as_str()).collect::<Vec<_>>(),
        vec!["two"]
    );
}

#[tokio::test]
async fn create_rejects_blank_text() {
    let app = TestApp::init().await;
    let chat_id = ObjectId::new();

    let result = app
        .message_service
        .create(Message::new(
            chat_id,
            ObjectId::new(),
            SenderModel::Customer,
            "   ",
        ))
        .await;

    assert!(matches!(result, Err(message::Error::Validation(_))));

    let messages = app
        .message_service
        .find_by_chat_id_and_params(&chat_id, None, None)
        .await
        .unwrap();
    assert!(messages.is_empty());
}

#[tokio::test]
async fn create_rejects_oversized_text() {
    let app = TestApp::init().await;
    let service = MessageService::new(MessageRepository::new(&app.db), 10);

    let result = service
        .create(Message::new(
            ObjectId::new(),
            ObjectId::new(),
            SenderModel::Customer,
            &"x".repeat(11),
        ))
        .await;

    assert!(matches!(result, Err(message::Error::Validation(_))));
}
