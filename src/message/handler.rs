use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use crate::auth::Identity;
use crate::chat;
use crate::chat::service::ChatService;

use super::model::MessageDto;
use super::service::MessageService;

impl From<&super::Error> for StatusCode {
    fn from(e: &super::Error) -> Self {
        match e {
            super::Error::Validation(_) => Self::BAD_REQUEST,
            super::Error::Unexpected(_) | super::Error::_MongoDB(_) => {
                Self::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Deserialize)]
pub struct Params {
    limit: Option<usize>,
    before: Option<i64>,
}

/// Chat history, ascending by timestamp. `before` is an exclusive cursor for
/// paging backwards through older messages.
pub async fn find_by_chat(
    identity: Identity,
    Path(chat_id): Path<chat::Id>,
    Query(params): Query<Params>,
    State(chat_service): State<ChatService>,
    State(message_service): State<MessageService>,
) -> crate::Result<Json<Vec<MessageDto>>> {
    chat_service.check_member(&chat_id, &identity.id).await?;

    let messages = message_service
        .find_by_chat_id_and_params(&chat_id, params.limit, params.before)
        .await?;

    Ok(Json(messages))
}
