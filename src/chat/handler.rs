use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use mongodb::bson::serde_helpers::serialize_object_id_as_hex_string;
use serde::{Deserialize, Serialize};

use crate::auth::Identity;
use crate::{product, user};

use super::Id;
use super::model::ChatDto;
use super::service::ChatService;

impl From<&super::Error> for StatusCode {
    fn from(e: &super::Error) -> Self {
        match e {
            super::Error::NotFound(_) => Self::NOT_FOUND,
            super::Error::NotParticipant => Self::FORBIDDEN,
            super::Error::SameParticipant => Self::BAD_REQUEST,
            super::Error::AlreadyExists(_) => Self::CONFLICT,
            super::Error::NotCreated
            | super::Error::_User(_)
            | super::Error::_Product(_)
            | super::Error::_MongoDB(_)
            | super::Error::_Redis(_) => Self::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Deserialize)]
pub struct InitiateRequest {
    pub participant_id: user::Id,
    #[serde(default)]
    pub product_id: Option<product::Id>,
}

#[derive(Serialize)]
pub struct InitiateResponse {
    #[serde(serialize_with = "serialize_object_id_as_hex_string")]
    pub chat_id: Id,
}

pub async fn initiate(
    identity: Identity,
    State(chat_service): State<ChatService>,
    Json(req): Json<InitiateRequest>,
) -> crate::Result<Json<InitiateResponse>> {
    let chat_id = chat_service
        .resolve(&identity, &req.participant_id, req.product_id)
        .await?;

    Ok(Json(InitiateResponse { chat_id }))
}

pub async fn list(
    identity: Identity,
    State(chat_service): State<ChatService>,
) -> crate::Result<Json<Vec<ChatDto>>> {
    let chats = chat_service.find_all(&identity).await?;

    Ok(Json(chats))
}

pub async fn mark_read(
    identity: Identity,
    State(chat_service): State<ChatService>,
    Path(id): Path<Id>,
) -> crate::Result<StatusCode> {
    chat_service.mark_read(&id, &identity).await?;

    Ok(StatusCode::OK)
}
