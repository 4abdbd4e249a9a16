use axum::Router;
use axum::routing::{get, post};

use crate::state::AppState;
use crate::user;

pub mod handler;
pub mod model;
pub mod repository;
pub mod service;

type Result<T> = std::result::Result<T, Error>;
pub type Id = mongodb::bson::oid::ObjectId;

pub fn resources<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/initiate", post(handler::initiate))
        .route("/list", get(handler::list))
        .route("/{id}/mark-read", post(handler::mark_read))
        .with_state(state)
}

#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub enum Error {
    #[error("chat not found: {0:?}")]
    NotFound(Option<Id>),
    #[error("chat already exists for participants: {0:?}")]
    AlreadyExists([user::Id; 2]),
    #[error("user is not a participant of the chat or role mismatch")]
    NotParticipant,
    #[error("chat participants must be two distinct users")]
    SameParticipant,
    #[error("could not create chat")]
    NotCreated,

    _User(#[from] user::Error),
    _Product(#[from] crate::product::Error),

    _MongoDB(#[from] mongodb::error::Error),
    _Redis(#[from] redis::RedisError),
}
