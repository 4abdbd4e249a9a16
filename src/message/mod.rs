use axum::Router;
use axum::routing::get;

use crate::state::AppState;

pub mod handler;
pub mod model;
pub mod repository;
pub mod service;

type Result<T> = std::result::Result<T, Error>;
pub type Id = mongodb::bson::oid::ObjectId;

pub fn resources<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/messages/{chat_id}", get(handler::find_by_chat))
        .with_state(state)
}

#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub enum Error {
    #[error("message rejected: {0}")]
    Validation(String),
    #[error("unexpected message error: {0}")]
    Unexpected(String),

    _MongoDB(#[from] mongodb::error::Error),
}
