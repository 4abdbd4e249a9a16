use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::error;
use serde::Serialize;

use crate::{auth, chat, integration, message, product, user};

#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub enum Error {
    _Auth(#[from] auth::Error),
    _Chat(#[from] chat::Error),
    _Message(#[from] message::Error),
    _User(#[from] user::Error),
    _Product(#[from] product::Error),
    _Integration(#[from] integration::Error),
}

impl Error {
    fn status(&self) -> StatusCode {
        match self {
            Self::_Auth(_) => StatusCode::UNAUTHORIZED,
            Self::_Chat(e) => StatusCode::from(e),
            Self::_Message(e) => StatusCode::from(e),
            Self::_User(e) => match e {
                user::Error::InvalidRole(_) => StatusCode::BAD_REQUEST,
                user::Error::_MongoDB(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::_Product(_) | Self::_Integration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        error!("{self}");

        #[derive(Serialize)]
        struct ErrorResponse {
            message: String,
        }

        let status = self.status();
        let message = if status.is_server_error() {
            "Internal server error".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(ErrorResponse { message })).into_response()
    }
}
