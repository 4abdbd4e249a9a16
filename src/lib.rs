pub mod auth;
pub mod chat;
pub mod error;
pub mod event;
pub mod integration;
pub mod message;
pub mod product;
pub mod state;
pub mod user;

pub type Result<T> = std::result::Result<T, error::Error>;
