use std::env;
use std::fmt::Display;

use crate::chat;
use crate::integration;
use crate::integration::Result;

#[derive(Clone)]
pub struct Config {
    host: String,
    port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: 6379,
        }
    }
}

impl Config {
    pub fn new(host: String, port: u16) -> Self {
        Self { host, port }
    }

    pub fn env() -> Result<Self> {
        let host = env::var("REDIS_HOST")?;
        let port = env::var("REDIS_PORT")?.parse()?;
        Ok(Self { host, port })
    }
}

pub async fn init(config: &Config) -> Result<redis::aio::ConnectionManager> {
    redis::Client::open(format!("redis://{}:{}", &config.host, &config.port))?
        .get_connection_manager()
        .await
        .map_err(integration::Error::from)
}

#[derive(Clone)]
pub enum Key {
    Chat(chat::Id),
}

impl Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::Chat(id) => write!(f, "chat:{}", id.to_hex()),
        }
    }
}

impl redis::ToRedisArgs for Key {
    fn write_redis_args<W>(&self, out: &mut W)
    where
        W: ?Sized + redis::RedisWrite,
    {
        out.write_arg_fmt(self)
    }
}
