use std::net::SocketAddr;
use std::str::FromStr;
use std::{env, fs::File};

use axum::http::HeaderValue;
use axum_server::tls_openssl::OpenSSLConfig;
use dotenv::dotenv;
use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, TermLogger, TerminalMode, WriteLogger};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin};

pub mod cache;
pub mod db;

type Result<T> = std::result::Result<T, Error>;

const DEFAULT_MAX_MESSAGE_LEN: usize = 2000;

#[derive(Clone)]
pub enum Env {
    Local,
    Dev,
    Stage,
    Production,
}

impl Env {
    pub fn addr(&self) -> SocketAddr {
        match self {
            Env::Local => SocketAddr::from(([127, 0, 0, 1], 8000)),
            Env::Dev | Env::Stage => SocketAddr::from(([0, 0, 0, 0], 8000)),
            Env::Production => SocketAddr::from(([0, 0, 0, 0], 8443)),
        }
    }

    pub fn ssl_config(&self) -> Option<OpenSSLConfig> {
        match self {
            Env::Local | Env::Dev | Env::Stage => None,
            Env::Production => {
                let ssl_config = OpenSSLConfig::from_pem_file(
                    env::var("SSL_CERT_FILE").expect("SSL_CERT_FILE must be set"),
                    env::var("SSL_KEY_FILE").expect("SSL_KEY_FILE must be set"),
                )
                .expect("cert should be present and have read permission");
                Some(ssl_config)
            }
        }
    }

    pub fn allow_origin(&self) -> AllowOrigin {
        match self {
            Env::Local | Env::Dev => AllowOrigin::any(),
            Env::Stage | Env::Production => {
                let origins = env::var("ALLOW_ORIGIN")
                    .expect("ALLOW_ORIGIN must be set")
                    .split(',')
                    .map(HeaderValue::from_str)
                    .map(|r| r.expect("invalid ALLOW_ORIGIN value"))
                    .collect::<Vec<HeaderValue>>();
                AllowOrigin::list(origins)
            }
        }
    }

    pub fn allow_methods(&self) -> AllowMethods {
        match self {
            Env::Local | Env::Dev | Env::Stage | Env::Production => AllowMethods::any(),
        }
    }

    pub fn allow_headers(&self) -> AllowHeaders {
        match self {
            Env::Local | Env::Dev | Env::Stage | Env::Production => AllowHeaders::any(),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub env: Env,

    pub redis: cache::Config,
    pub mongo: db::Config,

    pub max_message_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        dotenv().ok();

        let rust_log = env::var("RUST_LOG").unwrap_or("info".into());
        let level = LevelFilter::from_str(&rust_log).unwrap_or(LevelFilter::Info);
        let log_file = env::var("SERVICE_NAME")
            .map(|pkg| format!("{pkg}.log"))
            .unwrap_or("marketplace_chat.log".into());

        CombinedLogger::init(vec![
            TermLogger::new(
                level,
                simplelog::Config::default(),
                TerminalMode::Mixed,
                ColorChoice::Auto,
            ),
            WriteLogger::new(
                level,
                simplelog::Config::default(),
                File::create(log_file).expect("Failed to create log file"),
            ),
        ])
        .expect("Failed to initialize logger");

        let env = env::var("ENV")
            .map(|env| match env.as_str() {
                "local" => Env::Local,
                "dev" => Env::Dev,
                "stg" => Env::Stage,
                "prod" => Env::Production,
                _ => panic!("Invalid environment: {env}"),
            })
            .unwrap_or(Env::Local);

        let max_message_len = env::var("MAX_MESSAGE_LEN")
            .ok()
            .and_then(|len| len.parse().ok())
            .unwrap_or(DEFAULT_MAX_MESSAGE_LEN);

        Self {
            env,
            redis: cache::Config::env().unwrap_or_default(),
            mongo: db::Config::env().unwrap_or_default(),
            max_message_len,
        }
    }
}

#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub enum Error {
    _EnvVar(#[from] env::VarError),
    _ParseInt(#[from] std::num::ParseIntError),

    _MongoDB(#[from] mongodb::error::Error),
    _Redis(#[from] redis::RedisError),
}
