use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use log::error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use marketplace_chat::state::AppState;
use marketplace_chat::{chat, event, integration, message};

#[tokio::main]
async fn main() {
    let config = integration::Config::default();

    let state = match AppState::init(&config).await {
        Ok(state) => state,
        Err(e) => {
            error!("failed to initialize app state: {e}");
            return;
        }
    };

    let app = app(state, &config);
    let addr = config.env.addr();

    let served = match config.env.ssl_config() {
        Some(ssl_config) => {
            axum_server::bind_openssl(addr, ssl_config)
                .serve(app.into_make_service())
                .await
        }
        None => axum_server::bind(addr).serve(app.into_make_service()).await,
    };

    if let Err(e) = served {
        error!("server error: {e}");
    }
}

fn app(state: AppState, config: &integration::Config) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(config.env.allow_origin())
        .allow_methods(config.env.allow_methods())
        .allow_headers(config.env.allow_headers());

    Router::new()
        .route("/health", get(|| async { StatusCode::OK }))
        .nest(
            "/api/chat",
            chat::resources(state.clone()).merge(message::resources(state.clone())),
        )
        .merge(event::endpoints(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
