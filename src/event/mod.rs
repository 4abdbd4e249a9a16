use axum::Router;
use axum::extract::ws;
use axum::extract::ws::Message::{Binary, Close, Text};
use axum::extract::ws::WebSocket;
use axum::routing::get;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use log::{debug, error, warn};
use serde_json::from_str;
use tokio::sync::mpsc;
use tokio::try_join;

use crate::auth::Identity;
use crate::state::AppState;
use crate::{chat, message};

use self::model::{Command, Event};
use self::service::EventService;

pub mod context;
pub mod model;
pub mod service;

type Result<T> = std::result::Result<T, Error>;

pub fn endpoints<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/ws", get(handler::ws))
        .with_state(state)
}

mod handler {
    use axum::extract::{Query, State, WebSocketUpgrade};
    use axum::response::Response;
    use serde::Deserialize;

    use crate::auth::Identity;

    use super::handle_socket;
    use super::service::EventService;

    /// Identity comes from the authenticated session that opened the socket,
    /// not from any later event payload.
    #[derive(Deserialize)]
    pub struct Handshake {
        user_id: String,
        role: String,
    }

    pub async fn ws(
        ws: WebSocketUpgrade,
        Query(handshake): Query<Handshake>,
        State(event_service): State<EventService>,
    ) -> crate::Result<Response> {
        let identity = Identity::parse(&handshake.user_id, &handshake.role)?;

        Ok(ws.on_upgrade(move |socket| handle_socket(socket, identity, event_service)))
    }
}

async fn handle_socket(socket: WebSocket, identity: Identity, event_service: EventService) {
    let (sender, receiver) = socket.split();
    let (outbox, inbox) = mpsc::unbounded_channel();
    let ctx = context::Ws::new(identity, outbox);

    debug!("ws connected: {}", ctx.conn_id);

    let read_task = tokio::spawn(read(ctx.clone(), receiver, event_service.clone()));
    let write_task = tokio::spawn(write(ctx.clone(), sender, inbox));

    match try_join!(read_task, write_task) {
        Ok(_) => debug!("ws disconnected gracefully: {}", ctx.conn_id),
        Err(e) => error!("ws disconnected with error: {e}"),
    }

    // implicit leave of every joined channel
    event_service.drop_connection(&ctx).await;
}

async fn read(ctx: context::Ws, mut receiver: SplitStream<WebSocket>, event_service: EventService) {
    loop {
        tokio::select! {
            // close is notified => stop 'read' task
            _ = ctx.close.notified() => break,

            // read next frame from ws connection
            frame = receiver.next() => {
                let Some(message) = frame else {
                    ctx.close.notify_one();
                    break;
                };

                match message {
                    Err(e) => {
                        error!("failed to read ws frame: {e:?}");
                        ctx.close.notify_one(); // notify 'write' task to stop
                        break;
                    },
                    Ok(Close(_)) => {
                        debug!("ws connection closed by client: {}", ctx.conn_id);
                        ctx.close.notify_one(); // notify 'write' task to stop
                        break;
                    },
                    Ok(Text(content)) => {
                        handle_text_frame(&ctx, content.as_str(), &event_service).await;
                    },
                    Ok(Binary(content)) => {
                        warn!("received binary ws frame: {content:?}");
                    }
                    Ok(other) => debug!("received non-text ws frame: {other:?}"),
                }
            }
        }
    }
}

/// Failures are pushed back to the offending connection only; the channel
/// stays open for retry.
async fn handle_text_frame(ctx: &context::Ws, content: &str, event_service: &EventService) {
    let command = match from_str::<Command>(content) {
        Ok(command) => command,
        Err(e) => {
            warn!("skipping frame, content is malformed: {e}");
            ctx.push(Event::MessageFailed {
                error: Error::MalformedEvent.to_string(),
            });
            return;
        }
    };

    if let Err(e) = event_service.handle_command(ctx, command).await {
        error!("failed to handle command: {e}");
        ctx.push(Event::MessageFailed {
            error: e.to_string(),
        });
    }
}

async fn write(
    ctx: context::Ws,
    mut sender: SplitSink<WebSocket, ws::Message>,
    mut inbox: mpsc::UnboundedReceiver<Event>,
) {
    loop {
        tokio::select! {
            // close is notified => stop 'write' task
            _ = ctx.close.notified() => break,

            // next event routed to this connection => send it to the client
            event = inbox.recv() => {
                let Some(event) = event else { break };

                match serde_json::to_string(&event) {
                    Ok(json) => {
                        if let Err(e) = sender.send(Text(json.into())).await {
                            error!("failed to send event to client: {e}");
                            ctx.close.notify_one(); // notify 'read' task to stop
                            break;
                        }
                    }
                    Err(e) => error!("failed to serialize event: {e}"),
                }
            }
        }
    }
}

#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub enum Error {
    #[error("invalid event format")]
    MalformedEvent,

    _Chat(#[from] chat::Error),
    _Message(#[from] message::Error),
}
