use crate::endpoints::server::AppState;
use crate::viewer::{Viewer, ViewerEvent, ViewerUpdate};
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const CHANNEL_CAPACITY: usize = 64;

pub async fn viewer_ws(State(state): State<Arc<AppState>>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_session(socket, state))
}

async fn run_session(socket: WebSocket, state: Arc<AppState>) {
    let (mut sink, mut stream) = socket.split();
    let (event_tx, event_rx) = mpsc::channel::<ViewerEvent>(CHANNEL_CAPACITY);
    let (update_tx, mut update_rx) = mpsc::channel::<ViewerUpdate>(CHANNEL_CAPACITY);

    let viewer = Viewer::new(
        state.catalog.clone(),
        state.loader.clone(),
        state.tiles.clone(),
    );
    let session = tokio::spawn(viewer.run(event_rx, update_tx));

    // Updates are written on their own task, the read loop below never waits on the socket.
    let writer = tokio::spawn(async move {
        while let Some(update) = update_rx.recv().await {
            let text = match serde_json::to_string(&update) {
                Ok(text) => text,
                Err(e) => {
                    warn!(error = %e, "ws: failed to serialize viewer update");
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });
    info!("ws: viewer connected");

    while let Some(Ok(msg)) = stream.next().await {
        match msg {
            Message::Text(text) => match serde_json::from_str::<ViewerEvent>(text.as_str()) {
                Ok(event) => {
                    if event_tx.send(event).await.is_err() {
                        break;
                    }
                }
                Err(e) => warn!(error = %e, "ws: ignoring malformed viewer event"),
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    drop(event_tx);
    if let Err(e) = session.await {
        warn!(error = %e, "ws: viewer session task failed");
    }
    if let Err(e) = writer.await {
        warn!(error = %e, "ws: writer task failed");
    }
    debug!("ws: viewer disconnected");
}
