use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use pn_realtime::{ClientMessage, NEWS_CHANNEL};
use std::sync::Arc;
use tracing::{debug, info, warn};
use crate::AppState;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let registry = state.registry.clone();
    let (client, mut events) = registry.connect();
    info!("🔌 Client connected: {}", client);

    let (mut sink, mut stream) = socket.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let text = match event.to_json() {
                Ok(text) => text,
                Err(e) => {
                    warn!("Failed to encode {} event: {}", event.name(), e);
                    continue;
                }
            };
            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    let members = registry.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = stream.next().await {
            match message {
                Message::Text(text) => match ClientMessage::parse(&text) {
                    Ok(ClientMessage::SubscribeNews) => {
                        members.join(client, NEWS_CHANNEL);
                        info!("Client {} subscribed to news updates", client);
                    }
                    Ok(ClientMessage::UnsubscribeNews) => {
                        members.leave(client, NEWS_CHANNEL);
                        info!("Client {} unsubscribed from news updates", client);
                    }
                    Err(e) => debug!("Ignoring message from {}: {}", client, e),
                },
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    registry.disconnect(client);
    info!("🔌 Client disconnected: {}", client);
}
