use crate::engine::Engine;
use crate::host::BroadcastHost;
use crate::protocol::{decode_client_message, encode_host_message, ClientMessage};
use crate::replay::controls::ControlCommand;
use crate::replay::viewer::Viewer;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

/// One embedding page: it hears every turn the viewer announces and may send
/// media keys and highlight requests back.
pub async fn handle_socket<E: Engine>(
    socket: WebSocket,
    viewer: Arc<Viewer<E, BroadcastHost>>,
    host: BroadcastHost,
) {
    let (mut sender, mut receiver) = socket.split();
    let mut announcements = host.subscribe();

    let send_task = tokio::spawn(async move {
        loop {
            let message = match announcements.recv().await {
                Ok(message) => message,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "host socket lagging behind announcements");
                    continue;
                }
                Err(RecvError::Closed) => return,
            };
            let Some(payload) = encode_host_message(&message) else { continue };
            if sender.send(Message::Text(payload)).await.is_err() {
                return;
            }
        }
    });

    while let Some(result) = receiver.next().await {
        let Ok(message) = result else { break };
        match message {
            Message::Text(text) => handle_text_message(&viewer, &text).await,
            Message::Close(_) => break,
            _ => {}
        }
    }

    send_task.abort();
}

async fn handle_text_message<E: Engine>(viewer: &Arc<Viewer<E, BroadcastHost>>, text: &str) {
    let Some(message) = decode_client_message(text) else {
        tracing::debug!(text, "ignoring unreadable host message");
        return;
    };
    match message {
        ClientMessage::Key { key } => {
            let Some(command) = ControlCommand::from_key(&key) else { return };
            if let Err(error) = viewer.handle_command(command).await {
                tracing::warn!(?error, ?command, "viewer command failed");
            }
        }
        ClientMessage::Highlight { id } => viewer.set_highlighted(id).await,
        ClientMessage::ToggleHighlight { id } => viewer.toggle_highlight(&id).await,
    }
}
