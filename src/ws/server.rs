use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};

use super::hub::ServerMessage;
use crate::api::models::AppState;
use crate::engine::metrics::default_metrics;

/// Only accepted upgrade path.
pub const WS_PATH: &str = "/ws";

/// How many recent blocks/discoveries the connect-time snapshot carries.
const SNAPSHOT_LIMIT: usize = 25;

/// Accept-loop for the WebSocket feed. Every connection gets one
/// `initial_data` snapshot and then the live event stream; there is no
/// client->server protocol beyond ping/close.
pub async fn run(host: &str, port: u16, state: Arc<AppState>) -> std::io::Result<()> {
    let listener = TcpListener::bind((host, port)).await?;
    info!("WS - listening on ws://{}{WS_PATH}", listener.local_addr()?);

    loop {
        let (stream, peer) = listener.accept().await?;
        let state = state.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer, state).await {
                debug!("WS - connection {peer} ended: {e}");
            }
        });
    }
}

/// Snapshot of the platform for a freshly connected client.
fn initial_data(state: &AppState) -> ServerMessage {
    let (blocks, discoveries, metrics) = {
        let ledger = state.ledger.lock().expect("mutex poisoned");
        (
            ledger.blocks_page(SNAPSHOT_LIMIT, 0),
            ledger.discoveries_page(SNAPSHOT_LIMIT, 0, None),
            ledger.latest_metrics().cloned().unwrap_or_else(default_metrics),
        )
    };
    let operations = {
        let operations = state.operations.lock().expect("mutex poisoned");
        operations.active()
    };
    ServerMessage::InitialData {
        blocks,
        discoveries,
        operations,
        metrics,
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    state: Arc<AppState>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let check_path = |req: &Request, resp: Response| {
        if req.uri().path() == WS_PATH {
            Ok(resp)
        } else {
            let mut reject = ErrorResponse::new(Some("unknown path".to_string()));
            *reject.status_mut() = tokio_tungstenite::tungstenite::http::StatusCode::NOT_FOUND;
            Err(reject)
        }
    };
    let ws_stream = accept_hdr_async(stream, check_path).await?;
    let (mut ws_sink, mut ws_stream) = ws_stream.split();

    // Subscribe before snapshotting so no event between the two is lost;
    // everything after the snapshot arrives as a live event.
    let mut events = state.hub.subscribe();
    let snapshot = serde_json::to_string(&initial_data(&state))?;
    ws_sink.send(Message::Text(snapshot.into())).await?;
    info!("WS - client {peer} connected ({} online)", state.hub.client_count());

    loop {
        tokio::select! {
            msg = ws_stream.next() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        ws_sink.send(Message::Pong(data)).await?;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    // No client->server protocol: ignore everything else.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("WS - receive error from {peer}: {e}");
                        break;
                    }
                }
            }
            event = events.recv() => {
                match event {
                    Ok(message) => {
                        let json = serde_json::to_string(&message)?;
                        if ws_sink.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("WS - client {peer} lagged, dropped {skipped} events");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    info!("WS - client {peer} disconnected");
    Ok(())
}
