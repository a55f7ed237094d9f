//! Adapters between the arbiter's wire and the session driver's channels.
//!
//! Events are forwarded in arrival order. There is no reconnection here.

use futures::{SinkExt, StreamExt};
use shared::protocol::{ClientRequest, ServerEvent};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    sync::mpsc,
    task::JoinHandle,
};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};
use url::Url;

use crate::{error::TransportError, session::SessionIdentity};

const CHANNEL_CAPACITY: usize = 256;

pub struct ArbiterConnection {
    pub events: mpsc::Receiver<ServerEvent>,
    pub requests: mpsc::Sender<ClientRequest>,
}

pub fn session_url(server_url: &str, identity: &SessionIdentity) -> Result<Url, TransportError> {
    let server_url = server_url.trim_end_matches('/');
    let ws_url = if let Some(rest) = server_url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = server_url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else if server_url.starts_with("ws://") || server_url.starts_with("wss://") {
        server_url.to_string()
    } else {
        return Err(TransportError::UnsupportedScheme(server_url.to_string()));
    };
    let mut url = Url::parse(&format!("{ws_url}/ws"))?;
    url.query_pairs_mut()
        .append_pair("code", &identity.code)
        .append_pair("username", &identity.username);
    Ok(url)
}

pub async fn connect(
    server_url: &str,
    identity: &SessionIdentity,
) -> Result<ArbiterConnection, TransportError> {
    let url = session_url(server_url, identity)?;
    let (ws_stream, _) =
        connect_async(url.as_str())
            .await
            .map_err(|source| TransportError::Connect {
                url: url.to_string(),
                source: Box::new(source),
            })?;
    info!(code = %identity.code, "connected to arbiter");
    let (mut ws_writer, mut ws_reader) = ws_stream.split();

    let (event_tx, event_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (request_tx, mut request_rx) = mpsc::channel::<ClientRequest>(CHANNEL_CAPACITY);

    tokio::spawn(async move {
        while let Some(msg) = ws_reader.next().await {
            match msg {
                Ok(Message::Text(text)) => match ServerEvent::from_json(&text) {
                    Ok(event) => {
                        if event_tx.send(event).await.is_err() {
                            break;
                        }
                    }
                    Err(err) => warn!("{err}"),
                },
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(err) => {
                    warn!("websocket receive failed: {err}");
                    break;
                }
            }
        }
        debug!("arbiter event stream ended");
    });

    tokio::spawn(async move {
        while let Some(request) = request_rx.recv().await {
            let text = match request.to_json() {
                Ok(text) => text,
                Err(err) => {
                    warn!("{err}");
                    continue;
                }
            };
            if let Err(err) = ws_writer.send(Message::Text(text)).await {
                warn!("websocket send failed: {err}");
                break;
            }
        }
        let _ = ws_writer.close().await;
    });

    Ok(ArbiterConnection {
        events: event_rx,
        requests: request_tx,
    })
}

/// Feeds a recorded newline-delimited log of server events into a channel.
///
/// Blank lines are skipped; undecodable lines are logged and skipped.
pub fn replay<R>(reader: R) -> (mpsc::Receiver<ServerEvent>, JoinHandle<Result<usize, TransportError>>)
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    let handle = tokio::spawn(async move {
        let mut lines = reader.lines();
        let mut forwarded = 0;
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match ServerEvent::from_json(line) {
                Ok(event) => {
                    if tx.send(event).await.is_err() {
                        break;
                    }
                    forwarded += 1;
                }
                Err(err) => warn!("skipping recorded line: {err}"),
            }
        }
        Ok::<_, TransportError>(forwarded)
    });
    (rx, handle)
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
