use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("server_url must start with http://, https://, ws:// or wss://: {0}")]
    UnsupportedScheme(String),
    #[error("invalid server url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("failed to connect websocket {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: Box<tokio_tungstenite::tungstenite::Error>,
    },
    #[error("arbiter connection closed")]
    Closed,
    #[error("failed to read event log: {0}")]
    Io(#[from] std::io::Error),
}
