use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid server event: {0}")]
    InvalidEvent(#[source] serde_json::Error),
    #[error("failed to encode client request: {0}")]
    Encode(#[source] serde_json::Error),
}
