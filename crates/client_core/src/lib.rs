//! Per-participant game engine: board model, role-gated visibility, the
//! turn/outcome state machine and the validated command path to the arbiter.

pub mod board;
pub mod commands;
pub mod config;
pub mod driver;
pub mod error;
pub mod machine;
pub mod session;
pub mod transport;
pub mod visibility;

pub use board::{Board, BoardError, Cell, Knowledge};
pub use commands::{ArbiterSink, CommandEmitter, CommandError, LocalValidationError};
pub use config::ClientSettings;
pub use driver::{Intent, SessionDriver};
pub use error::TransportError;
pub use machine::{Effect, EventRejected, TerminalNotice};
pub use session::{GameSession, SessionIdentity, SessionState, SessionView};
pub use visibility::{CellView, VisibilityPolicy};

/// Everything the renderer is told, in order.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    Render(SessionView),
    Terminal(TerminalNotice),
    Ignored {
        event: &'static str,
        reason: String,
    },
    Rejected(LocalValidationError),
    Error(String),
}
