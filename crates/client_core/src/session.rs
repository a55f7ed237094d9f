use serde::Serialize;
use shared::domain::{Clue, Phase, Role, TeamColor};

use crate::{
    board::Board,
    visibility::{project_board, CellView},
};

/// Who this process plays as. Fixed for the lifetime of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionIdentity {
    pub username: String,
    pub code: String,
}

impl SessionIdentity {
    pub fn new(username: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            code: code.into().trim().to_ascii_uppercase(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub role: Role,
    pub team_color: TeamColor,
    pub score: i64,
    pub guesses_remaining: u32,
    pub active_clue: Option<Clue>,
    pub hard_mode: bool,
}

/// Per-participant game state. Only the state machine in [`crate::machine`] mutates it.
#[derive(Debug, Clone)]
pub struct GameSession {
    pub(crate) identity: SessionIdentity,
    pub(crate) phase: Phase,
    pub(crate) state: Option<SessionState>,
    pub(crate) board: Board,
}

impl GameSession {
    pub fn new(identity: SessionIdentity) -> Self {
        Self {
            identity,
            phase: Phase::Waiting,
            state: None,
            board: Board::default(),
        }
    }

    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> Option<&SessionState> {
        self.state.as_ref()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn role(&self) -> Option<Role> {
        self.state.as_ref().map(|state| state.role)
    }

    pub fn guesses_remaining(&self) -> u32 {
        self.state
            .as_ref()
            .map(|state| state.guesses_remaining)
            .unwrap_or(0)
    }

    pub fn clue_entry_enabled(&self) -> bool {
        self.phase == Phase::CluePhase && self.role() == Some(Role::ClueGiver)
    }

    pub fn guessing_enabled(&self) -> bool {
        self.phase == Phase::GuessPhase
            && self.role() == Some(Role::Guesser)
            && self.guesses_remaining() > 0
    }

    /// Read-only projection handed to the renderer.
    pub fn view(&self) -> SessionView {
        let cells = match self.role() {
            Some(role) => project_board(role, &self.board),
            None => Vec::new(),
        };
        SessionView {
            username: self.identity.username.clone(),
            code: self.identity.code.clone(),
            phase: self.phase,
            state: self.state.clone(),
            cells,
            clue_entry_enabled: self.clue_entry_enabled(),
            guessing_enabled: self.guessing_enabled(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub username: String,
    pub code: String,
    pub phase: Phase,
    pub state: Option<SessionState>,
    pub cells: Vec<CellView>,
    pub clue_entry_enabled: bool,
    pub guessing_enabled: bool,
}
