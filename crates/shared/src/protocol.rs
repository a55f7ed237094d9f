use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    domain::{Category, CellIndex, TeamColor},
    error::ProtocolError,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ClientRequest {
    Join,
    GiveClue { clue: String, number: u32 },
    MakeGuess { index: CellIndex },
}

impl ClientRequest {
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }
}

/// Initial snapshot sent to each participant once both players are connected.
///
/// `colors` is only present in the copy addressed to the clue giver.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStart {
    pub board: Vec<String>,
    pub revealed: Vec<bool>,
    pub clue_giver: String,
    pub team_color: TeamColor,
    pub score: i64,
    #[serde(default)]
    pub hard_mode: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<Category>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clue: Option<String>,
    #[serde(default)]
    pub guesses_remaining: i64,
}

// Hand-written so the hidden color map never ends up in a log line.
impl fmt::Debug for GameStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameStart")
            .field("board", &self.board)
            .field("revealed", &self.revealed)
            .field("clue_giver", &self.clue_giver)
            .field("team_color", &self.team_color)
            .field("score", &self.score)
            .field("hard_mode", &self.hard_mode)
            .field(
                "colors",
                &self.colors.as_ref().map(|colors| format!("<{} redacted>", colors.len())),
            )
            .field("clue", &self.clue)
            .field("guesses_remaining", &self.guesses_remaining)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellResolution {
    pub index: CellIndex,
    pub color: Category,
    pub score: i64,
    pub guesses_remaining: i64,
    #[serde(default)]
    pub lose: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lose_msg: Option<String>,
    #[serde(default)]
    pub win: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wins_awarded: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerEvent {
    StartGame(GameStart),
    ClueGiven {
        clue: String,
        guesses_remaining: i64,
    },
    #[serde(rename = "update")]
    CellResolved(CellResolution),
}

impl ServerEvent {
    pub fn from_json(raw: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(raw).map_err(ProtocolError::InvalidEvent)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::StartGame(_) => "start_game",
            Self::ClueGiven { .. } => "clue_given",
            Self::CellResolved(_) => "update",
        }
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
