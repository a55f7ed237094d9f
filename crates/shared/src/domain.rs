use std::fmt;

use serde::{Deserialize, Serialize};

/// Position of a cell on the board, in arbiter order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellIndex(pub usize);

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub const CANONICAL_BOARD_SIZE: usize = 25;
pub const BOARD_COLUMNS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Red,
    Blue,
    Neutral,
    Assassin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamColor {
    Red,
    Blue,
}

impl fmt::Display for TeamColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Red => f.write_str("Red"),
            Self::Blue => f.write_str("Blue"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    ClueGiver,
    Guesser,
}

/// Turn phase as seen by one participant.
///
/// `Won` and `Lost` are absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Waiting,
    CluePhase,
    GuessPhase,
    Won,
    Lost,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }

    fn rank(self) -> u8 {
        match self {
            Self::Waiting => 0,
            Self::CluePhase | Self::GuessPhase => 1,
            Self::Won | Self::Lost => 2,
        }
    }

    /// Whether moving from `self` to `next` respects
    /// WAITING < {CLUE, GUESS} < {WON, LOST}.
    pub fn can_advance_to(self, next: Phase) -> bool {
        !self.is_terminal() && next.rank() >= self.rank()
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Waiting => "WAITING",
            Self::CluePhase => "CLUE_PHASE",
            Self::GuessPhase => "GUESS_PHASE",
            Self::Won => "WON",
            Self::Lost => "LOST",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clue {
    pub word: String,
    pub number: u32,
}
