//! Turn/outcome state machine: folds arbiter events into a [`GameSession`].

use serde::Serialize;
use shared::{
    domain::{Category, CellIndex, Clue, Phase, Role, CANONICAL_BOARD_SIZE},
    protocol::{CellResolution, GameStart, ServerEvent},
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    board::{Board, BoardError, Knowledge},
    session::{GameSession, SessionState},
};

const DEFAULT_LOSE_MESSAGE: &str = "Sorry, you lost!";
const STANDARD_WIN_MESSAGE: &str = "Congratulations! You won!";
const HARD_MODE_WIN_MESSAGE: &str = "Congratulations! Hard Mode victory! You earned 2 wins!";
const HARD_MODE_WINS_AWARDED: u32 = 2;

/// User-facing outcome, delivered once on entry into `WON` or `LOST`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TerminalNotice {
    Lost {
        message: String,
    },
    Won {
        message: String,
        wins_awarded: u32,
        hard_mode_double: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        secret: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Render,
    Terminal(TerminalNotice),
}

/// Why an inbound event was discarded. None of these are fatal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventRejected {
    #[error("session already finished in phase {0}")]
    Finished(Phase),
    #[error("{event} not expected in phase {phase}")]
    UnexpectedPhase { event: &'static str, phase: Phase },
    #[error("cell {0} already revealed")]
    AlreadyRevealed(CellIndex),
    #[error(transparent)]
    Board(#[from] BoardError),
}

impl GameSession {
    /// Applies one arbiter event. Rejected events leave the session untouched.
    pub fn apply(&mut self, event: ServerEvent) -> Result<Vec<Effect>, EventRejected> {
        let kind = event.kind();
        let result = match event {
            ServerEvent::StartGame(start) => self.on_start_game(start),
            ServerEvent::ClueGiven {
                clue,
                guesses_remaining,
            } => self.on_clue_given(clue, guesses_remaining),
            ServerEvent::CellResolved(resolution) => self.on_cell_resolved(resolution),
        };
        if let Err(err) = &result {
            warn!(event = kind, phase = %self.phase, "ignoring event: {err}");
        }
        result
    }

    fn on_start_game(&mut self, start: GameStart) -> Result<Vec<Effect>, EventRejected> {
        self.expect_phase("start_game", Phase::Waiting)?;

        let role = if start.clue_giver == self.identity.username {
            Role::ClueGiver
        } else {
            Role::Guesser
        };
        let knowledge = match (role, start.colors) {
            (Role::ClueGiver, Some(colors)) => Knowledge::Full(colors),
            (Role::ClueGiver, None) => {
                warn!("start_game for clue giver carried no color map");
                Knowledge::None
            }
            (Role::Guesser, Some(_)) => {
                warn!("discarding color map addressed to a guesser");
                Knowledge::None
            }
            (Role::Guesser, None) => Knowledge::None,
        };
        let board = Board::initialize(start.board, &start.revealed, knowledge)?;
        if board.len() != CANONICAL_BOARD_SIZE {
            debug!(cells = board.len(), "non-canonical board size");
        }

        let guesses_remaining = clamp_guesses(start.guesses_remaining);
        let active_clue = match start.clue {
            Some(word) if guesses_remaining > 0 => Some(Clue {
                word,
                number: guesses_remaining,
            }),
            _ => None,
        };
        let phase = if active_clue.is_some() {
            Phase::GuessPhase
        } else {
            Phase::CluePhase
        };

        info!(
            ?role,
            team_color = %start.team_color,
            cells = board.len(),
            hard_mode = start.hard_mode,
            %phase,
            "game started"
        );
        self.board = board;
        self.state = Some(SessionState {
            role,
            team_color: start.team_color,
            score: start.score,
            guesses_remaining,
            active_clue,
            hard_mode: start.hard_mode,
        });
        self.enter(phase);
        Ok(vec![Effect::Render])
    }

    fn on_clue_given(
        &mut self,
        clue: String,
        guesses_remaining: i64,
    ) -> Result<Vec<Effect>, EventRejected> {
        self.expect_phase("clue_given", Phase::CluePhase)?;
        let state = self.started_state("clue_given")?;

        let guesses_remaining = clamp_guesses(guesses_remaining);
        state.guesses_remaining = guesses_remaining;
        if guesses_remaining == 0 {
            warn!("clue_given allows no guesses; staying in clue phase");
            state.active_clue = None;
            return Ok(vec![Effect::Render]);
        }

        debug!(guesses_remaining, "clue received");
        state.active_clue = Some(Clue {
            word: clue,
            number: guesses_remaining,
        });
        self.enter(Phase::GuessPhase);
        Ok(vec![Effect::Render])
    }

    fn on_cell_resolved(
        &mut self,
        resolution: CellResolution,
    ) -> Result<Vec<Effect>, EventRejected> {
        self.ensure_live()?;
        if self.state.is_none() {
            return Err(EventRejected::UnexpectedPhase {
                event: "update",
                phase: self.phase,
            });
        }
        let index = resolution.index;
        if self.board.get(index)?.is_revealed() {
            return Err(EventRejected::AlreadyRevealed(index));
        }
        self.expect_phase("update", Phase::GuessPhase)?;

        self.record_reveal(index, resolution.color)?;

        let guesses_remaining = clamp_guesses(resolution.guesses_remaining);
        let state = self.started_state("update")?;
        state.score = resolution.score;
        state.guesses_remaining = guesses_remaining;

        // Win/lose are checked before guess exhaustion.
        if resolution.lose {
            let message = resolution
                .lose_msg
                .unwrap_or_else(|| DEFAULT_LOSE_MESSAGE.to_string());
            info!(%index, "game lost");
            self.enter(Phase::Lost);
            return Ok(vec![
                Effect::Render,
                Effect::Terminal(TerminalNotice::Lost { message }),
            ]);
        }

        if resolution.win {
            let wins_awarded = resolution.wins_awarded.unwrap_or(1);
            let hard_mode_double = wins_awarded == HARD_MODE_WINS_AWARDED;
            let message = if hard_mode_double {
                HARD_MODE_WIN_MESSAGE
            } else {
                STANDARD_WIN_MESSAGE
            };
            info!(%index, wins_awarded, "game won");
            self.enter(Phase::Won);
            return Ok(vec![
                Effect::Render,
                Effect::Terminal(TerminalNotice::Won {
                    message: message.to_string(),
                    wins_awarded,
                    hard_mode_double,
                    secret: resolution.flag,
                }),
            ]);
        }

        if guesses_remaining == 0 {
            debug!(%index, "guesses exhausted; back to clue phase");
            state.active_clue = None;
            self.enter(Phase::CluePhase);
        }
        Ok(vec![Effect::Render])
    }

    fn record_reveal(&mut self, index: CellIndex, category: Category) -> Result<(), EventRejected> {
        let known = self.board.get(index)?.category();
        if let (Some(Role::ClueGiver), Some(known)) = (self.role(), known) {
            if known != category {
                warn!(%index, "arbiter reveal disagrees with start map; keeping arbiter value");
            }
        }
        self.board.reveal(index, category)?;
        Ok(())
    }

    fn enter(&mut self, next: Phase) {
        debug_assert!(
            self.phase.can_advance_to(next),
            "illegal phase transition {} -> {next}",
            self.phase
        );
        self.phase = next;
    }

    fn ensure_live(&self) -> Result<(), EventRejected> {
        if self.phase.is_terminal() {
            return Err(EventRejected::Finished(self.phase));
        }
        Ok(())
    }

    fn expect_phase(&self, event: &'static str, expected: Phase) -> Result<(), EventRejected> {
        self.ensure_live()?;
        if self.phase != expected {
            return Err(EventRejected::UnexpectedPhase {
                event,
                phase: self.phase,
            });
        }
        Ok(())
    }

    fn started_state(&mut self, event: &'static str) -> Result<&mut SessionState, EventRejected> {
        let phase = self.phase;
        self.state
            .as_mut()
            .ok_or(EventRejected::UnexpectedPhase { event, phase })
    }
}

fn clamp_guesses(raw: i64) -> u32 {
    if raw < 0 {
        warn!(raw, "negative guesses_remaining from arbiter; clamping to 0");
        return 0;
    }
    u32::try_from(raw).unwrap_or(u32::MAX)
}

#[cfg(test)]
#[path = "tests/machine_tests.rs"]
mod tests;
