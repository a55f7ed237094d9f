use async_trait::async_trait;
use shared::{
    domain::{CellIndex, Phase, Role},
    protocol::ClientRequest,
};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

use crate::{error::TransportError, session::GameSession};

/// A participant intent that failed local checks and was never transmitted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocalValidationError {
    #[error("clue word must not be empty")]
    EmptyClue,
    #[error("clue number must be a positive integer, got {0}")]
    InvalidNumber(i64),
    #[error("game has not started")]
    NotStarted,
    #[error("game is over ({0})")]
    Finished(Phase),
    #[error("only the {0:?} may do that")]
    WrongRole(Role),
    #[error("not allowed during {0}")]
    WrongPhase(Phase),
    #[error("cell {index} out of range for board of {len} cells")]
    OutOfRange { index: CellIndex, len: usize },
    #[error("cell {0} is already revealed")]
    AlreadyRevealed(CellIndex),
    #[error("no guesses remaining")]
    NoGuessesRemaining,
}

#[async_trait]
pub trait ArbiterSink: Send + Sync {
    async fn send(&self, request: ClientRequest) -> Result<(), TransportError>;
}

#[async_trait]
impl ArbiterSink for mpsc::Sender<ClientRequest> {
    async fn send(&self, request: ClientRequest) -> Result<(), TransportError> {
        mpsc::Sender::send(self, request)
            .await
            .map_err(|_| TransportError::Closed)
    }
}

pub fn validate_clue(
    session: &GameSession,
    word: &str,
    number: i64,
) -> Result<ClientRequest, LocalValidationError> {
    let word = word.trim();
    if word.is_empty() {
        return Err(LocalValidationError::EmptyClue);
    }
    let number = match u32::try_from(number) {
        Ok(n) if n > 0 => n,
        _ => return Err(LocalValidationError::InvalidNumber(number)),
    };
    require_role(session, Role::ClueGiver)?;
    if session.phase() != Phase::CluePhase {
        return Err(LocalValidationError::WrongPhase(session.phase()));
    }
    Ok(ClientRequest::GiveClue {
        clue: word.to_string(),
        number,
    })
}

pub fn validate_guess(
    session: &GameSession,
    index: CellIndex,
) -> Result<ClientRequest, LocalValidationError> {
    require_role(session, Role::Guesser)?;
    let board = session.board();
    let cell = board.get(index).map_err(|_| LocalValidationError::OutOfRange {
        index,
        len: board.len(),
    })?;
    if cell.is_revealed() {
        return Err(LocalValidationError::AlreadyRevealed(index));
    }
    if session.guesses_remaining() == 0 {
        return Err(LocalValidationError::NoGuessesRemaining);
    }
    if session.phase() != Phase::GuessPhase {
        return Err(LocalValidationError::WrongPhase(session.phase()));
    }
    Ok(ClientRequest::MakeGuess { index })
}

fn require_role(session: &GameSession, role: Role) -> Result<(), LocalValidationError> {
    if session.phase().is_terminal() {
        return Err(LocalValidationError::Finished(session.phase()));
    }
    match session.role() {
        None => Err(LocalValidationError::NotStarted),
        Some(actual) if actual != role => Err(LocalValidationError::WrongRole(role)),
        Some(_) => Ok(()),
    }
}

/// Outbound half of the session: validates intents and forwards them to the arbiter.
///
/// Never mutates the session; state only changes when the arbiter answers.
pub struct CommandEmitter<S> {
    sink: S,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Invalid(#[from] LocalValidationError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl<S: ArbiterSink> CommandEmitter<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub async fn join(&self) -> Result<(), TransportError> {
        debug!("sending join");
        self.sink.send(ClientRequest::Join).await
    }

    pub async fn submit_clue(
        &self,
        session: &GameSession,
        word: &str,
        number: i64,
    ) -> Result<(), CommandError> {
        let request = validate_clue(session, word, number)?;
        debug!(number, "sending clue");
        self.sink.send(request).await?;
        Ok(())
    }

    pub async fn submit_guess(
        &self,
        session: &GameSession,
        index: CellIndex,
    ) -> Result<(), CommandError> {
        let request = validate_guess(session, index)?;
        debug!(%index, "sending guess");
        self.sink.send(request).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;
