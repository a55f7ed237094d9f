use shared::{domain::CellIndex, protocol::ServerEvent};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::{
    commands::{ArbiterSink, CommandEmitter, CommandError},
    machine::Effect,
    session::{GameSession, SessionIdentity},
    ClientEvent,
};

/// Something the local participant wants to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    GiveClue { word: String, number: i64 },
    Guess(CellIndex),
}

/// Owns the session and serialises every inbound event and outbound intent.
pub struct SessionDriver<S> {
    session: GameSession,
    emitter: CommandEmitter<S>,
    events: broadcast::Sender<ClientEvent>,
}

impl<S: ArbiterSink> SessionDriver<S> {
    pub fn new(identity: SessionIdentity, sink: S) -> Self {
        let (events, _) = broadcast::channel(1024);
        Self {
            session: GameSession::new(identity),
            emitter: CommandEmitter::new(sink),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn handle_event(&mut self, event: ServerEvent) {
        let kind = event.kind();
        match self.session.apply(event) {
            Ok(effects) => {
                for effect in effects {
                    let client_event = match effect {
                        Effect::Render => ClientEvent::Render(self.session.view()),
                        Effect::Terminal(notice) => ClientEvent::Terminal(notice),
                    };
                    let _ = self.events.send(client_event);
                }
            }
            Err(err) => {
                let _ = self.events.send(ClientEvent::Ignored {
                    event: kind,
                    reason: err.to_string(),
                });
            }
        }
    }

    pub async fn handle_intent(&mut self, intent: Intent) {
        let result = match &intent {
            Intent::GiveClue { word, number } => {
                self.emitter
                    .submit_clue(&self.session, word, *number)
                    .await
            }
            Intent::Guess(index) => self.emitter.submit_guess(&self.session, *index).await,
        };
        match result {
            Ok(()) => {}
            Err(CommandError::Invalid(err)) => {
                debug!(?intent, "intent rejected locally: {err}");
                let _ = self.events.send(ClientEvent::Rejected(err));
            }
            Err(CommandError::Transport(err)) => {
                warn!("failed to forward intent: {err}");
                let _ = self.events.send(ClientEvent::Error(err.to_string()));
            }
        }
    }

    /// Sends `join`, then processes events and intents one at a time until the
    /// game ends, the arbiter stream closes, or the participant leaves.
    pub async fn run(
        mut self,
        mut inbound: mpsc::Receiver<ServerEvent>,
        mut intents: mpsc::Receiver<Intent>,
    ) -> GameSession {
        if let Err(err) = self.emitter.join().await {
            warn!("failed to send join: {err}");
            let _ = self.events.send(ClientEvent::Error(err.to_string()));
            return self.session;
        }

        let mut intents_open = true;
        loop {
            tokio::select! {
                event = inbound.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => {
                        info!("arbiter stream closed");
                        break;
                    }
                },
                intent = intents.recv(), if intents_open => match intent {
                    Some(intent) => self.handle_intent(intent).await,
                    None => {
                        debug!("participant input closed");
                        intents_open = false;
                    }
                },
            }
            if self.session.phase().is_terminal() {
                info!(phase = %self.session.phase(), "session finished");
                break;
            }
        }
        self.session
    }
}

#[cfg(test)]
#[path = "tests/driver_tests.rs"]
mod tests;
