mod input;
mod render;

use std::{future::Future, io::BufRead, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    config::DEFAULT_CONFIG_FILE, transport, ClientEvent, ClientSettings, GameSession, Intent,
    SessionDriver,
};
use shared::protocol::ClientRequest;
use tokio::{
    io::BufReader,
    sync::{broadcast, mpsc, oneshot},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::input::{parse_line, Command, HELP};

#[derive(Parser, Debug)]
#[command(about = "Play a Codenames session from the terminal")]
struct Args {
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    username: Option<String>,
    #[arg(long)]
    code: Option<String>,
    /// Drive the session from a newline-delimited JSON log of server events.
    #[arg(long)]
    replay: Option<PathBuf>,
    /// Print every projection as a JSON line instead of a text grid.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = ClientSettings::load(&args.config)?;
    if let Some(v) = args.server_url {
        settings.server_url = v;
    }
    if let Some(v) = args.username {
        settings.username = v;
    }
    if let Some(v) = args.code {
        settings.code = v;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let identity = settings.identity()?;
    let (intent_tx, intent_rx) = mpsc::channel(32);
    let (quit_tx, quit_rx) = oneshot::channel();
    // Plain thread: a blocked stdin read must not hold up runtime shutdown.
    std::thread::spawn(move || read_stdin(intent_tx, quit_tx));

    let (inbound, sink) = match &args.replay {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("failed to open replay log {}", path.display()))?;
            let (events, _reader) = transport::replay(BufReader::new(file));
            let (request_tx, request_rx) = mpsc::channel(32);
            tokio::spawn(echo_requests(request_rx));
            (events, request_tx)
        }
        None => {
            let connection = transport::connect(&settings.server_url, &identity)
                .await
                .context("failed to reach the game server")?;
            (connection.events, connection.requests)
        }
    };

    info!(username = %identity.username, code = %identity.code, "joining session");
    let driver = SessionDriver::new(identity, sink);
    let renderer = tokio::spawn(print_events(driver.subscribe(), args.json));

    match play(driver.run(inbound, intent_rx), quit_rx).await {
        SessionEnd::Finished(session) => info!(phase = %session.phase(), "session ended"),
        SessionEnd::Left => info!("left session"),
    }
    renderer.await.context("renderer task failed")?;
    Ok(())
}

#[derive(Debug)]
enum SessionEnd {
    Finished(GameSession),
    Left,
}

/// Runs the session until it finishes or the player explicitly quits.
///
/// A dropped quit sender (stdin at EOF) disables the quit branch.
async fn play<F>(session: F, quit: oneshot::Receiver<()>) -> SessionEnd
where
    F: Future<Output = GameSession>,
{
    tokio::select! {
        session = session => SessionEnd::Finished(session),
        Ok(()) = quit => SessionEnd::Left,
    }
}

fn read_stdin(intents: mpsc::Sender<Intent>, quit: oneshot::Sender<()>) {
    for line in std::io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!("failed to read stdin: {err}");
                return;
            }
        };
        match parse_line(&line) {
            Ok(Some(Command::Intent(intent))) => {
                if intents.blocking_send(intent).is_err() {
                    return;
                }
            }
            Ok(Some(Command::Help)) => println!("{HELP}"),
            Ok(Some(Command::Quit)) => {
                let _ = quit.send(());
                return;
            }
            Ok(None) => {}
            Err(err) => println!("! {err}"),
        }
    }
}

async fn echo_requests(mut requests: mpsc::Receiver<ClientRequest>) {
    while let Some(request) = requests.recv().await {
        match request.to_json() {
            Ok(json) => info!(request = %json, "replay: outbound request"),
            Err(err) => warn!("{err}"),
        }
    }
}

async fn print_events(mut events: broadcast::Receiver<ClientEvent>, json: bool) {
    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "renderer fell behind");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => return,
        };
        if let ClientEvent::Ignored { event, reason } = &event {
            info!(event = *event, "ignored: {reason}");
            continue;
        }
        if json {
            let line = match &event {
                ClientEvent::Render(view) => serde_json::to_string(view),
                ClientEvent::Terminal(notice) => serde_json::to_string(notice),
                _ => {
                    if let Some(text) = render::render_event(&event) {
                        eprint!("{text}");
                    }
                    continue;
                }
            };
            match line {
                Ok(line) => println!("{line}"),
                Err(err) => warn!("failed to encode projection: {err}"),
            }
        } else if let Some(text) = render::render_event(&event) {
            print!("{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use client_core::SessionIdentity;
    use shared::{domain::Phase, protocol::ServerEvent};

    use super::*;

    const WINNING_LOG: &str = concat!(
        r#"{"type":"start_game","payload":{"board":["apple","bank","castle","dragon","engine","forest","ghost","harbor"],"revealed":[false,false,false,false,false,false,false,false],"clue_giver":"giver","team_color":"red","score":0,"hard_mode":true}}"#,
        "\n",
        r#"{"type":"clue_given","payload":{"clue":"ocean","guesses_remaining":1}}"#,
        "\n",
        r#"{"type":"update","payload":{"index":7,"color":"red","score":1,"guesses_remaining":0,"win":true,"wins_awarded":2}}"#,
        "\n",
    );

    fn replay_driver() -> (
        SessionDriver<mpsc::Sender<ClientRequest>>,
        mpsc::Receiver<ServerEvent>,
        mpsc::Receiver<ClientRequest>,
    ) {
        let (events, _reader) = transport::replay(Cursor::new(WINNING_LOG.as_bytes().to_vec()));
        let (request_tx, request_rx) = mpsc::channel(8);
        let driver = SessionDriver::new(SessionIdentity::new("guesser", "abc123"), request_tx);
        (driver, events, request_rx)
    }

    #[tokio::test]
    async fn replay_reaches_win_after_stdin_closes() {
        let (driver, events, _requests) = replay_driver();
        let (intent_tx, intent_rx) = mpsc::channel::<Intent>(1);
        let (quit_tx, quit_rx) = oneshot::channel();
        // Stdin at EOF: both the intent and quit senders are gone.
        drop(intent_tx);
        drop(quit_tx);

        match play(driver.run(events, intent_rx), quit_rx).await {
            SessionEnd::Finished(session) => assert_eq!(session.phase(), Phase::Won),
            SessionEnd::Left => panic!("session ended before replay finished"),
        }
    }

    #[tokio::test]
    async fn explicit_quit_leaves_session() {
        let (quit_tx, quit_rx) = oneshot::channel();
        quit_tx.send(()).expect("send quit");
        let end = play(std::future::pending::<GameSession>(), quit_rx).await;
        assert!(matches!(end, SessionEnd::Left));
    }
}
