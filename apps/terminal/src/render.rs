use std::fmt::Write as _;

use client_core::{CellView, ClientEvent, SessionView, TerminalNotice};
use shared::domain::{Category, Role, BOARD_COLUMNS};

fn category_tag(cell: &CellView) -> String {
    let letter = match cell.category {
        Some(Category::Red) => 'r',
        Some(Category::Blue) => 'b',
        Some(Category::Neutral) => 'n',
        Some(Category::Assassin) => 'x',
        None if cell.revealed => '?',
        None => ' ',
    };
    let letter = if cell.revealed {
        letter.to_ascii_uppercase()
    } else {
        letter
    };
    if cell.emphasis {
        format!("*{letter}*")
    } else {
        format!("[{letter}]")
    }
}

pub fn render_view(view: &SessionView) -> String {
    let mut out = String::new();
    let Some(state) = &view.state else {
        let _ = writeln!(out, "Game {}: waiting for the other player...", view.code);
        return out;
    };

    let role = match state.role {
        Role::ClueGiver => "clue giver",
        Role::Guesser => "guesser",
    };
    let _ = write!(
        out,
        "Game {} | {} ({role}, {} team)",
        view.code, view.username, state.team_color
    );
    if state.hard_mode {
        out.push_str(" | HARD MODE");
    }
    out.push('\n');

    let clue = match &state.active_clue {
        Some(clue) => format!("{} ({})", clue.word, clue.number),
        None if state.role == Role::Guesser => "waiting for clue".to_string(),
        None => "-".to_string(),
    };
    let _ = writeln!(
        out,
        "{} | score {} | clue: {clue} | guesses left: {}",
        view.phase, state.score, state.guesses_remaining
    );

    let width = view
        .cells
        .iter()
        .map(|cell| cell.word.chars().count())
        .max()
        .unwrap_or(0);
    for row in view.cells.chunks(BOARD_COLUMNS) {
        let line = row
            .iter()
            .map(|cell| {
                format!(
                    "{:>2} {:<width$} {}",
                    cell.index.0,
                    cell.word,
                    category_tag(cell)
                )
            })
            .collect::<Vec<_>>()
            .join("  ");
        let _ = writeln!(out, "{}", line.trim_end());
    }

    if view.clue_entry_enabled {
        out.push_str("> your turn: clue <word> <number>\n");
    } else if view.guessing_enabled {
        out.push_str("> your turn: guess <index>\n");
    }
    out
}

pub fn render_notice(notice: &TerminalNotice) -> String {
    match notice {
        TerminalNotice::Lost { message } => format!("{message}\n"),
        TerminalNotice::Won {
            message, secret, ..
        } => match secret {
            Some(secret) => format!("{message}\nSecret: {secret}\n"),
            None => format!("{message}\n"),
        },
    }
}

/// Text for stdout, or `None` for diagnostics that only go to the log.
pub fn render_event(event: &ClientEvent) -> Option<String> {
    match event {
        ClientEvent::Render(view) => Some(render_view(view)),
        ClientEvent::Terminal(notice) => Some(render_notice(notice)),
        ClientEvent::Rejected(err) => Some(format!("! {err}\n")),
        ClientEvent::Error(message) => Some(format!("error: {message}\n")),
        ClientEvent::Ignored { .. } => None,
    }
}
