use client_core::Intent;
use shared::domain::CellIndex;
use thiserror::Error;

pub const HELP: &str = "commands: clue <word> <number> | guess <index> | help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Intent(Intent),
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("usage: clue <word> <number>")]
    ClueUsage,
    #[error("clue number must be an integer, got '{0}'")]
    ClueNumber(String),
    #[error("usage: guess <index>")]
    GuessUsage,
    #[error("cell index must be a non-negative integer, got '{0}'")]
    GuessIndex(String),
    #[error("unknown command '{0}', try 'help'")]
    Unknown(String),
}

pub fn parse_line(line: &str) -> Result<Option<Command>, InputError> {
    let mut tokens = line.split_whitespace();
    let Some(head) = tokens.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = tokens.collect();
    let command = match head.to_ascii_lowercase().as_str() {
        "clue" => {
            let Some((number, words)) = rest.split_last() else {
                return Err(InputError::ClueUsage);
            };
            if words.is_empty() {
                return Err(InputError::ClueUsage);
            }
            let number = number
                .parse::<i64>()
                .map_err(|_| InputError::ClueNumber(number.to_string()))?;
            Command::Intent(Intent::GiveClue {
                word: words.join(" "),
                number,
            })
        }
        "guess" => {
            let [index] = rest.as_slice() else {
                return Err(InputError::GuessUsage);
            };
            let index = index
                .parse::<usize>()
                .map_err(|_| InputError::GuessIndex(index.to_string()))?;
            Command::Intent(Intent::Guess(CellIndex(index)))
        }
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(InputError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}
