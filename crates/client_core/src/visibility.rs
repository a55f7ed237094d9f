//! Role-gated view of board cells.
//!
//! The guesser board never stores a category for an unrevealed cell, and the
//! guesser policy still refuses to expose one if it ever did.

use serde::Serialize;
use shared::domain::{Category, CellIndex, Role};

use crate::board::{Board, Cell};

/// A cell as a given role is allowed to see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellView {
    pub index: CellIndex,
    pub word: String,
    pub revealed: bool,
    pub category: Option<Category>,
    /// Set for the clue giver on revealed cells. Display-only.
    pub emphasis: bool,
}

pub trait VisibilityPolicy: Send + Sync {
    fn category(&self, cell: &Cell) -> Option<Category>;

    fn emphasis(&self, _cell: &Cell) -> bool {
        false
    }

    fn view(&self, cell: &Cell) -> CellView {
        CellView {
            index: cell.index(),
            word: cell.word().to_string(),
            revealed: cell.is_revealed(),
            category: self.category(cell),
            emphasis: self.emphasis(cell),
        }
    }
}

pub struct ClueGiverPolicy;

impl VisibilityPolicy for ClueGiverPolicy {
    fn category(&self, cell: &Cell) -> Option<Category> {
        cell.category()
    }

    fn emphasis(&self, cell: &Cell) -> bool {
        cell.is_revealed()
    }
}

pub struct GuesserPolicy;

impl VisibilityPolicy for GuesserPolicy {
    fn category(&self, cell: &Cell) -> Option<Category> {
        if cell.is_revealed() {
            cell.category()
        } else {
            None
        }
    }
}

pub fn policy_for(role: Role) -> &'static dyn VisibilityPolicy {
    match role {
        Role::ClueGiver => &ClueGiverPolicy,
        Role::Guesser => &GuesserPolicy,
    }
}

pub fn project_board(role: Role, board: &Board) -> Vec<CellView> {
    let policy = policy_for(role);
    board.cells().iter().map(|cell| policy.view(cell)).collect()
}

#[cfg(test)]
#[path = "tests/visibility_tests.rs"]
mod tests;
