use shared::domain::{Category, CellIndex};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("cell index {index} out of range for board of {len} cells")]
    OutOfRange { index: CellIndex, len: usize },
    #[error("board shape mismatch: {words} words, {flags} revealed flags")]
    RevealedShape { words: usize, flags: usize },
    #[error("board shape mismatch: {words} words, {categories} categories")]
    CategoryShape { words: usize, categories: usize },
}

/// One word on the board.
///
/// `category` is only populated when the owning participant is entitled to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    index: CellIndex,
    word: String,
    category: Option<Category>,
    revealed: bool,
}

impl Cell {
    pub fn index(&self) -> CellIndex {
        self.index
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn category(&self) -> Option<Category> {
        self.category
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }
}

/// What the participant knows about the hidden categories at game start.
#[derive(Clone, PartialEq, Eq)]
pub enum Knowledge {
    /// The full category map, held by the clue giver.
    Full(Vec<Category>),
    /// Nothing beyond what later reveals disclose.
    None,
}

impl std::fmt::Debug for Knowledge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full(categories) => write!(f, "Full(<{} redacted>)", categories.len()),
            Self::None => f.write_str("None"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    cells: Vec<Cell>,
}

impl Board {
    pub fn initialize(
        words: Vec<String>,
        revealed: &[bool],
        knowledge: Knowledge,
    ) -> Result<Self, BoardError> {
        if words.len() != revealed.len() {
            return Err(BoardError::RevealedShape {
                words: words.len(),
                flags: revealed.len(),
            });
        }
        let categories = match knowledge {
            Knowledge::Full(categories) => {
                if categories.len() != words.len() {
                    return Err(BoardError::CategoryShape {
                        words: words.len(),
                        categories: categories.len(),
                    });
                }
                categories.into_iter().map(Some).collect::<Vec<_>>()
            }
            Knowledge::None => vec![None; words.len()],
        };

        let cells = words
            .into_iter()
            .zip(revealed.iter().copied())
            .zip(categories)
            .enumerate()
            .map(|(i, ((word, revealed), category))| Cell {
                index: CellIndex(i),
                word,
                category,
                revealed,
            })
            .collect();
        Ok(Self { cells })
    }

    /// Marks the cell revealed and records its category.
    ///
    /// Returns `Ok(false)` when the cell was already revealed; nothing changes in that case.
    pub fn reveal(&mut self, index: CellIndex, category: Category) -> Result<bool, BoardError> {
        let len = self.cells.len();
        let cell = self
            .cells
            .get_mut(index.0)
            .ok_or(BoardError::OutOfRange { index, len })?;
        if cell.revealed {
            return Ok(false);
        }
        cell.revealed = true;
        cell.category = Some(category);
        Ok(true)
    }

    pub fn get(&self, index: CellIndex) -> Result<&Cell, BoardError> {
        self.cells.get(index.0).ok_or(BoardError::OutOfRange {
            index,
            len: self.cells.len(),
        })
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/board_tests.rs"]
mod tests;
