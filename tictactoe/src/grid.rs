//! Board model shared by both phases.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::GameError;

pub const CLASSIC_SIZE: usize = 3;
pub const EXPANDED_SIZE: usize = 5;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    X,
    O,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::X => Side::O,
            Side::O => Side::X,
        }
    }

    fn symbol(self) -> char {
        match self {
            Side::X => 'X',
            Side::O => 'O',
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A (row, column) coordinate into the active grid.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Move {
    pub row: usize,
    pub col: usize,
}

impl Move {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Square grid of side 3 or 5. Each cell is empty (`None`) or owned by a side.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Grid {
    size: usize,
    cells: Vec<Option<Side>>,
}

impl Grid {
    pub fn empty(size: usize) -> Result<Self, GameError> {
        if size != CLASSIC_SIZE && size != EXPANDED_SIZE {
            return Err(GameError::UnsupportedBoardSize(size));
        }
        Ok(Self {
            size,
            cells: vec![None; size * size],
        })
    }

    pub fn classic() -> Self {
        Self {
            size: CLASSIC_SIZE,
            cells: vec![None; CLASSIC_SIZE * CLASSIC_SIZE],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn in_bounds(&self, mv: Move) -> bool {
        mv.row < self.size && mv.col < self.size
    }

    pub fn get(&self, mv: Move) -> Option<Side> {
        if !self.in_bounds(mv) {
            return None;
        }
        self.cells[self.index(mv)]
    }

    pub fn place(&mut self, mv: Move, side: Side) -> Result<(), GameError> {
        if !self.in_bounds(mv) {
            return Err(GameError::OutOfBounds {
                row: mv.row,
                col: mv.col,
            });
        }
        let idx = self.index(mv);
        if self.cells[idx].is_some() {
            return Err(GameError::Occupied {
                row: mv.row,
                col: mv.col,
            });
        }
        self.cells[idx] = Some(side);
        Ok(())
    }

    /// Copy of the grid with `side` on `mv`. The receiver is left untouched.
    pub fn with(&self, mv: Move, side: Side) -> Result<Grid, GameError> {
        let mut next = self.clone();
        next.place(mv, side)?;
        Ok(next)
    }

    /// Unchecked write used by search code working on its own copy.
    pub(crate) fn set(&mut self, mv: Move, value: Option<Side>) {
        let idx = self.index(mv);
        self.cells[idx] = value;
    }

    /// Empty cells in row-major order.
    pub fn empty_cells(&self) -> Vec<Move> {
        self.coords().filter(|&mv| self.get(mv).is_none()).collect()
    }

    pub fn coords(&self) -> impl Iterator<Item = Move> {
        let size = self.size;
        (0..size).flat_map(move |row| (0..size).map(move |col| Move::new(row, col)))
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    pub fn count(&self, side: Side) -> usize {
        self.cells.iter().filter(|&&c| c == Some(side)).count()
    }

    /// Embed a finished 3x3 grid in the centre of an empty 5x5 grid.
    pub fn expand(&self) -> Result<Grid, GameError> {
        if self.size != CLASSIC_SIZE {
            return Err(GameError::NotExpandable);
        }
        let mut expanded = Grid {
            size: EXPANDED_SIZE,
            cells: vec![None; EXPANDED_SIZE * EXPANDED_SIZE],
        };
        for mv in self.coords() {
            expanded.set(Move::new(mv.row + 1, mv.col + 1), self.get(mv));
        }
        Ok(expanded)
    }

    fn index(&self, mv: Move) -> usize {
        mv.row * self.size + mv.col
    }
}

impl FromStr for Grid {
    type Err = GameError;

    /// Row-major cells: `X`, `O` or one of `.`, `-`, `_` for empty. `/` between
    /// rows is optional and ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut cells = Vec::with_capacity(EXPANDED_SIZE * EXPANDED_SIZE);
        for (position, character) in s.trim().chars().enumerate() {
            let cell = match character {
                'X' | 'x' => Some(Side::X),
                'O' | 'o' => Some(Side::O),
                '.' | '-' | '_' => None,
                '/' => continue,
                _ => {
                    return Err(GameError::InvalidCell {
                        position,
                        character,
                    })
                }
            };
            cells.push(cell);
        }
        let size = match cells.len() {
            9 => CLASSIC_SIZE,
            25 => EXPANDED_SIZE,
            other => return Err(GameError::BoardLength(other)),
        };
        Ok(Grid { size, cells })
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, chunk) in self.cells.chunks(self.size).enumerate() {
            if row > 0 {
                write!(f, "/")?;
            }
            for cell in chunk {
                let c = cell.map(Side::symbol).unwrap_or('.');
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}
