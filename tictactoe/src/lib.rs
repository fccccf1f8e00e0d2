//! Two-phase tic-tac-toe engine.
//! A classic 3x3 game is played first; a tie expands the board to 5x5, where
//! the side completing the most three-in-a-rows wins. The crate picks the
//! computer's move in both phases, scores the 5x5 board and adapts the
//! computer's playstyle across games.
//!
//! The engine is stateless apart from [`SessionHistory`]: callers pass a grid
//! snapshot and an explicit random source, and receive a coordinate back.
//!
//! ```
//! use rand::{rngs::StdRng, SeedableRng};
//! use tictactoe::{choose_move, Grid, Playstyle, Side};
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let grid: Grid = "X../.../...".parse().unwrap();
//! let mv = choose_move(&grid, 3, Playstyle::Balanced, Side::O, Side::X, &mut rng)
//!     .unwrap()
//!     .unwrap();
//! assert_eq!((mv.row, mv.col), (1, 1));
//! ```
use thiserror::Error;

pub mod classic;
pub mod engine;
pub mod expanded;
pub mod grid;
pub mod lines;
pub mod playstyle;
pub mod tournament;

pub use engine::{best_move, choose_move, MoveRequest, MoveResponse};
pub use grid::{Grid, Move, Side, CLASSIC_SIZE, EXPANDED_SIZE};
pub use lines::{
    calculate_scores, can_form_more_lines, check_winner, expanded_game_over, CompletedLine,
    Outcome, ScoreReport, ScoreTracker, Scores,
};
pub use playstyle::{Playstyle, SessionHistory};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("board size {0} is not supported (expected 3 or 5)")]
    UnsupportedBoardSize(usize),
    #[error("board size {expected} does not match a {actual}x{actual} grid")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("board has {0} cells (expected 9 or 25)")]
    BoardLength(usize),
    #[error("invalid cell character {character:?} at position {position}")]
    InvalidCell { position: usize, character: char },
    #[error("cell ({row}, {col}) is outside the board")]
    OutOfBounds { row: usize, col: usize },
    #[error("cell ({row}, {col}) is already taken")]
    Occupied { row: usize, col: usize },
    #[error("only a 3x3 board can be expanded")]
    NotExpandable,
    #[error("the computer and its opponent must play different sides")]
    SameSides,
    #[error("rounds {0} is out of range (1-{max})", max = tournament::MAX_ROUNDS)]
    RoundsOutOfRange(u32),
}
