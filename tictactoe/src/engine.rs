//! Move selection entry points.
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::grid::{Grid, Move, Side, CLASSIC_SIZE, EXPANDED_SIZE};
use crate::playstyle::Playstyle;
use crate::{classic, expanded, GameError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub board: String,
    pub ai: Side,
    pub playstyle: Playstyle,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResponse {
    #[serde(rename = "move")]
    pub mv: Option<Move>,
}

/// Pick the computer's next move. `Ok(None)` means the grid is full.
///
/// The grid is only read; trial moves are made on private copies.
pub fn choose_move(
    grid: &Grid,
    board_size: usize,
    playstyle: Playstyle,
    ai: Side,
    opponent: Side,
    rng: &mut dyn RngCore,
) -> Result<Option<Move>, GameError> {
    if board_size != CLASSIC_SIZE && board_size != EXPANDED_SIZE {
        return Err(GameError::UnsupportedBoardSize(board_size));
    }
    if grid.size() != board_size {
        return Err(GameError::SizeMismatch {
            expected: board_size,
            actual: grid.size(),
        });
    }
    if ai == opponent {
        return Err(GameError::SameSides);
    }
    if grid.is_full() {
        return Ok(None);
    }
    let mv = if board_size == CLASSIC_SIZE {
        classic::choose(grid, playstyle, ai, rng)
    } else {
        expanded::choose(grid, playstyle, ai, rng)
    };
    Ok(mv)
}

pub fn best_move(request: MoveRequest, rng: &mut dyn RngCore) -> Result<MoveResponse, GameError> {
    let grid: Grid = request.board.parse()?;
    let mv = choose_move(
        &grid,
        grid.size(),
        request.playstyle,
        request.ai,
        request.ai.opponent(),
        rng,
    )?;
    Ok(MoveResponse { mv })
}
