//! 3x3 phase: table-driven opening, then exhaustive minimax with alpha-beta
//! pruning. Playstyle only chooses among moves of equal value.
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use tracing::debug;

use crate::grid::{Grid, Move, Side, CLASSIC_SIZE};
use crate::lines::{check_winner, classify, lines_for, LineClass};
use crate::playstyle::{Category, Playstyle, Region, TieBreak};

const WIN_SCORE: i32 = 10;
const CENTER: Move = Move::new(1, 1);
const CORNERS: [Move; 4] = [
    Move::new(0, 0),
    Move::new(0, 2),
    Move::new(2, 0),
    Move::new(2, 2),
];
const EDGES: [Move; 4] = [
    Move::new(0, 1),
    Move::new(1, 0),
    Move::new(1, 2),
    Move::new(2, 1),
];

pub(crate) fn choose(
    grid: &Grid,
    playstyle: Playstyle,
    ai: Side,
    rng: &mut dyn RngCore,
) -> Option<Move> {
    if grid.is_blank() {
        return Some(opening_move(playstyle, rng));
    }
    let best = best_moves(grid, ai);
    match best.as_slice() {
        [] => None,
        [only] => Some(*only),
        _ => tie_break(grid, &best, playstyle, ai, rng),
    }
}

/// Opening move on the empty board, drawn from the playstyle's region table.
pub fn opening_move(playstyle: Playstyle, rng: &mut dyn RngCore) -> Move {
    let table = playstyle.profile().opening;
    let roll: f64 = rng.gen();
    let mut cumulative = 0.0;
    let mut region = Region::Center;
    for (i, &(candidate, p)) in table.iter().enumerate() {
        cumulative += p;
        region = candidate;
        if roll < cumulative || i == table.len() - 1 {
            break;
        }
    }
    match region {
        Region::Center => CENTER,
        Region::Corner => *CORNERS.choose(rng).unwrap_or(&CORNERS[0]),
        Region::Edge => *EDGES.choose(rng).unwrap_or(&EDGES[0]),
    }
}

/// Every move sharing the best minimax value for `ai`, in row-major order.
/// Empty for anything but a 3x3 grid.
pub fn best_moves(grid: &Grid, ai: Side) -> Vec<Move> {
    if grid.size() != CLASSIC_SIZE {
        return Vec::new();
    }
    let mut scratch = grid.clone();
    let mut best_score = i32::MIN;
    let mut best = Vec::new();
    for mv in grid.empty_cells() {
        scratch.set(mv, Some(ai));
        let score = minimax(&mut scratch, ai, 0, false, i32::MIN, i32::MAX);
        scratch.set(mv, None);
        if score > best_score {
            best_score = score;
            best.clear();
            best.push(mv);
        } else if score == best_score {
            best.push(mv);
        }
    }
    best
}

/// Value of `grid` for `ai`: `10 - depth` for a win, `depth - 10` for a loss,
/// 0 for a draw.
fn minimax(
    grid: &mut Grid,
    ai: Side,
    depth: i32,
    maximizing: bool,
    mut alpha: i32,
    mut beta: i32,
) -> i32 {
    if let Some(winner) = check_winner(grid) {
        return if winner == ai {
            WIN_SCORE - depth
        } else {
            depth - WIN_SCORE
        };
    }
    if grid.is_full() {
        return 0;
    }

    let side = if maximizing { ai } else { ai.opponent() };
    let mut best = if maximizing { i32::MIN } else { i32::MAX };
    for mv in grid.empty_cells() {
        grid.set(mv, Some(side));
        let score = minimax(grid, ai, depth + 1, !maximizing, alpha, beta);
        grid.set(mv, None);
        if maximizing {
            best = best.max(score);
            alpha = alpha.max(best);
        } else {
            best = best.min(score);
            beta = beta.min(best);
        }
        if beta <= alpha {
            break;
        }
    }
    best
}

/// Whether `side` on `mv` leaves a line through `mv` one move from complete.
fn creates_threat(grid: &Grid, mv: Move, side: Side) -> bool {
    let Ok(trial) = grid.with(mv, side) else {
        return false;
    };
    lines_for(&trial)
        .iter()
        .filter(|line| line.contains(&mv))
        .any(|line| match classify(&trial, line) {
            LineClass::Potential(p) => p.owner == side && p.completing_cell().is_some(),
            _ => false,
        })
}

fn in_category(grid: &Grid, mv: Move, ai: Side, category: Category) -> bool {
    match category {
        Category::Offensive => creates_threat(grid, mv, ai),
        Category::Defensive => creates_threat(grid, mv, ai.opponent()),
        Category::Central => mv == CENTER,
        Category::Corner => CORNERS.contains(&mv),
    }
}

fn tie_break(
    grid: &Grid,
    candidates: &[Move],
    playstyle: Playstyle,
    ai: Side,
    rng: &mut dyn RngCore,
) -> Option<Move> {
    let pool = |category: Category| -> Vec<Move> {
        candidates
            .iter()
            .copied()
            .filter(|&mv| in_category(grid, mv, ai, category))
            .collect()
    };
    match playstyle.profile().tie_break {
        TieBreak::Prefer(order) => {
            for category in order {
                let moves = pool(category);
                if let Some(&mv) = moves.choose(rng) {
                    debug!(?category, %playstyle, "3x3 tie broken");
                    return Some(mv);
                }
            }
        }
        TieBreak::CenterBiased(p) => {
            let central = pool(Category::Central);
            if !central.is_empty() && rng.gen_bool(p) {
                debug!(category = ?Category::Central, %playstyle, "3x3 tie broken");
                return central.choose(rng).copied();
            }
        }
    }
    debug!(%playstyle, ties = candidates.len(), "3x3 tie broken uniformly");
    candidates.choose(rng).copied()
}
