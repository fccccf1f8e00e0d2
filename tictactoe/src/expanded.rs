//! 5x5 phase. The board is too large to search, so each turn runs an ordered
//! cascade of strategies and plays the first move any of them proposes.
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use tracing::debug;

use crate::grid::{Grid, Move, Side};
use crate::lines::{PotentialLine, PotentialLines};
use crate::playstyle::Playstyle;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Tier {
    Win,
    Block,
    DoubleThreat,
    Strategic,
    Fallback,
}

/// Snapshot shared by every strategy for one decision.
pub struct Position<'a> {
    pub grid: &'a Grid,
    pub ai: Side,
    pub playstyle: Playstyle,
    pub lines: PotentialLines,
}

impl<'a> Position<'a> {
    pub fn new(grid: &'a Grid, ai: Side, playstyle: Playstyle) -> Self {
        Self {
            grid,
            ai,
            playstyle,
            lines: PotentialLines::of(grid),
        }
    }

    fn own(&self) -> &[PotentialLine] {
        self.lines.for_side(self.ai)
    }

    fn theirs(&self) -> &[PotentialLine] {
        self.lines.for_side(self.ai.opponent())
    }
}

pub type Strategy = fn(&Position<'_>, &mut dyn RngCore) -> Option<Move>;

/// Highest priority first.
pub const CASCADE: [(Tier, Strategy); 5] = [
    (Tier::Win, win_now),
    (Tier::Block, block),
    (Tier::DoubleThreat, double_threat),
    (Tier::Strategic, strategic),
    (Tier::Fallback, fallback),
];

pub(crate) fn choose(
    grid: &Grid,
    playstyle: Playstyle,
    ai: Side,
    rng: &mut dyn RngCore,
) -> Option<Move> {
    decide(grid, playstyle, ai, rng).map(|(mv, _)| mv)
}

/// Run the cascade, returning the move and the tier that produced it.
pub fn decide(
    grid: &Grid,
    playstyle: Playstyle,
    ai: Side,
    rng: &mut dyn RngCore,
) -> Option<(Move, Tier)> {
    let position = Position::new(grid, ai, playstyle);
    for (tier, strategy) in CASCADE {
        if let Some(mv) = strategy(&position, rng) {
            debug!(?tier, row = mv.row, col = mv.col, %playstyle, "5x5 move");
            return Some((mv, tier));
        }
    }
    None
}

/// The empty cell of a two-of-three line, preferring the fullest lines.
fn completing_move(lines: &[PotentialLine]) -> Option<Move> {
    let mut ordered: Vec<&PotentialLine> = lines.iter().collect();
    ordered.sort_by(|a, b| b.count.cmp(&a.count));
    ordered.into_iter().find_map(PotentialLine::completing_cell)
}

pub fn win_now(position: &Position<'_>, _rng: &mut dyn RngCore) -> Option<Move> {
    completing_move(position.own())
}

pub fn block(position: &Position<'_>, rng: &mut dyn RngCore) -> Option<Move> {
    let mv = completing_move(position.theirs())?;
    let skip = position.playstyle.profile().block_skip;
    if skip > 0.0 && rng.gen_bool(skip) {
        debug!(row = mv.row, col = mv.col, "ignoring block to stay on the offensive");
        return None;
    }
    Some(mv)
}

/// A cell shared by several of the computer's open lines: taking it turns each
/// of them into a threat at once.
pub fn double_threat(position: &Position<'_>, _rng: &mut dyn RngCore) -> Option<Move> {
    let mut counts: Vec<(Move, usize)> = Vec::new();
    for line in position.own() {
        for &cell in &line.empties {
            match counts.iter_mut().find(|(mv, _)| *mv == cell) {
                Some((_, n)) => *n += 1,
                None => counts.push((cell, 1)),
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .find(|&(_, n)| n > 1)
        .map(|(mv, _)| mv)
}

/// Fixed value of a 5x5 cell, in tenths.
fn position_bonus(mv: Move) -> i32 {
    let on_rim = |i: usize| i == 0 || i == 4;
    match (mv.row, mv.col) {
        (2, 2) => 50,
        (r, c) if on_rim(r) && on_rim(c) => 30,
        (0, 2) | (2, 0) | (2, 4) | (4, 2) => 20,
        _ => 0,
    }
}

fn line_pressure(lines: &[PotentialLine], mv: Move) -> i32 {
    lines
        .iter()
        .filter(|line| line.empties.contains(&mv))
        .map(|line| line.count as i32 * 2)
        .sum()
}

/// Score of an empty cell in tenths: position plus weighted offense and defense.
pub fn cell_score(position: &Position<'_>, mv: Move) -> i32 {
    let profile = position.playstyle.profile();
    position_bonus(mv)
        + line_pressure(position.own(), mv) * profile.offense_weight
        + line_pressure(position.theirs(), mv) * profile.defense_weight
}

/// Cells sorted best first; ties keep row-major order.
pub fn ranked_cells(position: &Position<'_>) -> Vec<(Move, i32)> {
    let mut scored: Vec<(Move, i32)> = position
        .grid
        .empty_cells()
        .into_iter()
        .map(|mv| (mv, cell_score(position, mv)))
        .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored
}

pub fn strategic(position: &Position<'_>, rng: &mut dyn RngCore) -> Option<Move> {
    let ranked = ranked_cells(position);
    if ranked.len() <= 1 {
        return ranked.first().map(|&(mv, _)| mv);
    }
    let profile = position.playstyle.profile();
    let index = if rng.gen_bool(profile.top_pick) {
        0
    } else {
        rng.gen_range(0..profile.top_window.min(ranked.len()))
    };
    Some(ranked[index].0)
}

pub fn fallback(position: &Position<'_>, rng: &mut dyn RngCore) -> Option<Move> {
    position.grid.empty_cells().choose(rng).copied()
}
