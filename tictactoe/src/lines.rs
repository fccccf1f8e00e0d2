//! Line evaluation: every straight window of three cells, its ownership, and
//! the win/score/reachability questions derived from it.
use std::collections::HashSet;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::grid::{Grid, Move, Side, CLASSIC_SIZE, EXPANDED_SIZE};

pub const LINE_LEN: usize = 3;

/// Three collinear cells, in order along the line.
pub type Line = [Move; LINE_LEN];

/// Precomputed windows for each phase.
static CLASSIC_LINES: Lazy<Vec<Line>> = Lazy::new(|| enumerate_lines(CLASSIC_SIZE));
static EXPANDED_LINES: Lazy<Vec<Line>> = Lazy::new(|| enumerate_lines(EXPANDED_SIZE));

/// All windows of three cells on a `size`x`size` board: horizontal, vertical,
/// then both diagonal directions.
pub fn enumerate_lines(size: usize) -> Vec<Line> {
    let mut lines = Vec::new();
    if size < LINE_LEN {
        return lines;
    }
    let last = size - LINE_LEN;
    // Horizontal
    for row in 0..size {
        for col in 0..=last {
            lines.push([0, 1, 2].map(|i| Move::new(row, col + i)));
        }
    }
    // Vertical
    for col in 0..size {
        for row in 0..=last {
            lines.push([0, 1, 2].map(|i| Move::new(row + i, col)));
        }
    }
    // Diagonal \
    for row in 0..=last {
        for col in 0..=last {
            lines.push([0, 1, 2].map(|i| Move::new(row + i, col + i)));
        }
    }
    // Diagonal /
    for row in 0..=last {
        for col in LINE_LEN - 1..size {
            lines.push([0, 1, 2].map(|i| Move::new(row + i, col - i)));
        }
    }
    lines
}

/// The cached windows matching the grid's size.
pub fn lines_for(grid: &Grid) -> &'static [Line] {
    if grid.size() == CLASSIC_SIZE {
        CLASSIC_LINES.as_slice()
    } else {
        EXPANDED_LINES.as_slice()
    }
}

/// A window holding marks of one side only, plus empties.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PotentialLine {
    pub line: Line,
    pub owner: Side,
    pub count: usize,
    pub empties: Vec<Move>,
}

impl PotentialLine {
    /// The one cell left to complete this line, if exactly one remains.
    pub fn completing_cell(&self) -> Option<Move> {
        match self.empties.as_slice() {
            [only] if self.count == LINE_LEN - 1 => Some(*only),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineClass {
    Empty,
    Contested,
    Potential(PotentialLine),
}

pub fn classify(grid: &Grid, line: &Line) -> LineClass {
    let mut x = 0;
    let mut o = 0;
    let mut empties = Vec::with_capacity(LINE_LEN);
    for &mv in line {
        match grid.get(mv) {
            Some(Side::X) => x += 1,
            Some(Side::O) => o += 1,
            None => empties.push(mv),
        }
    }
    let (owner, count) = match (x, o) {
        (0, 0) => return LineClass::Empty,
        (_, 0) => (Side::X, x),
        (0, _) => (Side::O, o),
        _ => return LineClass::Contested,
    };
    LineClass::Potential(PotentialLine {
        line: *line,
        owner,
        count,
        empties,
    })
}

/// Potential lines of both sides, in enumeration order.
#[derive(Clone, Debug, Default)]
pub struct PotentialLines {
    pub x: Vec<PotentialLine>,
    pub o: Vec<PotentialLine>,
}

impl PotentialLines {
    pub fn of(grid: &Grid) -> Self {
        let mut lines = Self::default();
        for line in lines_for(grid) {
            if let LineClass::Potential(potential) = classify(grid, line) {
                match potential.owner {
                    Side::X => lines.x.push(potential),
                    Side::O => lines.o.push(potential),
                }
            }
        }
        lines
    }

    pub fn for_side(&self, side: Side) -> &[PotentialLine] {
        match side {
            Side::X => &self.x,
            Side::O => &self.o,
        }
    }
}

fn line_owner(grid: &Grid, line: &Line) -> Option<Side> {
    let first = grid.get(line[0])?;
    line[1..]
        .iter()
        .all(|&mv| grid.get(mv) == Some(first))
        .then_some(first)
}

/// Side owning a complete line, if any. Intended for the 3x3 phase.
pub fn check_winner(grid: &Grid) -> Option<Side> {
    lines_for(grid)
        .iter()
        .find_map(|line| line_owner(grid, line))
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub x: u32,
    pub o: u32,
}

impl Scores {
    pub fn get(&self, side: Side) -> u32 {
        match side {
            Side::X => self.x,
            Side::O => self.o,
        }
    }

    fn bump(&mut self, side: Side) {
        match side {
            Side::X => self.x += 1,
            Side::O => self.o += 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompletedLine {
    pub owner: Side,
    pub cells: Line,
}

fn completed_lines(grid: &Grid) -> Vec<CompletedLine> {
    lines_for(grid)
        .iter()
        .filter_map(|line| {
            line_owner(grid, line).map(|owner| CompletedLine {
                owner,
                cells: *line,
            })
        })
        .collect()
}

/// Number of complete windows per side. A cell may count towards several.
pub fn calculate_scores(grid: &Grid) -> Scores {
    let mut scores = Scores::default();
    for line in completed_lines(grid) {
        scores.bump(line.owner);
    }
    scores
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub scores: Scores,
    pub new_lines: Vec<CompletedLine>,
}

/// Scores a grid and remembers which lines were already complete, so each
/// call can report the lines completed since the previous one.
#[derive(Clone, Debug, Default)]
pub struct ScoreTracker {
    seen: HashSet<CompletedLine>,
}

impl ScoreTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an earlier snapshot so only later completions are reported.
    pub fn seeded(previous: &Grid) -> Self {
        Self {
            seen: completed_lines(previous).into_iter().collect(),
        }
    }

    pub fn update(&mut self, grid: &Grid) -> ScoreReport {
        let mut scores = Scores::default();
        let mut new_lines = Vec::new();
        let mut current = HashSet::new();
        for line in completed_lines(grid) {
            scores.bump(line.owner);
            if !self.seen.contains(&line) {
                new_lines.push(line.clone());
            }
            current.insert(line);
        }
        self.seen = current;
        ScoreReport { scores, new_lines }
    }
}

/// True while some window still has an empty cell and is not blocked by both
/// sides.
pub fn can_form_more_lines(grid: &Grid) -> bool {
    lines_for(grid).iter().any(|line| match classify(grid, line) {
        LineClass::Empty => true,
        LineClass::Contested => false,
        LineClass::Potential(p) => !p.empties.is_empty(),
    })
}

/// 5x5 end condition: the board is full or no further line can be completed.
pub fn expanded_game_over(grid: &Grid) -> bool {
    grid.is_full() || !can_form_more_lines(grid)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Winner(Side),
    Tie,
}

impl Outcome {
    pub fn from_scores(scores: Scores) -> Self {
        match scores.x.cmp(&scores.o) {
            std::cmp::Ordering::Greater => Outcome::Winner(Side::X),
            std::cmp::Ordering::Less => Outcome::Winner(Side::O),
            std::cmp::Ordering::Equal => Outcome::Tie,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(s: &str) -> Grid {
        s.parse().unwrap()
    }

    #[test]
    fn line_counts() {
        assert_eq!(enumerate_lines(3).len(), 8);
        // 15 horizontal + 15 vertical + 9 per diagonal direction
        assert_eq!(enumerate_lines(5).len(), 48);
    }

    #[test]
    fn every_window_is_straight_and_in_bounds() {
        for line in enumerate_lines(5) {
            let dr = line[1].row as isize - line[0].row as isize;
            let dc = line[1].col as isize - line[0].col as isize;
            assert_eq!(line[2].row as isize - line[1].row as isize, dr);
            assert_eq!(line[2].col as isize - line[1].col as isize, dc);
            assert!(line.iter().all(|m| m.row < 5 && m.col < 5));
        }
    }

    #[test]
    fn classify_kinds() {
        let g = grid("XX./XO./...");
        let lines = lines_for(&g);
        assert!(matches!(
            classify(&g, &lines[0]),
            LineClass::Potential(PotentialLine { owner: Side::X, count: 2, .. })
        ));
        assert_eq!(classify(&g, &lines[1]), LineClass::Contested);
        assert_eq!(classify(&g, &lines[2]), LineClass::Empty);
        let LineClass::Potential(top) = classify(&g, &lines[0]) else {
            panic!("top row should be potential");
        };
        assert_eq!(top.completing_cell(), Some(Move::new(0, 2)));
    }

    #[test]
    fn detect_winners() {
        assert_eq!(check_winner(&grid("XXX/OO./...")), Some(Side::X));
        assert_eq!(check_winner(&grid("O.X/.OX/X.O")), Some(Side::O));
        assert_eq!(check_winner(&grid("..X/.X./X..")), Some(Side::X));
        assert_eq!(check_winner(&grid("XOX/XOO/OXX")), None);
    }

    #[test]
    fn scores_count_overlapping_windows() {
        // Four in a row yields two windows.
        let g = grid("XXXX./...../OOO../...../.....");
        assert_eq!(calculate_scores(&g), Scores { x: 2, o: 1 });
    }

    #[test]
    fn tracker_reports_only_new_lines() {
        let mut tracker = ScoreTracker::new();
        let first = tracker.update(&grid("XXX../...../...../...../....."));
        assert_eq!(first.new_lines.len(), 1);

        let second = tracker.update(&grid("XXX../...../OOO../...../....."));
        assert_eq!(second.scores, Scores { x: 1, o: 1 });
        assert_eq!(
            second.new_lines,
            vec![CompletedLine {
                owner: Side::O,
                cells: [Move::new(2, 0), Move::new(2, 1), Move::new(2, 2)],
            }]
        );

        let third = tracker.update(&grid("XXX../...../OOO../...../....."));
        assert!(third.new_lines.is_empty());
    }

    #[test]
    fn seeded_tracker_diffs_two_snapshots() {
        let before = grid("XX.../...../...../...../.....");
        let after = grid("XXX../...../...../...../.....");
        let report = ScoreTracker::seeded(&before).update(&after);
        assert_eq!(report.new_lines.len(), 1);
        assert!(ScoreTracker::seeded(&after).update(&after).new_lines.is_empty());
    }

    #[test]
    fn more_lines_until_every_window_blocked() {
        assert!(can_form_more_lines(&Grid::empty(5).unwrap()));
        // The last empty cell sits only in windows holding both marks.
        let blocked = grid("OXXOO/OXOXX/XOXXO/OXOOX/XXXO.");
        assert!(!can_form_more_lines(&blocked));
        assert!(expanded_game_over(&blocked));
        assert!(expanded_game_over(&grid("XXOXO/OOXOX/XXOXO/OOXOX/XXOXO")));
    }

    #[test]
    fn outcome_by_score() {
        assert_eq!(Outcome::from_scores(Scores { x: 3, o: 1 }), Outcome::Winner(Side::X));
        assert_eq!(Outcome::from_scores(Scores { x: 2, o: 2 }), Outcome::Tie);
    }
}
