//! Playstyles and the adaptive choice between them across games.
use std::fmt;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Playstyle {
    Aggressive,
    Defensive,
    Balanced,
}

impl Playstyle {
    pub const ALL: [Playstyle; 3] = [
        Playstyle::Aggressive,
        Playstyle::Defensive,
        Playstyle::Balanced,
    ];

    pub fn profile(self) -> &'static Profile {
        match self {
            Playstyle::Aggressive => &AGGRESSIVE,
            Playstyle::Defensive => &DEFENSIVE,
            Playstyle::Balanced => &BALANCED,
        }
    }
}

impl fmt::Display for Playstyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Playstyle::Aggressive => "aggressive",
            Playstyle::Defensive => "defensive",
            Playstyle::Balanced => "balanced",
        };
        f.write_str(name)
    }
}

/// Regions of the 3x3 board used by the opening table.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Region {
    Center,
    Corner,
    Edge,
}

/// How a 3x3 tie between equally valued moves is broken.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Category {
    /// Leaves the computer one move from a line.
    Offensive,
    /// Takes the cell the opponent would use to get one move from a line.
    Defensive,
    Central,
    Corner,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TieBreak {
    /// First non-empty category wins.
    Prefer([Category; 4]),
    /// The centre with this probability when it is among the ties.
    CenterBiased(f64),
}

/// Numeric weightings for one playstyle. Weights are in tenths.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Profile {
    /// Rolled in order; the last region takes whatever probability remains.
    pub opening: &'static [(Region, f64)],
    pub tie_break: TieBreak,
    /// Chance of ignoring an available 5x5 block.
    pub block_skip: f64,
    pub offense_weight: i32,
    pub defense_weight: i32,
    /// Chance of taking the best-scored 5x5 cell outright.
    pub top_pick: f64,
    /// Otherwise pick uniformly among this many best cells.
    pub top_window: usize,
}

const AGGRESSIVE: Profile = Profile {
    opening: &[(Region::Center, 0.7), (Region::Corner, 0.3)],
    tie_break: TieBreak::Prefer([
        Category::Offensive,
        Category::Central,
        Category::Corner,
        Category::Defensive,
    ]),
    block_skip: 0.2,
    offense_weight: 15,
    defense_weight: 7,
    top_pick: 0.8,
    top_window: 3,
};

const DEFENSIVE: Profile = Profile {
    opening: &[
        (Region::Corner, 0.6),
        (Region::Center, 0.3),
        (Region::Edge, 0.1),
    ],
    tie_break: TieBreak::Prefer([
        Category::Defensive,
        Category::Corner,
        Category::Central,
        Category::Offensive,
    ]),
    block_skip: 0.0,
    offense_weight: 7,
    defense_weight: 15,
    top_pick: 0.9,
    top_window: 2,
};

const BALANCED: Profile = Profile {
    opening: &[
        (Region::Center, 0.5),
        (Region::Corner, 0.4),
        (Region::Edge, 0.1),
    ],
    tie_break: TieBreak::CenterBiased(0.6),
    block_skip: 0.0,
    offense_weight: 10,
    defense_weight: 10,
    top_pick: 0.7,
    top_window: 3,
};

/// Cross-game memory driving the adaptive playstyle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionHistory {
    pub is_first_game: bool,
    pub did_ai_win_last_game: bool,
}

impl Default for SessionHistory {
    fn default() -> Self {
        Self {
            is_first_game: true,
            did_ai_win_last_game: false,
        }
    }
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick the playstyle for the next game. A computer that won last time
    /// eases off; one that lost plays harder.
    pub fn select_playstyle(&self, ai_moves_first: bool, rng: &mut dyn RngCore) -> Playstyle {
        let style = match (self.is_first_game, self.did_ai_win_last_game, ai_moves_first) {
            (true, _, true) => Playstyle::ALL[rng.gen_range(0..Playstyle::ALL.len())],
            (true, _, false) => either(rng, 0.5, Playstyle::Aggressive, Playstyle::Balanced),
            (false, true, true) => either(rng, 0.5, Playstyle::Defensive, Playstyle::Balanced),
            (false, true, false) => Playstyle::Balanced,
            (false, false, true) => either(rng, 0.6, Playstyle::Aggressive, Playstyle::Balanced),
            (false, false, false) => Playstyle::Aggressive,
        };
        debug!(
            %style,
            first_game = self.is_first_game,
            ai_won_last = self.did_ai_win_last_game,
            ai_moves_first,
            "selected playstyle"
        );
        style
    }

    pub fn report_game_result(&mut self, ai_won: bool) {
        self.is_first_game = false;
        self.did_ai_win_last_game = ai_won;
    }
}

fn either(rng: &mut dyn RngCore, p: f64, first: Playstyle, second: Playstyle) -> Playstyle {
    if rng.gen_bool(p) {
        first
    } else {
        second
    }
}
