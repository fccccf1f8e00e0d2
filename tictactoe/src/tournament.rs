//! Engine-versus-engine games for comparing playstyles.
//!
//! Each game starts on 3x3; a tie expands to 5x5, which runs until the board
//! is full or no further line can be completed. X always moves first and the
//! first mover is drawn at random every round.
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::engine::choose_move;
use crate::grid::{Grid, Side, CLASSIC_SIZE, EXPANDED_SIZE};
use crate::lines::{calculate_scores, check_winner, expanded_game_over, Outcome, Scores};
use crate::playstyle::Playstyle;
use crate::GameError;

pub const MAX_ROUNDS: u32 = 1_000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameRecord {
    pub outcome: Outcome,
    /// Set when the 3x3 phase tied and play continued on 5x5.
    pub expanded: bool,
    pub scores: Scores,
    pub board: Grid,
}

/// Play one game. `x_style` moves first as X.
pub fn play_game(
    x_style: Playstyle,
    o_style: Playstyle,
    rng: &mut dyn RngCore,
) -> Result<GameRecord, GameError> {
    let style = |side: Side| match side {
        Side::X => x_style,
        Side::O => o_style,
    };
    let mut grid = Grid::classic();
    let mut turn = Side::X;
    while let Some(mv) = choose_move(&grid, CLASSIC_SIZE, style(turn), turn, turn.opponent(), rng)? {
        grid.place(mv, turn)?;
        turn = turn.opponent();
        if let Some(winner) = check_winner(&grid) {
            return Ok(GameRecord {
                outcome: Outcome::Winner(winner),
                expanded: false,
                scores: Scores::default(),
                board: grid,
            });
        }
    }

    let mut grid = grid.expand()?;
    while !expanded_game_over(&grid) {
        let Some(mv) = choose_move(&grid, EXPANDED_SIZE, style(turn), turn, turn.opponent(), rng)?
        else {
            break;
        };
        grid.place(mv, turn)?;
        turn = turn.opponent();
    }
    let scores = calculate_scores(&grid);
    Ok(GameRecord {
        outcome: Outcome::from_scores(scores),
        expanded: true,
        scores,
        board: grid,
    })
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirstMoveStats {
    pub total: u32,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub styles: [Playstyle; 2],
    pub rounds: u32,
    pub wins: [u32; 2],
    pub ties: u32,
    /// Mean 5x5 score over all rounds; 0 for rounds decided on 3x3.
    pub average_scores: [f64; 2],
    /// Results of each style in the rounds it moved first.
    pub when_first: [FirstMoveStats; 2],
}

/// Play `rounds` games between two playstyles.
pub fn play_match(
    first: Playstyle,
    second: Playstyle,
    rounds: u32,
    rng: &mut dyn RngCore,
) -> Result<MatchReport, GameError> {
    if !(1..=MAX_ROUNDS).contains(&rounds) {
        return Err(GameError::RoundsOutOfRange(rounds));
    }
    let styles = [first, second];
    let mut wins = [0; 2];
    let mut ties = 0;
    let mut score_totals = [0u64; 2];
    let mut when_first = [FirstMoveStats::default(), FirstMoveStats::default()];

    for _ in 0..rounds {
        let leader = if rng.gen_bool(0.5) { 0 } else { 1 };
        let follower = 1 - leader;
        let record = play_game(styles[leader], styles[follower], rng)?;

        let side_of = |idx: usize| if idx == leader { Side::X } else { Side::O };
        for idx in 0..2 {
            score_totals[idx] += u64::from(record.scores.get(side_of(idx)));
        }
        let stats = &mut when_first[leader];
        stats.total += 1;
        match record.outcome {
            Outcome::Winner(side) => {
                let winner = if side == Side::X { leader } else { follower };
                wins[winner] += 1;
                if winner == leader {
                    stats.wins += 1;
                } else {
                    stats.losses += 1;
                }
            }
            Outcome::Tie => {
                ties += 1;
                stats.ties += 1;
            }
        }
    }

    let average_scores = score_totals.map(|total| total as f64 / f64::from(rounds));
    Ok(MatchReport {
        styles,
        rounds,
        wins,
        ties,
        average_scores,
        when_first,
    })
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub playstyle: Playstyle,
    pub wins: u32,
    pub games: u32,
    pub win_rate: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TournamentReport {
    pub matches: Vec<MatchReport>,
    /// Best win rate first.
    pub rankings: Vec<Ranking>,
}

/// Every pair of distinct playstyles plays `rounds` games.
pub fn round_robin(rounds: u32, rng: &mut dyn RngCore) -> Result<TournamentReport, GameError> {
    let mut matches = Vec::new();
    for (i, &first) in Playstyle::ALL.iter().enumerate() {
        for &second in &Playstyle::ALL[i + 1..] {
            matches.push(play_match(first, second, rounds, rng)?);
        }
    }

    let mut rankings: Vec<Ranking> = Playstyle::ALL
        .iter()
        .map(|&playstyle| {
            let (wins, games) = matches
                .iter()
                .flat_map(|m| (0..2).map(move |idx| (m, idx)))
                .filter(|(m, idx)| m.styles[*idx] == playstyle)
                .fold((0, 0), |(wins, games), (m, idx)| {
                    (wins + m.wins[idx], games + m.rounds)
                });
            Ranking {
                playstyle,
                wins,
                games,
                win_rate: if games == 0 {
                    0.0
                } else {
                    f64::from(wins) / f64::from(games)
                },
            }
        })
        .collect();
    rankings.sort_by(|a, b| b.win_rate.total_cmp(&a.win_rate));
    Ok(TournamentReport { matches, rankings })
}
