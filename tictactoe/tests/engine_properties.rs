use rand::rngs::mock::StepRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tictactoe::classic::best_moves;
use tictactoe::{
    calculate_scores, check_winner, choose_move, Grid, Move, Playstyle, Scores, Side,
};

fn transform(grid: &Grid, f: impl Fn(usize, Move) -> Move) -> Grid {
    let n = grid.size();
    let mut out = Grid::empty(n).unwrap();
    for mv in grid.coords() {
        if let Some(side) = grid.get(mv) {
            out.place(f(n, mv), side).unwrap();
        }
    }
    out
}

fn rotate(grid: &Grid) -> Grid {
    transform(grid, |n, mv| Move::new(mv.col, n - 1 - mv.row))
}

fn reflect(grid: &Grid) -> Grid {
    transform(grid, |n, mv| Move::new(mv.row, n - 1 - mv.col))
}

fn random_fill(size: usize, marks: usize, rng: &mut StdRng) -> Grid {
    let mut grid = Grid::empty(size).unwrap();
    let mut cells = grid.empty_cells();
    cells.shuffle(rng);
    for (i, mv) in cells.into_iter().take(marks).enumerate() {
        let side = if i % 2 == 0 { Side::X } else { Side::O };
        grid.place(mv, side).unwrap();
    }
    grid
}

#[test]
fn classic_engine_never_loses_to_random_play() {
    let mut rng = StdRng::seed_from_u64(2024);
    for style in Playstyle::ALL {
        for ai in [Side::X, Side::O] {
            for _ in 0..60 {
                let mut grid = Grid::classic();
                let mut turn = Side::X;
                while check_winner(&grid).is_none() && !grid.is_full() {
                    let mv = if turn == ai {
                        choose_move(&grid, 3, style, ai, ai.opponent(), &mut rng)
                            .unwrap()
                            .unwrap()
                    } else {
                        *grid.empty_cells().choose(&mut rng).unwrap()
                    };
                    grid.place(mv, turn).unwrap();
                    turn = turn.opponent();
                }
                assert_ne!(
                    check_winner(&grid),
                    Some(ai.opponent()),
                    "{style} {ai} lost: {grid}"
                );
            }
        }
    }
}

#[test]
fn chosen_move_is_among_best() {
    let mut rng = StdRng::seed_from_u64(77);
    for _ in 0..40 {
        let grid = random_fill(3, 3, &mut rng);
        if check_winner(&grid).is_some() {
            continue;
        }
        let tied = best_moves(&grid, Side::O);
        for style in Playstyle::ALL {
            let mv = choose_move(&grid, 3, style, Side::O, Side::X, &mut rng)
                .unwrap()
                .unwrap();
            assert!(tied.contains(&mv), "{style} picked {mv:?} outside {tied:?}");
        }
    }
}

#[test]
fn caller_grid_is_not_mutated() {
    let mut rng = StdRng::seed_from_u64(5);
    for size in [3, 5] {
        let grid = random_fill(size, 4, &mut rng);
        let before = grid.clone();
        for style in Playstyle::ALL {
            choose_move(&grid, size, style, Side::X, Side::O, &mut rng).unwrap();
        }
        assert_eq!(grid, before);
    }
}

#[test]
fn scores_never_drop_as_marks_are_added() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..20 {
        let mut grid = Grid::empty(5).unwrap();
        let mut cells = grid.empty_cells();
        cells.shuffle(&mut rng);
        let mut previous = Scores::default();
        for (i, mv) in cells.into_iter().enumerate() {
            let side = if i % 2 == 0 { Side::X } else { Side::O };
            grid.place(mv, side).unwrap();
            let scores = calculate_scores(&grid);
            assert!(scores.x >= previous.x && scores.o >= previous.o);
            previous = scores;
        }
    }
}

#[test]
fn evaluation_has_no_axis_bias() {
    let mut rng = StdRng::seed_from_u64(4242);
    for (size, marks) in [(5, 14), (5, 25), (3, 9)] {
        for _ in 0..30 {
            let grid = random_fill(size, marks, &mut rng);
            let scores = calculate_scores(&grid);
            let mut image = grid.clone();
            for _ in 0..4 {
                image = rotate(&image);
                assert_eq!(calculate_scores(&image), scores);
                assert_eq!(calculate_scores(&reflect(&image)), scores);
            }
        }
    }
}

#[test]
fn winner_is_stable_under_symmetry() {
    let mut rng = StdRng::seed_from_u64(808);
    for _ in 0..50 {
        // A legal game stopped at its first line has at most one winner.
        let mut grid = Grid::classic();
        let mut turn = Side::X;
        while check_winner(&grid).is_none() && !grid.is_full() {
            let mv = *grid.empty_cells().choose(&mut rng).unwrap();
            grid.place(mv, turn).unwrap();
            turn = turn.opponent();
        }
        let winner = check_winner(&grid);
        let mut image = grid.clone();
        for _ in 0..4 {
            image = rotate(&image);
            assert_eq!(check_winner(&image), winner);
            assert_eq!(check_winner(&reflect(&image)), winner);
        }
    }
}

#[test]
fn same_seed_same_moves() {
    let mut grids = Vec::new();
    let mut setup = StdRng::seed_from_u64(1);
    for _ in 0..10 {
        grids.push(random_fill(3, 2, &mut setup));
        grids.push(random_fill(5, 8, &mut setup));
    }
    grids.push(Grid::classic());

    let run = |seed: u64| -> Vec<Option<Move>> {
        let mut rng = StdRng::seed_from_u64(seed);
        grids
            .iter()
            .flat_map(|grid| Playstyle::ALL.map(|style| (grid, style)))
            .map(|(grid, style)| {
                choose_move(grid, grid.size(), style, Side::X, Side::O, &mut rng).unwrap()
            })
            .collect()
    };
    assert_eq!(run(12345), run(12345));
}

#[test]
fn centre_answers_corner_opening() {
    let grid: Grid = "X../.../...".parse().unwrap();
    let mut rng = StepRng::new(0, 0);
    let mv = choose_move(&grid, 3, Playstyle::Balanced, Side::O, Side::X, &mut rng).unwrap();
    assert_eq!(mv, Some(Move::new(1, 1)));
}

#[test]
fn completing_own_line_beats_blocking() {
    for (ai, board) in [
        (Side::X, "...../...../XX.OO/...../....."),
        (Side::O, "...../...../OO.XX/...../....."),
    ] {
        let grid: Grid = board.parse().unwrap();
        for style in Playstyle::ALL {
            let mut rng = StdRng::seed_from_u64(3);
            let mv = choose_move(&grid, 5, style, ai, ai.opponent(), &mut rng).unwrap();
            assert_eq!(mv, Some(Move::new(2, 2)));
        }
    }
}
