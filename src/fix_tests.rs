//! Crate-level end-to-end tests on fixed puzzles, plus the shared fixtures
//! used by the per-module tests.

use crate::{Board, Position, BOARD_SIZE, CELL_EMPTY};
use crate::cage::{self, Cage};
use crate::domain::CellDomain;
use crate::error::SudokuError;
use crate::solver::{
    BacktrackStrategy,
    ForwardStrategy,
    StepResult,
    SteppingBacktrackStrategy,
    SteppingForwardStrategy,
    SteppingStrategy,
    Strategy
};

/// The givens of a classic Sudoku, taken from the World Puzzle Federation
/// Sudoku Grand Prix (2020 round 8, puzzle 2). Zero denotes an empty cell.
pub(crate) const CLASSIC_GIVENS: [[u8; 9]; 9] = [
    [0, 0, 0, 0, 8, 1, 0, 0, 0],
    [0, 0, 2, 0, 0, 7, 8, 0, 0],
    [0, 5, 3, 0, 0, 0, 1, 7, 0],
    [3, 7, 0, 0, 0, 0, 0, 0, 0],
    [6, 0, 0, 0, 0, 0, 0, 0, 3],
    [0, 0, 0, 0, 0, 0, 0, 2, 4],
    [0, 6, 9, 0, 0, 0, 2, 3, 0],
    [0, 0, 5, 9, 0, 0, 4, 0, 0],
    [0, 0, 0, 6, 5, 0, 0, 0, 0]
];

/// The unique solution of [CLASSIC_GIVENS].
pub(crate) const CLASSIC_SOLUTION: [[u8; 9]; 9] = [
    [7, 4, 6, 2, 8, 1, 3, 5, 9],
    [9, 1, 2, 5, 3, 7, 8, 4, 6],
    [8, 5, 3, 4, 9, 6, 1, 7, 2],
    [3, 7, 4, 1, 2, 5, 6, 9, 8],
    [6, 2, 8, 7, 4, 9, 5, 1, 3],
    [5, 9, 1, 3, 6, 8, 7, 2, 4],
    [1, 6, 9, 8, 7, 4, 2, 3, 5],
    [2, 8, 5, 9, 1, 3, 4, 6, 7],
    [4, 3, 7, 6, 5, 2, 9, 8, 1]
];

/// Creates a board whose cells hold the given values, with zero denoting an
/// empty cell. No cages are attached.
pub(crate) fn board_with_givens(rows: [[u8; 9]; 9]) -> Board {
    let mut board = Board::new();

    for (row, values) in rows.iter().enumerate() {
        for (col, &value) in values.iter().enumerate() {
            if value != CELL_EMPTY {
                board.set_cell(Position::new(row, col), value).unwrap();
            }
        }
    }

    board
}

/// Asserts that the given board is completely filled and satisfies all
/// constraints: every row, column, and box contains the digits 1 to 9
/// exactly once, and every cage holds distinct values summing to its
/// target.
pub(crate) fn assert_solved(board: &Board) {
    assert!(!board.is_incomplete(), "solved board has empty cells");
    assert!(!board.is_invalid(), "solved board violates a constraint");

    let house = |positions: &[Position]| {
        let mut values = CellDomain::new();

        for &pos in positions {
            values.insert(board.get_cell(pos).unwrap()).unwrap();
        }

        assert_eq!(9, values.len(), "house misses a digit");
    };

    for index in 0..BOARD_SIZE {
        house(board.row_positions(index).unwrap());
        house(board.col_positions(index).unwrap());
        house(board.box_positions(index).unwrap());
    }

    for killer_cage in board.cages() {
        let mut values = CellDomain::new();
        let mut sum = 0;

        for &pos in killer_cage.cells() {
            let value = board.get_cell(pos).unwrap();
            assert!(values.insert(value).unwrap(), "cage repeats a digit");
            sum += u32::from(value);
        }

        assert_eq!(killer_cage.sum(), sum, "cage sum mismatch");
    }
}

fn killer_cage(sum: u32, cells: &[(usize, usize)]) -> Cage {
    let cells = cells.iter()
        .map(|&(row, col)| Position::new(row, col))
        .collect();
    Cage::new(sum, cells).unwrap()
}

/// The cage layout of a classic Killer Sudoku: 33 cages partitioning most
/// of the grid, no givens.
pub(crate) fn classic_killer_cages() -> Vec<Cage> {
    vec![
        killer_cage(6, &[(5, 1)]),
        killer_cage(7, &[(8, 4)]),
        killer_cage(13, &[(0, 0), (1, 0)]),
        killer_cage(14, &[(2, 0), (2, 1)]),
        killer_cage(3, &[(0, 1), (1, 1)]),
        killer_cage(4, &[(3, 0), (3, 1)]),
        killer_cage(14, &[(4, 0), (4, 1)]),
        killer_cage(15, &[(5, 0), (6, 0)]),
        killer_cage(5, &[(7, 0), (8, 0)]),
        killer_cage(8, &[(3, 2), (3, 3)]),
        killer_cage(15, &[(4, 2), (4, 3)]),
        killer_cage(10, &[(6, 2), (6, 3)]),
        killer_cage(4, &[(1, 3), (2, 3)]),
        killer_cage(16, &[(2, 4), (2, 5)]),
        killer_cage(13, &[(3, 4), (3, 5)]),
        killer_cage(7, &[(6, 4), (7, 4)]),
        killer_cage(7, &[(6, 5), (7, 5)]),
        killer_cage(9, &[(0, 8), (1, 8)]),
        killer_cage(10, &[(6, 7), (7, 7)]),
        killer_cage(6, &[(6, 8), (7, 8)]),
        killer_cage(17, &[(8, 7), (8, 8)]),
        killer_cage(15, &[(0, 2), (1, 2), (2, 2)]),
        killer_cage(18, &[(8, 2), (7, 3), (8, 3)]),
        killer_cage(15, &[(4, 5), (5, 5), (4, 6)]),
        killer_cage(12, &[(2, 6), (2, 7), (1, 7)]),
        killer_cage(14, &[(3, 6), (3, 7), (4, 7)]),
        killer_cage(16, &[(5, 6), (5, 7), (5, 8)]),
        killer_cage(18, &[(2, 8), (3, 8), (4, 8)]),
        killer_cage(25, &[(6, 1), (7, 1), (8, 1), (7, 2)]),
        killer_cage(10, &[(5, 2), (5, 3), (5, 4), (4, 4)]),
        killer_cage(17, &[(0, 3), (0, 4), (1, 4), (1, 5)]),
        killer_cage(15, &[(8, 5), (8, 6), (7, 6), (6, 6)]),
        killer_cage(27, &[(0, 5), (0, 6), (0, 7), (1, 6)])
    ]
}

fn classic_killer_board() -> Board {
    let mut board = Board::new();
    board.set_cages(classic_killer_cages()).unwrap();
    board
}

/// A small unsolvable configuration: both cages lie in row 0 and can only
/// be filled as `{1, 2}` and `{1, 3}`, so they compete for the 1.
fn contradictory_cages_board() -> Board {
    let mut board = Board::new();
    board.set_cages(vec![
        killer_cage(3, &[(0, 0), (0, 1)]),
        killer_cage(4, &[(0, 2), (0, 3)])
    ]).unwrap();
    board
}

#[test]
fn singleton_cage_fixes_its_cell() {
    let mut board = Board::new();
    board.set_cages(vec![killer_cage(6, &[(0, 0)])]).unwrap();

    let mut strategy = BacktrackStrategy::new(&mut board);

    assert!(strategy.solve().unwrap());
    drop(strategy);

    assert_eq!(6, board.get_cell(Position::new(0, 0)).unwrap());
    assert_solved(&board);
}

#[test]
fn forward_solves_classic_killer() {
    let mut board = classic_killer_board();
    let mut strategy = ForwardStrategy::new(&mut board, true, true);

    assert!(strategy.solve().unwrap());
    assert!(strategy.step_count() > 0);
    drop(strategy);

    assert_solved(&board);
}

#[test]
fn backtracking_solves_classic_killer() {
    let mut board = classic_killer_board();
    let mut strategy = BacktrackStrategy::new(&mut board);

    assert!(strategy.solve().unwrap());
    drop(strategy);

    assert_solved(&board);
}

#[test]
fn backtrack_and_forward_find_the_same_grid() {
    // Forward checking only removes candidates that admit no solution, so
    // with identical orderings both searches reach the same first solution.
    let mut backtrack_board = classic_killer_board();
    let mut backtrack = BacktrackStrategy::new(&mut backtrack_board);
    assert!(backtrack.solve().unwrap());
    drop(backtrack);

    let mut forward_board = classic_killer_board();
    let mut forward = ForwardStrategy::new(&mut forward_board, false, false);
    assert!(forward.solve().unwrap());
    drop(forward);

    assert_eq!(backtrack_board.cells(), forward_board.cells());
}

#[test]
fn forward_without_lcv_solves_classic_killer() {
    let mut board = classic_killer_board();
    let mut strategy = ForwardStrategy::new(&mut board, true, false);

    assert!(strategy.solve().unwrap());
    drop(strategy);

    assert_solved(&board);
}

#[test]
fn classic_killer_satisfies_its_cages() {
    let mut board = classic_killer_board();
    let mut strategy = ForwardStrategy::new(&mut board, true, true);

    assert!(strategy.solve().unwrap());
    drop(strategy);

    for killer_cage in board.cages() {
        assert!(!cage::is_invalid(killer_cage, &board));
    }
}

#[test]
fn unsatisfiable_cage_sum_fails() {
    let mut board = Board::new();
    board.set_cages(vec![killer_cage(1, &[(0, 0), (0, 1)])]).unwrap();

    let mut strategy = BacktrackStrategy::new(&mut board);

    assert!(!strategy.solve().unwrap());
    assert!(strategy.step_count() > 0);
    drop(strategy);

    assert!(board.cells().iter().all(|&value| value == CELL_EMPTY));
}

#[test]
fn strategies_agree_on_unsolvable_board() {
    let mut backtrack_board = contradictory_cages_board();
    let mut backtrack = BacktrackStrategy::new(&mut backtrack_board);
    assert!(!backtrack.solve().unwrap());

    for (mrv, lcv) in [(false, false), (true, false), (true, true)] {
        let mut forward_board = contradictory_cages_board();
        let mut forward = ForwardStrategy::new(&mut forward_board, mrv, lcv);
        assert!(!forward.solve().unwrap());
    }

    let mut stepping_board = contradictory_cages_board();
    let mut stepping =
        SteppingForwardStrategy::new(&mut stepping_board, true, true);
    assert!(!stepping.solve().unwrap());
}

#[test]
fn step_limit_fails_with_too_hard() {
    // The contradiction sits in the last row, so the search runs deep
    // before every branch dies.
    let mut board = Board::new();
    board.set_cages(vec![killer_cage(1, &[(8, 7), (8, 8)])]).unwrap();

    let mut strategy = BacktrackStrategy::with_step_limit(&mut board, 100);

    assert_eq!(Err(SudokuError::TooHard), strategy.solve());
    assert!(strategy.step_count() > 100);
}

#[test]
fn stepping_step_limit_fails_with_too_hard() {
    let mut board = Board::new();
    board.set_cages(vec![killer_cage(1, &[(8, 7), (8, 8)])]).unwrap();

    let mut stepper =
        SteppingBacktrackStrategy::with_step_limit(&mut board, 100);

    assert_eq!(Err(SudokuError::TooHard), stepper.solve());
    assert!(stepper.step_count() > 100);
}

#[test]
fn forward_step_limit_fails_with_too_hard() {
    let mut board = Board::new();
    board.set_cages(vec![killer_cage(1, &[(8, 7), (8, 8)])]).unwrap();

    let mut strategy =
        ForwardStrategy::with_step_limit(&mut board, 100, false, false);

    assert_eq!(Err(SudokuError::TooHard), strategy.solve());
    assert!(strategy.step_count() > 100);
}

#[test]
fn stepper_matches_recursive_forward_on_classic_killer() {
    let mut recursive_board = classic_killer_board();
    let mut recursive =
        ForwardStrategy::new(&mut recursive_board, true, true);
    let recursive_result = recursive.solve().unwrap();
    drop(recursive);

    let mut stepping_board = classic_killer_board();
    let mut stepper =
        SteppingForwardStrategy::new(&mut stepping_board, true, true);

    let stepping_result = loop {
        match stepper.step().unwrap() {
            StepResult::More => continue,
            StepResult::Success => break true,
            StepResult::Fail => break false
        }
    };
    drop(stepper);

    assert_eq!(recursive_result, stepping_result);
    assert!(stepping_result);
    assert_eq!(recursive_board.cells(), stepping_board.cells());
}

#[test]
fn stepper_matches_recursive_backtrack_on_classic_sudoku() {
    let mut recursive_board = board_with_givens(CLASSIC_GIVENS);
    let mut recursive = BacktrackStrategy::new(&mut recursive_board);
    assert!(recursive.solve().unwrap());
    drop(recursive);

    let mut stepping_board = board_with_givens(CLASSIC_GIVENS);
    let mut stepper = SteppingBacktrackStrategy::new(&mut stepping_board);
    assert!(stepper.solve().unwrap());
    drop(stepper);

    assert_eq!(recursive_board.cells(), stepping_board.cells());
}

#[test]
fn top_level_solve_delegates_to_strategy() {
    let mut board = board_with_givens(CLASSIC_GIVENS);
    let mut strategy = ForwardStrategy::new(&mut board, true, true);

    assert!(crate::solver::solve(&mut strategy).unwrap());
    drop(strategy);

    let expected = board_with_givens(CLASSIC_SOLUTION);
    assert_eq!(expected.cells(), board.cells());
}

#[test]
fn solving_does_not_disturb_cage_free_cells_on_failure() {
    // A board whose givens already violate a constraint is reported as
    // unsolvable without permanently mutating the other cells. The
    // duplicate sits in row 0, where every branch of the search dies.
    let mut board = Board::new();
    board.set_cell(Position::new(0, 2), 8).unwrap();
    board.set_cell(Position::new(0, 6), 8).unwrap();

    let before = board.cells().to_vec();

    let mut strategy = ForwardStrategy::new(&mut board, false, false);
    assert!(!strategy.solve().unwrap());
    drop(strategy);

    assert_eq!(before, board.cells());
}
