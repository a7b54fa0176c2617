//! This module contains the plain backtracking strategy.

use crate::{Board, Position, BOARD_SIZE, CELL_EMPTY, CELL_MAX, CELL_MIN};
use crate::error::SudokuResult;
use crate::solver::{next_position, StepCounter, Strategy};

/// A [Strategy] which performs a position-ordered depth-first search: cells
/// are visited row-major, every value from 1 to 9 is tried in every empty
/// cell, and a tentative assignment is kept if the row, column, box, and
/// cage touched by it remain valid. This is a perfect solver in the sense
/// that it finds a solution whenever one exists, but its worst-case runtime
/// is exponential.
///
/// # Example
///
/// ```
/// use killer_sudoku::{Board, Position};
/// use killer_sudoku::cage::Cage;
/// use killer_sudoku::solver::{BacktrackStrategy, Strategy};
///
/// let mut board = Board::new();
/// board.set_cages(vec![
///     Cage::new(3, vec![Position::new(0, 0)]).unwrap()
/// ]).unwrap();
///
/// let mut strategy = BacktrackStrategy::new(&mut board);
/// assert!(strategy.solve().unwrap());
/// assert!(strategy.step_count() > 0);
/// ```
pub struct BacktrackStrategy<'a> {
    board: &'a mut Board,
    counter: StepCounter
}

impl<'a> BacktrackStrategy<'a> {

    /// Creates a new backtracking strategy for the given board, without a
    /// step limit.
    pub fn new(board: &'a mut Board) -> BacktrackStrategy<'a> {
        BacktrackStrategy {
            board,
            counter: StepCounter::unlimited()
        }
    }

    /// Creates a new backtracking strategy for the given board which fails
    /// with [SudokuError](crate::error::SudokuError)`::TooHard` as soon as
    /// its step count exceeds `step_limit`.
    pub fn with_step_limit(board: &'a mut Board, step_limit: usize)
            -> BacktrackStrategy<'a> {
        BacktrackStrategy {
            board,
            counter: StepCounter::new(step_limit)
        }
    }

    fn expand(&mut self, pos: Position) -> SudokuResult<bool> {
        if pos.row == BOARD_SIZE {
            return Ok(true);
        }

        self.counter.tick()?;

        let next = next_position(pos);

        // Givens are skipped without trying candidates.
        if self.board.get_cell(pos).unwrap() != CELL_EMPTY {
            return self.expand(next);
        }

        for value in CELL_MIN..=CELL_MAX {
            self.board.set_cell(pos, value).unwrap();

            if self.board.is_invalid_cell(pos).unwrap() {
                continue;
            }

            if self.expand(next)? {
                return Ok(true);
            }
        }

        self.board.clear_cell(pos).unwrap();
        Ok(false)
    }
}

impl Strategy for BacktrackStrategy<'_> {
    fn solve(&mut self) -> SudokuResult<bool> {
        self.expand(Position::new(0, 0))
    }

    fn step_count(&self) -> usize {
        self.counter.count()
    }
}
