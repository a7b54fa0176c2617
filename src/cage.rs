//! This module contains the definition of the [Cage] record as well as the
//! pure cage logic used by the board's invariant checks and by the
//! forward-checking solver: the validity predicate and the feasible-value
//! computation for the empty cells of a cage.

use crate::{Board, Position, CELL_EMPTY, CELL_MAX, CELL_MIN, BOARD_SIZE};
use crate::domain::CellDomain;
use crate::error::{SudokuError, SudokuResult};

use serde::{Deserialize, Serialize};

use std::collections::HashSet;
use std::convert::TryFrom;

fn contains_duplicate(cells: &[Position]) -> bool {
    let mut seen = HashSet::new();
    cells.iter().any(|cell| !seen.insert(*cell))
}

/// A single cage of a Killer Sudoku board, which groups some cells and
/// annotates the sum of the digits in these cells. Additionally, digits may
/// not repeat within a cage.
///
/// Cages are immutable once created. A board rejects cage lists in which two
/// cages share a cell; cells not covered by any cage simply carry no sum
/// constraint.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(into = "(u32, Vec<Position>)")]
#[serde(try_from = "(u32, Vec<Position>)")]
pub struct Cage {
    cells: Vec<Position>,
    sum: u32
}

impl Cage {

    /// Creates a new cage with the given target sum and cells.
    ///
    /// # Arguments
    ///
    /// * `sum`: The annotated target sum of the cage.
    /// * `cells`: The positions of the cells contained in this cage. May not
    /// be empty, contain duplicates, or address cells outside the grid.
    ///
    /// # Errors
    ///
    /// * `SudokuError::EmptyCage` if `cells` is empty.
    /// * `SudokuError::DuplicateCells` if `cells` contains the same position
    /// more than once.
    /// * `SudokuError::OutOfRange` if any position lies outside the grid.
    pub fn new(sum: u32, cells: Vec<Position>) -> SudokuResult<Cage> {
        if cells.is_empty() {
            return Err(SudokuError::EmptyCage);
        }

        if contains_duplicate(&cells) {
            return Err(SudokuError::DuplicateCells);
        }

        if cells.iter()
                .any(|c| c.row >= BOARD_SIZE || c.col >= BOARD_SIZE) {
            return Err(SudokuError::OutOfRange);
        }

        Ok(Cage {
            cells,
            sum
        })
    }

    /// Gets the positions of the cells contained in this cage.
    pub fn cells(&self) -> &[Position] {
        &self.cells
    }

    /// Gets the annotated target sum of this cage.
    pub fn sum(&self) -> u32 {
        self.sum
    }
}

impl TryFrom<(u32, Vec<Position>)> for Cage {
    type Error = SudokuError;

    fn try_from((sum, cells): (u32, Vec<Position>)) -> SudokuResult<Cage> {
        Cage::new(sum, cells)
    }
}

impl From<Cage> for (u32, Vec<Position>) {
    fn from(cage: Cage) -> (u32, Vec<Position>) {
        (cage.sum, cage.cells)
    }
}

/// Returns the sum of all filled cells and the number of empty cells in the
/// cage, under the current values of the given board.
///
/// # Errors
///
/// If any cage position lies outside the grid, which cannot happen for
/// cages created through [Cage::new]. In that case,
/// `SudokuError::OutOfRange` is returned.
pub fn evaluate(cage: &Cage, board: &Board) -> SudokuResult<(u32, usize)> {
    let mut sum = 0;
    let mut empty = 0;

    for &pos in cage.cells() {
        let value = board.get_cell(pos)?;

        if value == CELL_EMPTY {
            empty += 1;
        }
        else {
            sum += u32::from(value);
        }
    }

    Ok((sum, empty))
}

fn contains_duplicate_value(cage: &Cage, board: &Board) -> bool {
    let mut seen = CellDomain::new();

    for &pos in cage.cells() {
        let value = board.get_cell(pos).unwrap();

        if value != CELL_EMPTY && !seen.insert(value).unwrap() {
            return true;
        }
    }

    false
}

/// Indicates whether the given cage is invalid under the current values of
/// the given board. A cage is invalid if it contains a repeated non-empty
/// value, if the sum of its filled cells exceeds its target, if all cells
/// are filled and the sum differs from the target, or if the remaining sum
/// cannot be realized by the empty cells, i.e. it is less than their count
/// or greater than nine times their count.
pub fn is_invalid(cage: &Cage, board: &Board) -> bool {
    if contains_duplicate_value(cage, board) {
        return true;
    }

    let (sum, empty) = evaluate(cage, board).unwrap();

    if sum > cage.sum() {
        return true;
    }

    if empty == 0 {
        return sum != cage.sum();
    }

    let remaining = (cage.sum() - sum) as usize;
    remaining < empty || remaining > usize::from(CELL_MAX) * empty
}

/// Computes the set of values that could still be placed in the empty cells
/// of the given cage under the current values of the given board.
///
/// With `k` empty cells and a remaining sum `R` (the target minus the sum of
/// the filled cells), a lone empty cell can only hold `R` itself, provided
/// that is a digit. Otherwise a value `v` is feasible if the rest `R - v` is
/// non-negative and can be distributed over the other `k - 1` empty cells,
/// i.e. lies between `k - 1` and `9 * (k - 1)`.
///
/// This is the only arithmetic pruning applied; it deliberately ignores that
/// cage values must also be distinct, which remains covered by duplicate
/// detection in the invariant checks.
pub fn feasible_values(cage: &Cage, board: &Board) -> CellDomain {
    let (sum, empty) = evaluate(cage, board).unwrap();
    let mut feasible = CellDomain::new();

    if empty == 0 {
        return feasible;
    }

    let remaining = i64::from(cage.sum()) - i64::from(sum);

    if empty == 1 {
        if remaining >= i64::from(CELL_MIN)
                && remaining <= i64::from(CELL_MAX) {
            feasible.insert(remaining as u8).unwrap();
        }

        return feasible;
    }

    let rest_cells = (empty - 1) as i64;

    for value in CELL_MIN..=CELL_MAX {
        let rest = remaining - i64::from(value);

        if rest >= 0 && rest >= rest_cells
                && rest <= i64::from(CELL_MAX) * rest_cells {
            feasible.insert(value).unwrap();
        }
    }

    feasible
}
