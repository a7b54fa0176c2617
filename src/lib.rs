// Code lints

#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![warn(unreachable_pub)]
#![warn(unused_import_braces)]
#![warn(unused_lifetimes)]
#![warn(unused_qualifications)]

// Doc lints

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_codeblock_attributes)]

//! This crate implements an engine for solving Killer Sudoku. It supports
//! the following key features:
//!
//! * Modeling 9x9 Killer Sudoku boards, that is, ordinary Sudoku grids
//! augmented with *cages*, groups of cells annotated with a target sum in
//! which no digit may repeat
//! * Checking validity of boards incrementally (per cell) and globally
//! * Solving boards with a plain backtracking search or with a
//! forward-checking search offering MRV variable ordering, LCV value
//! ordering, and cage-driven domain pruning
//! * Advancing either search one decision at a time through a stepping
//! driver, for visualization or cooperative scheduling
//! * Reading puzzle collections in the binary `KSF1` bundle format
//!
//! # Modeling boards
//!
//! A [Board] starts out empty. Cages are attached as one list which must not
//! contain two cages sharing a cell, and cell values are read and written
//! through positions. Validity can be queried for the whole board or for the
//! houses and cage touched by a single cell.
//!
//! ```
//! use killer_sudoku::{Board, Position};
//! use killer_sudoku::cage::Cage;
//!
//! let mut board = Board::new();
//! let cage =
//!     Cage::new(10, vec![Position::new(0, 0), Position::new(0, 1)]).unwrap();
//! board.set_cages(vec![cage]).unwrap();
//!
//! board.set_cell(Position::new(0, 0), 4).unwrap();
//! assert!(!board.is_invalid());
//!
//! // A repeated digit violates both the row and the cage.
//! board.set_cell(Position::new(0, 1), 4).unwrap();
//! assert!(board.is_invalid());
//! assert!(board.is_invalid_cell(Position::new(0, 1)).unwrap());
//! ```
//!
//! # Solving boards
//!
//! Solvers implement the [Strategy](solver::Strategy) trait and mutate the
//! board they were created for in place. On success the grid holds the
//! solution; on failure all cells that were empty before the search are
//! empty again.
//!
//! ```
//! use killer_sudoku::{Board, Position};
//! use killer_sudoku::cage::Cage;
//! use killer_sudoku::solver::{ForwardStrategy, Strategy};
//!
//! let mut board = Board::new();
//! let cage = Cage::new(6, vec![Position::new(0, 0)]).unwrap();
//! board.set_cages(vec![cage]).unwrap();
//!
//! let mut strategy = ForwardStrategy::new(&mut board, true, true);
//! assert!(strategy.solve().unwrap());
//!
//! // A cage of one cell fixes that cell to its sum.
//! assert_eq!(6, board.get_cell(Position::new(0, 0)).unwrap());
//! ```
//!
//! # Stepping
//!
//! The stepping strategies expose the same searches as explicit state
//! machines which advance by at most one decision per call, so an external
//! driver controls the pacing.
//!
//! ```
//! use killer_sudoku::Board;
//! use killer_sudoku::solver::{
//!     StepResult,
//!     SteppingBacktrackStrategy,
//!     SteppingStrategy
//! };
//!
//! let mut board = Board::new();
//! let mut stepper = SteppingBacktrackStrategy::new(&mut board);
//!
//! loop {
//!     match stepper.step().unwrap() {
//!         StepResult::More => continue,
//!         StepResult::Success => break,
//!         StepResult::Fail => unreachable!("an empty board is solvable")
//!     }
//! }
//! ```
//!
//! # Note regarding performance
//!
//! The searches are exponential in the worst case. For non-trivial puzzles
//! it is strongly recommended to build with at least `opt-level = 2`, even
//! in tests, and to prefer the forward-checking strategy with MRV enabled.

pub mod bundle;
pub mod cage;
pub mod domain;
pub mod error;
pub mod solver;

#[cfg(test)]
mod fix_tests;


use crate::cage::Cage;
use crate::domain::CellDomain;
use crate::error::{SudokuError, SudokuResult};

use serde::{Deserialize, Serialize};

use std::convert::TryFrom;
use std::fmt::{self, Display, Formatter};

/// The number of cells along one side of the grid, which is also the number
/// of rows, columns, and boxes.
pub const BOARD_SIZE: usize = 9;

/// The number of cells along one side of a box.
pub const BOX_SIZE: usize = 3;

/// The cell value that denotes an empty cell.
pub const CELL_EMPTY: u8 = 0;

/// The smallest value an assigned cell can hold.
pub const CELL_MIN: u8 = 1;

/// The largest value an assigned cell can hold.
pub const CELL_MAX: u8 = 9;

/// The coordinates of one cell on a [Board], in the form of a row and a
/// column index, both counted from zero starting at the top-left corner.
///
/// Constructing a position does not validate the coordinates; board
/// operations reject positions outside the grid with
/// [SudokuError::OutOfRange]. Deserialization, however, only accepts
/// positions within the grid.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(into = "(usize, usize)")]
#[serde(try_from = "(usize, usize)")]
pub struct Position {

    /// The row index of the cell, in the range `[0, 8]` for valid positions.
    pub row: usize,

    /// The column index of the cell, in the range `[0, 8]` for valid
    /// positions.
    pub col: usize
}

impl Position {

    /// Creates a new position with the given row and column indices.
    pub fn new(row: usize, col: usize) -> Position {
        Position {
            row,
            col
        }
    }

    /// Gets the canonical flat offset of this position, that is,
    /// `row * 9 + col`.
    pub fn offset(&self) -> usize {
        self.row * BOARD_SIZE + self.col
    }

    /// Gets the index of the 3x3 box containing this position. Boxes are
    /// numbered row-major, i.e. box 0 covers the top-left 3x3 cells and box
    /// 8 the bottom-right ones.
    pub fn box_index(&self) -> usize {
        (self.row / BOX_SIZE) * BOX_SIZE + self.col / BOX_SIZE
    }
}

impl TryFrom<(usize, usize)> for Position {
    type Error = SudokuError;

    fn try_from((row, col): (usize, usize)) -> SudokuResult<Position> {
        if row >= BOARD_SIZE || col >= BOARD_SIZE {
            Err(SudokuError::OutOfRange)
        }
        else {
            Ok(Position::new(row, col))
        }
    }
}

impl From<Position> for (usize, usize) {
    fn from(pos: Position) -> (usize, usize) {
        (pos.row, pos.col)
    }
}

const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

/// The positions of the cells of one row, column, or box.
pub type House = [Position; BOARD_SIZE];

/// A Killer Sudoku board. It owns the 9x9 grid of cell values, the list of
/// [Cage]s, and precomputed membership tables for all rows, columns, and
/// boxes as well as a per-cell cage lookup.
///
/// The board does not enforce its constraints on writes; it is perfectly
/// legal to build an invalid configuration. Instead, [Board::is_invalid] and
/// [Board::is_invalid_cell] report whether the current values violate a
/// Latin-square or cage constraint, which is what the solvers query after
/// every tentative assignment.
#[derive(Clone)]
pub struct Board {
    values: [u8; CELL_COUNT],
    cages: Vec<Cage>,
    cell_cage: [Option<usize>; CELL_COUNT],
    rows: [House; BOARD_SIZE],
    cols: [House; BOARD_SIZE],
    boxes: [House; BOARD_SIZE]
}

fn check_position(pos: Position) -> SudokuResult<usize> {
    if pos.row >= BOARD_SIZE || pos.col >= BOARD_SIZE {
        Err(SudokuError::OutOfRange)
    }
    else {
        Ok(pos.offset())
    }
}

fn check_house_index(index: usize) -> SudokuResult<usize> {
    if index >= BOARD_SIZE {
        Err(SudokuError::OutOfRange)
    }
    else {
        Ok(index)
    }
}

impl Board {

    /// Creates a new board with all cells empty and no cages attached.
    pub fn new() -> Board {
        let mut rows = [[Position::new(0, 0); BOARD_SIZE]; BOARD_SIZE];
        let mut cols = [[Position::new(0, 0); BOARD_SIZE]; BOARD_SIZE];
        let mut boxes = [[Position::new(0, 0); BOARD_SIZE]; BOARD_SIZE];

        for index in 0..BOARD_SIZE {
            let box_row = (index / BOX_SIZE) * BOX_SIZE;
            let box_col = (index % BOX_SIZE) * BOX_SIZE;

            for cell in 0..BOARD_SIZE {
                rows[index][cell] = Position::new(index, cell);
                cols[index][cell] = Position::new(cell, index);
                boxes[index][cell] = Position::new(
                    box_row + cell / BOX_SIZE, box_col + cell % BOX_SIZE);
            }
        }

        Board {
            values: [CELL_EMPTY; CELL_COUNT],
            cages: Vec::new(),
            cell_cage: [None; CELL_COUNT],
            rows,
            cols,
            boxes
        }
    }

    /// Attaches the given cage list to this board, replacing any previously
    /// attached cages and fully recomputing the per-cell cage lookup. The
    /// cages must not overlap, i.e. no two cages may contain the same cell.
    ///
    /// # Errors
    ///
    /// If two cages share a cell. In that case,
    /// `SudokuError::OverlappingCages` is returned and the board is left
    /// unchanged.
    pub fn set_cages(&mut self, cages: Vec<Cage>) -> SudokuResult<()> {
        let mut cell_cage = [None; CELL_COUNT];

        for (index, cage) in cages.iter().enumerate() {
            for pos in cage.cells() {
                let offset = pos.offset();

                if cell_cage[offset].is_some() {
                    return Err(SudokuError::OverlappingCages);
                }

                cell_cage[offset] = Some(index);
            }
        }

        self.cages = cages;
        self.cell_cage = cell_cage;
        Ok(())
    }

    /// Gets the cages attached to this board, in the order they were
    /// provided to [Board::set_cages].
    pub fn cages(&self) -> &[Cage] {
        &self.cages
    }

    /// Gets the cage containing the cell at the specified position, or
    /// `None` if the cell is not covered by any cage.
    ///
    /// # Errors
    ///
    /// If `pos` lies outside the grid. In that case,
    /// `SudokuError::OutOfRange` is returned.
    pub fn cage_at(&self, pos: Position) -> SudokuResult<Option<&Cage>> {
        let offset = check_position(pos)?;
        Ok(self.cell_cage[offset].map(|index| &self.cages[index]))
    }

    /// Gets the value of the cell at the specified position. [CELL_EMPTY]
    /// (i.e. 0) denotes an empty cell.
    ///
    /// # Errors
    ///
    /// If `pos` lies outside the grid. In that case,
    /// `SudokuError::OutOfRange` is returned.
    pub fn get_cell(&self, pos: Position) -> SudokuResult<u8> {
        let offset = check_position(pos)?;
        Ok(self.values[offset])
    }

    /// Sets the value of the cell at the specified position. If the cell was
    /// not empty, the old value is overwritten.
    ///
    /// # Errors
    ///
    /// * `SudokuError::OutOfRange` if `pos` lies outside the grid.
    /// * `SudokuError::InvalidValue` if `value` is not in the range
    /// `[1, 9]`.
    pub fn set_cell(&mut self, pos: Position, value: u8) -> SudokuResult<()> {
        let offset = check_position(pos)?;

        if value < CELL_MIN || value > CELL_MAX {
            return Err(SudokuError::InvalidValue);
        }

        self.values[offset] = value;
        Ok(())
    }

    /// Clears the cell at the specified position, that is, sets its value to
    /// [CELL_EMPTY]. If the cell is already empty, it is left that way.
    ///
    /// # Errors
    ///
    /// If `pos` lies outside the grid. In that case,
    /// `SudokuError::OutOfRange` is returned.
    pub fn clear_cell(&mut self, pos: Position) -> SudokuResult<()> {
        let offset = check_position(pos)?;
        self.values[offset] = CELL_EMPTY;
        Ok(())
    }

    /// Gets the positions of all cells in the row with the given index, from
    /// left to right.
    ///
    /// # Errors
    ///
    /// If `index` is greater than 8. In that case,
    /// `SudokuError::OutOfRange` is returned.
    pub fn row_positions(&self, index: usize) -> SudokuResult<&House> {
        Ok(&self.rows[check_house_index(index)?])
    }

    /// Gets the positions of all cells in the column with the given index,
    /// from top to bottom.
    ///
    /// # Errors
    ///
    /// If `index` is greater than 8. In that case,
    /// `SudokuError::OutOfRange` is returned.
    pub fn col_positions(&self, index: usize) -> SudokuResult<&House> {
        Ok(&self.cols[check_house_index(index)?])
    }

    /// Gets the positions of all cells in the 3x3 box with the given index
    /// (see [Position::box_index] for the numbering), row-major within the
    /// box.
    ///
    /// # Errors
    ///
    /// If `index` is greater than 8. In that case,
    /// `SudokuError::OutOfRange` is returned.
    pub fn box_positions(&self, index: usize) -> SudokuResult<&House> {
        Ok(&self.boxes[check_house_index(index)?])
    }

    fn house_has_duplicate(&self, house: &House) -> bool {
        let mut seen = CellDomain::new();

        for pos in house {
            let value = self.values[pos.offset()];

            if value != CELL_EMPTY && !seen.insert(value).unwrap() {
                return true;
            }
        }

        false
    }

    fn cage_is_invalid(&self, index: usize) -> bool {
        cage::is_invalid(&self.cages[index], self)
    }

    /// Indicates whether any row, column, box, or cage of this board is
    /// currently invalid. A row, column, or box is invalid if it contains a
    /// repeated non-empty value. A cage is invalid if it contains a repeated
    /// non-empty value, if the sum of its filled cells already exceeds its
    /// target, if it is completely filled with a sum different from its
    /// target, or if the remaining sum cannot be distributed over its empty
    /// cells.
    pub fn is_invalid(&self) -> bool {
        for index in 0..BOARD_SIZE {
            if self.house_has_duplicate(&self.rows[index])
                    || self.house_has_duplicate(&self.cols[index])
                    || self.house_has_duplicate(&self.boxes[index]) {
                return true;
            }
        }

        (0..self.cages.len()).any(|index| self.cage_is_invalid(index))
    }

    /// Indicates whether the row, column, box, or cage touched by the cell
    /// at the specified position is currently invalid, under the same
    /// criteria as [Board::is_invalid]. This is the check the solvers run
    /// after every tentative assignment.
    ///
    /// # Errors
    ///
    /// If `pos` lies outside the grid. In that case,
    /// `SudokuError::OutOfRange` is returned.
    pub fn is_invalid_cell(&self, pos: Position) -> SudokuResult<bool> {
        let offset = check_position(pos)?;

        if self.house_has_duplicate(&self.rows[pos.row])
                || self.house_has_duplicate(&self.cols[pos.col])
                || self.house_has_duplicate(&self.boxes[pos.box_index()]) {
            return Ok(true);
        }

        if let Some(cage_index) = self.cell_cage[offset] {
            return Ok(self.cage_is_invalid(cage_index));
        }

        Ok(false)
    }

    /// Indicates whether any cell of this board is empty.
    pub fn is_incomplete(&self) -> bool {
        self.values.iter().any(|&value| value == CELL_EMPTY)
    }

    /// Gets the values of all cells in row-major order, i.e. the cell at
    /// position `pos` is found at index [Position::offset]. Empty cells hold
    /// [CELL_EMPTY].
    pub fn cells(&self) -> &[u8] {
        &self.values
    }
}

fn frame_line() -> &'static str {
    "+-------+-------+-------+"
}

fn separator_line() -> &'static str {
    "|-------|-------|-------|"
}

fn content_line(board: &Board, row: usize) -> String {
    let mut line = String::from("|");

    for col in 0..BOARD_SIZE {
        let value = board.values[Position::new(row, col).offset()];

        line.push(' ');

        if value == CELL_EMPTY {
            line.push(' ');
        }
        else {
            line.push((b'0' + value) as char);
        }

        if col % BOX_SIZE == BOX_SIZE - 1 {
            line.push_str(" |");
        }
    }

    line
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", frame_line())?;

        for row in 0..BOARD_SIZE {
            if row > 0 && row % BOX_SIZE == 0 {
                writeln!(f, "{}", separator_line())?;
            }

            writeln!(f, "{}", content_line(self, row))?;
        }

        write!(f, "{}", frame_line())
    }
}
