//! This module contains the forward-checking strategy as well as the shared
//! machinery (domain store initialization, forward check, candidate
//! building, MRV cell selection) that the stepping variant reuses.

use crate::{
    cage,
    Board,
    Position,
    BOARD_SIZE,
    CELL_COUNT,
    CELL_EMPTY,
    CELL_MAX,
    CELL_MIN
};
use crate::domain::CellDomain;
use crate::error::SudokuResult;
use crate::solver::{next_position, StepCounter, Strategy};

use std::mem;

/// One domain per cell, indexed by [Position::offset].
pub(crate) type DomainGrid = [CellDomain; CELL_COUNT];

/// The domain deltas produced by one forward-check pass for one candidate
/// value, stored as the complete domain grid that results from applying
/// them, together with the number of domain values the pass pruned across
/// all affected cells. The latter is the LCV sort key.
pub(crate) struct Refinement {
    pub(crate) domains: DomainGrid,
    pub(crate) pruned: usize
}

/// Builds the initial domain store for the given board: a singleton domain
/// for every given cell and the full domain for every empty cell. No
/// propagation is performed; domains refine only on actual assignments.
pub(crate) fn initial_domains(board: &Board) -> DomainGrid {
    let mut domains = [CellDomain::full(); CELL_COUNT];

    for row in 0..BOARD_SIZE {
        for col in 0..BOARD_SIZE {
            let pos = Position::new(row, col);
            let value = board.get_cell(pos).unwrap();

            if value != CELL_EMPTY {
                domains[pos.offset()] =
                    CellDomain::singleton(value).unwrap();
            }
        }
    }

    domains
}

fn refine_cell(domains: &mut DomainGrid, pruned: &mut usize, pos: Position,
        value: u8) -> bool {
    let domain = &mut domains[pos.offset()];

    if domain.remove(value).unwrap() {
        *pruned += 1;
    }

    !domain.is_empty()
}

/// Runs the forward check for assigning `value` at `pos`. The board must
/// already hold `value` in that cell, and `value` must be contained in the
/// cell's current domain.
///
/// The assigned cell's domain collapses to the singleton `{value}`. The
/// value is removed from the domain of every other cell in the same row,
/// column, or box. If the cell belongs to a cage, the domains of the cage's
/// other empty cells additionally intersect with the cage's feasible-value
/// set. If any domain becomes empty, the refinement is illegal and `None`
/// is returned; otherwise the resulting domain grid is returned together
/// with the number of pruned values.
pub(crate) fn forward_check(board: &Board, domains: &DomainGrid,
        pos: Position, value: u8) -> Option<Refinement> {
    let mut next = *domains;
    let mut pruned = next[pos.offset()].len() - 1;
    next[pos.offset()] = CellDomain::singleton(value).unwrap();

    for &other in board.row_positions(pos.row).unwrap() {
        if other != pos && !refine_cell(&mut next, &mut pruned, other, value) {
            return None;
        }
    }

    for &other in board.col_positions(pos.col).unwrap() {
        if other != pos && !refine_cell(&mut next, &mut pruned, other, value) {
            return None;
        }
    }

    for &other in board.box_positions(pos.box_index()).unwrap() {
        if other != pos && !refine_cell(&mut next, &mut pruned, other, value) {
            return None;
        }
    }

    if let Some(cage) = board.cage_at(pos).unwrap() {
        let feasible = cage::feasible_values(cage, board);

        for &other in cage.cells() {
            if other == pos
                    || board.get_cell(other).unwrap() != CELL_EMPTY {
                continue;
            }

            if !refine_cell(&mut next, &mut pruned, other, value) {
                return None;
            }

            let domain = &mut next[other.offset()];
            let before = domain.len();
            domain.intersect_assign(&feasible);
            pruned += before - domain.len();

            if domain.is_empty() {
                return None;
            }
        }
    }

    Some(Refinement {
        domains: next,
        pruned
    })
}

/// Builds the ordered candidate list for the empty cell at `pos`: every
/// value of the cell's domain that keeps the board valid and passes the
/// forward check, paired with its refinement. Candidates are in ascending
/// numeric order unless `lcv` is set, in which case they are sorted by the
/// number of pruned values, least-constraining first (the sort is stable,
/// so ties keep the numeric order).
pub(crate) fn build_candidates(board: &mut Board, domains: &DomainGrid,
        pos: Position, lcv: bool) -> Vec<(u8, Refinement)> {
    let mut candidates = Vec::new();

    for value in CELL_MIN..=CELL_MAX {
        if !domains[pos.offset()].contains(value) {
            continue;
        }

        board.set_cell(pos, value).unwrap();

        if !board.is_invalid_cell(pos).unwrap() {
            if let Some(refinement) = forward_check(board, domains, pos,
                    value) {
                candidates.push((value, refinement));
            }
        }

        board.clear_cell(pos).unwrap();
    }

    if lcv {
        candidates.sort_by_key(|(_, refinement)| refinement.pruned);
    }

    candidates
}

/// Finds the empty cell with the smallest current domain, ties broken by
/// row-major scan order. If the board has no empty cell, the returned
/// position has a row index of 9, which the strategies treat as the success
/// condition.
pub(crate) fn find_mrv_cell(board: &Board, domains: &DomainGrid) -> Position {
    let mut best = Position::new(BOARD_SIZE, 0);
    let mut best_len = usize::MAX;

    for row in 0..BOARD_SIZE {
        for col in 0..BOARD_SIZE {
            let pos = Position::new(row, col);

            if board.get_cell(pos).unwrap() != CELL_EMPTY {
                continue;
            }

            let len = domains[pos.offset()].len();

            if len < best_len {
                best = pos;
                best_len = len;
            }
        }
    }

    best
}

/// A [Strategy] which extends the backtracking search with a per-cell
/// candidate domain store and forward checking: after every tentative
/// assignment, the value is pruned from the domains of all cells sharing a
/// row, column, box, or cage with the assigned cell, and cage domains are
/// additionally narrowed to the cage's feasible values. A candidate whose
/// propagation empties any domain is rejected without recursion, and all
/// domain changes are rolled back exactly when a branch fails.
///
/// Two orderings can be enabled independently: MRV (minimum remaining
/// values) picks the empty cell with the smallest domain as the next
/// variable, and LCV (least constraining value) tries the candidate values
/// in order of how few domain values their propagation prunes.
///
/// # Example
///
/// ```
/// use killer_sudoku::{Board, Position};
/// use killer_sudoku::cage::Cage;
/// use killer_sudoku::solver::{ForwardStrategy, Strategy};
///
/// let mut board = Board::new();
/// board.set_cages(vec![
///     Cage::new(17, vec![Position::new(8, 7), Position::new(8, 8)])
///         .unwrap()
/// ]).unwrap();
///
/// let mut strategy = ForwardStrategy::new(&mut board, true, true);
/// assert!(strategy.solve().unwrap());
/// ```
pub struct ForwardStrategy<'a> {
    board: &'a mut Board,
    domains: DomainGrid,
    counter: StepCounter,
    mrv: bool,
    lcv: bool
}

impl<'a> ForwardStrategy<'a> {

    /// Creates a new forward-checking strategy for the given board, without
    /// a step limit. `mrv` enables minimum-remaining-values variable
    /// ordering and `lcv` enables least-constraining-value value ordering.
    pub fn new(board: &'a mut Board, mrv: bool, lcv: bool)
            -> ForwardStrategy<'a> {
        let domains = initial_domains(board);

        ForwardStrategy {
            board,
            domains,
            counter: StepCounter::unlimited(),
            mrv,
            lcv
        }
    }

    /// Creates a new forward-checking strategy for the given board which
    /// fails with [SudokuError](crate::error::SudokuError)`::TooHard` as
    /// soon as its step count exceeds `step_limit`. `mrv` and `lcv` behave
    /// as in [ForwardStrategy::new].
    pub fn with_step_limit(board: &'a mut Board, step_limit: usize,
            mrv: bool, lcv: bool) -> ForwardStrategy<'a> {
        let domains = initial_domains(board);

        ForwardStrategy {
            board,
            domains,
            counter: StepCounter::new(step_limit),
            mrv,
            lcv
        }
    }

    fn select_next(&self, pos: Position) -> Position {
        if self.mrv {
            find_mrv_cell(self.board, &self.domains)
        }
        else {
            next_position(pos)
        }
    }

    fn start_position(&self) -> Position {
        if self.mrv {
            find_mrv_cell(self.board, &self.domains)
        }
        else {
            Position::new(0, 0)
        }
    }

    fn expand(&mut self, pos: Position) -> SudokuResult<bool> {
        if pos.row == BOARD_SIZE {
            return Ok(true);
        }

        self.counter.tick()?;

        if self.board.get_cell(pos).unwrap() != CELL_EMPTY {
            let next = self.select_next(pos);
            return self.expand(next);
        }

        let candidates =
            build_candidates(self.board, &self.domains, pos, self.lcv);

        for (value, refinement) in candidates {
            self.board.set_cell(pos, value).unwrap();
            let backup = mem::replace(&mut self.domains, refinement.domains);
            let next = self.select_next(pos);

            if self.expand(next)? {
                return Ok(true);
            }

            self.board.clear_cell(pos).unwrap();
            self.domains = backup;
        }

        Ok(false)
    }
}

impl Strategy for ForwardStrategy<'_> {
    fn solve(&mut self) -> SudokuResult<bool> {
        let start = self.start_position();
        self.expand(start)
    }

    fn step_count(&self) -> usize {
        self.counter.count()
    }
}
