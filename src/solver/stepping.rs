//! This module contains the stepping variants of the two searches. They
//! reify the recursion as an explicit stack of frames and advance by at most
//! one frame transition per call, so an external driver (a UI, a test, a
//! cooperative scheduler) controls the pacing.

use crate::{Board, Position, BOARD_SIZE, CELL_EMPTY, CELL_MAX, CELL_MIN};
use crate::domain::CellDomain;
use crate::error::{SudokuError, SudokuResult};
use crate::solver::{
    next_position,
    StepCounter,
    StepResult,
    SteppingStrategy,
    Strategy
};
use crate::solver::forward::{
    build_candidates,
    find_mrv_cell,
    initial_domains,
    DomainGrid,
    Refinement
};

use std::mem;

fn check_domain_position(pos: Position) -> SudokuResult<usize> {
    if pos.row >= BOARD_SIZE || pos.col >= BOARD_SIZE {
        Err(SudokuError::OutOfRange)
    }
    else {
        Ok(pos.offset())
    }
}

fn drive<S>(strategy: &mut S) -> SudokuResult<bool>
where
    S: SteppingStrategy
{
    loop {
        match strategy.step()? {
            StepResult::More => continue,
            StepResult::Success => return Ok(true),
            StepResult::Fail => return Ok(false)
        }
    }
}

/// One frame of the [SteppingBacktrackStrategy]'s stack, deciding the value
/// of one position. `next_value` is 0 when the frame has not been entered
/// yet; `skip_cell` marks frames whose position held a given.
struct Frame {
    pos: Position,
    next_value: u8,
    skip_cell: bool
}

impl Frame {
    fn at(pos: Position) -> Frame {
        Frame {
            pos,
            next_value: 0,
            skip_cell: false
        }
    }
}

/// A [SteppingStrategy] which performs the same search as
/// [BacktrackStrategy](crate::solver::BacktrackStrategy), but one decision
/// per call to [SteppingStrategy::step]: each call either enters a frame,
/// places one candidate and pushes a child frame, or pops an exhausted
/// frame. Driving it to completion yields the same terminal status and the
/// same final grid as the recursive search.
///
/// Since this variant keeps no domain store, [SteppingStrategy::domain]
/// reports the full value set for every cell.
pub struct SteppingBacktrackStrategy<'a> {
    board: &'a mut Board,
    counter: StepCounter,
    stack: Vec<Frame>,
    initialized: bool
}

impl<'a> SteppingBacktrackStrategy<'a> {

    /// Creates a new stepping backtracking strategy for the given board,
    /// without a step limit.
    pub fn new(board: &'a mut Board) -> SteppingBacktrackStrategy<'a> {
        SteppingBacktrackStrategy {
            board,
            counter: StepCounter::unlimited(),
            stack: Vec::new(),
            initialized: false
        }
    }

    /// Creates a new stepping backtracking strategy for the given board
    /// which fails with [SudokuError]`::TooHard` as soon as its step count
    /// exceeds `step_limit`.
    pub fn with_step_limit(board: &'a mut Board, step_limit: usize)
            -> SteppingBacktrackStrategy<'a> {
        SteppingBacktrackStrategy {
            board,
            counter: StepCounter::new(step_limit),
            stack: Vec::new(),
            initialized: false
        }
    }
}

impl Strategy for SteppingBacktrackStrategy<'_> {
    fn solve(&mut self) -> SudokuResult<bool> {
        drive(self)
    }

    fn step_count(&self) -> usize {
        self.counter.count()
    }
}

impl SteppingStrategy for SteppingBacktrackStrategy<'_> {
    fn step(&mut self) -> SudokuResult<StepResult> {
        if !self.initialized {
            self.initialized = true;
            self.stack.push(Frame::at(Position::new(0, 0)));
        }

        let pos = match self.stack.last() {
            Some(frame) => frame.pos,
            None => return Ok(StepResult::Fail)
        };

        if pos.row == BOARD_SIZE {
            return Ok(StepResult::Success);
        }

        self.counter.tick()?;

        let top = self.stack.len() - 1;

        if self.stack[top].next_value == 0 {
            // First visit of this frame.
            self.stack[top].next_value = CELL_MIN;

            if self.board.get_cell(pos).unwrap() != CELL_EMPTY {
                self.stack[top].skip_cell = true;
                self.stack.push(Frame::at(next_position(pos)));
                return Ok(StepResult::More);
            }
        }
        else if self.stack[top].skip_cell {
            // Revisited after the child subtree failed; the given is not
            // ours to change, so the failure propagates.
            self.stack.pop();
            return Ok(StepResult::More);
        }

        while self.stack[top].next_value <= CELL_MAX {
            let value = self.stack[top].next_value;
            self.stack[top].next_value += 1;
            self.board.set_cell(pos, value).unwrap();

            if !self.board.is_invalid_cell(pos).unwrap() {
                self.stack.push(Frame::at(next_position(pos)));
                return Ok(StepResult::More);
            }

            self.board.clear_cell(pos).unwrap();
        }

        self.board.clear_cell(pos).unwrap();
        self.stack.pop();
        Ok(StepResult::More)
    }

    fn domain(&self, pos: Position) -> SudokuResult<CellDomain> {
        check_domain_position(pos)?;
        Ok(CellDomain::full())
    }
}

/// The state of a [ForwardFrame] within the candidate protocol.
#[derive(Clone, Copy)]
enum FrameState {

    /// The frame has not built its candidate list yet.
    Init,

    /// The candidate list exists; the next call tries the candidate at the
    /// current try index or pops the frame if none remain.
    GeneratedCandidates,

    /// A candidate is applied and a child frame was pushed. The frame is
    /// only seen in this state again after the child subtree failed, in
    /// which case the candidate is rolled back.
    TryingCandidate
}

/// One frame of the [SteppingForwardStrategy]'s stack.
struct ForwardFrame {
    pos: Position,
    state: FrameState,
    skip_cell: bool,
    candidates: Vec<(u8, Refinement)>,
    try_index: usize,
    backup: Option<Box<DomainGrid>>
}

impl ForwardFrame {
    fn at(pos: Position) -> ForwardFrame {
        ForwardFrame {
            pos,
            state: FrameState::Init,
            skip_cell: false,
            candidates: Vec::new(),
            try_index: 0,
            backup: None
        }
    }
}

/// A [SteppingStrategy] which performs the same search as
/// [ForwardStrategy](crate::solver::ForwardStrategy), but one decision per
/// call to [SteppingStrategy::step]. Each frame passes through an explicit
/// candidate protocol: on entry it builds the list of values that survive
/// the validity check and the forward check (LCV-sorted if enabled), then
/// one call per candidate applies its domain deltas with a backup and
/// pushes a child frame, and one call per failed candidate rolls the deltas
/// back and advances to the next one.
///
/// [SteppingStrategy::domain] reports the stored domain of the cell, which
/// is what a visualization of the search state wants to show.
pub struct SteppingForwardStrategy<'a> {
    board: &'a mut Board,
    domains: DomainGrid,
    counter: StepCounter,
    mrv: bool,
    lcv: bool,
    stack: Vec<ForwardFrame>,
    initialized: bool
}

impl<'a> SteppingForwardStrategy<'a> {

    /// Creates a new stepping forward-checking strategy for the given
    /// board, without a step limit. `mrv` enables minimum-remaining-values
    /// variable ordering and `lcv` enables least-constraining-value value
    /// ordering.
    pub fn new(board: &'a mut Board, mrv: bool, lcv: bool)
            -> SteppingForwardStrategy<'a> {
        let domains = initial_domains(board);

        SteppingForwardStrategy {
            board,
            domains,
            counter: StepCounter::unlimited(),
            mrv,
            lcv,
            stack: Vec::new(),
            initialized: false
        }
    }

    /// Creates a new stepping forward-checking strategy for the given board
    /// which fails with [SudokuError]`::TooHard` as soon as its step count
    /// exceeds `step_limit`. `mrv` and `lcv` behave as in
    /// [SteppingForwardStrategy::new].
    pub fn with_step_limit(board: &'a mut Board, step_limit: usize,
            mrv: bool, lcv: bool) -> SteppingForwardStrategy<'a> {
        let domains = initial_domains(board);

        SteppingForwardStrategy {
            board,
            domains,
            counter: StepCounter::new(step_limit),
            mrv,
            lcv,
            stack: Vec::new(),
            initialized: false
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
}

impl Strategy for SteppingForwardStrategy<'_> {
    fn solve(&mut self) -> SudokuResult<bool> {
        drive(self)
    }

    fn step_count(&self) -> usize {
        self.counter.count()
    }
}

impl SteppingStrategy for SteppingForwardStrategy<'_> {
    fn step(&mut self) -> SudokuResult<StepResult> {
        if !self.initialized {
            self.initialized = true;
            let start = self.start_position();
            self.stack.push(ForwardFrame::at(start));
        }

        let pos = match self.stack.last() {
            Some(frame) => frame.pos,
            None => return Ok(StepResult::Fail)
        };

        if pos.row == BOARD_SIZE {
            return Ok(StepResult::Success);
        }

        let top = self.stack.len() - 1;

        match self.stack[top].state {
            FrameState::TryingCandidate => {
                // The child subtree failed: undo this candidate and let the
                // next call move on to the following one.
                self.board.clear_cell(pos).unwrap();

                let backup = self.stack[top].backup.take().unwrap();
                self.domains = *backup;
                self.stack[top].try_index += 1;
                self.stack[top].state = FrameState::GeneratedCandidates;
                Ok(StepResult::More)
            },
            FrameState::Init => {
                self.counter.tick()?;

                if self.stack[top].skip_cell {
                    // Revisited after the child subtree failed; the given is
                    // not ours to change, so the failure propagates.
                    self.stack.pop();
                    return Ok(StepResult::More);
                }

                if self.board.get_cell(pos).unwrap() != CELL_EMPTY {
                    self.stack[top].skip_cell = true;
                    let child = self.select_next(pos);
                    self.stack.push(ForwardFrame::at(child));
                    return Ok(StepResult::More);
                }

                let candidates = build_candidates(self.board, &self.domains,
                    pos, self.lcv);
                self.stack[top].candidates = candidates;
                self.stack[top].try_index = 0;
                self.stack[top].state = FrameState::GeneratedCandidates;
                Ok(StepResult::More)
            },
            FrameState::GeneratedCandidates => {
                let frame = &mut self.stack[top];

                if frame.try_index >= frame.candidates.len() {
                    self.board.clear_cell(pos).unwrap();
                    self.stack.pop();
                    return Ok(StepResult::More);
                }

                let (value, new_domains) = {
                    let (value, refinement) =
                        &frame.candidates[frame.try_index];
                    (*value, refinement.domains)
                };

                self.board.set_cell(pos, value).unwrap();

                let backup = mem::replace(&mut self.domains, new_domains);
                let frame = &mut self.stack[top];
                frame.backup = Some(Box::new(backup));
                frame.state = FrameState::TryingCandidate;

                let child = self.select_next(pos);
                self.stack.push(ForwardFrame::at(child));
                Ok(StepResult::More)
            }
        }
    }

    fn domain(&self, pos: Position) -> SudokuResult<CellDomain> {
        let offset = check_domain_position(pos)?;
        Ok(self.domains[offset])
    }
}
