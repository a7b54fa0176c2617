//! The command-line front end of the Killer Sudoku engine. It solves
//! puzzles from `KSF1` bundles, either a single one (printing the board) or
//! the whole bundle (writing per-puzzle timing and step counts to a CSV
//! file).

use killer_sudoku::Board;
use killer_sudoku::bundle::{BundleReader, Puzzle};
use killer_sudoku::error::{SudokuError, SudokuResult};
use killer_sudoku::solver::{
    self,
    BacktrackStrategy,
    ForwardStrategy,
    Strategy
};

use log::{error, info, warn};

use std::env;
use std::fs::File;
use std::io::{BufReader, Write};
use std::process;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

const USAGE: &str = "\
Usage: killer-sudoku <bundle-path>[:index] [<step-limit>] [<strategy>]

Arguments:
  <bundle-path>   A puzzle bundle in the KSF1 format. With a `:index`
                  suffix, only the puzzle with that zero-based index is
                  solved and the board is printed. Without it, all puzzles
                  are solved and timing data is written to
                  experiment-data-<strategy>-<unix-timestamp>.csv.
  <step-limit>    A positive integer; the search fails once its step count
                  exceeds this limit. Unlimited if omitted.
  <strategy>      `backtrack`, or `forward` optionally followed by `mrv`
                  and/or `lcv`. Defaults to `forward mrv lcv`.";

#[derive(Clone, Copy, Eq, PartialEq)]
enum StrategyKind {
    Backtrack,
    Forward
}

struct StrategySelector {
    kind: StrategyKind,
    mrv: bool,
    lcv: bool
}

impl StrategySelector {
    fn label(&self) -> String {
        let mut label = match self.kind {
            StrategyKind::Backtrack => String::from("backtrack"),
            StrategyKind::Forward => String::from("forward")
        };

        if self.mrv {
            label.push_str("-mrv");
        }

        if self.lcv {
            label.push_str("-lcv");
        }

        label
    }
}

struct Options {
    path: String,
    index: Option<usize>,
    step_limit: Option<usize>,
    selector: StrategySelector
}

fn parse_options(args: &[String]) -> Result<Options, String> {
    let mut args = args.iter();
    let target = args.next()
        .ok_or_else(|| String::from("missing bundle path"))?;

    let (path, index) = match target.rsplit_once(':') {
        Some((path, suffix)) =>
            match suffix.parse::<usize>() {
                Ok(index) => (String::from(path), Some(index)),
                Err(_) => (target.clone(), None)
            },
        None => (target.clone(), None)
    };

    let mut step_limit = None;
    let mut kind = None;
    let mut mrv = false;
    let mut lcv = false;

    for arg in args {
        if let Ok(limit) = arg.parse::<usize>() {
            if step_limit.is_some() {
                return Err(String::from("duplicate step limit"));
            }

            step_limit = Some(limit);
            continue;
        }

        match arg.as_str() {
            "backtrack" => kind = Some(StrategyKind::Backtrack),
            "forward" => kind = Some(StrategyKind::Forward),
            "mrv" => mrv = true,
            "lcv" => lcv = true,
            other => return Err(format!("unknown argument `{}`", other))
        }
    }

    let selector = match kind {
        Some(StrategyKind::Backtrack) => {
            if mrv || lcv {
                return Err(String::from(
                    "mrv and lcv require the forward strategy"));
            }

            StrategySelector {
                kind: StrategyKind::Backtrack,
                mrv: false,
                lcv: false
            }
        },
        Some(StrategyKind::Forward) => StrategySelector {
            kind: StrategyKind::Forward,
            mrv,
            lcv
        },
        None => {
            if mrv || lcv {
                return Err(String::from(
                    "mrv and lcv require the forward strategy"));
            }

            StrategySelector {
                kind: StrategyKind::Forward,
                mrv: true,
                lcv: true
            }
        }
    };

    Ok(Options {
        path,
        index,
        step_limit,
        selector
    })
}

/// Runs the selected strategy on the board and reports the outcome together
/// with the number of steps taken, which is meaningful even when the search
/// fails with [SudokuError::TooHard].
fn run_strategy(board: &mut Board, selector: &StrategySelector,
        step_limit: Option<usize>) -> (SudokuResult<bool>, usize) {
    match selector.kind {
        StrategyKind::Backtrack => {
            let mut strategy = match step_limit {
                Some(limit) =>
                    BacktrackStrategy::with_step_limit(board, limit),
                None => BacktrackStrategy::new(board)
            };
            let result = solver::solve(&mut strategy);
            (result, strategy.step_count())
        },
        StrategyKind::Forward => {
            let mut strategy = match step_limit {
                Some(limit) => ForwardStrategy::with_step_limit(board,
                    limit, selector.mrv, selector.lcv),
                None =>
                    ForwardStrategy::new(board, selector.mrv, selector.lcv)
            };
            let result = solver::solve(&mut strategy);
            (result, strategy.step_count())
        }
    }
}

enum SolutionCheck {

    /// The final grid equals the bundled reference solution.
    Expected,

    /// The final grid is a valid solution different from the bundled one.
    DifferentButValid,

    /// The final grid does not satisfy the constraints, which indicates a
    /// solver defect and is fatal to the run.
    Invalid
}

fn check_solution(board: &Board, puzzle: &Puzzle) -> SolutionCheck {
    if board.cells() == puzzle.solution() {
        SolutionCheck::Expected
    }
    else if board.is_incomplete() || board.is_invalid() {
        SolutionCheck::Invalid
    }
    else {
        SolutionCheck::DifferentButValid
    }
}

fn open_bundle(path: &str) -> Result<BundleReader<BufReader<File>>, i32> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            error!("cannot open {}: {}", path, err);
            return Err(1);
        }
    };

    match BundleReader::new(BufReader::new(file)) {
        Ok(reader) => Ok(reader),
        Err(err) => {
            error!("cannot read {}: {}", path, err);
            Err(1)
        }
    }
}

fn solve_single(reader: &mut BundleReader<BufReader<File>>, index: usize,
        options: &Options) -> i32 {
    let puzzle = match reader.load(index) {
        Ok(puzzle) => puzzle,
        Err(err) => {
            error!("cannot load puzzle {}: {}", index, err);
            return 1;
        }
    };

    let mut board = match puzzle.board() {
        Ok(board) => board,
        Err(err) => {
            error!("puzzle {} has an invalid cage layout: {}", index, err);
            return 1;
        }
    };

    let started = Instant::now();
    let (result, steps) = run_strategy(&mut board, &options.selector,
        options.step_limit);
    let elapsed = started.elapsed().as_secs_f64();

    match result {
        Ok(true) => {
            println!("solution found");
            println!("{}", board);
            info!("solved puzzle {} in {:.6}s and {} steps", index, elapsed,
                steps);

            match check_solution(&board, &puzzle) {
                SolutionCheck::Expected => 0,
                SolutionCheck::DifferentButValid => {
                    info!("found a valid solution different from the \
                        bundled one");
                    0
                },
                SolutionCheck::Invalid => {
                    error!("solution mismatch: the final board violates a \
                        constraint");
                    1
                }
            }
        },
        Ok(false) => {
            println!("no solution");
            println!("{}", board);
            1
        },
        Err(SudokuError::TooHard) => {
            warn!("puzzle {} exceeded the step limit after {} steps", index,
                steps);
            1
        },
        Err(err) => {
            error!("solving puzzle {} failed: {}", index, err);
            1
        }
    }
}

fn solve_all(reader: &mut BundleReader<BufReader<File>>, options: &Options)
        -> i32 {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0);
    let csv_path = format!("experiment-data-{}-{}.csv",
        options.selector.label(), timestamp);

    let mut csv = match File::create(&csv_path) {
        Ok(csv) => csv,
        Err(err) => {
            error!("cannot create {}: {}", csv_path, err);
            return 1;
        }
    };

    if let Err(err) = writeln!(csv, "Puzzle,Time,Steps") {
        error!("cannot write {}: {}", csv_path, err);
        return 1;
    }

    for index in 0..reader.puzzle_count() {
        let puzzle = match reader.load(index) {
            Ok(puzzle) => puzzle,
            Err(err) => {
                error!("cannot load puzzle {}: {}", index, err);
                return 1;
            }
        };

        let mut board = match puzzle.board() {
            Ok(board) => board,
            Err(err) => {
                error!("puzzle {} has an invalid cage layout: {}", index,
                    err);
                return 1;
            }
        };

        let started = Instant::now();
        let (result, steps) = run_strategy(&mut board, &options.selector,
            options.step_limit);
        let elapsed = started.elapsed().as_secs_f64();

        match result {
            Ok(solved) => {
                if solved {
                    if let SolutionCheck::Invalid =
                            check_solution(&board, &puzzle) {
                        error!("solution mismatch on puzzle {}: the final \
                            board violates a constraint", index);
                        return 1;
                    }
                }
                else {
                    warn!("puzzle {} has no solution", index);
                }

                if let Err(err) = writeln!(csv, "{},{:.6},{}", index,
                        elapsed, steps) {
                    error!("cannot write {}: {}", csv_path, err);
                    return 1;
                }
            },
            Err(SudokuError::TooHard) => {
                warn!("puzzle {} exceeded the step limit after {} steps, \
                    skipping", index, steps);
            },
            Err(err) => {
                error!("solving puzzle {} failed: {}", index, err);
                return 1;
            }
        }
    }

    info!("wrote {}", csv_path);
    0
}

fn init_logging() {
    env_logger::init();
}

fn main() {
    init_logging();

    let args: Vec<String> = env::args().skip(1).collect();

    let options = match parse_options(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{}", message);
            eprintln!("{}", USAGE);
            process::exit(1);
        }
    };

    let mut reader = match open_bundle(&options.path) {
        Ok(reader) => reader,
        Err(code) => process::exit(code)
    };

    let code = match options.index {
        Some(index) => solve_single(&mut reader, index, &options),
        None => solve_all(&mut reader, &options)
    };

    process::exit(code);
}
