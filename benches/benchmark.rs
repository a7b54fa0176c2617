use criterion::{
    criterion_group,
    criterion_main,
    BenchmarkGroup,
    Criterion,
    SamplingMode
};
use criterion::measurement::WallTime;

use killer_sudoku::Board;
use killer_sudoku::cage::Cage;
use killer_sudoku::solver::{BacktrackStrategy, ForwardStrategy, Strategy};

use std::fs;
use std::time::Duration;

const MEASUREMENT_TIME_SECS: u64 = 20;
const BENCHDATA_DIR: &str = "benchdata/";
const TASK_FILE_EXT: &str = ".json";

fn load_cages(name: &str) -> Vec<Cage> {
    let path = format!("{}{}{}", BENCHDATA_DIR, name, TASK_FILE_EXT);
    let data = fs::read_to_string(&path)
        .expect("missing benchdata task file");
    serde_json::from_str(&data).expect("malformed benchdata task file")
}

fn caged_board(cages: &[Cage]) -> Board {
    let mut board = Board::new();
    board.set_cages(cages.to_vec()).unwrap();
    board
}

fn solve_backtrack(cages: &[Cage]) -> bool {
    let mut board = caged_board(cages);
    let mut strategy = BacktrackStrategy::new(&mut board);
    strategy.solve().unwrap()
}

fn solve_forward(cages: &[Cage], mrv: bool, lcv: bool) -> bool {
    let mut board = caged_board(cages);
    let mut strategy = ForwardStrategy::new(&mut board, mrv, lcv);
    strategy.solve().unwrap()
}

fn bench_strategies(group: &mut BenchmarkGroup<'_, WallTime>,
        cages: &[Cage]) {
    group.bench_function("backtrack", |bencher|
        bencher.iter(|| assert!(solve_backtrack(cages))));
    group.bench_function("forward", |bencher|
        bencher.iter(|| assert!(solve_forward(cages, false, false))));
    group.bench_function("forward-mrv", |bencher|
        bencher.iter(|| assert!(solve_forward(cages, true, false))));
    group.bench_function("forward-mrv-lcv", |bencher|
        bencher.iter(|| assert!(solve_forward(cages, true, true))));
}

fn benchmark_classic_killer(c: &mut Criterion) {
    let cages = load_cages("classic-killer");
    let mut group = c.benchmark_group("classic-killer");
    group.sampling_mode(SamplingMode::Flat);
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(MEASUREMENT_TIME_SECS));
    bench_strategies(&mut group, &cages);
    group.finish();
}

criterion_group!(benches, benchmark_classic_killer);
criterion_main!(benches);
