use std::time::{Duration, Instant};

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hackmatch_bot::core::{find_matches, parse_text, random_board, settle, BoardGen, SimpleRng};
use hackmatch_bot::engine::{Solver, SolverConfig};
use hackmatch_bot::input::encode;
use hackmatch_bot::vision::{render, BoardParser};

const BUSY: &str =
    ".......\n.......\n.......\n.......\ny......\nrg.b.y.\nbyrgpbr\ngbyrpgy\nrpgbyrb\n___@___";

fn bench_find_matches(c: &mut Criterion) {
    let board = parse_text(BUSY).unwrap();
    c.bench_function("find_matches", |b| b.iter(|| find_matches(black_box(&board))));
}

fn bench_settle(c: &mut Criterion) {
    let mut board = parse_text(BUSY).unwrap();
    // punch holes so pieces have to fall
    for col in 0..7 {
        board.set(7, col, hackmatch_bot::types::Symbol::Empty);
    }
    c.bench_function("settle", |b| b.iter(|| settle(black_box(&board))));
}

fn bench_parse_frame(c: &mut Criterion) {
    let parser = BoardParser::default();
    let frame = render(&parse_text(BUSY).unwrap(), parser.table());
    c.bench_function("parse_frame", |b| {
        b.iter(|| parser.parse_frame(black_box(&frame)))
    });
}

fn bench_solve(c: &mut Criterion) {
    let board = parse_text(BUSY).unwrap();
    let mut group = c.benchmark_group("solve");
    group.sample_size(10);
    for depth in [4usize, 6] {
        let solver = Solver::new(SolverConfig {
            max_depth: depth,
            ..SolverConfig::default()
        });
        group.bench_function(format!("depth_{depth}"), |b| {
            b.iter(|| solver.search(black_box(&board), Instant::now() + Duration::from_secs(10)))
        });
    }
    group.finish();
}

fn bench_solve_random(c: &mut Criterion) {
    let mut rng = SimpleRng::new(12345);
    let boards: Vec<_> = (0..16)
        .map(|_| random_board(&mut rng, &BoardGen::default()))
        .collect();
    let solver = Solver::new(SolverConfig {
        max_depth: 5,
        ..SolverConfig::default()
    });

    let mut group = c.benchmark_group("solve_random");
    group.sample_size(10);
    group.bench_function("sequential", |b| {
        b.iter(|| {
            for board in &boards {
                let (plan, _) = solver.search(board, Instant::now() + Duration::from_secs(10));
                black_box(encode(&plan, board.cursor()));
            }
        })
    });
    let parallel = Solver::new(SolverConfig {
        parallel: true,
        ..*solver.config()
    });
    group.bench_function("parallel", |b| {
        b.iter(|| {
            for board in &boards {
                black_box(parallel.search(board, Instant::now() + Duration::from_secs(10)));
            }
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_find_matches,
    bench_settle,
    bench_parse_frame,
    bench_solve,
    bench_solve_random
);
criterion_main!(benches);
