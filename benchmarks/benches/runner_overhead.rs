use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fitbench::{BenchOptions, Benchmark, GridPoint, ParamGrid, TimedUnit};

fn noop_units(n: usize) -> impl Iterator<Item = TimedUnit> {
    (0..n).map(|i| TimedUnit::new(GridPoint::new().with("i", i), || Ok(())))
}

fn bench_run_noop_units(c: &mut Criterion) {
    let wall_only = Benchmark::new(BenchOptions::default().metrics(true, false, false)).unwrap();
    let wall_and_cpu = Benchmark::new(BenchOptions::default().metrics(true, true, false)).unwrap();

    // Per-run cost of an empty sweep of `n` units
    for size in [10, 100, 1000].iter() {
        c.bench_with_input(BenchmarkId::new("wall_only", size), size, |b, &n| {
            b.iter(|| black_box(wall_only.run(noop_units(n)).unwrap()));
        });
        c.bench_with_input(BenchmarkId::new("wall_and_cpu", size), size, |b, &n| {
            b.iter(|| black_box(wall_and_cpu.run(noop_units(n)).unwrap()));
        });
    }
}

fn bench_peak_memory_sampler(c: &mut Criterion) {
    let bench = Benchmark::new(BenchOptions::default().metrics(true, false, true)).unwrap();

    // One sampler thread is spawned per repetition
    c.bench_function("peak_memory_10_units", |b| {
        b.iter(|| black_box(bench.run(noop_units(10)).unwrap()));
    });
}

fn bench_grid_points(c: &mut Criterion) {
    for size in [10usize, 100, 1000].iter() {
        c.bench_with_input(BenchmarkId::new("grid_points", size), size, |b, &n| {
            let grid = ParamGrid::new()
                .axis("N", 0..n)
                .axis("solver", ["lbfgs", "newton-cg", "sag"]);
            b.iter(|| black_box(grid.points().count()));
        });
    }
}

fn bench_table_output(c: &mut Criterion) {
    let bench = Benchmark::new(
        BenchOptions::default()
            .metrics(true, true, false)
            .repeat(10),
    )
    .unwrap();
    let table = bench
        .run(noop_units(100))
        .unwrap()
        .with_constant("estimator", "Noop")
        .unwrap();

    c.bench_function("csv_1000_rows", |b| {
        b.iter(|| {
            let mut buf = Vec::with_capacity(64 * 1024);
            fitbench::CsvSink::write_to(&mut buf, black_box(&table)).unwrap();
            black_box(buf);
        });
    });
    c.bench_function("summary_1000_rows", |b| {
        b.iter(|| black_box(black_box(&table).summary()));
    });
}

criterion_group!(
    benches,
    bench_run_noop_units,
    bench_peak_memory_sampler,
    bench_grid_points,
    bench_table_output
);
criterion_main!(benches);
