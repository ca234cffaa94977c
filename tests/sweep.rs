use fitbench::{
    BenchOptions, Benchmark, CsvSink, FailurePolicy, GridPoint, Metric, ParamGrid, ResultSink,
    TagValue, TimedUnit,
};
use proptest::prelude::*;
use std::time::Duration;

const NAP: Duration = Duration::from_millis(20);

fn sleeping_units(grid: &ParamGrid) -> impl Iterator<Item = TimedUnit> + '_ {
    grid.points().map(|point| {
        TimedUnit::new(point, || {
            std::thread::sleep(NAP);
            Ok(())
        })
    })
}

#[test]
fn two_points_three_repeats_of_a_fixed_sleep() {
    let grid = ParamGrid::new()
        .axis("N", [100usize])
        .axis("variant", ["a", "b"]);
    let bench = Benchmark::new(
        BenchOptions::default()
            .metrics(true, true, false)
            .repeat(3),
    )
    .unwrap();

    let table = bench.run(sleeping_units(&grid)).unwrap();

    assert_eq!(table.len(), 6);
    for (i, row) in table.rows().iter().enumerate() {
        let expected = if i < 3 { "a" } else { "b" };
        assert_eq!(row.tags.get("variant"), Some(&TagValue::from(expected)));
        assert_eq!(row.tags.get("N"), Some(&TagValue::Int(100)));
        assert_eq!(row.repetition, i % 3);
        assert!(row.sample.wall_time.unwrap() >= NAP.as_secs_f64());
        assert!(row.sample.cpu_time.unwrap() >= 0.0);
        assert_eq!(row.sample.peak_memory, None);
    }

    let summary = table.summary();
    assert_eq!(summary.rows.len(), 2);
    assert!(summary.rows[0].get(Metric::WallTime).unwrap().min >= NAP.as_secs_f64());
}

#[test]
fn record_and_continue_runs_every_unit_and_writes_error_column() {
    let grid = ParamGrid::new().axis("N", [1usize, 2, 3]);
    let units = grid.points().map(|point| {
        let fails = point.get("N") == Some(&TagValue::Int(2));
        TimedUnit::new(point, move || {
            if fails {
                anyhow::bail!("fit exploded");
            }
            Ok(())
        })
    });
    let bench = Benchmark::new(
        BenchOptions::default()
            .metrics(true, false, false)
            .repeat(2)
            .failure_policy(FailurePolicy::RecordAndContinue),
    )
    .unwrap();

    let table = bench
        .run(units)
        .unwrap()
        .with_constant("estimator", "Sleeper")
        .unwrap();
    assert_eq!(table.len(), 6);
    assert_eq!(table.failures().count(), 2);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    CsvSink::new(&path).write(&table).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "N,estimator,repetition,wall_time,error");
    assert_eq!(lines.len(), 7);
    assert!(lines[3].starts_with("2,Sleeper,0,,"));
    assert!(lines[3].ends_with("fit exploded"));
}

#[test]
fn configuration_errors_fail_before_any_unit_runs() {
    assert!(Benchmark::new(BenchOptions::default().repeat(0)).is_err());
    assert!(Benchmark::new(BenchOptions::default().metrics(false, false, false)).is_err());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn k_rows_per_grid_point(n_points in 1usize..6, repeat in 1usize..5) {
        let units = (0..n_points).map(|i| {
            TimedUnit::new(GridPoint::new().with("i", i).with("kind", "noop"), || Ok(()))
        });
        let bench = Benchmark::new(
            BenchOptions::default().metrics(true, false, false).repeat(repeat),
        ).unwrap();
        let table = bench.run(units).unwrap();

        prop_assert_eq!(table.len(), n_points * repeat);
        for (j, row) in table.rows().iter().enumerate() {
            prop_assert_eq!(row.tags.get("i"), Some(&TagValue::from(j / repeat)));
            prop_assert_eq!(row.tags.get("kind"), Some(&TagValue::from("noop")));
            prop_assert_eq!(row.repetition, j % repeat);
        }
        let summary = table.summary();
        prop_assert_eq!(summary.rows.len(), n_points);
        prop_assert!(summary.rows.iter().all(|r| r.repetitions == repeat));
    }
}
