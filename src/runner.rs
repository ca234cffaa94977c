//! The benchmark sweep runner.
//!
//! [`Benchmark::run`] pulls [`TimedUnit`]s one at a time from any iterator,
//! executes each `repeat` times back to back with the selected instruments
//! running, and collects one [`Measurement`] per repetition. Units run in
//! the order the iterator yields them; nothing runs in parallel.
//!
//! # Failure policy
//!
//! A failing callable is never skipped silently:
//!
//! - [`FailurePolicy::Abort`] (default) stops at the first failure and
//!   returns [`BenchError::UnitFailed`] with the grid point and repetition.
//!   No further units are pulled from the iterator.
//! - [`FailurePolicy::RecordAndContinue`] stores a row carrying the error
//!   message and empty metric cells, then carries on with the remaining
//!   repetitions and units.

use crate::config::BenchOptions;
use crate::error::{BenchError, Result};
use crate::measure::{Availability, Instruments, Sample};
use crate::table::{check_not_reserved, Measurement, ResultTable};
use crate::unit::TimedUnit;
use serde::{Deserialize, Serialize};

/// What to do when a unit's callable returns an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    #[default]
    Abort,
    RecordAndContinue,
}

/// Progress of a run, reported to the observer of
/// [`Benchmark::run_with_progress`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Running { unit: usize, repetition: usize },
    Done,
}

/// Sequential sweep runner.
#[derive(Debug, Clone)]
pub struct Benchmark {
    options: BenchOptions,
}

impl Benchmark {
    /// Validate `options` up front so no unit runs under a bad configuration.
    pub fn new(options: BenchOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &BenchOptions {
        &self.options
    }

    pub fn run<I>(&self, units: I) -> Result<ResultTable>
    where
        I: IntoIterator<Item = TimedUnit>,
    {
        self.run_with_progress(units, |_| {})
    }

    pub fn run_with_progress<I, P>(&self, units: I, progress: P) -> Result<ResultTable>
    where
        I: IntoIterator<Item = TimedUnit>,
        P: FnMut(RunState),
    {
        self.options.validate()?;
        self.run_probed(units, progress, Availability::detect())
    }

    /// Run with host support for each metric given by `available`.
    pub(crate) fn run_probed<I, P>(
        &self,
        units: I,
        mut progress: P,
        available: Availability,
    ) -> Result<ResultTable>
    where
        I: IntoIterator<Item = TimedUnit>,
        P: FnMut(RunState),
    {
        let repeat = self.options.repeat;
        let policy = self.options.failure_policy;

        let (instruments, omitted) = Instruments::probe_with(
            &self.options.requested(),
            self.options.memory_interval_duration(),
            available,
        );
        for metric in &omitted {
            tracing::warn!(%metric, "metric not available on this host, column omitted");
        }

        let _span = tracing::info_span!("run", repeat, ?policy).entered();
        let mut table = ResultTable::new(instruments.active().clone(), omitted, policy);
        let mut schema: Option<Vec<String>> = None;
        progress(RunState::NotStarted);

        for (index, mut unit) in units.into_iter().enumerate() {
            let keys: Vec<String> = unit.tags().keys().map(str::to_string).collect();
            match &schema {
                None => {
                    for key in &keys {
                        check_not_reserved(key)?;
                    }
                    table.set_tag_keys(keys.clone());
                    schema = Some(keys);
                }
                Some(expected) if *expected != keys => {
                    return Err(BenchError::TagSchemaMismatch {
                        expected: expected.clone(),
                        found: keys,
                    });
                }
                Some(_) => {}
            }

            let _unit_span = tracing::debug_span!("unit", index, tags = %unit.tags()).entered();
            for repetition in 0..repeat {
                progress(RunState::Running {
                    unit: index,
                    repetition,
                });

                let session = instruments.start();
                let outcome = unit.invoke();
                let sample = session.stop();

                match outcome {
                    Ok(()) => {
                        tracing::trace!(repetition, ?sample, "repetition finished");
                        table.push(Measurement {
                            tags: unit.tags().clone(),
                            repetition,
                            sample,
                            error: None,
                        });
                    }
                    Err(err) if policy == FailurePolicy::Abort => {
                        let message = format!("{err:#}");
                        tracing::error!(repetition, error = %message, "unit failed, aborting run");
                        return Err(BenchError::UnitFailed {
                            point: unit.into_tags(),
                            repetition,
                            source: err,
                        });
                    }
                    Err(err) => {
                        let message = format!("{err:#}");
                        tracing::warn!(repetition, error = %message, "unit failed, recording and continuing");
                        table.push(Measurement {
                            tags: unit.tags().clone(),
                            repetition,
                            sample: Sample::default(),
                            error: Some(message),
                        });
                    }
                }
            }
        }

        progress(RunState::Done);
        tracing::info!(
            rows = table.len(),
            failures = table.failures().count(),
            "benchmark run finished"
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridPoint, ParamGrid, TagValue};
    use crate::measure::Metric;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn wall_only(repeat: usize) -> Benchmark {
        Benchmark::new(
            BenchOptions::default()
                .metrics(true, false, false)
                .repeat(repeat),
        )
        .unwrap()
    }

    fn counting_units(grid: &ParamGrid, log: Rc<RefCell<Vec<String>>>) -> Vec<TimedUnit> {
        grid.points()
            .map(|p| {
                let log = Rc::clone(&log);
                let label = p.to_string();
                TimedUnit::new(p, move || {
                    log.borrow_mut().push(label.clone());
                    Ok(())
                })
            })
            .collect()
    }

    #[test]
    fn test_new_rejects_bad_options() {
        assert!(Benchmark::new(BenchOptions::default().repeat(0)).is_err());
        assert!(Benchmark::new(BenchOptions::default().metrics(false, false, false)).is_err());
    }

    #[test]
    fn test_rows_follow_unit_then_repetition_order() {
        let grid = ParamGrid::new().axis("N", [1usize, 2, 3]);
        let log = Rc::new(RefCell::new(Vec::new()));
        let table = wall_only(2).run(counting_units(&grid, Rc::clone(&log))).unwrap();

        assert_eq!(table.len(), 6);
        let order: Vec<(TagValue, usize)> = table
            .rows()
            .iter()
            .map(|r| (r.tags.get("N").cloned().unwrap(), r.repetition))
            .collect();
        assert_eq!(
            order,
            vec![
                (TagValue::Int(1), 0),
                (TagValue::Int(1), 1),
                (TagValue::Int(2), 0),
                (TagValue::Int(2), 1),
                (TagValue::Int(3), 0),
                (TagValue::Int(3), 1),
            ]
        );
        assert_eq!(log.borrow().len(), 6);
    }

    #[test]
    fn test_units_are_pulled_lazily() {
        let built = Rc::new(RefCell::new(0usize));
        let ran_when_built = Rc::new(RefCell::new(Vec::new()));

        let b = Rc::clone(&built);
        let r = Rc::clone(&ran_when_built);
        let units = (0..3usize).map(move |i| {
            *b.borrow_mut() += 1;
            let b = Rc::clone(&b);
            let r = Rc::clone(&r);
            TimedUnit::new(GridPoint::new().with("i", i), move || {
                r.borrow_mut().push(*b.borrow());
                Ok(())
            })
        });

        wall_only(1).run(units).unwrap();
        // Unit i ran when exactly i+1 units had been constructed.
        assert_eq!(*ran_when_built.borrow(), vec![1, 2, 3]);
        assert_eq!(*built.borrow(), 3);
    }

    #[test]
    fn test_abort_stops_at_first_failure() {
        let later_ran = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&later_ran);
        let units = vec![
            TimedUnit::new(GridPoint::new().with("N", 10usize), || Ok(())),
            TimedUnit::new(GridPoint::new().with("N", 20usize), || {
                anyhow::bail!("lbfgs did not converge")
            }),
            TimedUnit::new(GridPoint::new().with("N", 30usize), move || {
                *flag.borrow_mut() = true;
                Ok(())
            }),
        ];

        let err = wall_only(3).run(units).unwrap_err();
        match err {
            BenchError::UnitFailed {
                point, repetition, ..
            } => {
                assert_eq!(point.get("N"), Some(&TagValue::Int(20)));
                assert_eq!(repetition, 0);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!*later_ran.borrow());
    }

    #[test]
    fn test_record_and_continue_marks_failed_rows() {
        let bench = Benchmark::new(
            BenchOptions::default()
                .metrics(true, false, false)
                .repeat(2)
                .failure_policy(FailurePolicy::RecordAndContinue),
        )
        .unwrap();
        let units = vec![
            TimedUnit::new(GridPoint::new().with("N", 10usize), || {
                anyhow::bail!("singular matrix")
            }),
            TimedUnit::new(GridPoint::new().with("N", 20usize), || Ok(())),
        ];

        let table = bench.run(units).unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(table.failures().count(), 2);
        for row in &table.rows()[..2] {
            assert_eq!(row.error.as_deref(), Some("singular matrix"));
            assert_eq!(row.sample, Sample::default());
        }
        for row in &table.rows()[2..] {
            assert!(row.error.is_none());
            assert!(row.sample.wall_time.is_some());
        }
        assert_eq!(table.summary().rows[0].failures, 2);
    }

    #[test]
    fn test_tag_schema_mismatch_aborts_before_running() {
        let ran = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&ran);
        let units = vec![
            TimedUnit::new(GridPoint::new().with("N", 1usize), || Ok(())),
            TimedUnit::new(GridPoint::new().with("depth", 1usize), move || {
                *flag.borrow_mut() = true;
                Ok(())
            }),
        ];
        let err = wall_only(1).run(units).unwrap_err();
        assert!(matches!(err, BenchError::TagSchemaMismatch { .. }));
        assert!(!*ran.borrow());
    }

    #[test]
    fn test_wall_only_has_no_other_columns() {
        let units = vec![TimedUnit::new(GridPoint::new().with("N", 1usize), || Ok(()))];
        let table = wall_only(1).run(units).unwrap();
        let cols = table.columns();
        assert!(cols.contains(&"wall_time".to_string()));
        assert!(!cols.contains(&"cpu_time".to_string()));
        assert!(!cols.contains(&"peak_memory".to_string()));
        assert!(!table.metrics().contains(Metric::CpuTime));
    }

    #[test]
    fn test_progress_reports_state_transitions() {
        let grid = ParamGrid::new().axis("N", [1usize, 2]);
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut states = Vec::new();
        wall_only(2)
            .run_with_progress(counting_units(&grid, log), |s| states.push(s))
            .unwrap();
        assert_eq!(states.first(), Some(&RunState::NotStarted));
        assert_eq!(states.last(), Some(&RunState::Done));
        assert_eq!(states.len(), 2 + 4);
        assert_eq!(
            states[3],
            RunState::Running {
                unit: 1,
                repetition: 0
            }
        );
    }

    #[test]
    fn test_empty_units_give_empty_table() {
        let table = wall_only(3).run(Vec::<TimedUnit>::new()).unwrap();
        assert!(table.is_empty());
        assert!(table.tag_keys().is_empty());
    }

    #[test]
    fn test_tag_named_like_result_column_is_rejected() {
        let ran = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&ran);
        let units = vec![TimedUnit::new(
            GridPoint::new().with("N", 1usize).with("repetition", 5usize),
            move || {
                *flag.borrow_mut() = true;
                Ok(())
            },
        )];
        let err = wall_only(1).run(units).unwrap_err();
        assert!(matches!(err, BenchError::SchemaMismatch(_)));
        assert!(!*ran.borrow());
    }

    #[test]
    fn test_missing_instrument_drops_column_and_is_listed() {
        let bench = Benchmark::new(BenchOptions::default().metrics(true, false, true)).unwrap();
        let units = vec![TimedUnit::new(GridPoint::new().with("N", 1usize), || Ok(()))];
        let available = Availability {
            cpu_time: true,
            peak_memory: false,
        };
        let table = bench.run_probed(units, |_| {}, available).unwrap();

        assert_eq!(table.columns(), vec!["N", "repetition", "wall_time"]);
        assert_eq!(table.omitted(), &[Metric::PeakMemory]);
        assert_eq!(table.rows()[0].sample.peak_memory, None);

        let json = crate::sink::JsonSink::to_value(&table).unwrap();
        assert_eq!(json["omitted"], serde_json::json!(["peak_memory"]));
        assert!(json["rows"][0].get("peak_memory").is_none());
    }
}
