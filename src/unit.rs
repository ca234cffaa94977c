//! Deferred, tagged units of work.

use crate::grid::GridPoint;
use std::fmt;

type Call = Box<dyn FnMut() -> anyhow::Result<()>>;

/// A deferred computation plus the tags of the grid point it belongs to.
///
/// The callable is invoked once per repetition, so it must be `FnMut`: state
/// it owns (an estimator, a dataset slice) is reused across repetitions.
pub struct TimedUnit {
    tags: GridPoint,
    call: Call,
}

impl TimedUnit {
    pub fn new<F>(tags: GridPoint, call: F) -> Self
    where
        F: FnMut() -> anyhow::Result<()> + 'static,
    {
        Self {
            tags,
            call: Box::new(call),
        }
    }

    pub fn tags(&self) -> &GridPoint {
        &self.tags
    }

    /// Execute the deferred computation once.
    pub fn invoke(&mut self) -> anyhow::Result<()> {
        (self.call)()
    }

    pub fn into_tags(self) -> GridPoint {
        self.tags
    }
}

impl fmt::Debug for TimedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimedUnit")
            .field("tags", &self.tags)
            .finish_non_exhaustive()
    }
}

/// Wrap a call whose output (typically a fitted model) is not needed.
///
/// The output goes through `std::hint::black_box` and is dropped inside the
/// measurement window.
pub fn delayed<F, R>(tags: GridPoint, mut f: F) -> TimedUnit
where
    F: FnMut() -> anyhow::Result<R> + 'static,
{
    TimedUnit::new(tags, move || {
        let out = f()?;
        std::hint::black_box(out);
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_unit_is_not_executed_on_construction() {
        let calls = Rc::new(Cell::new(0));
        let c = Rc::clone(&calls);
        let mut unit = TimedUnit::new(GridPoint::new().with("N", 1usize), move || {
            c.set(c.get() + 1);
            Ok(())
        });
        assert_eq!(calls.get(), 0);
        unit.invoke().unwrap();
        unit.invoke().unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_delayed_discards_output_and_propagates_errors() {
        let mut ok = delayed(GridPoint::new(), || Ok(vec![1.0_f64; 8]));
        assert!(ok.invoke().is_ok());

        let mut bad = delayed(GridPoint::new(), || -> anyhow::Result<u8> {
            anyhow::bail!("singular matrix")
        });
        let err = bad.invoke().unwrap_err();
        assert_eq!(err.to_string(), "singular matrix");
    }

    #[test]
    fn test_debug_shows_tags() {
        let unit = TimedUnit::new(GridPoint::new().with("solver", "lbfgs"), || Ok(()));
        let dbg = format!("{:?}", unit);
        assert!(dbg.contains("solver"));
    }
}
