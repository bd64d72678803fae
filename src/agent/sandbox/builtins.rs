//! Functions added on top of the Starlark standard library.
//!
//! `print` writes into the run's captured output, `sum` fills a gap in the
//! standard set, `range` materializes a list against the run's item budget,
//! and `llm_query` explains that delegation happens outside code blocks.

use std::cell::{RefCell, RefMut};

use anyhow::{anyhow, bail};
use starlark::any::ProvidesStaticType;
use starlark::environment::GlobalsBuilder;
use starlark::eval::Evaluator;
use starlark::starlark_module;
use starlark::values::Value;
use starlark::values::list::AllocList;
use starlark::values::none::NoneType;
use starlark::values::tuple::UnpackTuple;

/// Per-run state reachable from builtins through `Evaluator::extra`.
#[derive(Debug, ProvidesStaticType)]
pub(super) struct RunState {
    pub(super) output: String,
    range_budget: usize,
    range_left: usize,
}

impl RunState {
    pub(super) const fn new(range_budget: usize) -> Self {
        Self {
            output: String::new(),
            range_budget,
            range_left: range_budget,
        }
    }

    fn charge_range(&mut self, items: usize) -> anyhow::Result<()> {
        if items > self.range_left {
            bail!("range budget of {} items per run exceeded", self.range_budget);
        }
        self.range_left -= items;
        Ok(())
    }
}

fn run_state<'v, 'a>(eval: &Evaluator<'v, 'a, '_>) -> anyhow::Result<RefMut<'a, RunState>> {
    eval.extra
        .as_ref()
        .and_then(|extra| extra.downcast_ref::<RefCell<RunState>>())
        .map(RefCell::borrow_mut)
        .ok_or_else(|| anyhow!("sandbox run state is not attached"))
}

/// Integers produced by `range(start, stop, step)`, or an error when the
/// step is zero or the count exceeds `limit`.
pub(super) fn range_items(start: i32, stop: i32, step: i32, limit: usize) -> anyhow::Result<Vec<i32>> {
    if step == 0 {
        bail!("range() step must not be zero");
    }
    let (start, stop, step) = (i64::from(start), i64::from(stop), i64::from(step));
    let span = if step > 0 { stop - start } else { start - stop };
    let count = if span <= 0 {
        0
    } else {
        (span + step.abs() - 1) / step.abs()
    };
    let count = usize::try_from(count).unwrap_or(usize::MAX);
    if count > limit {
        bail!("range of {count} items exceeds the remaining range budget of {limit}");
    }
    Ok((0..count)
        .scan(start, |next, _| {
            let current = *next;
            *next += step;
            i32::try_from(current).ok()
        })
        .collect())
}

#[starlark_module]
pub(super) fn sandbox_builtins(builder: &mut GlobalsBuilder) {
    fn print<'v>(
        #[starlark(args)] args: UnpackTuple<Value<'v>>,
        #[starlark(require = named)] sep: Option<&'v str>,
        #[starlark(require = named)] end: Option<&'v str>,
        eval: &mut Evaluator<'v, '_, '_>,
    ) -> anyhow::Result<NoneType> {
        let line = args
            .items
            .iter()
            .map(|value| value.to_str())
            .collect::<Vec<_>>()
            .join(sep.unwrap_or(" "));
        let mut state = run_state(eval)?;
        state.output.push_str(&line);
        state.output.push_str(end.unwrap_or("\n"));
        Ok(NoneType)
    }

    fn sum<'v>(
        #[starlark(require = pos)] items: Value<'v>,
        #[starlark(require = pos)] start: Option<Value<'v>>,
        eval: &mut Evaluator<'v, '_, '_>,
    ) -> anyhow::Result<Value<'v>> {
        let heap = eval.heap();
        let mut total = start.unwrap_or_else(|| heap.alloc(0_i32));
        for item in items.iterate(heap).map_err(|e| anyhow!("{e}"))? {
            total = total.add(item, heap).map_err(|e| anyhow!("{e}"))?;
        }
        Ok(total)
    }

    fn range<'v>(
        #[starlark(require = pos)] first: i32,
        #[starlark(require = pos)] second: Option<i32>,
        #[starlark(require = pos)] step: Option<i32>,
        eval: &mut Evaluator<'v, '_, '_>,
    ) -> anyhow::Result<Value<'v>> {
        let (start, stop) = second.map_or((0, first), |stop| (first, stop));
        let items = {
            let mut state = run_state(eval)?;
            let items = range_items(start, stop, step.unwrap_or(1), state.range_left)?;
            state.charge_range(items.len())?;
            items
        };
        Ok(eval.heap().alloc(AllocList(items)))
    }

    fn llm_query<'v>(#[starlark(require = pos)] prompt: &'v str) -> anyhow::Result<NoneType> {
        bail!(
            "llm_query(\"{}\") cannot run inside a code block. Write llm_query(\"...\") in your \
             response text, outside code blocks, to delegate sub-tasks",
            prompt.chars().take(60).collect::<String>()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_items_forward_and_backward() {
        assert_eq!(range_items(0, 5, 1, 100).unwrap_or_default(), vec![0, 1, 2, 3, 4]);
        assert_eq!(range_items(1, 10, 4, 100).unwrap_or_default(), vec![1, 5, 9]);
        assert_eq!(range_items(5, 0, -2, 100).unwrap_or_default(), vec![5, 3, 1]);
        assert!(range_items(5, 5, 1, 100).unwrap_or_default().is_empty());
        assert!(range_items(0, 5, -1, 100).unwrap_or_default().is_empty());
    }

    #[test]
    fn test_range_items_extreme_bounds() {
        let items = range_items(i32::MAX - 2, i32::MAX, i32::MAX, 10).unwrap_or_default();
        assert_eq!(items, vec![i32::MAX - 2]);
        let items = range_items(i32::MIN, i32::MAX, i32::MAX, 10).unwrap_or_default();
        assert_eq!(items, vec![i32::MIN, -1, i32::MAX - 1]);
    }

    #[test]
    fn test_range_items_rejections() {
        assert!(range_items(0, 10, 0, 100).is_err());
        assert!(range_items(0, 1_000, 1, 999).is_err());
        assert!(range_items(0, 1_000, 1, 1_000).is_ok());
    }

    #[test]
    fn test_range_charge() {
        let mut state = RunState::new(10);
        assert!(state.charge_range(6).is_ok());
        assert!(state.charge_range(4).is_ok());
        assert!(state.charge_range(1).is_err());
    }
}
