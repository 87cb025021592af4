//! Shared fixtures for unit tests: in-memory sort sessions with injectable
//! failures.

use crate::{
    aggregate::BoundedSelector,
    capability::ValueOrdering,
    error::InternalError,
    sort::{SortSession, SortSessionFactory},
    value::Value,
};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

/// Fill a selector with exactly `values`, at capacity.
pub(crate) fn ints_selector(values: &[i64]) -> BoundedSelector {
    let mut selector = BoundedSelector::new(values.len());
    for v in values {
        selector
            .insert(Value::Int64(*v))
            .expect("selector has room");
    }

    selector
}

///
/// VecSession
///
/// Sorts in memory. Optionally fails after `fail_after` puts and
/// optionally truncates its output to `keep` values.
///

struct VecSession {
    ordering: ValueOrdering,
    values: Vec<Value>,
    output: Option<std::vec::IntoIter<Value>>,
    fail_after: Option<usize>,
    keep: Option<usize>,
    ended: bool,
    ended_counter: Arc<AtomicUsize>,
}

impl SortSession for VecSession {
    fn put(&mut self, value: Value) -> Result<(), InternalError> {
        if self.fail_after.is_some_and(|limit| self.values.len() >= limit) {
            return Err(InternalError::sort_exhausted("injected put failure"));
        }
        self.values.push(value);

        Ok(())
    }

    fn perform_sort(&mut self) -> Result<(), InternalError> {
        let mut values = std::mem::take(&mut self.values);
        values.sort_by(|a, b| self.ordering.compare(a, b));
        if let Some(keep) = self.keep {
            values.truncate(keep);
        }
        self.output = Some(values.into_iter());

        Ok(())
    }

    fn next_value(&mut self) -> Result<Option<Value>, InternalError> {
        Ok(self.output.as_mut().and_then(Iterator::next))
    }

    fn end(&mut self) {
        if !self.ended {
            self.ended = true;
            self.values.clear();
            self.output = None;
            self.ended_counter.fetch_add(1, Ordering::SeqCst);
        }
    }
}

///
/// FailingSortFactory
///

#[derive(Default)]
pub(crate) struct FailingSortFactory {
    fail_begin: bool,
    fail_after: Option<usize>,
    ended: Arc<AtomicUsize>,
}

impl FailingSortFactory {
    /// Every `begin` fails.
    pub(crate) fn on_begin() -> Self {
        Self {
            fail_begin: true,
            ..Self::default()
        }
    }

    /// Sessions start, then fail on the put after `puts` successful ones.
    pub(crate) fn after_puts(puts: usize) -> Self {
        Self {
            fail_after: Some(puts),
            ..Self::default()
        }
    }

    pub(crate) fn ended_sessions(&self) -> usize {
        self.ended.load(Ordering::SeqCst)
    }
}

impl SortSessionFactory for FailingSortFactory {
    fn begin(&self, ordering: ValueOrdering) -> Result<Box<dyn SortSession>, InternalError> {
        if self.fail_begin {
            return Err(InternalError::sort_exhausted("injected begin failure"));
        }

        Ok(Box::new(VecSession {
            ordering,
            values: Vec::new(),
            output: None,
            fail_after: self.fail_after,
            keep: None,
            ended: false,
            ended_counter: Arc::clone(&self.ended),
        }))
    }
}

///
/// ShortSortFactory
///
/// Sessions whose sorted output silently stops after `keep` values.
///

pub(crate) struct ShortSortFactory {
    pub(crate) keep: usize,
}

impl SortSessionFactory for ShortSortFactory {
    fn begin(&self, ordering: ValueOrdering) -> Result<Box<dyn SortSession>, InternalError> {
        Ok(Box::new(VecSession {
            ordering,
            values: Vec::new(),
            output: None,
            fail_after: None,
            keep: Some(self.keep),
            ended: false,
            ended_counter: Arc::default(),
        }))
    }
}
